//! Minimal HTTP client with safe logging, proxies, and bearer auth.
//!
//! - One attempt per request: no retries, no backoff
//! - Text GET for page scraping, JSON POST for API calls
//! - Proxies per scheme, optional system proxy detection
//! - Redacts authorization headers and never logs secret values
//! - Optional *raw* request/response logging via `HARVEST_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), harvest_http::HttpError> {
//! let client = harvest_http::HttpClient::builder()
//!     .timeout(std::time::Duration::from_secs(10))
//!     .proxy("https", "http://10.10.1.10:1080")?
//!     .build()?;
//! let html = client
//!     .get_text("https://example.com/news", harvest_http::RequestOpts::default())
//!     .await?;
//! # let _ = html;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and
//! (optionally) raw request/response lines (target `http.raw`).

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, Proxy, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "HARVEST_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (key, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", key, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        if let Ok(s) = std::str::from_utf8(bytes) {
            let mut s = s.to_string();
            if s.len() > RAW_MAX_BODY {
                truncate_at_char_boundary(&mut s, RAW_MAX_BODY);
                s.push('…');
            }
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        } else {
            parts.push(format!("--data-binary @- # ({} bytes)", bytes.len()));
        }
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Headers whose values never reach the logs.
const SECRET_HEADERS: &[&str] = &["authorization", "proxy-authorization", "cookie"];

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str();
            let val = if SECRET_HEADERS.contains(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("<binary>").to_string()
            };
            (key.to_string(), val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// Failures that happened on the wire (timeouts and transport errors).
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::Timeout(_) | HttpError::Network(_))
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use harvest_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// assert!(matches!(bearer, Auth::Bearer("token")));
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    None,
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use harvest_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Bearer("ya29.token")),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
}

// ==============================
// Builder
// ==============================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProxyScheme {
    Http,
    Https,
    All,
}

impl ProxyScheme {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Some(ProxyScheme::Http),
            "https" => Some(ProxyScheme::Https),
            "all" => Some(ProxyScheme::All),
            _ => None,
        }
    }
}

/// Collects client-wide settings; proxies can only be fixed at build time.
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    base: Option<String>,
    connect_timeout: Duration,
    timeout: Duration,
    proxies: Vec<(ProxyScheme, String)>,
    system_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            base: None,
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            proxies: Vec::new(),
            system_proxy: true,
        }
    }
}

impl HttpClientBuilder {
    /// Anchor relative request paths to `base`.
    pub fn base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    /// Default whole-request timeout; overridable per request.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = dur;
        self
    }

    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = dur;
        self
    }

    /// Route requests of `scheme` (`http`, `https` or `all`) through `proxy_url`.
    ///
    /// ```
    /// use harvest_http::HttpClient;
    ///
    /// assert!(HttpClient::builder().proxy("https", "http://10.0.0.1:3128").is_ok());
    /// assert!(HttpClient::builder().proxy("ftp", "http://10.0.0.1:3128").is_err());
    /// ```
    pub fn proxy(mut self, scheme: &str, proxy_url: &str) -> Result<Self, HttpError> {
        let parsed = ProxyScheme::parse(scheme)
            .ok_or_else(|| HttpError::Build(format!("unsupported proxy scheme: {scheme}")))?;
        Url::parse(proxy_url).map_err(|e| HttpError::Url(format!("proxy {proxy_url}: {e}")))?;
        self.proxies.push((parsed, proxy_url.to_string()));
        Ok(self)
    }

    /// Whether to honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment when no
    /// explicit proxy is configured. Enabled by default.
    pub fn system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, HttpError> {
        let base = self
            .base
            .as_deref()
            .map(|b| Url::parse(b).map_err(|e| HttpError::Url(e.to_string())))
            .transpose()?;

        let mut cb = Client::builder().connect_timeout(self.connect_timeout);
        if !self.proxies.is_empty() || !self.system_proxy {
            cb = cb.no_proxy();
        }
        for (scheme, proxy_url) in &self.proxies {
            let proxy = match scheme {
                ProxyScheme::Http => Proxy::http(proxy_url),
                ProxyScheme::Https => Proxy::https(proxy_url),
                ProxyScheme::All => Proxy::all(proxy_url),
            }
            .map_err(|e| HttpError::Build(e.to_string()))?;
            cb = cb.proxy(proxy);
        }
        tracing::debug!(
            base = ?base.as_ref().map(Url::as_str),
            proxy_count = self.proxies.len(),
            system_proxy = self.system_proxy,
            timeout_ms = self.timeout.as_millis() as u64,
            "http.client.build"
        );
        let inner = cb.build().map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(HttpClient {
            base,
            inner,
            connect_timeout: self.connect_timeout,
            default_timeout: self.timeout,
        })
    }
}

// ==============================
// Client
// ==============================

/// Shared connection pool; clone freely.
#[derive(Clone)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    connect_timeout: Duration,
    pub default_timeout: Duration,
}

struct RawResponse {
    req_id: String,
    body: Vec<u8>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use harvest_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://us-central1-aiplatform.googleapis.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        Self::builder().base(base).build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Override the default timeout.
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Budget for establishing a connection, fixed when the client was built.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// GET `path` and return the body decoded as UTF-8 (invalid bytes replaced).
    ///
    /// Absolute URLs are used as-is; relative paths are joined onto the base.
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let resp = self.execute::<()>(Method::GET, path, None, opts).await?;
        Ok(String::from_utf8_lossy(&resp.body).into_owned())
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.execute(Method::POST, path, Some(body), opts).await?;
        serde_json::from_slice::<T>(&resp.body).map_err(|e| {
            let snippet = snip_body(&resp.body);
            tracing::warn!(
                req_id=%resp.req_id,
                serde_line=%e.line(),
                serde_col=%e.column(),
                serde_err=%e.to_string(),
                body_snippet=%snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        if let Ok(abs) = Url::parse(path) {
            return Ok(abs);
        }
        match &self.base {
            Some(base) => base.join(path).map_err(|e| HttpError::Url(e.to_string())),
            None => Err(HttpError::Url(format!("relative URL without base: {path}"))),
        }
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;

        // ----- Build request -----
        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        rb = rb.timeout(timeout);

        // body (serialize up front so we can log exact bytes)
        let mut request_body_bytes: Option<Vec<u8>> = None;
        if let Some(b) = body {
            let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
            request_body_bytes = Some(bytes.clone());
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes);
        }

        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        let auth_kind = match &opts.auth {
            Some(Auth::Bearer(tok)) => {
                let tok = sanitize_token(tok)?;
                rb = rb.bearer_auth(tok);
                "bearer"
            }
            Some(Auth::None) | None => "none",
        };

        // ----- Safe request logging (pre-send) -----
        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let merged = opts.headers.clone().unwrap_or_default();
            let curl = make_curl(&method, &url, &merged, request_body_bytes.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = rb
            .send()
            .await
            .map_err(|err| transport_error(&req_id, "send", err))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| transport_error(&req_id, "body", err))?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%req_hdr_id,
            content_type=?headers.get(reqwest::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snippet,
            "http.response.body_snippet"
        );

        if status.is_success() {
            return Ok(RawResponse {
                req_id,
                body: bytes.to_vec(),
            });
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%req_hdr_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id: req_hdr_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn transport_error(req_id: &str, stage: &'static str, err: reqwest::Error) -> HttpError {
    let message = err.to_string();
    if err.is_timeout() {
        tracing::warn!(req_id=%req_id, stage, message=%message, "http.timeout");
        return HttpError::Timeout(message);
    }
    tracing::warn!(req_id=%req_id, stage, message=%message, "http.network_error");
    HttpError::Network(message)
}

fn extract_error_message(body: &[u8]) -> String {
    // Google APIs: {"error":{"code":403,"message":"...","status":"PERMISSION_DENIED"}}
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<ErrorEnvelope>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        truncate_at_char_boundary(&mut snip, 500);
        snip.push_str("...");
    }
    snip
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

fn sanitize_token(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("access token is empty".into()));
    }
    if !s.is_ascii() {
        return Err(HttpError::Build("access token contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "access token contains control characters".into(),
        ));
    }

    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
