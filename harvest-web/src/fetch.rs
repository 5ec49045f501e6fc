//! Best-effort page fetching: one GET per URL, failures become `None`.

use crate::pages::RawPageMap;
use crate::politeness::PolitenessPolicy;
use crate::urls::UrlSet;
use harvest_http::{HttpClient, HttpError, RequestOpts};
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, HeaderMap, HeaderValue,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use std::sync::Arc;
use std::time::Duration;

/// Whole-request budget for a page.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";
const PREVIEW_CHARS: usize = 100;

/// Client-wide fetch settings.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    /// `(scheme, proxy URL)` pairs, scheme being `http`, `https` or `all`.
    pub proxies: Vec<(String, String)>,
    /// Honor proxy environment variables when `proxies` is empty.
    pub system_proxy: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: FETCH_TIMEOUT,
            proxies: Vec::new(),
            system_proxy: true,
        }
    }
}

/// How a failed fetch is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-2xx status.
    Http,
    /// Timeout or transport error.
    Request,
    /// Anything else (malformed URL, unusable header).
    Unexpected,
}

impl FetchFailure {
    pub fn classify(err: &HttpError) -> Self {
        match err {
            HttpError::Api { .. } => FetchFailure::Http,
            e if e.is_transport() => FetchFailure::Request,
            _ => FetchFailure::Unexpected,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FetchFailure::Http => "HTTP Error",
            FetchFailure::Request => "Request Error",
            FetchFailure::Unexpected => "Unexpected Error",
        }
    }
}

/// Sequential page fetcher sharing one connection pool across requests.
pub struct WebFetcher {
    http: HttpClient,
    politeness: Arc<dyn PolitenessPolicy>,
}

impl WebFetcher {
    pub fn new(
        settings: &FetchSettings,
        politeness: Arc<dyn PolitenessPolicy>,
    ) -> Result<Self, HttpError> {
        let mut builder = HttpClient::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .system_proxy(settings.system_proxy);
        for (scheme, proxy_url) in &settings.proxies {
            builder = builder.proxy(scheme, proxy_url)?;
        }
        Ok(Self {
            http: builder.build()?,
            politeness,
        })
    }

    fn browser_headers(&self) -> Result<HeaderMap, HttpError> {
        let agent = self.politeness.user_agent();
        let mut h = HeaderMap::new();
        h.insert(
            USER_AGENT,
            HeaderValue::from_str(&agent)
                .map_err(|e| HttpError::Build(format!("invalid user agent {agent:?}: {e}")))?,
        );
        h.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        h.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        h.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        h.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        h.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        Ok(h)
    }

    /// Wait per the politeness policy, then GET `url` once.
    pub async fn try_fetch(&self, url: &str) -> Result<String, HttpError> {
        let delay = self.politeness.next_delay();
        if !delay.is_zero() {
            tracing::debug!(url, delay_ms = delay.as_millis() as u64, "fetch.delay");
            tokio::time::sleep(delay).await;
        }
        let opts = RequestOpts {
            headers: Some(self.browser_headers()?),
            ..Default::default()
        };
        self.http.get_text(url, opts).await
    }

    /// Like [`Self::try_fetch`], but logs the failure and returns `None`.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        match self.try_fetch(url).await {
            Ok(html) => Some(html),
            Err(err) => {
                let kind = FetchFailure::classify(&err);
                tracing::warn!(url, kind = ?kind, error = %err, "{} fetching {url}", kind.label());
                None
            }
        }
    }

    /// Fetch every URL in order; failures are recorded as `None`.
    pub async fn fetch_all(&self, urls: &UrlSet) -> RawPageMap {
        let mut pages = RawPageMap::new();
        for url in urls.iter() {
            let html = self.fetch(url).await;
            if let Some(body) = html.as_deref().filter(|b| !b.is_empty()) {
                tracing::info!(url, preview = %preview(body), "Data fetched");
            }
            pages.insert(url.to_string(), html);
        }
        let failed = pages.values().filter(|v| v.is_none()).count();
        tracing::info!(total = pages.len(), failed, "fetch.done");
        pages
    }
}

fn preview(body: &str) -> String {
    let mut out: String = body.chars().take(PREVIEW_CHARS).collect();
    if out.len() < body.len() {
        out.push_str("...");
    }
    out
}
