use crate::traits::Predictor;
use async_trait::async_trait;
use harvest_common::{HarvestError, Result};
use harvest_http::{Auth, HttpClient, RequestOpts};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<UrlInstance<'a>>,
}

#[derive(Debug, Serialize)]
struct UrlInstance<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<JsonValue>,
    #[serde(rename = "deployedModelId")]
    deployed_model_id: Option<String>,
}

/// Vertex AI online prediction endpoint client.
///
/// Requires a valid OAuth access token and internet access.
pub struct VertexEndpointClient {
    http: HttpClient,
    path: String,
    token: String,
    name: String,
}

impl VertexEndpointClient {
    /// Client for the regional Vertex AI host of `location`.
    pub fn new(project: &str, location: &str, endpoint_id: &str, token: String) -> Result<Self> {
        if location.is_empty()
            || !location
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(HarvestError::Config(format!(
                "location {location:?} is not a valid region"
            )));
        }
        let base = format!("https://{location}-aiplatform.googleapis.com/");
        Self::with_base_url(&base, project, location, endpoint_id, token)
    }

    /// Client against an arbitrary host (private endpoints, tests).
    pub fn with_base_url(
        base: &str,
        project: &str,
        location: &str,
        endpoint_id: &str,
        token: String,
    ) -> Result<Self> {
        for (field, value) in [
            ("project", project),
            ("location", location),
            ("model_id", endpoint_id),
        ] {
            if value.trim().is_empty() {
                return Err(HarvestError::Config(format!("{field} must not be empty")));
            }
        }

        let http = HttpClient::new(base)
            .map_err(|e| HarvestError::Config(format!("prediction endpoint base: {e}")))?
            .with_timeout(Duration::from_secs(60));
        let path = format!(
            "v1/projects/{project}/locations/{location}/endpoints/{endpoint_id}:predict"
        );
        let name = format!("projects/{project}/locations/{location}/endpoints/{endpoint_id}");

        Ok(Self {
            http,
            path,
            token,
            name,
        })
    }
}

#[async_trait]
impl Predictor for VertexEndpointClient {
    async fn predict(&self, url: &str) -> Result<Vec<JsonValue>> {
        let request = PredictRequest {
            instances: vec![UrlInstance { url }],
        };

        tracing::debug!(endpoint = %self.name, url, "Sending prediction request");

        let resp: PredictResponse = self
            .http
            .post_json(
                &self.path,
                &request,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.token)),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| HarvestError::Prediction(format!("{url}: {e}")))?;

        tracing::debug!(
            endpoint = %self.name,
            url,
            predictions = resp.predictions.len(),
            deployed_model_id = ?resp.deployed_model_id,
            "prediction.received"
        );
        Ok(resp.predictions)
    }

    fn endpoint_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_path_is_built_from_config_values() {
        let client =
            VertexEndpointClient::new("news-lab", "us-central1", "4417", "tok".into()).unwrap();
        assert_eq!(
            client.path,
            "v1/projects/news-lab/locations/us-central1/endpoints/4417:predict"
        );
        assert_eq!(
            client.endpoint_name(),
            "projects/news-lab/locations/us-central1/endpoints/4417"
        );
    }

    #[test]
    fn location_must_look_like_a_region() {
        assert!(VertexEndpointClient::new("p", "us central", "1", "tok".into()).is_err());
        assert!(VertexEndpointClient::new("p", "", "1", "tok".into()).is_err());
    }

    #[test]
    fn request_wraps_url_as_single_instance() {
        let body = serde_json::to_value(PredictRequest {
            instances: vec![UrlInstance {
                url: "https://a.example",
            }],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"instances": [{"url": "https://a.example"}]}));
    }
}
