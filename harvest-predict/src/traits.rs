use async_trait::async_trait;
use harvest_common::Result;
use serde_json::Value as JsonValue;

#[async_trait]
pub trait Predictor: Send + Sync {
    /// Submit one URL as the sole instance and return the raw predictions.
    async fn predict(&self, url: &str) -> Result<Vec<JsonValue>>;

    /// Human-readable name of the remote endpoint, for logs.
    fn endpoint_name(&self) -> &str;
}
