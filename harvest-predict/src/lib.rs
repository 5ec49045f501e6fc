//! Remote prediction for harvested URLs.
//!
//! This crate exposes a common [`traits::Predictor`] interface and a
//! concrete client for Vertex AI endpoints. [`predictor_from_config`] builds
//! the client from a [`harvest_config::HarvestConfig`] and the access token in
//! the environment.
//!
//! # Examples
//! ```no_run
//! use harvest_config::HarvestConfig;
//! use harvest_predict::predictor_from_config;
//!
//! # async fn demo() -> harvest_common::Result<()> {
//! let cfg = HarvestConfig::template();
//! let predictor = predictor_from_config(&cfg)?;
//! let predictions = predictor.predict("https://example.com/story").await?;
//! println!("{predictions:?}");
//! # Ok(())
//! # }
//! ```
pub mod traits;
pub mod vertex;

use harvest_common::{HarvestError, Result};
use harvest_config::HarvestConfig;
use std::sync::Arc;
use traits::Predictor;
use vertex::VertexEndpointClient;

/// Environment variable holding the OAuth access token for the endpoint.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Build the endpoint client for `config`.
///
/// Fails with [`HarvestError::Config`] when no access token is available.
pub fn predictor_from_config(
    config: &HarvestConfig,
) -> Result<Arc<dyn Predictor + Send + Sync + 'static>> {
    let token = std::env::var(ACCESS_TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            HarvestError::Config(format!(
                "{ACCESS_TOKEN_ENV} is not set; export a token (e.g. `gcloud auth print-access-token`)"
            ))
        })?;
    let client = VertexEndpointClient::new(
        &config.project,
        &config.location,
        &config.model_id,
        token,
    )?;
    Ok(Arc::new(client))
}
