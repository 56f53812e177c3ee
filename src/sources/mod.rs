// Pricing sources: one adapter per external provider API.
mod lambda;
mod prime_intellect;
mod runpod;
mod spheron;
mod spheron_base;
mod tensordock;
mod vast;

pub use lambda::LambdaSource;
pub use prime_intellect::PrimeIntellectSource;
pub use runpod::RunPodSource;
pub use spheron::SpheronSource;
pub use spheron_base::SpheronBaseSource;
pub use tensordock::TensorDockSource;
pub use vast::VastSource;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::time::timeout;

use crate::config::AppConfig;
use crate::model::{RawOffer, SourceError};

/// One external pricing source. Implementations never panic; a missing
/// credential yields an empty result without a network call, and every
/// transport or schema problem surfaces as a `SourceError` for the
/// aggregation boundary to absorb.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError>;
}

/// Sends a prepared request and decodes the JSON body, bounding both phases
/// by the per-source time limit.
pub(crate) async fn json_with_timeout(
    request: reqwest::RequestBuilder,
    limit: Duration,
) -> Result<Value, SourceError> {
    let response = match timeout(limit, request.send()).await {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => return Err(SourceError::Http(e)),
        Err(_) => return Err(SourceError::Timeout),
    };
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::InvalidResponse(format!("status {status}")));
    }
    match timeout(limit, response.json::<Value>()).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(SourceError::Http(e)),
        Err(_) => Err(SourceError::Timeout),
    }
}

/// Builds the full source registry. The static Spheron base list goes first
/// so that live data from any keyed source overrides it under the
/// last-write-wins dedup rule.
pub fn build_sources(config: &AppConfig) -> Vec<Arc<dyn PriceSource>> {
    let client = Client::builder()
        .user_agent("gpuprice/0.1")
        .build()
        .expect("failed to build http client");

    vec![
        Arc::new(SpheronBaseSource::new()),
        Arc::new(PrimeIntellectSource::new(
            client.clone(),
            config.prime_intellect_api_key.clone(),
        )),
        Arc::new(LambdaSource::new(client.clone(), config.lambda_api_key.clone())),
        Arc::new(TensorDockSource::new(
            client.clone(),
            config.tensordock_api_key.clone(),
        )),
        Arc::new(SpheronSource::new(client.clone())),
        Arc::new(RunPodSource::new(client.clone(), config.runpod_api_key.clone())),
        Arc::new(VastSource::new(client, config.vast_api_key.clone())),
    ]
}
