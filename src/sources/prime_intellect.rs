// Prime Intellect availability API. Responds with an object keyed by GPU
// type, each value an array of offers.
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::{PriceSource, json_with_timeout};
use crate::model::{RawOffer, SourceError};

const ENDPOINT: &str = "https://api.primeintellect.ai/api/v1/availability/";
const TIME_LIMIT: Duration = Duration::from_secs(5);

pub struct PrimeIntellectSource {
    client: Client,
    api_key: Option<String>,
}

impl PrimeIntellectSource {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

#[async_trait::async_trait]
impl PriceSource for PrimeIntellectSource {
    fn name(&self) -> &'static str {
        "Prime Intellect"
    }

    async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
        let Some(key) = &self.api_key else {
            return Ok(Vec::new());
        };

        let body = json_with_timeout(
            self.client.get(ENDPOINT).bearer_auth(key),
            TIME_LIMIT,
        )
        .await?;
        let map = body.as_object().ok_or_else(|| {
            SourceError::InvalidResponse("expected object keyed by gpu type".into())
        })?;

        let mut offers = Vec::new();
        for (gpu_type, entry) in map {
            let Some(list) = entry.as_array() else { continue };
            for offer in list {
                let prices = offer.get("prices");
                let price_per_hour = prices
                    .and_then(|p| p.get("onDemand"))
                    .and_then(Value::as_f64)
                    .or_else(|| {
                        prices
                            .and_then(|p| p.get("communityPrice"))
                            .and_then(Value::as_f64)
                    })
                    .or_else(|| offer.get("price").and_then(Value::as_f64))
                    .unwrap_or(0.0);
                if price_per_hour <= 0.0 {
                    continue;
                }

                let model_text = offer
                    .get("gpuType")
                    .or_else(|| offer.get("gpu_type"))
                    .or_else(|| offer.get("model"))
                    .and_then(Value::as_str)
                    .unwrap_or(gpu_type.as_str())
                    .to_string();

                offers.push(RawOffer {
                    provider: self.name().to_string(),
                    model_text,
                    price_per_hour,
                    vram_gb: offer.get("gpuMemory").and_then(Value::as_u64).map(|v| v as u32),
                    vcpus: nested_count(offer, "vcpu"),
                    ram_gb: nested_count(offer, "memory"),
                    storage_gb: nested_count(offer, "disk"),
                });
            }
        }
        Ok(offers)
    }
}

fn nested_count(offer: &Value, field: &str) -> Option<u32> {
    offer
        .get(field)
        .and_then(|v| v.get("defaultCount"))
        .and_then(Value::as_u64)
        .map(|v| v as u32)
}
