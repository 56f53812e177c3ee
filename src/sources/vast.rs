// Vast.ai marketplace bundles API. VRAM and host RAM arrive in MB.
use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};

use super::{PriceSource, json_with_timeout};
use crate::model::{RawOffer, SourceError};

const ENDPOINT: &str = "https://console.vast.ai/api/v0/bundles/";
const TIME_LIMIT: Duration = Duration::from_secs(5);

pub struct VastSource {
    client: Client,
    api_key: Option<String>,
}

impl VastSource {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

#[async_trait::async_trait]
impl PriceSource for VastSource {
    fn name(&self) -> &'static str {
        "Vast.ai"
    }

    async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
        let Some(key) = &self.api_key else {
            return Ok(Vec::new());
        };

        let filter = json!({
            "verified": { "eq": true },
            "external": { "eq": false },
            "rentable": { "eq": true },
            "type": "on-demand"
        });
        let request = self
            .client
            .get(ENDPOINT)
            .query(&[("q", filter.to_string())])
            .bearer_auth(key);
        let body = json_with_timeout(request, TIME_LIMIT).await?;
        let bundles = body
            .get("offers")
            .and_then(Value::as_array)
            .ok_or_else(|| SourceError::InvalidResponse("response missing offers array".into()))?;

        let mut offers = Vec::new();
        for bundle in bundles {
            let price = bundle.get("dph_total").and_then(Value::as_f64).unwrap_or(0.0);
            let num_gpus = bundle.get("num_gpus").and_then(Value::as_u64);
            // Single-GPU configs only; a missing count is treated as one.
            if price <= 0.0 || !matches!(num_gpus, None | Some(1)) {
                continue;
            }
            let Some(gpu_name) = bundle.get("gpu_name").and_then(Value::as_str) else {
                continue;
            };
            offers.push(RawOffer {
                provider: self.name().to_string(),
                model_text: gpu_name.to_string(),
                price_per_hour: price,
                vram_gb: mb_to_gb(bundle.get("gpu_ram")),
                vcpus: bundle
                    .get("cpu_cores_effective")
                    .and_then(Value::as_f64)
                    .map(|v| v.round() as u32),
                ram_gb: mb_to_gb(bundle.get("cpu_ram")),
                storage_gb: bundle
                    .get("disk_space")
                    .and_then(Value::as_f64)
                    .map(|v| v.round() as u32),
            });
        }
        Ok(offers)
    }
}

fn mb_to_gb(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(Value::as_f64)
        .map(|mb| (mb / 1024.0).round() as u32)
}
