// TensorDock marketplace hostnodes API. `hostnodes` is a dynamic map and
// each node lists its GPUs under keys like `geforcertx4090-pcie-24gb`.
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::{PriceSource, json_with_timeout};
use crate::model::{RawOffer, SourceError};

const ENDPOINT: &str = "https://dashboard.tensordock.com/api/v0/client/deploy/hostnodes";
const TIME_LIMIT: Duration = Duration::from_secs(10);

pub struct TensorDockSource {
    client: Client,
    api_key: Option<String>,
}

impl TensorDockSource {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

#[async_trait::async_trait]
impl PriceSource for TensorDockSource {
    fn name(&self) -> &'static str {
        "TensorDock"
    }

    async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
        let Some(key) = &self.api_key else {
            return Ok(Vec::new());
        };

        let body = json_with_timeout(
            self.client.get(ENDPOINT).query(&[("api_key", key.as_str())]),
            TIME_LIMIT,
        )
        .await?;
        let hostnodes = body
            .get("hostnodes")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                SourceError::InvalidResponse("response missing hostnodes map".into())
            })?;

        let mut offers = Vec::new();
        for node in hostnodes.values() {
            let Some(specs) = node.get("specs") else { continue };
            let Some(gpus) = specs.get("gpu").and_then(Value::as_object) else {
                continue;
            };
            let vcpus = spec_amount(specs, "cpu");
            let ram_gb = spec_amount(specs, "ram");
            let storage_gb = spec_amount(specs, "storage");

            for (gpu_key, info) in gpus {
                let amount = info.get("amount").and_then(Value::as_u64).unwrap_or(0);
                let price = info.get("price").and_then(Value::as_f64).unwrap_or(0.0);
                if amount == 0 || price <= 0.0 {
                    continue;
                }
                offers.push(RawOffer {
                    provider: self.name().to_string(),
                    model_text: gpu_key.clone(),
                    price_per_hour: price,
                    vram_gb: info.get("vram").and_then(Value::as_u64).map(|v| v as u32),
                    vcpus,
                    ram_gb,
                    storage_gb,
                });
            }
        }
        Ok(offers)
    }
}

fn spec_amount(specs: &Value, field: &str) -> Option<u32> {
    specs
        .get(field)
        .and_then(|v| v.get("amount"))
        .and_then(Value::as_f64)
        .map(|v| v.round() as u32)
}
