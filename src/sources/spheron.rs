// Spheron public gpu-offers API. No credential required.
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{PriceSource, json_with_timeout};
use crate::model::{RawOffer, SourceError};

const ENDPOINT: &str = "https://app.spheron.ai/api/gpu-offers";
const TIME_LIMIT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GpuOffersResponse {
    #[serde(default)]
    data: Vec<GpuTypeEntry>,
}

#[derive(Debug, Deserialize)]
struct GpuTypeEntry {
    #[serde(rename = "gpuType")]
    gpu_type: Option<String>,
    #[serde(rename = "gpuModel")]
    gpu_model: Option<String>,
    #[serde(rename = "baseGpuType")]
    base_gpu_type: Option<String>,
    #[serde(rename = "totalAvailable", default)]
    total_available: u32,
    #[serde(default)]
    offers: Vec<GpuOffer>,
}

#[derive(Debug, Deserialize)]
struct GpuOffer {
    #[serde(default)]
    available: bool,
    #[serde(default)]
    price: f64,
    #[serde(rename = "gpuCount", default)]
    gpu_count: u32,
    #[serde(default)]
    maintenance: bool,
    gpu_memory: Option<u32>,
    vcpus: Option<u32>,
    memory: Option<u32>,
    storage: Option<u32>,
}

pub struct SpheronSource {
    client: Client,
}

impl SpheronSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl PriceSource for SpheronSource {
    fn name(&self) -> &'static str {
        "Spheron"
    }

    async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
        let request = self.client.get(ENDPOINT).query(&[
            ("page", "1"),
            ("limit", "200"),
            ("sortBy", "popularity"),
            ("sortOrder", "asc"),
        ]);
        let body = json_with_timeout(request, TIME_LIMIT).await?;
        let parsed: GpuOffersResponse = serde_json::from_value(body)
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;
        if parsed.data.is_empty() {
            return Err(SourceError::InvalidResponse("no gpu data received".into()));
        }

        let mut results = Vec::new();
        for entry in parsed.data {
            if entry.total_available == 0 {
                continue;
            }
            let Some(model_text) = entry
                .gpu_type
                .or(entry.gpu_model)
                .or(entry.base_gpu_type)
            else {
                continue;
            };
            // Single-GPU offers only; multi-GPU configs are not comparable.
            for offer in entry
                .offers
                .into_iter()
                .filter(|o| o.available && o.price > 0.0 && o.gpu_count == 1 && !o.maintenance)
            {
                results.push(RawOffer {
                    provider: self.name().to_string(),
                    model_text: model_text.clone(),
                    price_per_hour: offer.price,
                    vram_gb: offer.gpu_memory,
                    vcpus: offer.vcpus,
                    ram_gb: offer.memory,
                    storage_gb: offer.storage,
                });
            }
        }
        Ok(results)
    }
}
