// RunPod GraphQL API.
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{PriceSource, json_with_timeout};
use crate::model::{RawOffer, SourceError};

const ENDPOINT: &str = "https://api.runpod.io/graphql";
const TIME_LIMIT: Duration = Duration::from_secs(5);

const GPU_TYPES_QUERY: &str = r#"
    query GpuTypes {
        gpuTypes {
            id
            displayName
            memoryInGb
            communityPrice
            securePrice
            lowestPrice(input: {gpuCount: 1}) {
                minVcpu
                minMemory
            }
        }
    }
"#;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: GpuTypesData,
}

#[derive(Debug, Deserialize)]
struct GpuTypesData {
    #[serde(rename = "gpuTypes")]
    gpu_types: Vec<GpuType>,
}

#[derive(Debug, Deserialize)]
struct GpuType {
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(rename = "memoryInGb")]
    memory_in_gb: Option<u32>,
    #[serde(rename = "communityPrice")]
    community_price: Option<f64>,
    #[serde(rename = "securePrice")]
    secure_price: Option<f64>,
    #[serde(rename = "lowestPrice")]
    lowest_price: Option<LowestPrice>,
}

#[derive(Debug, Deserialize)]
struct LowestPrice {
    #[serde(rename = "minVcpu")]
    min_vcpu: Option<u32>,
    #[serde(rename = "minMemory")]
    min_memory: Option<u32>,
}

pub struct RunPodSource {
    client: Client,
    api_key: Option<String>,
}

impl RunPodSource {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

#[async_trait::async_trait]
impl PriceSource for RunPodSource {
    fn name(&self) -> &'static str {
        "RunPod"
    }

    async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
        let Some(key) = &self.api_key else {
            return Ok(Vec::new());
        };

        let request = self
            .client
            .post(ENDPOINT)
            .query(&[("api_key", key.as_str())])
            .json(&json!({ "query": GPU_TYPES_QUERY }));
        let body = json_with_timeout(request, TIME_LIMIT).await?;
        let parsed: GraphqlResponse = serde_json::from_value(body)
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        let offers = parsed
            .data
            .gpu_types
            .into_iter()
            .filter_map(|gpu| {
                // Secure (datacenter) price preferred over community price.
                let price = gpu.secure_price.or(gpu.community_price).unwrap_or(0.0);
                if price <= 0.0 {
                    return None;
                }
                let (vcpus, ram_gb) = gpu
                    .lowest_price
                    .map(|l| (l.min_vcpu, l.min_memory))
                    .unwrap_or((None, None));
                Some(RawOffer {
                    provider: self.name().to_string(),
                    model_text: gpu.display_name,
                    price_per_hour: price,
                    vram_gb: gpu.memory_in_gb,
                    vcpus,
                    ram_gb,
                    storage_gb: None,
                })
            })
            .collect();
        Ok(offers)
    }
}
