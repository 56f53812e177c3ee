// Lambda public cloud instance-types API.
use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{PriceSource, json_with_timeout};
use crate::model::{RawOffer, SourceError};

const ENDPOINT: &str = "https://cloud.lambdalabs.com/api/v1/instance-types";
const TIME_LIMIT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct InstanceTypesResponse {
    data: HashMap<String, InstanceTypeEntry>,
}

#[derive(Debug, Deserialize)]
struct InstanceTypeEntry {
    instance_type: InstanceType,
    price_cents_per_hour: f64,
}

#[derive(Debug, Deserialize)]
struct InstanceType {
    name: String,
    description: String,
}

pub struct LambdaSource {
    client: Client,
    api_key: Option<String>,
}

impl LambdaSource {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

#[async_trait::async_trait]
impl PriceSource for LambdaSource {
    fn name(&self) -> &'static str {
        "Lambda"
    }

    async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
        let Some(key) = &self.api_key else {
            return Ok(Vec::new());
        };

        // API key as basic-auth username, empty password.
        let body = json_with_timeout(
            self.client.get(ENDPOINT).basic_auth(key, Some("")),
            TIME_LIMIT,
        )
        .await?;
        let parsed: InstanceTypesResponse = serde_json::from_value(body)
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        let offers = parsed
            .data
            .into_values()
            .filter(|entry| entry.instance_type.name.contains("gpu"))
            .map(|entry| RawOffer {
                provider: self.name().to_string(),
                model_text: entry.instance_type.description,
                price_per_hour: entry.price_cents_per_hour / 100.0,
                vram_gb: None,
                vcpus: None,
                ram_gb: None,
                storage_gb: None,
            })
            .collect();
        Ok(offers)
    }
}
