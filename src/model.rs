// Core structs: RawOffer, MergedOffer, SourceError
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// A single GPU rental offer as reported by one pricing source, before
/// canonicalization. Lives only within one aggregation pass.
#[derive(Debug, Clone)]
pub struct RawOffer {
    pub provider: String,
    pub model_text: String,
    pub price_per_hour: f64,
    pub vram_gb: Option<u32>,
    pub vcpus: Option<u32>,
    pub ram_gb: Option<u32>,
    pub storage_gb: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GpuCategory {
    #[serde(rename = "High-End")]
    HighEnd,
    #[serde(rename = "Mid-Range")]
    MidRange,
    Budget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProviderType {
    Cloud,
    Marketplace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Availability {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemSpecs {
    #[serde(rename = "vCPU")]
    pub vcpu: u32,
    pub ram: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<u32>,
}

/// Final display-ready offer, one per unique (canonical model, provider) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedOffer {
    pub id: String,
    pub model: String,
    pub provider: String,
    pub price: f64,
    pub vram: u32,
    #[serde(rename = "type")]
    pub category: GpuCategory,
    pub provider_type: ProviderType,
    pub gpu_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_specs: Option<SystemSpecs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signup_credit: Option<String>,
    pub availability: Availability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_url: Option<String>,
    pub slug: String,
    pub last_updated: DateTime<Utc>,
}

/// Failure of a single pricing source. Absorbed and logged at the
/// aggregation boundary; never propagates past it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),
}
