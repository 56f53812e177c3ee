// Published Spheron base rates. Spheron's dashboard pricing is stable enough
// to ship as a fixed list; the live Spheron source overrides these entries
// whenever it returns data.
use super::PriceSource;
use crate::model::{RawOffer, SourceError};

const BASE_RATES: &[(&str, f64, u32)] = &[
    ("Nvidia H100", 1.33, 80),
    ("Nvidia H200", 1.56, 141),
    ("Nvidia A100", 0.72, 80),
    ("Nvidia RTX 4090", 0.58, 24),
    ("Nvidia RTX 5090", 0.68, 32),
    ("Nvidia L40S", 0.69, 48),
    ("Nvidia B200", 2.25, 192),
    ("Nvidia GH200", 1.88, 96),
];

pub struct SpheronBaseSource;

impl SpheronBaseSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl PriceSource for SpheronBaseSource {
    fn name(&self) -> &'static str {
        "Spheron base rates"
    }

    async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
        let offers = BASE_RATES
            .iter()
            .map(|(model, price, vram)| RawOffer {
                provider: "Spheron".to_string(),
                model_text: model.to_string(),
                price_per_hour: *price,
                vram_gb: Some(*vram),
                vcpus: None,
                ram_gb: None,
                storage_gb: None,
            })
            .collect();
        Ok(offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn base_rates_always_fetch() {
        let offers = SpheronBaseSource::new().fetch().await.unwrap();
        assert_eq!(offers.len(), 8);
        assert!(offers.iter().all(|o| o.provider == "Spheron"));
        assert!(offers.iter().all(|o| o.price_per_hour > 0.0));
    }
}
