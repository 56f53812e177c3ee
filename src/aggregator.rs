// Scatter-gather aggregation: fan out all sources, canonicalize, merge.
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::catalog::{
    category_for, fallback_catalog, is_excluded, provider_details_for, provider_type_for,
};
use crate::freshness::FreshnessTracker;
use crate::model::{Availability, MergedOffer, RawOffer, SystemSpecs};
use crate::normalizer::canonicalize;
use crate::sources::PriceSource;
use crate::utils::{round_price, to_kebab_case};

pub struct Aggregator {
    sources: Vec<Arc<dyn PriceSource>>,
    freshness: Arc<FreshnessTracker>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>, freshness: Arc<FreshnessTracker>) -> Self {
        Self { sources, freshness }
    }

    /// Runs one full aggregation pass. Never fails: source errors are absorbed
    /// at the fetch boundary and a total outage falls back to the static
    /// catalog.
    pub async fn aggregate(&self) -> Vec<MergedOffer> {
        let tasks: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                tokio::spawn(async move {
                    let name = source.name();
                    match source.fetch().await {
                        Ok(offers) => {
                            info!("{}: fetched {} offers", name, offers.len());
                            offers
                        }
                        Err(e) => {
                            warn!("{}: fetch failed: {}", name, e);
                            Vec::new()
                        }
                    }
                })
            })
            .collect();

        // Sources have already mapped their own failures to empty; a task
        // that dies anyway (panic) still only contributes nothing.
        let mut raw = Vec::new();
        for (idx, settled) in join_all(tasks).await.into_iter().enumerate() {
            match settled {
                Ok(offers) => raw.extend(offers),
                Err(e) => warn!("{}: task aborted: {}", self.sources[idx].name(), e),
            }
        }
        info!("total raw offers from all sources: {}", raw.len());

        self.merge(raw)
    }

    /// Canonicalizes, deduplicates and sorts one pass worth of raw offers.
    /// Duplicate (model, provider) pairs resolve last-processed-wins.
    fn merge(&self, raw: Vec<RawOffer>) -> Vec<MergedOffer> {
        let now = Utc::now();
        let mut merged: HashMap<(usize, String), MergedOffer> = HashMap::new();

        for offer in raw {
            let Some((target_idx, target)) = canonicalize(&offer.model_text) else {
                debug!("dropping untracked model '{}'", offer.model_text);
                continue;
            };
            if is_excluded(target.name, &offer.provider) {
                continue;
            }

            let details = provider_details_for(&offer.provider);
            let system_specs = offer.vcpus.zip(offer.ram_gb).map(|(vcpu, ram)| SystemSpecs {
                vcpu,
                ram,
                storage: offer.storage_gb,
            });

            let key = (target_idx, offer.provider.to_lowercase());
            merged.insert(key, MergedOffer {
                id: format!(
                    "{}-{}",
                    to_kebab_case(target.name),
                    to_kebab_case(&offer.provider)
                ),
                model: target.name.to_string(),
                price: round_price(offer.price_per_hour),
                // Adapter-reported VRAM is unreliable; the table value wins.
                vram: target.vram_gb,
                category: category_for(target.name),
                provider_type: provider_type_for(&offer.provider),
                gpu_count: 1,
                system_specs,
                signup_credit: details.and_then(|d| d.signup_credit).map(str::to_string),
                availability: Availability::Available,
                launch_url: details.map(|d| d.launch_url.to_string()),
                slug: target.slug.to_string(),
                last_updated: now,
                provider: offer.provider,
            });
        }

        if merged.is_empty() {
            warn!("no live offers from any source, serving static fallback catalog");
            return fallback_catalog();
        }

        let mut entries: Vec<((usize, String), MergedOffer)> = merged.into_iter().collect();
        entries.sort_by(|a, b| {
            a.0.0
                .cmp(&b.0.0)
                .then_with(|| a.1.price.total_cmp(&b.1.price))
        });
        let offers: Vec<MergedOffer> = entries.into_iter().map(|(_, offer)| offer).collect();

        info!("merge complete: {} unique model/provider offers", offers.len());
        self.freshness.mark_updated();
        offers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GpuCategory, ProviderType, SourceError};

    struct StubSource {
        name: &'static str,
        offers: Vec<RawOffer>,
    }

    struct FailingSource;

    struct PanickingSource;

    fn raw(provider: &str, model_text: &str, price: f64) -> RawOffer {
        RawOffer {
            provider: provider.to_string(),
            model_text: model_text.to_string(),
            price_per_hour: price,
            vram_gb: None,
            vcpus: None,
            ram_gb: None,
            storage_gb: None,
        }
    }

    #[async_trait::async_trait]
    impl PriceSource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }
        async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
            Ok(self.offers.clone())
        }
    }

    #[async_trait::async_trait]
    impl PriceSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
            Err(SourceError::Timeout)
        }
    }

    #[async_trait::async_trait]
    impl PriceSource for PanickingSource {
        fn name(&self) -> &'static str {
            "panicking"
        }
        async fn fetch(&self) -> Result<Vec<RawOffer>, SourceError> {
            panic!("source misbehaved");
        }
    }

    fn aggregator(sources: Vec<Arc<dyn PriceSource>>) -> (Aggregator, Arc<FreshnessTracker>) {
        let freshness = Arc::new(FreshnessTracker::new());
        (Aggregator::new(sources, Arc::clone(&freshness)), freshness)
    }

    #[tokio::test]
    async fn duplicate_model_provider_pairs_resolve_last_processed_wins() {
        let (agg, _) = aggregator(vec![Arc::new(StubSource {
            name: "stub",
            offers: vec![
                raw("Spheron", "Nvidia H100 SXM5", 1.21),
                raw("Spheron", "H100 SXM", 1.33),
            ],
        })]);
        let offers = agg.aggregate().await;
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].model, "Nvidia H100 SXM5");
        assert_eq!(offers[0].price, 1.33);
    }

    #[tokio::test]
    async fn later_source_overrides_earlier_one() {
        let (agg, _) = aggregator(vec![
            Arc::new(StubSource {
                name: "first",
                offers: vec![raw("Spheron", "H100 SXM5", 1.99)],
            }),
            Arc::new(StubSource {
                name: "second",
                offers: vec![raw("Spheron", "H100 SXM5", 1.33)],
            }),
        ]);
        let offers = agg.aggregate().await;
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price, 1.33);
    }

    #[tokio::test]
    async fn no_two_offers_share_a_model_provider_pair() {
        let (agg, _) = aggregator(vec![
            Arc::new(StubSource {
                name: "a",
                offers: vec![
                    raw("RunPod", "H100 SXM", 2.69),
                    raw("RunPod", "NVIDIA H100 80GB SXM5", 2.79),
                    raw("RunPod", "RTX 4090", 0.59),
                    raw("Lambda", "H100 SXM", 2.49),
                ],
            }),
            Arc::new(StubSource {
                name: "b",
                offers: vec![raw("RunPod", "H100_SXM5", 2.99)],
            }),
        ]);
        let offers = agg.aggregate().await;
        let mut keys: Vec<(String, String)> = offers
            .iter()
            .map(|o| (o.model.clone(), o.provider.to_lowercase()))
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[tokio::test]
    async fn total_outage_serves_the_static_fallback() {
        let (agg, freshness) = aggregator(vec![
            Arc::new(FailingSource),
            Arc::new(StubSource { name: "empty", offers: vec![] }),
        ]);
        let before = freshness.last_updated();
        let offers = agg.aggregate().await;
        assert_eq!(offers.len(), 5);
        assert!(offers.iter().any(|o| o.model == "Nvidia H100 SXM5"));
        // Fallback does not count as a successful live update.
        assert_eq!(freshness.last_updated(), before);
    }

    #[tokio::test]
    async fn panicking_source_does_not_poison_the_pass() {
        let (agg, _) = aggregator(vec![
            Arc::new(PanickingSource),
            Arc::new(StubSource {
                name: "stub",
                offers: vec![raw("Spheron", "H100 SXM5", 1.33)],
            }),
        ]);
        let offers = agg.aggregate().await;
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].model, "Nvidia H100 SXM5");
    }

    #[tokio::test]
    async fn output_sorted_by_target_order_then_price() {
        let (agg, _) = aggregator(vec![Arc::new(StubSource {
            name: "stub",
            offers: vec![
                raw("RunPod", "RTX 4090", 0.59),
                raw("Spheron", "RTX 4090", 0.58),
                raw("Lambda", "H100 SXM", 2.49),
                raw("RunPod", "B200", 5.98),
            ],
        })]);
        let offers = agg.aggregate().await;
        let summary: Vec<(&str, f64)> = offers
            .iter()
            .map(|o| (o.model.as_str(), o.price))
            .collect();
        assert_eq!(summary, vec![
            ("Nvidia B200", 5.98),
            ("Nvidia H100 SXM5", 2.49),
            ("Nvidia RTX 4090", 0.58),
            ("Nvidia RTX 4090", 0.59),
        ]);
    }

    #[tokio::test]
    async fn table_vram_overrides_adapter_reported_vram() {
        let mut offer = raw("RunPod", "RTX 4090", 0.59);
        offer.vram_gb = Some(48);
        let (agg, _) = aggregator(vec![Arc::new(StubSource {
            name: "stub",
            offers: vec![offer],
        })]);
        let offers = agg.aggregate().await;
        assert_eq!(offers[0].vram, 24);
    }

    #[tokio::test]
    async fn category_and_provider_type_derivation() {
        let (agg, _) = aggregator(vec![Arc::new(StubSource {
            name: "stub",
            offers: vec![raw("RunPod", "RTX 4090", 0.59)],
        })]);
        let offers = agg.aggregate().await;
        assert_eq!(offers[0].category, GpuCategory::Budget);
        assert_eq!(offers[0].provider_type, ProviderType::Cloud);
        assert_eq!(offers[0].signup_credit.as_deref(), Some("Up to $5"));
        assert!(offers[0].launch_url.is_some());
    }

    #[tokio::test]
    async fn excluded_pairs_are_dropped() {
        let (agg, _) = aggregator(vec![Arc::new(StubSource {
            name: "stub",
            offers: vec![
                raw("Vast.ai", "RTX 4090", 0.28),
                raw("RunPod", "RTX 4090", 0.59),
            ],
        })]);
        let offers = agg.aggregate().await;
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].provider, "RunPod");
    }

    #[tokio::test]
    async fn untracked_models_are_dropped_silently() {
        let (agg, _) = aggregator(vec![Arc::new(StubSource {
            name: "stub",
            offers: vec![
                raw("Vast.ai", "Radeon RX 7900 XTX", 0.15),
                raw("RunPod", "H100 SXM", 2.69),
            ],
        })]);
        let offers = agg.aggregate().await;
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].model, "Nvidia H100 SXM5");
    }

    #[tokio::test]
    async fn successful_live_merge_marks_freshness() {
        let (agg, freshness) = aggregator(vec![Arc::new(StubSource {
            name: "stub",
            offers: vec![raw("Spheron", "H100 SXM5", 1.33)],
        })]);
        let before = freshness.last_updated();
        agg.aggregate().await;
        assert!(freshness.last_updated() >= before);
        assert_eq!(freshness.time_since(), "Just now");
    }
}
