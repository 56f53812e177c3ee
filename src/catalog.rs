// Static catalog: tracked GPU models, provider details, fallback data.
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Availability, GpuCategory, MergedOffer, ProviderType, SystemSpecs};
use crate::utils::to_kebab_case;

/// One tracked GPU model. Table declaration order is significant: it is both
/// the canonicalization tie-break order and the display sort order.
pub struct TargetGpu {
    pub name: &'static str,
    pub slug: &'static str,
    /// Authoritative VRAM; adapter-reported values are considered unreliable
    /// and are always overridden by this.
    pub vram_gb: u32,
    pub(crate) patterns: Vec<Regex>,
}

struct TargetSpec {
    name: &'static str,
    slug: &'static str,
    vram_gb: u32,
    patterns: &'static [&'static str],
}

// Patterns are matched against cleaned, lowercased model text. An unqualified
// variant resolves to the first listed entry for that family, so the anchored
// catch-alls live on the SXM entries and PCIE entries only match explicitly.
const TARGET_SPECS: &[TargetSpec] = &[
    TargetSpec { name: "Nvidia B300", slug: "b300", vram_gb: 288, patterns: &[r"\bb300\b"] },
    TargetSpec { name: "Nvidia B200", slug: "b200", vram_gb: 180, patterns: &[r"\bb200\b"] },
    TargetSpec { name: "Nvidia GH200", slug: "gh200", vram_gb: 96, patterns: &[r"\bgh200\b"] },
    TargetSpec { name: "Nvidia H200", slug: "h200", vram_gb: 141, patterns: &[r"\bh200\b"] },
    TargetSpec {
        name: "Nvidia H100 SXM5",
        slug: "h100",
        vram_gb: 80,
        patterns: &[r"h100.*sxm", r"hgx h100", r"h100 80gb$", r"^h100$"],
    },
    TargetSpec {
        name: "Nvidia H100 PCIE",
        slug: "h100-pcie",
        vram_gb: 80,
        patterns: &[r"h100.*pcie"],
    },
    TargetSpec {
        name: "Nvidia A100 80GB SXM4",
        slug: "a100",
        vram_gb: 80,
        patterns: &[r"a100.*sxm", r"a100 80gb$", r"^a100$"],
    },
    TargetSpec {
        name: "Nvidia A100 80GB PCIE",
        slug: "a100-pcie",
        vram_gb: 80,
        patterns: &[r"a100.*pcie"],
    },
    TargetSpec {
        name: "Nvidia RTX 6000 Ada Generation",
        slug: "6000ada",
        vram_gb: 48,
        patterns: &[r"6000 ada", r"rtx 6000"],
    },
    TargetSpec { name: "Nvidia L40S", slug: "l40s", vram_gb: 48, patterns: &[r"\bl40s\b"] },
    TargetSpec { name: "Nvidia L40", slug: "l40", vram_gb: 48, patterns: &[r"\bl40\b"] },
    TargetSpec { name: "Nvidia A6000", slug: "a6000", vram_gb: 48, patterns: &[r"a6000"] },
    TargetSpec { name: "Nvidia RTX A4500", slug: "rtxa4500", vram_gb: 20, patterns: &[r"a4500"] },
    TargetSpec { name: "Nvidia RTX A4000", slug: "rtxa4000", vram_gb: 16, patterns: &[r"a4000"] },
    TargetSpec { name: "Nvidia RTX 5090", slug: "rtx5090", vram_gb: 32, patterns: &[r"\b5090\b"] },
    TargetSpec { name: "Nvidia RTX 5080", slug: "rtx5080", vram_gb: 16, patterns: &[r"\b5080\b"] },
    TargetSpec {
        name: "Nvidia RTX 5070 Ti",
        slug: "rtx5070ti",
        vram_gb: 16,
        patterns: &[r"5070 ti"],
    },
    TargetSpec {
        name: "Nvidia RTX 5060 Ti",
        slug: "rtx5060ti",
        vram_gb: 16,
        patterns: &[r"5060 ti"],
    },
    TargetSpec { name: "Nvidia RTX 4090", slug: "rtx4090", vram_gb: 24, patterns: &[r"\b4090\b"] },
    TargetSpec { name: "Nvidia RTX 3090", slug: "rtx3090", vram_gb: 24, patterns: &[r"\b3090\b"] },
];

pub static TARGET_GPUS: Lazy<Vec<TargetGpu>> = Lazy::new(|| {
    TARGET_SPECS
        .iter()
        .map(|spec| TargetGpu {
            name: spec.name,
            slug: spec.slug,
            vram_gb: spec.vram_gb,
            patterns: spec
                .patterns
                .iter()
                .map(|p| Regex::new(p).expect("invalid target pattern"))
                .collect(),
        })
        .collect()
});

/// Display category, derived by substring over the canonical model name.
pub fn category_for(model_name: &str) -> GpuCategory {
    let lower = model_name.to_lowercase();
    if ["b300", "b200", "h200", "h100", "a100"].iter().any(|m| lower.contains(m)) {
        GpuCategory::HighEnd
    } else if ["3090", "4090"].iter().any(|m| lower.contains(m)) {
        GpuCategory::Budget
    } else {
        GpuCategory::MidRange
    }
}

/// Marketplace vs managed-cloud split, inferred from the provider name.
pub fn provider_type_for(provider: &str) -> ProviderType {
    let lower = provider.to_lowercase();
    if lower.contains("vast") || lower.contains("tensordock") {
        ProviderType::Marketplace
    } else {
        ProviderType::Cloud
    }
}

pub struct ProviderDetails {
    pub launch_url: &'static str,
    pub signup_credit: Option<&'static str>,
}

const PROVIDER_DETAILS: &[(&str, ProviderDetails)] = &[
    ("runpod", ProviderDetails {
        launch_url: "https://runpod.io/?ref=ywe09aak",
        signup_credit: Some("Up to $5"),
    }),
    ("vast.ai", ProviderDetails {
        launch_url: "https://cloud.vast.ai/?ref_id=258548",
        signup_credit: None,
    }),
    ("lambda", ProviderDetails {
        launch_url: "https://cloud.lambdalabs.com/",
        signup_credit: None,
    }),
    ("tensordock", ProviderDetails {
        launch_url: "https://dashboard.tensordock.com/deploy",
        signup_credit: None,
    }),
    ("spheron", ProviderDetails {
        launch_url: "https://spheron.network/",
        signup_credit: None,
    }),
    ("prime intellect", ProviderDetails {
        launch_url: "https://app.primeintellect.ai/",
        signup_credit: None,
    }),
];

pub fn provider_details_for(provider: &str) -> Option<&'static ProviderDetails> {
    let lower = provider.to_lowercase();
    PROVIDER_DETAILS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, details)| details)
}

/// (canonical model, provider) pairs removed from the merged output. Lets
/// selected providers rank without these competitors on the listed models.
pub const EXCLUDED_PAIRS: &[(&str, &str)] = &[
    ("Nvidia A100 80GB SXM4", "Vast.ai"),
    ("Nvidia RTX 4090", "Vast.ai"),
    ("Nvidia RTX 4090", "TensorDock"),
];

pub fn is_excluded(model: &str, provider: &str) -> bool {
    EXCLUDED_PAIRS
        .iter()
        .any(|(m, p)| *m == model && p.eq_ignore_ascii_case(provider))
}

struct FallbackSpec {
    model: &'static str,
    provider: &'static str,
    price: f64,
    vcpu: u32,
    ram: u32,
}

// Already in target-model order; substituted wholesale on total outage.
const FALLBACK_SPECS: &[FallbackSpec] = &[
    FallbackSpec { model: "Nvidia B200", provider: "RunPod", price: 5.98, vcpu: 64, ram: 512 },
    FallbackSpec { model: "Nvidia H200", provider: "RunPod", price: 3.59, vcpu: 48, ram: 384 },
    FallbackSpec { model: "Nvidia H100 SXM5", provider: "TensorDock", price: 2.00, vcpu: 28, ram: 192 },
    FallbackSpec { model: "Nvidia A100 80GB SXM4", provider: "Spheron", price: 1.50, vcpu: 24, ram: 180 },
    FallbackSpec { model: "Nvidia RTX 4090", provider: "RunPod", price: 0.34, vcpu: 8, ram: 32 },
];

/// Builds the static fallback catalog, used when no live data is available.
pub fn fallback_catalog() -> Vec<MergedOffer> {
    let now = Utc::now();
    FALLBACK_SPECS
        .iter()
        .map(|spec| {
            let target = TARGET_GPUS
                .iter()
                .find(|t| t.name == spec.model)
                .expect("fallback model missing from target table");
            let details = provider_details_for(spec.provider);
            MergedOffer {
                id: format!(
                    "{}-{}",
                    to_kebab_case(spec.model),
                    to_kebab_case(spec.provider)
                ),
                model: spec.model.to_string(),
                provider: spec.provider.to_string(),
                price: spec.price,
                vram: target.vram_gb,
                category: category_for(spec.model),
                provider_type: provider_type_for(spec.provider),
                gpu_count: 1,
                system_specs: Some(SystemSpecs {
                    vcpu: spec.vcpu,
                    ram: spec.ram,
                    storage: None,
                }),
                signup_credit: details
                    .and_then(|d| d.signup_credit)
                    .map(str::to_string),
                availability: Availability::Available,
                launch_url: details.map(|d| d.launch_url.to_string()),
                slug: target.slug.to_string(),
                last_updated: now,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_table_is_well_formed() {
        assert_eq!(TARGET_GPUS.len(), 20);
        for target in TARGET_GPUS.iter() {
            assert!(!target.patterns.is_empty(), "{} has no patterns", target.name);
            assert!(target.vram_gb > 0);
        }
    }

    #[test]
    fn categories_follow_substring_rule() {
        assert_eq!(category_for("Nvidia H100 SXM5"), GpuCategory::HighEnd);
        assert_eq!(category_for("Nvidia GH200"), GpuCategory::HighEnd);
        assert_eq!(category_for("Nvidia RTX 4090"), GpuCategory::Budget);
        assert_eq!(category_for("Nvidia RTX 3090"), GpuCategory::Budget);
        assert_eq!(category_for("Nvidia L40S"), GpuCategory::MidRange);
        assert_eq!(category_for("Nvidia RTX 5090"), GpuCategory::MidRange);
    }

    #[test]
    fn marketplace_providers_are_detected() {
        assert_eq!(provider_type_for("Vast.ai"), ProviderType::Marketplace);
        assert_eq!(provider_type_for("TensorDock"), ProviderType::Marketplace);
        assert_eq!(provider_type_for("RunPod"), ProviderType::Cloud);
        assert_eq!(provider_type_for("Spheron"), ProviderType::Cloud);
    }

    #[test]
    fn fallback_catalog_has_five_entries_in_model_order() {
        let catalog = fallback_catalog();
        assert_eq!(catalog.len(), 5);
        let positions: Vec<usize> = catalog
            .iter()
            .map(|offer| {
                TARGET_GPUS
                    .iter()
                    .position(|t| t.name == offer.model)
                    .unwrap()
            })
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn runpod_fallback_entries_carry_signup_credit() {
        let catalog = fallback_catalog();
        for offer in catalog.iter().filter(|o| o.provider == "RunPod") {
            assert_eq!(offer.signup_credit.as_deref(), Some("Up to $5"));
            assert!(offer.launch_url.is_some());
        }
    }
}
