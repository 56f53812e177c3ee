// Free-text GPU model canonicalization: ordered pattern table,
// first-match-wins.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::{TARGET_GPUS, TargetGpu};

static CONFIG_SUFFIXES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(high perf(ormance)?|low ram|high ram|standard|performance|compute|memory|optimized|baremetal|dgx)\b",
    )
    .expect("invalid suffix pattern")
});
static GLUED_RTX: Lazy<Regex> = Lazy::new(|| Regex::new(r"rtx(\d)").unwrap());
static GLUED_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(pro|quadro|titan|tesla)(\d)").unwrap());
static DIGIT_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)([a-z]{2,})").unwrap());
static VRAM_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*gb?\b").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalizes raw model text into the form the pattern table matches against:
/// lowercase, vendor tokens and configuration suffixes removed, glued tokens
/// re-spaced, VRAM tokens collapsed to `NNgb`.
pub fn clean_model_text(text: &str) -> String {
    let mut name = text.to_lowercase().replace(['_', '-'], " ");
    name = name.replace("geforce", "").replace("nvidia", "");
    name = CONFIG_SUFFIXES.replace_all(&name, " ").into_owned();
    name = GLUED_RTX.replace_all(&name, "rtx $1").into_owned();
    name = GLUED_PREFIX.replace_all(&name, "$1 $2").into_owned();
    name = DIGIT_LETTER.replace_all(&name, "$1 $2").into_owned();
    name = VRAM_TOKEN.replace_all(&name, "${1}gb").into_owned();
    WHITESPACE.replace_all(&name, " ").trim().to_string()
}

/// Resolves free-text model names to a tracked GPU. Evaluates the target
/// table in declaration order and stops at the first entry with a matching
/// pattern; later entries are never consulted. Returns the table index along
/// with the entry so callers can sort by declaration order.
pub fn canonicalize(model_text: &str) -> Option<(usize, &'static TargetGpu)> {
    let cleaned = clean_model_text(model_text);
    if cleaned.is_empty() {
        return None;
    }
    TARGET_GPUS
        .iter()
        .enumerate()
        .find(|(_, target)| target.patterns.iter().any(|p| p.is_match(&cleaned)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_name(text: &str) -> Option<&'static str> {
        canonicalize(text).map(|(_, t)| t.name)
    }

    #[test]
    fn sxm_variant_beats_unqualified_catch_all() {
        assert_eq!(
            canonical_name("NVIDIA A100 80GB SXM"),
            Some("Nvidia A100 80GB SXM4")
        );
        // No explicit bus variant resolves to the SXM entry, not PCIE.
        assert_eq!(canonical_name("A100 80GB"), Some("Nvidia A100 80GB SXM4"));
        assert_eq!(canonical_name("A100_80GB"), Some("Nvidia A100 80GB SXM4"));
    }

    #[test]
    fn pcie_variants_resolve_explicitly() {
        assert_eq!(canonical_name("A100 80GB PCIe"), Some("Nvidia A100 80GB PCIE"));
        assert_eq!(canonical_name("H100 80GB PCIE"), Some("Nvidia H100 PCIE"));
    }

    #[test]
    fn h100_family_resolves() {
        assert_eq!(canonical_name("H100 SXM"), Some("Nvidia H100 SXM5"));
        assert_eq!(canonical_name("NVIDIA HGX H100"), Some("Nvidia H100 SXM5"));
        assert_eq!(canonical_name("h100"), Some("Nvidia H100 SXM5"));
        assert_eq!(canonical_name("1x H100 (80 GB SXM5)"), Some("Nvidia H100 SXM5"));
    }

    #[test]
    fn marketplace_key_shapes_resolve() {
        // TensorDock hostnode keys arrive as glued kebab-case.
        assert_eq!(canonical_name("geforcertx4090-pcie-24gb"), Some("Nvidia RTX 4090"));
        assert_eq!(canonical_name("rtx4090"), Some("Nvidia RTX 4090"));
        assert_eq!(canonical_name("RTX 5070Ti"), Some("Nvidia RTX 5070 Ti"));
        assert_eq!(canonical_name("RTX 6000ADA"), Some("Nvidia RTX 6000 Ada Generation"));
    }

    #[test]
    fn configuration_suffixes_are_ignored() {
        assert_eq!(canonical_name("A100_DGX"), Some("Nvidia A100 80GB SXM4"));
        assert_eq!(canonical_name("H100 SXM5 HIGH PERFORMANCE"), Some("Nvidia H100 SXM5"));
        assert_eq!(canonical_name("RTX 4090 BAREMETAL"), Some("Nvidia RTX 4090"));
    }

    #[test]
    fn l40_does_not_shadow_l40s() {
        assert_eq!(canonical_name("L40S"), Some("Nvidia L40S"));
        assert_eq!(canonical_name("L40"), Some("Nvidia L40"));
    }

    #[test]
    fn gh200_does_not_collide_with_h200() {
        assert_eq!(canonical_name("GH200"), Some("Nvidia GH200"));
        assert_eq!(canonical_name("H200"), Some("Nvidia H200"));
    }

    #[test]
    fn unknown_and_degenerate_inputs_return_none() {
        assert_eq!(canonical_name(""), None);
        assert_eq!(canonical_name("   "), None);
        assert_eq!(canonical_name("Radeon RX 7900 XTX"), None);
        assert_eq!(canonical_name("Intel Arc A770"), None);
        assert_eq!(canonical_name("🦀🦀🦀"), None);
        assert_eq!(canonical_name("\u{0000}\u{FFFD}"), None);
    }

    #[test]
    fn canonicalization_is_idempotent() {
        for target in TARGET_GPUS.iter() {
            let first = canonical_name(target.name);
            let second = first.and_then(canonical_name);
            assert_eq!(first, second, "unstable for {}", target.name);
        }
    }

    #[test]
    fn every_target_name_resolves_to_itself() {
        for (idx, target) in TARGET_GPUS.iter().enumerate() {
            let resolved = canonicalize(target.name);
            assert_eq!(
                resolved.map(|(i, _)| i),
                Some(idx),
                "{} does not round-trip",
                target.name
            );
        }
    }
}
