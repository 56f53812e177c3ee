// Utility functions

/// Converts a display string to kebab-case for ids and slugs.
pub fn to_kebab_case(text: &str) -> String {
    text.to_lowercase()
        .replace([' ', '.'], "-")
        .replace("--", "-")
}

/// Rounds a price to two decimal places (display currency).
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}
