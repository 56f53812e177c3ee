// Last-successful-update tracking, shared across aggregation passes.
use chrono::{DateTime, Utc};
use std::sync::RwLock;

/// Tracks when the last successful live merge happened. Constructor-injected
/// and shared via `Arc` rather than a module global, so the aggregator stays
/// testable and reentrant. The write is a single assignment under the lock.
#[derive(Debug)]
pub struct FreshnessTracker {
    last_updated: RwLock<DateTime<Utc>>,
}

impl FreshnessTracker {
    /// Initialized to process start; there is no persistence across restarts.
    pub fn new() -> Self {
        Self {
            last_updated: RwLock::new(Utc::now()),
        }
    }

    pub fn mark_updated(&self) {
        *self.last_updated.write().expect("freshness lock poisoned") = Utc::now();
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        *self.last_updated.read().expect("freshness lock poisoned")
    }

    /// Human-readable elapsed time since the last successful update, bucketed
    /// into whole hours, whole minutes, or "Just now".
    pub fn time_since(&self) -> String {
        Self::format_elapsed(Utc::now() - self.last_updated())
    }

    fn format_elapsed(elapsed: chrono::Duration) -> String {
        let minutes = elapsed.num_minutes();
        let hours = elapsed.num_hours();
        if hours >= 1 {
            format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" })
        } else if minutes >= 1 {
            format!("{} minute{} ago", minutes, if minutes > 1 { "s" } else { "" })
        } else {
            "Just now".to_string()
        }
    }
}

impl Default for FreshnessTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fresh_tracker_reports_just_now() {
        let tracker = FreshnessTracker::new();
        assert_eq!(tracker.time_since(), "Just now");
    }

    #[test]
    fn elapsed_buckets_use_singular_and_plural_units() {
        assert_eq!(FreshnessTracker::format_elapsed(Duration::seconds(30)), "Just now");
        assert_eq!(FreshnessTracker::format_elapsed(Duration::seconds(61)), "1 minute ago");
        assert_eq!(FreshnessTracker::format_elapsed(Duration::minutes(45)), "45 minutes ago");
        assert_eq!(FreshnessTracker::format_elapsed(Duration::minutes(61)), "1 hour ago");
        assert_eq!(FreshnessTracker::format_elapsed(Duration::hours(5)), "5 hours ago");
    }

    #[test]
    fn mark_updated_advances_the_timestamp() {
        let tracker = FreshnessTracker::new();
        let before = tracker.last_updated();
        tracker.mark_updated();
        assert!(tracker.last_updated() >= before);
    }
}
