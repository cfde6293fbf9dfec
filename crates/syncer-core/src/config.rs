//! Tunable thresholds for the content classifiers, gathered in one place so
//! they can be overridden without touching classifier logic.

/// Thresholds consulted by the C2 content classifier pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncConfig {
    /// `field_percent_urls` strictly above this marks `special_type = url`.
    pub url_threshold: f64,
    /// `field_distinct_count` strictly below this (and above zero) marks
    /// `special_type = category`.
    pub cardinality_threshold: u64,
    /// `field_avg_length` strictly above this clears `preview_display`.
    pub avg_length_threshold: u64,
    /// Maximum number of sampled values fetched for JSON-shape classification.
    pub json_sample_cap: usize,
    /// Case-insensitive table name reserved for out-of-band catalog patches.
    pub metadata_table_name: &'static str,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            url_threshold: 0.95,
            cardinality_threshold: 40,
            avg_length_threshold: 50,
            json_sample_cap: 10_000,
            metadata_table_name: "_metabase_metadata",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_thresholds() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.url_threshold, 0.95);
        assert_eq!(cfg.cardinality_threshold, 40);
        assert_eq!(cfg.avg_length_threshold, 50);
        assert_eq!(cfg.json_sample_cap, 10_000);
        assert_eq!(cfg.metadata_table_name, "_metabase_metadata");
    }
}
