//! Per-bucket metrics for time series and channel charts.

use crate::aggregator::{compute_metrics, sum_records};
use campaign_core::types::{AnalyticsRecord, PerformanceMetrics};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketMetrics {
    pub bucket_label: String,
    pub records: usize,
    pub metrics: PerformanceMetrics,
}

/// Group records by `bucket_label` and compute metrics per group.
///
/// Buckets appear in the order their label was first seen.
pub fn metrics_by_bucket(records: &[AnalyticsRecord]) -> Vec<BucketMetrics> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<AnalyticsRecord>)> = Vec::new();

    for record in records {
        let label = record.bucket_label.as_str();
        let slot = *index.entry(label).or_insert_with(|| {
            groups.push((label, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record.clone());
    }

    groups
        .into_iter()
        .map(|(label, rows)| BucketMetrics {
            bucket_label: label.to_string(),
            records: rows.len(),
            metrics: compute_metrics(&sum_records(&rows)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_label_in_first_seen_order() {
        let records = vec![
            AnalyticsRecord::new("2024-06-02", 100, 40, 10, 0, 0),
            AnalyticsRecord::new("2024-06-01", 200, 20, 2, 4, 0),
            AnalyticsRecord::new("2024-06-02", 100, 10, 0, 0, 1),
        ];
        let series = metrics_by_bucket(&records);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].bucket_label, "2024-06-02");
        assert_eq!(series[0].records, 2);
        assert_eq!(series[0].metrics.totals.recipients, 200);
        assert_eq!(series[0].metrics.open_rate, 25.0);
        assert_eq!(series[1].bucket_label, "2024-06-01");
        assert_eq!(series[1].metrics.bounce_rate, 2.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(metrics_by_bucket(&[]).is_empty());
    }
}
