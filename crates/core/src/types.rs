//! Data contracts shared by the aggregator and its callers.
//!
//! Records arrive as JSON from the campaign analytics endpoints. The count
//! fields are deserialized leniently: a missing, `null`, non-numeric or
//! non-finite value becomes `0`, floats are truncated and numeric strings are
//! parsed. Negative counts are kept as received and clamped when summed.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One observation of delivery outcomes for a variant, day or channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RecordPayload")]
pub struct AnalyticsRecord {
    pub recipients: i64,
    pub opens: i64,
    pub clicks: i64,
    pub bounces: i64,
    pub unsubscribes: i64,
    pub bucket_label: String,
}

/// Wire shape of a record. Endpoints name the bucket differently; when
/// several keys are present `bucketLabel` wins, then `timestamp`, `date`,
/// `label`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordPayload {
    #[serde(default, deserialize_with = "lenient_count")]
    recipients: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    opens: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    clicks: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    bounces: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    unsubscribes: i64,
    #[serde(default, deserialize_with = "lenient_label")]
    bucket_label: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    date: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    label: Option<String>,
}

impl From<RecordPayload> for AnalyticsRecord {
    fn from(raw: RecordPayload) -> Self {
        Self {
            recipients: raw.recipients,
            opens: raw.opens,
            clicks: raw.clicks,
            bounces: raw.bounces,
            unsubscribes: raw.unsubscribes,
            bucket_label: raw
                .bucket_label
                .or(raw.timestamp)
                .or(raw.date)
                .or(raw.label)
                .unwrap_or_default(),
        }
    }
}

impl AnalyticsRecord {
    pub fn new(
        bucket_label: impl Into<String>,
        recipients: i64,
        opens: i64,
        clicks: i64,
        bounces: i64,
        unsubscribes: i64,
    ) -> Self {
        Self {
            recipients,
            opens,
            clicks,
            bounces,
            unsubscribes,
            bucket_label: bucket_label.into(),
        }
    }

    /// True when any count is negative or exceeds the recipient count.
    pub fn violates_invariants(&self) -> bool {
        let counts = [self.opens, self.clicks, self.bounces, self.unsubscribes];
        self.recipients < 0 || counts.iter().any(|&c| c < 0 || c > self.recipients)
    }
}

/// Element-wise sum of one or more records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateTotals {
    pub recipients: u64,
    pub opens: u64,
    pub clicks: u64,
    pub bounces: u64,
    pub unsubscribes: u64,
}

impl AggregateTotals {
    pub fn saturating_add(self, other: Self) -> Self {
        Self {
            recipients: self.recipients.saturating_add(other.recipients),
            opens: self.opens.saturating_add(other.opens),
            clicks: self.clicks.saturating_add(other.clicks),
            bounces: self.bounces.saturating_add(other.bounces),
            unsubscribes: self.unsubscribes.saturating_add(other.unsubscribes),
        }
    }
}

impl From<&AnalyticsRecord> for AggregateTotals {
    fn from(record: &AnalyticsRecord) -> Self {
        let clamp = |v: i64| u64::try_from(v).unwrap_or(0);
        Self {
            recipients: clamp(record.recipients),
            opens: clamp(record.opens),
            clicks: clamp(record.clicks),
            bounces: clamp(record.bounces),
            unsubscribes: clamp(record.unsubscribes),
        }
    }
}

/// Rates derived from [`AggregateTotals`], in percent and unrounded.
///
/// `click_rate` is relative to opens, `click_through_rate` to recipients.
/// Every rate is finite; a zero denominator yields `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub totals: AggregateTotals,
    pub open_rate: f64,
    pub click_rate: f64,
    pub click_through_rate: f64,
    pub bounce_rate: f64,
    pub unsubscribe_rate: f64,
}

/// One version of an email in an A/B test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Traffic share, 0–100.
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub analytics: Vec<AnalyticsRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub per_variant: BTreeMap<i64, PerformanceMetrics>,
    pub winning_variant_id: Option<i64>,
    /// Variant ids in the order they were supplied, without duplicates.
    #[serde(default)]
    pub variant_order: Vec<i64>,
}

impl ComparisonResult {
    pub fn metrics_for(&self, variant_id: i64) -> Option<&PerformanceMetrics> {
        self.per_variant.get(&variant_id)
    }

    pub fn winner_metrics(&self) -> Option<&PerformanceMetrics> {
        self.winning_variant_id.and_then(|id| self.metrics_for(id))
    }
}

/// A labelled value for side-by-side comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_from_value(&value))
}

fn count_from_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().and_then(truncate_finite))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_finite))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn truncate_finite(f: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds
    f.is_finite().then(|| f.trunc() as i64)
}

fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_null_counts_become_zero() {
        let record: AnalyticsRecord =
            serde_json::from_str(r#"{"recipients": 100, "opens": null, "date": "2024-03-01"}"#)
                .unwrap();
        assert_eq!(record.recipients, 100);
        assert_eq!(record.opens, 0);
        assert_eq!(record.clicks, 0);
        assert_eq!(record.bucket_label, "2024-03-01");
    }

    #[test]
    fn test_several_label_keys_pick_by_precedence() {
        let record: AnalyticsRecord = serde_json::from_str(
            r#"{"recipients": 10, "timestamp": "2024-03-01T00:00:00Z", "date": "2024-03-01"}"#,
        )
        .unwrap();
        assert_eq!(record.recipients, 10);
        assert_eq!(record.bucket_label, "2024-03-01T00:00:00Z");

        let record: AnalyticsRecord =
            serde_json::from_str(r#"{"label": "Week 9", "date": null, "bucketLabel": "w9"}"#)
                .unwrap();
        assert_eq!(record.bucket_label, "w9");

        let record: AnalyticsRecord =
            serde_json::from_str(r#"{"date": null, "label": "Week 9"}"#).unwrap();
        assert_eq!(record.bucket_label, "Week 9");
    }

    #[test]
    fn test_loose_numeric_payloads() {
        let record: AnalyticsRecord = serde_json::from_str(
            r#"{"recipients": "250", "opens": 40.9, "clicks": "x", "bounces": -3, "unsubscribes": true}"#,
        )
        .unwrap();
        assert_eq!(record.recipients, 250);
        assert_eq!(record.opens, 40);
        assert_eq!(record.clicks, 0);
        assert_eq!(record.bounces, -3);
        assert_eq!(record.unsubscribes, 0);
        assert!(record.violates_invariants());
    }

    #[test]
    fn test_label_aliases() {
        let a: AnalyticsRecord = serde_json::from_str(r#"{"timestamp": "t1"}"#).unwrap();
        let b: AnalyticsRecord = serde_json::from_str(r#"{"bucketLabel": "t2"}"#).unwrap();
        let c: AnalyticsRecord = serde_json::from_str(r#"{"label": 7}"#).unwrap();
        assert_eq!(a.bucket_label, "t1");
        assert_eq!(b.bucket_label, "t2");
        assert_eq!(c.bucket_label, "7");
    }

    #[test]
    fn test_totals_clamp_negative_counts() {
        let record = AnalyticsRecord::new("d", 10, -5, 2, -1, 0);
        let totals = AggregateTotals::from(&record);
        assert_eq!(totals.recipients, 10);
        assert_eq!(totals.opens, 0);
        assert_eq!(totals.clicks, 2);
        assert_eq!(totals.bounces, 0);
    }

    #[test]
    fn test_saturating_add() {
        let max = AggregateTotals {
            recipients: u64::MAX,
            ..Default::default()
        };
        let one = AggregateTotals {
            recipients: 1,
            opens: 1,
            ..Default::default()
        };
        let sum = max.saturating_add(one);
        assert_eq!(sum.recipients, u64::MAX);
        assert_eq!(sum.opens, 1);
    }

    #[test]
    fn test_variant_payload_shape() {
        let variant: Variant = serde_json::from_str(
            r#"{"id": 3, "name": "Subject B", "weight": 50, "analytics": [{"recipients": 10, "opens": 4}]}"#,
        )
        .unwrap();
        assert_eq!(variant.id, 3);
        assert_eq!(variant.analytics.len(), 1);
        assert_eq!(variant.analytics[0].opens, 4);
    }

    #[test]
    fn test_metrics_serialize_camel_case() {
        let json = serde_json::to_value(PerformanceMetrics::default()).unwrap();
        assert!(json.get("openRate").is_some());
        assert!(json.get("clickThroughRate").is_some());
        assert!(json["totals"].get("unsubscribes").is_some());
    }
}
