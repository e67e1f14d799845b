//! Sum-then-divide reduction shared by every campaign analytics view.

use campaign_core::types::{AggregateTotals, AnalyticsRecord, PerformanceMetrics};
use tracing::{debug, warn};

/// Element-wise sum of the count fields. Negative counts clamp to zero.
pub fn sum_records(records: &[AnalyticsRecord]) -> AggregateTotals {
    let malformed = records.iter().filter(|r| r.violates_invariants()).count();
    if malformed > 0 {
        warn!(
            malformed,
            total = records.len(),
            "Analytics rows violate count invariants"
        );
    }

    records
        .iter()
        .map(AggregateTotals::from)
        .fold(AggregateTotals::default(), AggregateTotals::saturating_add)
}

/// Derive percentage rates from raw totals.
pub fn compute_metrics(totals: &AggregateTotals) -> PerformanceMetrics {
    let metrics = PerformanceMetrics {
        totals: *totals,
        open_rate: percentage(totals.opens, totals.recipients),
        click_rate: percentage(totals.clicks, totals.opens),
        click_through_rate: percentage(totals.clicks, totals.recipients),
        bounce_rate: percentage(totals.bounces, totals.recipients),
        unsubscribe_rate: percentage(totals.unsubscribes, totals.recipients),
    };
    debug!(
        recipients = totals.recipients,
        open_rate = metrics.open_rate,
        click_rate = metrics.click_rate,
        "Computed performance metrics"
    );
    metrics
}

/// Shorthand for `compute_metrics(&sum_records(records))`.
pub fn summarize(records: &[AnalyticsRecord]) -> PerformanceMetrics {
    compute_metrics(&sum_records(records))
}

/// `part / whole * 100`, or `0.0` when `whole` is zero.
///
/// Scales before dividing so that exact percentages (7 of 100) come out exact.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

// ─── Tests ───────────────────────────────────────────────────────────
