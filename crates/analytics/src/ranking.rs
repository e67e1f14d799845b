//! Competitive ranking and side-by-side comparison text.

use campaign_core::error::{InsightsError, InsightsResult};
use campaign_core::types::NamedValue;

/// Percentile for a 1-based `position` among `total_competitors`.
///
/// The result feeds a progress bar directly, so it is clamped to
/// `[0, 100]` even when `position` lies outside the population.
pub fn percentile_rank(position: i64, total_competitors: i64) -> InsightsResult<f64> {
    if total_competitors <= 0 {
        return Err(InsightsError::InvalidArgument(format!(
            "total_competitors must be positive, got {total_competitors}"
        )));
    }
    // (1 - (position - 1) / total) * 100
    let ahead_or_equal = total_competitors as f64 - position as f64 + 1.0;
    let rank = ahead_or_equal * 100.0 / total_competitors as f64;
    Ok(rank.clamp(0.0, 100.0))
}

/// Sentence naming the higher value and the gap to one decimal place,
/// e.g. `"Variant A outperforms Variant B by 7.5%"`.
///
/// Only an exact tie reads as equal; a gap below 0.05 still names the winner
/// ("by 0.0%"). Halves round away from zero, so a gap of 0.25 prints "0.3%".
pub fn delta_description(a: &NamedValue, b: &NamedValue) -> String {
    let a_value = finite_or_zero(a.value);
    let b_value = finite_or_zero(b.value);

    if a_value == b_value {
        return format!("{} and {} perform equally (0.0% difference)", a.name, b.name);
    }

    let gap = ((a_value - b_value).abs() * 10.0).round() / 10.0;
    let (higher, lower) = if a_value > b_value { (a, b) } else { (b, a) };
    format!("{} outperforms {} by {gap:.1}%", higher.name, lower.name)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
