//! A/B variant comparison: per-variant metrics, winner selection and lift.

use crate::aggregator::summarize;
use campaign_core::types::{ComparisonResult, Variant};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Compute metrics for every variant and pick the winner.
///
/// An `explicit_winner_id` that names one of the variants is taken verbatim.
/// Otherwise the highest open rate wins and an exact tie keeps the variant
/// supplied first. When an id appears more than once only its first
/// occurrence is measured.
pub fn compare_variants(variants: &[Variant], explicit_winner_id: Option<i64>) -> ComparisonResult {
    let mut per_variant = BTreeMap::new();
    let mut variant_order = Vec::with_capacity(variants.len());

    for variant in variants {
        if per_variant.contains_key(&variant.id) {
            warn!(variant_id = variant.id, "Duplicate variant id ignored");
            continue;
        }
        per_variant.insert(variant.id, summarize(&variant.analytics));
        variant_order.push(variant.id);
    }

    let explicit = explicit_winner_id.filter(|id| per_variant.contains_key(id));
    if let (Some(id), None) = (explicit_winner_id, explicit) {
        warn!(winner_id = id, "Supplied winner is not among the variants");
    }

    let winning_variant_id = explicit.or_else(|| {
        // Current leader is replaced only when strictly exceeded.
        variant_order
            .iter()
            .filter_map(|id| per_variant.get(id).map(|m| (*id, m.open_rate)))
            .fold(None, |best: Option<(i64, f64)>, (id, rate)| match best {
                Some((_, best_rate)) if rate <= best_rate => best,
                _ => Some((id, rate)),
            })
            .map(|(id, _)| id)
    });

    debug!(
        variants = variant_order.len(),
        winner = ?winning_variant_id,
        explicit = explicit.is_some(),
        "Compared variants"
    );

    ComparisonResult {
        per_variant,
        winning_variant_id,
        variant_order,
    }
}

/// Variant ids by open rate, best first. Ties keep input order.
pub fn ranked(result: &ComparisonResult) -> Vec<i64> {
    let mut ids: Vec<(i64, f64)> = result
        .variant_order
        .iter()
        .filter_map(|id| result.per_variant.get(id).map(|m| (*id, m.open_rate)))
        .collect();
    // sort_by is stable
    ids.sort_by(|a, b| b.1.total_cmp(&a.1));
    ids.into_iter().map(|(id, _)| id).collect()
}

/// Relative change of `candidate` over `control`, in percent.
///
/// Returns `0.0` when `control` is zero or either value is not finite.
pub fn lift_percent(control: f64, candidate: f64) -> f64 {
    if !control.is_finite() || !candidate.is_finite() || control == 0.0 {
        return 0.0;
    }
    let lift = (candidate - control) / control.abs() * 100.0;
    if lift.is_finite() {
        lift
    } else {
        0.0
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
