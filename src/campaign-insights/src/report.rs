//! JSON reports written by the CLI, decorated with presentation hints.

use campaign_analytics::{
    compare_variants, delta_description, lift_percent, metrics_by_bucket, ranked, summarize,
    BucketMetrics, FunnelReport,
};
use campaign_core::config::ReportingConfig;
use campaign_core::types::{
    AnalyticsRecord, ComparisonResult, NamedValue, PerformanceMetrics, Variant,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub metrics: PerformanceMetrics,
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    #[serde(flatten)]
    pub bucket: BucketMetrics,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareReport {
    pub generated_at: DateTime<Utc>,
    pub comparison: ComparisonResult,
    pub ranking: Vec<RankedVariant>,
    /// Gap between the two best variants, when there are at least two.
    pub delta: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedVariant {
    pub id: i64,
    pub name: String,
    pub open_rate: f64,
    pub open_rate_label: String,
    /// Open-rate lift over the first supplied variant.
    pub lift_vs_control: f64,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelOutput {
    pub generated_at: DateTime<Utc>,
    pub funnel: FunnelReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankReport {
    pub generated_at: DateTime<Utc>,
    pub position: i64,
    pub total_competitors: i64,
    pub percentile: f64,
    pub percentile_label: String,
}

pub fn summary_report(records: &[AnalyticsRecord], reporting: &ReportingConfig) -> SummaryReport {
    let series = metrics_by_bucket(records)
        .into_iter()
        .enumerate()
        .map(|(i, bucket)| SeriesPoint {
            bucket,
            color: reporting.color_for(i).map(str::to_string),
        })
        .collect();

    SummaryReport {
        generated_at: Utc::now(),
        metrics: summarize(records),
        series,
    }
}

pub fn compare_report(
    variants: &[Variant],
    explicit_winner_id: Option<i64>,
    reporting: &ReportingConfig,
) -> CompareReport {
    let comparison = compare_variants(variants, explicit_winner_id);
    let name_of = |id: i64| {
        variants
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| format!("Variant {id}"))
    };
    let open_rate_of = |id: i64| comparison.metrics_for(id).map_or(0.0, |m| m.open_rate);

    let control_rate = comparison
        .variant_order
        .first()
        .map_or(0.0, |&id| open_rate_of(id));

    let ranking: Vec<RankedVariant> = ranked(&comparison)
        .into_iter()
        .map(|id| {
            let open_rate = open_rate_of(id);
            // Colors follow input order, not rank.
            let position = comparison
                .variant_order
                .iter()
                .position(|&v| v == id)
                .unwrap_or(0);
            RankedVariant {
                id,
                name: name_of(id),
                open_rate,
                open_rate_label: format!("{:.*}%", reporting.decimal_places, open_rate),
                lift_vs_control: lift_percent(control_rate, open_rate),
                color: reporting.color_for(position).map(str::to_string),
            }
        })
        .collect();

    let delta = match ranking.as_slice() {
        [first, second, ..] => Some(delta_description(
            &NamedValue::new(first.name.clone(), first.open_rate),
            &NamedValue::new(second.name.clone(), second.open_rate),
        )),
        _ => None,
    };

    CompareReport {
        generated_at: Utc::now(),
        comparison,
        ranking,
        delta,
    }
}

/// Competitor count from the command line, else from `reporting.ranking_population`.
pub fn resolve_population(
    total: Option<i64>,
    reporting: &ReportingConfig,
) -> anyhow::Result<i64> {
    total
        .or(reporting.ranking_population)
        .context("no competitor count given and reporting.ranking_population is unset")
}

pub fn rank_report(
    position: i64,
    total_competitors: i64,
    percentile: f64,
    reporting: &ReportingConfig,
) -> RankReport {
    RankReport {
        generated_at: Utc::now(),
        position,
        total_competitors,
        percentile,
        percentile_label: format!("{:.*}%", reporting.decimal_places, percentile),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: i64, name: &str, opens: i64) -> Variant {
        Variant {
            id,
            name: name.to_string(),
            weight: 50.0,
            analytics: vec![AnalyticsRecord::new("2024-07-01", 200, opens, 10, 2, 1)],
        }
    }

    #[test]
    fn test_compare_report_ranking_and_delta() {
        let variants = vec![variant(1, "Control", 40), variant(2, "Emoji subject", 50)];
        let report = compare_report(&variants, None, &ReportingConfig::default());

        assert_eq!(report.comparison.winning_variant_id, Some(2));
        assert_eq!(report.ranking[0].id, 2);
        assert_eq!(report.ranking[0].open_rate, 25.0);
        assert_eq!(report.ranking[0].open_rate_label, "25.0%");
        assert_eq!(report.ranking[0].lift_vs_control, 25.0);
        assert_eq!(report.ranking[1].lift_vs_control, 0.0);
        assert_eq!(
            report.delta.as_deref(),
            Some("Emoji subject outperforms Control by 5.0%")
        );
        // second supplied variant gets the second palette color
        assert_eq!(report.ranking[0].color.as_deref(), Some("#22c55e"));
    }

    #[test]
    fn test_compare_report_single_variant() {
        let report = compare_report(
            &[variant(9, "Only", 10)],
            None,
            &ReportingConfig::default(),
        );
        assert!(report.delta.is_none());
        assert_eq!(report.ranking.len(), 1);
    }

    #[test]
    fn test_summary_report_series_colors() {
        let records = vec![
            AnalyticsRecord::new("mon", 100, 20, 5, 0, 0),
            AnalyticsRecord::new("tue", 100, 30, 5, 0, 0),
        ];
        let report = summary_report(&records, &ReportingConfig::default());
        assert_eq!(report.metrics.open_rate, 25.0);
        assert_eq!(report.series.len(), 2);
        assert_eq!(report.series[1].color.as_deref(), Some("#22c55e"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["series"][0]["bucketLabel"], "mon");
    }

    #[test]
    fn test_population_falls_back_to_config() {
        let reporting = ReportingConfig {
            ranking_population: Some(40),
            ..Default::default()
        };
        assert_eq!(resolve_population(None, &reporting).unwrap(), 40);
        assert_eq!(resolve_population(Some(12), &reporting).unwrap(), 12);
    }

    #[test]
    fn test_population_missing_everywhere() {
        let err = resolve_population(None, &ReportingConfig::default()).unwrap_err();
        assert!(err.to_string().contains("ranking_population"));
    }

    #[test]
    fn test_rank_report_label() {
        let reporting = ReportingConfig {
            decimal_places: 0,
            ..Default::default()
        };
        let report = rank_report(3, 4, 50.0, &reporting);
        assert_eq!(report.percentile_label, "50%");
    }
}
