//! Engagement funnel — progression from send to click with drop-off per stage.

use crate::aggregator::percentage;
use campaign_core::types::AggregateTotals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    Sent,
    Delivered,
    Opened,
    Clicked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStepResult {
    pub stage: FunnelStage,
    pub count: u64,
    /// Share of the previous stage that reached this one, in `[0, 100]`.
    pub conversion_rate: f64,
    pub drop_off_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelReport {
    pub steps: Vec<FunnelStepResult>,
    pub overall_conversion_rate: f64,
}

pub fn engagement_funnel(totals: &AggregateTotals) -> FunnelReport {
    let stages = [
        (FunnelStage::Sent, totals.recipients),
        (FunnelStage::Delivered, totals.recipients.saturating_sub(totals.bounces)),
        (FunnelStage::Opened, totals.opens),
        (FunnelStage::Clicked, totals.clicks),
    ];

    let mut steps = Vec::with_capacity(stages.len());
    let mut previous: Option<u64> = None;
    for (stage, count) in stages {
        let conversion_rate = match previous {
            // The first stage has nothing to drop from.
            None => 100.0,
            Some(prev) => percentage(count, prev).clamp(0.0, 100.0),
        };
        steps.push(FunnelStepResult {
            stage,
            count,
            conversion_rate,
            drop_off_rate: 100.0 - conversion_rate,
        });
        previous = Some(count);
    }

    FunnelReport {
        steps,
        overall_conversion_rate: percentage(totals.clicks, totals.recipients).clamp(0.0, 100.0),
    }
}
