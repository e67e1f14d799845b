//! Input payloads as returned by the campaign analytics endpoints.

use anyhow::Context;
use campaign_core::types::{AnalyticsRecord, Variant};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// `GET /api/email-performance/metrics`: a bare array or an envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordsPayload {
    Bare(Vec<AnalyticsRecord>),
    Wrapped {
        #[serde(alias = "data")]
        records: Vec<AnalyticsRecord>,
    },
}

impl RecordsPayload {
    pub fn into_records(self) -> Vec<AnalyticsRecord> {
        match self {
            Self::Bare(records) | Self::Wrapped { records } => records,
        }
    }
}

/// `GET /api/ab-testing/campaigns/:id/analytics`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum VariantsPayload {
    Bare(Vec<Variant>),
    Wrapped {
        variants: Vec<Variant>,
        #[serde(default, rename = "winningVariantId")]
        winning_variant_id: Option<i64>,
    },
}

impl VariantsPayload {
    pub fn into_parts(self) -> (Vec<Variant>, Option<i64>) {
        match self {
            Self::Bare(variants) => (variants, None),
            Self::Wrapped {
                variants,
                winning_variant_id,
            } => (variants, winning_variant_id),
        }
    }
}

/// Read a file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn parse_records(raw: &str) -> anyhow::Result<Vec<AnalyticsRecord>> {
    let payload: RecordsPayload =
        serde_json::from_str(raw).context("payload is not a list of analytics records")?;
    Ok(payload.into_records())
}

pub fn parse_variants(raw: &str) -> anyhow::Result<(Vec<Variant>, Option<i64>)> {
    let payload: VariantsPayload =
        serde_json::from_str(raw).context("payload is not a list of variants")?;
    Ok(payload.into_parts())
}
