use crate::error::InsightsResult;
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_INSIGHTS__` and an optional TOML config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_json")]
    pub json: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_json() -> bool {
    false
}
fn default_log_filter() -> String {
    "campaign_insights=info,campaign_analytics=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: default_log_json(),
            filter: default_log_filter(),
        }
    }
}

// ─── Reporting Config ───────────────────────────────────────────────────
/// Presentation hints handed to whatever renders the computed metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// Series colors, assigned to variants or buckets in order.
    #[serde(default = "default_chart_palette")]
    pub chart_palette: Vec<String>,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,
    /// Competitor population used when a ranking omits one.
    #[serde(default)]
    pub ranking_population: Option<i64>,
}

fn default_chart_palette() -> Vec<String> {
    ["#6366f1", "#22c55e", "#f59e0b", "#ef4444", "#06b6d4", "#a855f7"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}
fn default_decimal_places() -> usize {
    1
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            chart_palette: default_chart_palette(),
            decimal_places: default_decimal_places(),
            ranking_population: None,
        }
    }
}

impl ReportingConfig {
    /// Color for the series at `index`, cycling through the palette.
    pub fn color_for(&self, index: usize) -> Option<&str> {
        if self.chart_palette.is_empty() {
            return None;
        }
        self.chart_palette
            .get(index % self.chart_palette.len())
            .map(String::as_str)
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load(path: Option<&str>) -> InsightsResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_INSIGHTS")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("reporting.chart_palette"),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
