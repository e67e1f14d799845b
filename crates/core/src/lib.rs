pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{InsightsError, InsightsResult};
pub use types::{
    AggregateTotals, AnalyticsRecord, ComparisonResult, NamedValue, PerformanceMetrics, Variant,
};
