//! Campaign metrics aggregation — rate metrics, A/B variant comparison,
//! competitive ranking, per-bucket series and the engagement funnel.
//!
//! Every function here is a pure transform over its arguments.

pub mod aggregator;
pub mod comparison;
pub mod funnel;
pub mod ranking;
pub mod series;

pub use aggregator::{compute_metrics, sum_records, summarize};
pub use comparison::{compare_variants, lift_percent, ranked};
pub use funnel::{engagement_funnel, FunnelReport};
pub use ranking::{delta_description, percentile_rank};
pub use series::{metrics_by_bucket, BucketMetrics};
