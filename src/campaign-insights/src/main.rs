//! Campaign Insights — derived email-campaign metrics from analytics payloads.
//!
//! Reads JSON shaped like the campaign analytics endpoints and prints the
//! computed report as JSON on stdout. Logs go to stderr.

mod payload;
mod report;

use anyhow::Context;
use campaign_analytics::{engagement_funnel, percentile_rank, sum_records};
use campaign_core::config::AppConfig;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-insights")]
#[command(about = "Derived email-campaign metrics from analytics payloads")]
#[command(version)]
struct Cli {
    /// Optional TOML config file (environment variables still apply)
    #[arg(long, env = "CAMPAIGN_INSIGHTS_CONFIG")]
    config: Option<String>,

    /// Emit JSON logs (overrides config)
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Totals, rates and per-bucket series for a list of records
    Summary {
        /// Records payload, or `-` for stdin
        input: PathBuf,
    },
    /// Compare A/B variants and pick the winner
    Compare {
        /// Variants payload, or `-` for stdin
        input: PathBuf,
        /// Winning variant decided elsewhere (overrides the payload)
        #[arg(long)]
        winner: Option<i64>,
    },
    /// Engagement funnel from send to click
    Funnel {
        /// Records payload, or `-` for stdin
        input: PathBuf,
    },
    /// Percentile for a position among competitors
    Rank {
        #[arg(long)]
        position: i64,
        /// Competitor count (defaults to reporting.ranking_population)
        #[arg(long)]
        total: Option<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let (config, config_error) = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_tracing(&config, cli.json_logs);

    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    let reporting = &config.reporting;
    match cli.command {
        Command::Summary { input } => {
            let records = payload::parse_records(&payload::read_input(&input)?)?;
            info!(records = records.len(), "Summarizing analytics records");
            print_json(&report::summary_report(&records, reporting))
        }
        Command::Compare { input, winner } => {
            let (variants, payload_winner) =
                payload::parse_variants(&payload::read_input(&input)?)?;
            info!(variants = variants.len(), "Comparing variants");
            print_json(&report::compare_report(
                &variants,
                winner.or(payload_winner),
                reporting,
            ))
        }
        Command::Funnel { input } => {
            let records = payload::parse_records(&payload::read_input(&input)?)?;
            let funnel = engagement_funnel(&sum_records(&records));
            print_json(&report::FunnelOutput {
                generated_at: chrono::Utc::now(),
                funnel,
            })
        }
        Command::Rank { position, total } => {
            let total = report::resolve_population(total, reporting)?;
            let percentile = percentile_rank(position, total)?;
            print_json(&report::rank_report(position, total, percentile, reporting))
        }
    }
}

fn init_tracing(config: &AppConfig, json_override: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.as_str().into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json_override || config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{out}");
    Ok(())
}
