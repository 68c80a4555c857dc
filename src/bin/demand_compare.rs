//! demand-compare CLI
//!
//! Runs one logit demand comparison described by a TOML configuration file.
//!
//! Usage:
//!   demand-compare --config run.toml
//!   demand-compare --config run.toml --market-definition county_model_year --per-year
//!   demand-compare --config run.toml --description "rerun with Smart removed" --stamp 0307-0905

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use demand_compare::{
    market::MarketDefinition,
    orchestrator::{run, ConfigOverrides, RunConfig, RunStamp},
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "demand-compare")]
#[command(about = "Compare logit demand estimates between reference and registration panels")]
struct Args {
    /// Path to the TOML run configuration
    #[arg(long)]
    config: PathBuf,

    /// Replace the run description from the configuration file
    #[arg(long)]
    description: Option<String>,

    /// Market definition: model_year or county_model_year
    #[arg(long)]
    market_definition: Option<MarketDefinition>,

    /// Also run the comparison separately for each registration model year
    #[arg(long)]
    per_year: bool,

    /// Run stamp as MMDD-HHMM (defaults to the current local time)
    #[arg(long)]
    stamp: Option<String>,
}

fn init_console_logging() {
    let console_layer = fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(console_layer)
        .init();
}

fn main() {
    init_console_logging();
    std::panic::set_hook(Box::new(|info| {
        error!("panic: {info}");
    }));

    if let Err(e) = try_main() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();

    let stamp = match args.stamp.as_deref() {
        Some(text) => text.parse::<RunStamp>().context("Invalid --stamp")?,
        None => RunStamp::now(),
    };
    let cfg = RunConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?
        .with_overrides(ConfigOverrides {
            description: args.description,
            market_definition: args.market_definition,
            per_year: args.per_year.then_some(true),
        });
    let estimator = cfg.build_estimator().context("Invalid estimator settings")?;

    let outcome = run(&cfg, stamp, estimator.as_ref()).context("Comparison run failed")?;
    info!(
        output_dir = %outcome.output_dir.display(),
        data_dir = %outcome.data_dir.display(),
        log = %outcome.log_path.display(),
        "Run complete"
    );
    if !outcome.skipped_years.is_empty() {
        info!(skipped = ?outcome.skipped_years, "Some model years were skipped; see the run log");
    }
    Ok(())
}
