//! orchestrator — end-to-end comparison runs.
//!
//! Purpose
//! -------
//! Turn a [`RunConfig`] into files on disk: prepared tables for both data
//! sources and long-format comparison tables for the full registration
//! panel and, optionally, each of its model years.
//!
//! Key behaviors
//! -------------
//! - Configuration is validated and run directories are created before any
//!   data is read; an existing directory for the same stamp is fatal.
//! - Each run writes to its own log file through a scoped [`RunLog`]
//!   dispatcher, starting with the run description.
//! - Failures of single per-year comparisons are logged and skipped; any
//!   other failure aborts the run after being logged.
//!
//! Conventions
//! -----------
//! - File names embed the market definition and the `MMDD-HHMM` stamp:
//!   `exp_mkt_data_{stamp}.csv`, `mkt_data_{mkt}_{stamp}_{label}.csv`,
//!   `comparison_outputs_{logit|ols}_{mkt}_{stamp}_{label}.csv`, with
//!   `label` either `all_years` or a model year.

pub mod config;
pub mod dirs;
pub mod errors;
pub mod run;
pub mod run_log;

pub use self::config::{ConfigOverrides, InputPaths, MleConfig, PreparationConfig, RunConfig};
pub use self::dirs::{create_run_dirs, RunDirs, RunStamp};
pub use self::errors::{RunError, RunResult};
pub use self::run::{
    comparison_output_path, load_inputs, run, run_with_inputs, RunInputs, RunOutcome,
    ALL_YEARS_LABEL,
};
pub use self::run_log::RunLog;
