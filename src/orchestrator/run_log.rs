//! Per-run log: a `tracing` dispatcher scoped to one run.
//!
//! The file layer records `info` and above without ANSI colors; the console
//! layer on stderr follows `RUST_LOG` and defaults to `info`. Events are only
//! routed here inside [`RunLog::in_scope`], so concurrent runs in one process
//! (e.g. tests) never share a file.
use std::path::{Path, PathBuf};

use tracing::Dispatch;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use crate::orchestrator::{
    dirs::RunStamp,
    errors::{RunError, RunResult},
};

pub struct RunLog {
    dispatch: Dispatch,
    path: PathBuf,
    _guard: WorkerGuard,
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog").field("path", &self.path).finish_non_exhaustive()
    }
}

impl RunLog {
    /// Open `estimate_demand_compare_{stamp}.log` in `dir` for appending.
    ///
    /// # Errors
    /// [`RunError::Io`] if the appender cannot create the file.
    pub fn open(dir: &Path, stamp: RunStamp) -> RunResult<Self> {
        let file_name = format!("estimate_demand_compare_{stamp}.log");
        let path = dir.join(&file_name);
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(dir)
            .map_err(|e| RunError::Io { path: path.clone(), message: e.to_string() })?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let file_layer =
            fmt::layer().with_ansi(false).with_writer(writer).with_filter(LevelFilter::INFO);
        let console_layer = fmt::layer().with_writer(std::io::stderr).with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        );
        let subscriber = tracing_subscriber::registry().with(file_layer).with(console_layer);

        Ok(Self { dispatch: Dispatch::new(subscriber), path, _guard: guard })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with this log as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}
