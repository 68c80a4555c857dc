//! One comparison run, from validated configuration to result files.
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::{
    estimation::{run_specifications, ComparisonTables, DemandEstimator, Specification},
    market::{
        io::{read_rows, write_market_table, write_records},
        AuxiliaryTables,
        EnergyPrices,
        MarketTable,
        ReferenceRow,
        RegistrationRow,
    },
    orchestrator::{
        config::{InputPaths, RunConfig},
        dirs::{create_run_dirs, RunDirs, RunStamp},
        errors::RunResult,
        run_log::RunLog,
    },
    prepare::{prepare_reference, prepare_registration},
};

/// Label of the comparison over the full registration table.
pub const ALL_YEARS_LABEL: &str = "all_years";

/// Raw panels and auxiliary tables, as read from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunInputs {
    pub reference: Vec<ReferenceRow>,
    pub registration: Vec<RegistrationRow>,
    pub aux: AuxiliaryTables,
}

/// Read every input CSV named in `paths`.
///
/// # Errors
/// [`RunError::Io`](super::errors::RunError::Io) or
/// [`RunError::Csv`](super::errors::RunError::Csv) for the first file that
/// cannot be read or parsed.
pub fn load_inputs(paths: &InputPaths) -> RunResult<RunInputs> {
    let households_by_county = match &paths.households_by_county {
        Some(path) => read_rows(path)?,
        None => Vec::new(),
    };
    let aux = AuxiliaryTables {
        households_by_year: read_rows(&paths.households_by_year)?,
        households_by_county,
        brand_mapping: read_rows(&paths.brand_mapping)?,
        energy: EnergyPrices {
            gas: read_rows(&paths.gas_prices)?,
            diesel: read_rows(&paths.diesel_prices)?,
            electricity: read_rows(&paths.electricity_prices)?,
        },
    };
    Ok(RunInputs {
        reference: read_rows(&paths.reference)?,
        registration: read_rows(&paths.registration)?,
        aux,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,
    pub log_path: PathBuf,
    /// Model years whose per-year comparison finished, ascending.
    pub completed_years: Vec<i32>,
    /// Model years whose per-year comparison failed and was skipped.
    pub skipped_years: Vec<i32>,
}

/// Run a full comparison, reading inputs from the paths in `cfg`.
///
/// Configuration is validated and the run directories are created before
/// any input is read. Failures after the run log is open are logged to it
/// before being returned.
///
/// # Errors
/// - [`RunError::MissingDescription`](super::errors::RunError::MissingDescription)
///   and other configuration errors from [`RunConfig::validate`].
/// - [`RunError::DirectoryExists`](super::errors::RunError::DirectoryExists)
///   if the stamp's directories already exist.
/// - Any I/O, preparation, or estimation error of the all-years comparison.
pub fn run(
    cfg: &RunConfig, stamp: RunStamp, estimator: &dyn DemandEstimator,
) -> RunResult<RunOutcome> {
    run_inner(cfg, stamp, estimator, || load_inputs(&cfg.inputs))
}

/// Same as [`run`], with inputs already in memory.
pub fn run_with_inputs(
    cfg: &RunConfig, stamp: RunStamp, estimator: &dyn DemandEstimator, inputs: RunInputs,
) -> RunResult<RunOutcome> {
    run_inner(cfg, stamp, estimator, || Ok(inputs))
}

fn run_inner(
    cfg: &RunConfig, stamp: RunStamp, estimator: &dyn DemandEstimator,
    load: impl FnOnce() -> RunResult<RunInputs>,
) -> RunResult<RunOutcome> {
    cfg.validate()?;
    let specs = cfg.specifications()?;
    let dirs = create_run_dirs(&cfg.output_root, &cfg.data_root, cfg.market_definition, stamp)?;
    let log = RunLog::open(&dirs.output_dir, stamp)?;

    let result = log.in_scope(|| {
        info!("\n{}\n{}", cfg.description.trim(), "-".repeat(58));
        info!(
            market_definition = %cfg.market_definition,
            estimator = estimator.name(),
            per_year = cfg.per_year,
            "Starting comparison run"
        );
        let outcome =
            load().and_then(|inputs| execute(cfg, stamp, estimator, &specs, &dirs, inputs));
        if let Err(e) = &outcome {
            error!("Run failed: {e}");
        }
        outcome
    });

    let (completed_years, skipped_years) = result?;
    Ok(RunOutcome {
        output_dir: dirs.output_dir,
        data_dir: dirs.data_dir,
        log_path: log.path().to_path_buf(),
        completed_years,
        skipped_years,
    })
}

fn execute(
    cfg: &RunConfig, stamp: RunStamp, estimator: &dyn DemandEstimator, specs: &[Specification],
    dirs: &RunDirs, inputs: RunInputs,
) -> RunResult<(Vec<i32>, Vec<i32>)> {
    let RunInputs { reference, registration, aux } = inputs;
    let reference = prepare_reference(reference, &aux, &cfg.reference_options()?)?;
    let registration = prepare_registration(registration, &aux, &cfg.registration_options()?)?;
    write_market_table(&dirs.data_dir.join(format!("exp_mkt_data_{stamp}.csv")), &reference)?;

    let ctx = CompareContext { cfg, stamp, estimator, specs, dirs, reference: &reference };
    ctx.compare(ALL_YEARS_LABEL, &registration)?;

    let mut completed = Vec::new();
    let mut skipped = Vec::new();
    if cfg.per_year {
        for year in registration.model_years() {
            let restricted = registration.restrict_to_year(year);
            match ctx.compare(&year.to_string(), &restricted) {
                Ok(()) => completed.push(year),
                Err(e) => {
                    error!("Error running model year: {year}");
                    error!("{e}");
                    skipped.push(year);
                }
            }
        }
        info!(completed = completed.len(), skipped = skipped.len(), "Per-year comparisons done");
    }
    Ok((completed, skipped))
}

struct CompareContext<'a> {
    cfg: &'a RunConfig,
    stamp: RunStamp,
    estimator: &'a dyn DemandEstimator,
    specs: &'a [Specification],
    dirs: &'a RunDirs,
    reference: &'a MarketTable,
}

impl CompareContext<'_> {
    fn compare(&self, label: &str, registration: &MarketTable) -> RunResult<()> {
        info!(label, rows = registration.len(), "Running comparison");
        let data_path = self.dirs.data_dir.join(format!(
            "mkt_data_{}_{}_{label}.csv",
            self.cfg.market_definition, self.stamp
        ));
        write_market_table(&data_path, registration)?;

        let tables = run_specifications(self.estimator, self.reference, registration, self.specs)?;
        self.persist(label, &tables)
    }

    fn persist(&self, label: &str, tables: &ComparisonTables) -> RunResult<()> {
        let path = |kind: &str| {
            comparison_output_path(&self.dirs.output_dir, kind, self.cfg, self.stamp, label)
        };
        write_records(&path("logit"), &tables.logit)?;
        write_records(&path("ols"), &tables.ols)?;
        Ok(())
    }
}

/// Path of a per-label comparison output inside `output_dir`; `kind` is
/// `"logit"` or `"ols"`.
pub fn comparison_output_path(
    output_dir: &Path, kind: &str, cfg: &RunConfig, stamp: RunStamp, label: &str,
) -> PathBuf {
    let definition = cfg.market_definition;
    output_dir.join(format!("comparison_outputs_{kind}_{definition}_{stamp}_{label}.csv"))
}
