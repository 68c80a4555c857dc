//! orchestrator::config — run configuration loaded from TOML.
//!
//! Purpose
//! -------
//! Collect every knob of a comparison run in one explicit [`RunConfig`]:
//! the description written to the run log, input and output locations,
//! market definition, preparation options, estimator backend, the
//! specification grid, and MLE tolerances.
//!
//! Key behaviors
//! -------------
//! - Deserialized with `serde` from a TOML file; optional fields carry the
//!   pipeline defaults (registration years 2016/2017/2023 excluded,
//!   `zms_replaced_with = 0.001`, specifications 1, 2, 6, 7, 8, 9, 10).
//! - `preparation.make_removal` has no default and must be set.
//! - [`RunConfig::validate`] runs before any directory is created.
//! - Command-line overrides are applied through [`ConfigOverrides`].
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    estimation::{
        CovarianceKind, DemandEstimator, EstimatorKind, IvLogit, MleLogit, Specification,
        DEFAULT_SPECIFICATIONS,
    },
    market::MarketDefinition,
    optimization::loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
    orchestrator::errors::{RunError, RunResult},
    prepare::{MakeRemoval, PrepareOptions, DEFAULT_ZMS, REGISTRATION_EXCLUDED_YEARS},
};

/// Locations of the raw CSV inputs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputPaths {
    pub reference: PathBuf,
    pub registration: PathBuf,
    pub gas_prices: PathBuf,
    pub diesel_prices: PathBuf,
    pub electricity_prices: PathBuf,
    pub households_by_year: PathBuf,
    /// Needed only for county × model-year markets.
    #[serde(default)]
    pub households_by_county: Option<PathBuf>,
    pub brand_mapping: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreparationConfig {
    pub make_removal: MakeRemoval,
    #[serde(default)]
    pub makes_to_remove: Vec<String>,
    #[serde(default = "default_zms")]
    pub zms_replaced_with: f64,
    #[serde(default)]
    pub year_to_drop: Option<i32>,
    #[serde(default)]
    pub reference_excluded_years: Vec<i32>,
    #[serde(default = "default_registration_excluded_years")]
    pub registration_excluded_years: Vec<i32>,
}

fn default_zms() -> f64 {
    DEFAULT_ZMS
}

fn default_registration_excluded_years() -> Vec<i32> {
    REGISTRATION_EXCLUDED_YEARS.to_vec()
}

/// Tolerances and line search for the MLE backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MleConfig {
    #[serde(default = "default_tol_grad")]
    pub tol_grad: Option<f64>,
    #[serde(default)]
    pub tol_cost: Option<f64>,
    #[serde(default = "default_max_iter")]
    pub max_iter: Option<usize>,
    #[serde(default = "default_line_searcher")]
    pub line_searcher: LineSearcher,
    #[serde(default)]
    pub lbfgs_mem: Option<usize>,
    #[serde(default)]
    pub covariance: CovarianceKind,
}

fn default_tol_grad() -> Option<f64> {
    Some(1e-8)
}

fn default_max_iter() -> Option<usize> {
    Some(500)
}

fn default_line_searcher() -> LineSearcher {
    LineSearcher::MoreThuente
}

impl Default for MleConfig {
    fn default() -> Self {
        Self {
            tol_grad: default_tol_grad(),
            tol_cost: None,
            max_iter: default_max_iter(),
            line_searcher: default_line_searcher(),
            lbfgs_mem: None,
            covariance: CovarianceKind::default(),
        }
    }
}

impl MleConfig {
    pub fn to_options(&self) -> RunResult<MLEOptions> {
        let config_err = |e: crate::optimization::errors::OptError| RunError::Config {
            message: format!("mle: {e}"),
        };
        let tols =
            Tolerances::new(self.tol_grad, self.tol_cost, self.max_iter).map_err(config_err)?;
        MLEOptions::new(tols, self.line_searcher, self.lbfgs_mem).map_err(config_err)
    }
}

fn default_market_definition() -> MarketDefinition {
    MarketDefinition::ModelYear
}

fn default_specifications() -> Vec<usize> {
    DEFAULT_SPECIFICATIONS.to_vec()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    pub description: String,
    pub output_root: PathBuf,
    pub data_root: PathBuf,
    #[serde(default = "default_market_definition")]
    pub market_definition: MarketDefinition,
    #[serde(default)]
    pub per_year: bool,
    #[serde(default)]
    pub estimator: EstimatorKind,
    #[serde(default = "default_specifications")]
    pub specifications: Vec<usize>,
    pub inputs: InputPaths,
    pub preparation: PreparationConfig,
    #[serde(default)]
    pub mle: MleConfig,
}

/// Values given on the command line that replace the file's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub description: Option<String>,
    pub market_definition: Option<MarketDefinition>,
    pub per_year: Option<bool>,
}

impl RunConfig {
    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    /// [`RunError::Io`] if the file cannot be read, [`RunError::Config`] if
    /// it does not parse.
    pub fn load(path: &Path) -> RunResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RunError::Io { path: path.to_path_buf(), message: e.to_string() })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> RunResult<Self> {
        toml::from_str(contents).map_err(|e| RunError::Config { message: e.to_string() })
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(description) = overrides.description {
            self.description = description;
        }
        if let Some(definition) = overrides.market_definition {
            self.market_definition = definition;
        }
        if let Some(per_year) = overrides.per_year {
            self.per_year = per_year;
        }
        self
    }

    /// Check everything that can be checked without touching data.
    ///
    /// # Errors
    /// - [`RunError::MissingDescription`] for a blank description.
    /// - [`RunError::Config`] for an empty specification list, bad MLE
    ///   tolerances, or county markets without county household counts.
    /// - [`RunError::Estimation`] for a specification index out of range.
    /// - [`RunError::Prepare`] for an invalid `zms_replaced_with`.
    pub fn validate(&self) -> RunResult<()> {
        if self.description.trim().is_empty() {
            return Err(RunError::MissingDescription);
        }
        if self.market_definition.includes_county() && self.inputs.households_by_county.is_none() {
            return Err(RunError::Config {
                message: "county_model_year markets need inputs.households_by_county".to_string(),
            });
        }
        self.specifications()?;
        self.registration_options()?;
        self.mle.to_options()?;
        Ok(())
    }

    pub fn specifications(&self) -> RunResult<Vec<Specification>> {
        if self.specifications.is_empty() {
            return Err(RunError::Config { message: "no specifications listed".to_string() });
        }
        Ok(self
            .specifications
            .iter()
            .map(|&j| Specification::new(j))
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub fn reference_options(&self) -> RunResult<PrepareOptions> {
        let p = &self.preparation;
        Ok(PrepareOptions::reference(p.make_removal)
            .with_makes_to_remove(p.makes_to_remove.clone())
            .with_excluded_years(p.reference_excluded_years.clone())
            .with_zms(p.zms_replaced_with)?)
    }

    pub fn registration_options(&self) -> RunResult<PrepareOptions> {
        let p = &self.preparation;
        Ok(PrepareOptions::registration(self.market_definition, p.make_removal)
            .with_makes_to_remove(p.makes_to_remove.clone())
            .with_excluded_years(p.registration_excluded_years.clone())
            .with_year_to_drop(p.year_to_drop)
            .with_zms(p.zms_replaced_with)?)
    }

    pub fn build_estimator(&self) -> RunResult<Box<dyn DemandEstimator>> {
        Ok(match self.estimator {
            EstimatorKind::IvLogit => Box::new(IvLogit),
            EstimatorKind::MleLogit => {
                Box::new(MleLogit::new(self.mle.to_options()?, self.mle.covariance))
            }
        })
    }
}
