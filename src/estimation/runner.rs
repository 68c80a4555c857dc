//! estimation::runner — specification × data-source comparison.
//!
//! For every specification index, in order, and for each data source
//! (reference first, then registration), fit the discrete-choice
//! formulation through a [`DemandEstimator`] and the linear share
//! regression, and append both coefficient sets to long-format tables.
//! The first error aborts the whole comparison.
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    estimation::{
        design::{numeric_column, ols_design},
        errors::EstimationResult,
        estimator::{DemandEstimator, Estimates, ParamEstimate},
        ols::ols,
        specification::{Formulation, Specification},
    },
    market::MarketTable,
};

/// Which panel a result came from. Serialized with the labels used in the
/// output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataSource {
    #[serde(rename = "Experian")]
    Reference,
    #[serde(rename = "RLP")]
    Registration,
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Reference => "Experian",
            DataSource::Registration => "RLP",
        }
    }
}

/// One coefficient of one (specification, data source) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    pub specification: usize,
    pub data_source: DataSource,
    pub param: String,
    pub value: f64,
    pub se: f64,
}

/// Long-format results for the discrete-choice and linear fits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonTables {
    pub logit: Vec<ComparisonRecord>,
    pub ols: Vec<ComparisonRecord>,
}

fn tag(estimates: Estimates, spec: Specification, source: DataSource) -> Vec<ComparisonRecord> {
    estimates
        .into_iter()
        .map(|p| ComparisonRecord {
            specification: spec.index(),
            data_source: source,
            param: p.name,
            value: p.value,
            se: p.se,
        })
        .collect()
}

fn linear_fit(formulation: &Formulation, table: &MarketTable) -> EstimationResult<Estimates> {
    let design = ols_design(formulation, table)?;
    let fit = ols(&design, &numeric_column(table, "shares")?)?;
    let p_values = fit.p_values();
    for (name, p) in fit.names.iter().zip(p_values.iter()) {
        debug!(param = %name, p_value = p, "OLS coefficient");
    }
    Ok(fit
        .names
        .into_iter()
        .zip(fit.coefficients.iter().zip(fit.standard_errors.iter()))
        .map(|(name, (&value, &se))| ParamEstimate { name, value, se })
        .collect())
}

/// Run every specification on both tables.
///
/// # Errors
/// The first [`EstimationError`](super::errors::EstimationError) from either
/// fit of any cell.
pub fn run_specifications(
    estimator: &dyn DemandEstimator, reference: &MarketTable, registration: &MarketTable,
    specs: &[Specification],
) -> EstimationResult<ComparisonTables> {
    let mut tables = ComparisonTables::default();
    for &spec in specs {
        for (source, table) in
            [(DataSource::Reference, reference), (DataSource::Registration, registration)]
        {
            let formulation = Formulation::new(spec, table.definition);
            info!("Data Source: {}", source.label());
            info!("Specification: {formulation}");

            let logit = estimator.estimate(&formulation, table)?;
            tables.logit.extend(tag(logit, spec, source));
            let linear = linear_fit(&formulation, table)?;
            tables.ols.extend(tag(linear, spec, source));
        }
    }
    Ok(tables)
}
