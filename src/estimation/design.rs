//! estimation::design — design matrices from formulations.
//!
//! Purpose
//! -------
//! Expand a [`Formulation`] over a [`MarketTable`] into a dense matrix with
//! named columns, in the two codings the comparison reports:
//!
//! - [`logit_design`]: formula coding with no intercept. The first fixed
//!   effect keeps every level (`C(make)[Acura]`); later ones drop their
//!   first level (`C(drivetype)[T.FWD]`).
//! - [`ols_design`]: dummy coding with an intercept named `const`; every
//!   fixed effect drops its first level (`make_Audi`).
//!
//! Conventions
//! -----------
//! - Levels are sorted lexicographically; "first level" means the smallest.
//! - Covariates keep formulation order and precede the dummies.
//! - Every value must be finite; anything else is a
//!   [`EstimationError::DegenerateColumn`].
use std::collections::BTreeSet;

use ndarray::Array2;

use crate::{
    estimation::{
        errors::{EstimationError, EstimationResult},
        specification::Formulation,
    },
    market::MarketTable,
};

/// Dense design matrix with one name per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub names: Vec<String>,
    pub matrix: Array2<f64>,
}

impl Design {
    pub fn ncols(&self) -> usize {
        self.names.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Numeric column by name, checked for finiteness.
pub fn numeric_column(table: &MarketTable, name: &str) -> EstimationResult<Vec<f64>> {
    let values = table
        .numeric(name)
        .ok_or_else(|| EstimationError::UnknownColumn { name: name.to_string() })?;
    if let Some((row, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(EstimationError::DegenerateColumn { name: name.to_string(), row, value });
    }
    Ok(values)
}

struct Categorical<'a> {
    name: &'a str,
    values: Vec<&'a str>,
    levels: Vec<&'a str>,
}

fn categorical<'a>(table: &'a MarketTable, name: &'a str) -> EstimationResult<Categorical<'a>> {
    let values = table
        .categorical(name)
        .ok_or_else(|| EstimationError::UnknownColumn { name: name.to_string() })?;
    let levels: BTreeSet<&str> = values.iter().copied().collect();
    Ok(Categorical { name, values, levels: levels.into_iter().collect() })
}

struct Builder {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Builder {
    fn new() -> Self {
        Self { names: Vec::new(), columns: Vec::new() }
    }

    fn push(&mut self, name: String, column: Vec<f64>) {
        self.names.push(name);
        self.columns.push(column);
    }

    fn push_dummies(&mut self, cat: &Categorical<'_>, skip: usize, name: impl Fn(&str) -> String) {
        for level in cat.levels.iter().skip(skip) {
            let column = cat.values.iter().map(|v| if v == level { 1.0 } else { 0.0 }).collect();
            self.push(name(level), column);
        }
    }

    fn finish(self, rows: usize) -> Design {
        let mut matrix = Array2::<f64>::zeros((rows, self.columns.len()));
        for (j, column) in self.columns.iter().enumerate() {
            for (i, &v) in column.iter().enumerate() {
                matrix[[i, j]] = v;
            }
        }
        Design { names: self.names, matrix }
    }
}

fn covariates(builder: &mut Builder, f: &Formulation, table: &MarketTable) -> EstimationResult<()> {
    for name in &f.covariates {
        builder.push(name.clone(), numeric_column(table, name)?);
    }
    Ok(())
}

/// Formula-coded design without intercept.
///
/// # Errors
/// - [`EstimationError::EmptyTable`] for an empty table.
/// - [`EstimationError::UnknownColumn`] for a name the table lacks.
/// - [`EstimationError::DegenerateColumn`] for a non-finite covariate.
pub fn logit_design(f: &Formulation, table: &MarketTable) -> EstimationResult<Design> {
    if table.is_empty() {
        return Err(EstimationError::EmptyTable);
    }
    let mut builder = Builder::new();
    covariates(&mut builder, f, table)?;
    for (k, fe) in f.fixed_effects.iter().enumerate() {
        let cat = categorical(table, fe)?;
        if k == 0 {
            builder.push_dummies(&cat, 0, |level| format!("C({})[{level}]", cat.name));
        } else {
            builder.push_dummies(&cat, 1, |level| format!("C({})[T.{level}]", cat.name));
        }
    }
    Ok(builder.finish(table.len()))
}

/// Dummy-coded design with a leading `const` column.
///
/// # Errors
/// Same as [`logit_design`].
pub fn ols_design(f: &Formulation, table: &MarketTable) -> EstimationResult<Design> {
    if table.is_empty() {
        return Err(EstimationError::EmptyTable);
    }
    let mut builder = Builder::new();
    builder.push("const".to_string(), vec![1.0; table.len()]);
    covariates(&mut builder, f, table)?;
    for fe in &f.fixed_effects {
        let cat = categorical(table, fe)?;
        builder.push_dummies(&cat, 1, |level| format!("{}_{level}", cat.name));
    }
    Ok(builder.finish(table.len()))
}
