//! Nested covariate specifications and their formulations.
//!
//! Specification `j` uses the first `j` entries of [`MASTER_COVARIATES`];
//! the fixed-effect block is the same for every `j`, so specifications are
//! cumulative.
use std::fmt;

use crate::{
    estimation::errors::{EstimationError, EstimationResult},
    market::MarketDefinition,
};

/// Ordered master list of linear covariates.
pub const MASTER_COVARIATES: [&str; 10] = [
    "prices",
    "dollar_per_mile",
    "electric",
    "phev",
    "hybrid",
    "diesel",
    "log_hp_weight",
    "wheelbase",
    "doors",
    "range_elec",
];

/// Specification indices run when a configuration does not list its own.
pub const DEFAULT_SPECIFICATIONS: [usize; 7] = [1, 2, 6, 7, 8, 9, 10];

/// Categoricals absorbed as fixed effects in every specification.
pub const FIXED_EFFECTS: [&str; 3] = ["make", "drivetype", "bodytype"];

/// Extra fixed effect for county × model-year markets.
pub const COUNTY_FIXED_EFFECT: &str = "county_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specification {
    index: usize,
}

impl Specification {
    /// # Errors
    /// [`EstimationError::InvalidSpecification`] unless `1 ≤ index ≤ 10`.
    pub fn new(index: usize) -> EstimationResult<Self> {
        if index == 0 || index > MASTER_COVARIATES.len() {
            return Err(EstimationError::InvalidSpecification {
                index,
                max: MASTER_COVARIATES.len(),
            });
        }
        Ok(Self { index })
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_SPECIFICATIONS.iter().map(|&index| Self { index }).collect()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn covariates(&self) -> &'static [&'static str] {
        &MASTER_COVARIATES[..self.index]
    }
}

/// Linear covariates plus absorbed categoricals, with no intercept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formulation {
    pub covariates: Vec<String>,
    pub fixed_effects: Vec<String>,
}

impl Formulation {
    pub fn new(spec: Specification, definition: MarketDefinition) -> Self {
        let mut fixed_effects: Vec<String> = FIXED_EFFECTS.iter().map(|s| s.to_string()).collect();
        if definition.includes_county() {
            fixed_effects.push(COUNTY_FIXED_EFFECT.to_string());
        }
        Self {
            covariates: spec.covariates().iter().map(|s| s.to_string()).collect(),
            fixed_effects,
        }
    }

    /// Terms in formula order: covariates, then `C(..)` fixed effects.
    pub fn terms(&self) -> Vec<String> {
        self.covariates
            .iter()
            .cloned()
            .chain(self.fixed_effects.iter().map(|fe| format!("C({fe})")))
            .collect()
    }
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0 + {}", self.terms().join(" + "))
    }
}
