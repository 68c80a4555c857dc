//! Preparation options for the two panel variants.
use serde::Deserialize;

use crate::{
    market::MarketDefinition,
    prepare::errors::{PrepareError, PrepareResult},
};

/// Default replacement for zero registration counts.
pub const DEFAULT_ZMS: f64 = 0.001;

/// Model years dropped from the registration panel by default.
pub const REGISTRATION_EXCLUDED_YEARS: [i32; 3] = [2016, 2017, 2023];

/// When excluded makes are removed relative to share and instrument
/// construction.
///
/// - `Initial`: before any other step; removed makes are neither inside
///   goods nor rivals.
/// - `Final`: after instruments are built; removed makes still count as
///   rivals in the instruments and their share mass is folded into the
///   outside good.
///
/// There is deliberately no `Default`: every run must choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MakeRemoval {
    Initial,
    Final,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrepareOptions {
    pub market_definition: MarketDefinition,
    pub make_removal: MakeRemoval,
    pub makes_to_remove: Vec<String>,
    pub excluded_years: Vec<i32>,
    pub year_to_drop: Option<i32>,
    zms_replaced_with: f64,
}

impl PrepareOptions {
    /// Registration-panel defaults: excluded years 2016, 2017, 2023 and
    /// `zms_replaced_with = 0.001`.
    pub fn registration(market_definition: MarketDefinition, make_removal: MakeRemoval) -> Self {
        Self {
            market_definition,
            make_removal,
            makes_to_remove: Vec::new(),
            excluded_years: REGISTRATION_EXCLUDED_YEARS.to_vec(),
            year_to_drop: None,
            zms_replaced_with: DEFAULT_ZMS,
        }
    }

    /// Reference-panel defaults: model-year markets, nothing excluded.
    pub fn reference(make_removal: MakeRemoval) -> Self {
        Self {
            market_definition: MarketDefinition::ModelYear,
            make_removal,
            makes_to_remove: Vec::new(),
            excluded_years: Vec::new(),
            year_to_drop: None,
            zms_replaced_with: DEFAULT_ZMS,
        }
    }

    pub fn with_makes_to_remove(mut self, makes: Vec<String>) -> Self {
        self.makes_to_remove = makes;
        self
    }

    pub fn with_excluded_years(mut self, years: Vec<i32>) -> Self {
        self.excluded_years = years;
        self
    }

    pub fn with_year_to_drop(mut self, year: Option<i32>) -> Self {
        self.year_to_drop = year;
        self
    }

    /// # Errors
    /// [`PrepareError::InvalidZmsValue`] unless `zms` is finite and `> 0`.
    pub fn with_zms(mut self, zms: f64) -> PrepareResult<Self> {
        if !zms.is_finite() || zms <= 0.0 {
            return Err(PrepareError::InvalidZmsValue { value: zms });
        }
        self.zms_replaced_with = zms;
        Ok(self)
    }

    pub fn zms_replaced_with(&self) -> f64 {
        self.zms_replaced_with
    }

    pub(crate) fn is_year_excluded(&self, year: i32) -> bool {
        self.excluded_years.contains(&year) || self.year_to_drop == Some(year)
    }

    pub(crate) fn is_make_removed(&self, make: &str) -> bool {
        self.makes_to_remove.iter().any(|m| m == make)
    }
}
