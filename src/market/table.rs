//! market::table — prepared, estimation-ready market tables.
//!
//! Purpose
//! -------
//! Hold the output of the preparer: one [`MarketRow`] per (market, product)
//! with shares, characteristics, and BLP-style instruments, plus the
//! [`MarketDefinition`] that produced the market ids.
//!
//! Invariants & assumptions
//! ------------------------
//! - Rows are sorted by `(market_ids, product_ids)` and the pair is unique.
//! - Every row carries the same number of instruments, recorded in
//!   `MarketTable::n_instruments`.
//! - Fuel dummies are stored as `0.0`/`1.0` so every covariate is read back
//!   through the same numeric accessor.
//!
//! Conventions
//! -----------
//! - Column names in [`MarketTable::numeric`] and
//!   [`MarketTable::categorical`] are the CSV header names, which are also
//!   the names used in formulations.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Name prefix of generated instrument columns.
pub const INSTRUMENT_PREFIX: &str = "demand_instruments";

/// How products are grouped into markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketDefinition {
    /// One market per model year; `market_ids = "{model_year}"`.
    ModelYear,
    /// One market per county and model year; `market_ids = "{county}_{model_year}"`.
    CountyModelYear,
}

impl MarketDefinition {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketDefinition::ModelYear => "model_year",
            MarketDefinition::CountyModelYear => "county_model_year",
        }
    }

    pub fn includes_county(&self) -> bool {
        matches!(self, MarketDefinition::CountyModelYear)
    }
}

impl fmt::Display for MarketDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketDefinition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model_year" => Ok(MarketDefinition::ModelYear),
            "county_model_year" => Ok(MarketDefinition::CountyModelYear),
            other => Err(format!(
                "unknown market definition '{other}', expected 'model_year' or 'county_model_year'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketRow {
    pub market_ids: String,
    pub product_ids: String,
    pub firm_ids: String,
    pub make: String,
    pub model: String,
    pub model_year: i32,
    pub trim: String,
    pub fuel: String,
    pub county_name: Option<String>,
    pub prices: f64,
    pub quantity: f64,
    pub market_size: f64,
    pub shares: f64,
    pub outside_share: f64,
    pub time_trend: f64,
    pub dollar_per_mile: f64,
    pub electric: f64,
    pub phev: f64,
    pub hybrid: f64,
    pub diesel: f64,
    pub log_hp_weight: f64,
    pub wheelbase: f64,
    pub doors: f64,
    pub range_elec: f64,
    pub drivetype: String,
    pub bodytype: String,
    pub demand_instruments: Vec<f64>,
}

impl MarketRow {
    /// Numeric column by name, including `demand_instruments{k}`.
    pub fn numeric(&self, name: &str) -> Option<f64> {
        let value = match name {
            "prices" => self.prices,
            "quantity" => self.quantity,
            "market_size" => self.market_size,
            "shares" => self.shares,
            "outside_share" => self.outside_share,
            "time_trend" => self.time_trend,
            "model_year" => f64::from(self.model_year),
            "dollar_per_mile" => self.dollar_per_mile,
            "electric" => self.electric,
            "phev" => self.phev,
            "hybrid" => self.hybrid,
            "diesel" => self.diesel,
            "log_hp_weight" => self.log_hp_weight,
            "wheelbase" => self.wheelbase,
            "doors" => self.doors,
            "range_elec" => self.range_elec,
            other => {
                let k: usize = other.strip_prefix(INSTRUMENT_PREFIX)?.parse().ok()?;
                return self.demand_instruments.get(k).copied();
            }
        };
        Some(value)
    }

    /// Categorical column by name. `county_name` is empty for state-level
    /// panels.
    pub fn categorical(&self, name: &str) -> Option<&str> {
        let value = match name {
            "market_ids" => &self.market_ids,
            "product_ids" => &self.product_ids,
            "firm_ids" => &self.firm_ids,
            "make" => &self.make,
            "model" => &self.model,
            "trim" => &self.trim,
            "fuel" => &self.fuel,
            "drivetype" => &self.drivetype,
            "bodytype" => &self.bodytype,
            "county_name" => return Some(self.county_name.as_deref().unwrap_or("")),
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// Prepared table for one data source.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketTable {
    pub definition: MarketDefinition,
    pub n_instruments: usize,
    pub rows: Vec<MarketRow>,
}

impl MarketTable {
    pub fn new(definition: MarketDefinition, n_instruments: usize, rows: Vec<MarketRow>) -> Self {
        Self { definition, n_instruments, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whole numeric column, or `None` if the name is not a numeric column.
    pub fn numeric(&self, name: &str) -> Option<Vec<f64>> {
        self.rows.iter().map(|r| r.numeric(name)).collect()
    }

    /// Whole categorical column, or `None` if the name is unknown.
    pub fn categorical(&self, name: &str) -> Option<Vec<&str>> {
        self.rows.iter().map(|r| r.categorical(name)).collect()
    }

    pub fn instrument_names(&self) -> Vec<String> {
        (0..self.n_instruments).map(|k| format!("{INSTRUMENT_PREFIX}{k}")).collect()
    }

    /// Distinct model years, ascending.
    pub fn model_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.rows.iter().map(|r| r.model_year).collect();
        years.into_iter().collect()
    }

    /// Copy of the table restricted to one model year. Shares and
    /// instruments are market-level and carry over unchanged.
    pub fn restrict_to_year(&self, year: i32) -> MarketTable {
        let rows = self.rows.iter().filter(|r| r.model_year == year).cloned().collect();
        MarketTable::new(self.definition, self.n_instruments, rows)
    }

    /// Row index ranges of consecutive markets. Relies on the sort order.
    pub fn market_ranges(&self) -> Vec<std::ops::Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        for i in 1..=self.rows.len() {
            if i == self.rows.len() || self.rows[i].market_ids != self.rows[start].market_ids {
                ranges.push(start..i);
                start = i;
            }
        }
        ranges
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn row(market: &str, product: &str, share: f64) -> MarketRow {
        MarketRow {
            market_ids: market.to_string(),
            product_ids: product.to_string(),
            firm_ids: "OEM".to_string(),
            make: "Acura".to_string(),
            model: "MDX".to_string(),
            model_year: 2019,
            trim: "Base".to_string(),
            fuel: "gasoline".to_string(),
            county_name: None,
            prices: 40_000.0,
            quantity: share * 1000.0,
            market_size: 1000.0,
            shares: share,
            outside_share: 0.5,
            time_trend: 0.0,
            dollar_per_mile: 0.1,
            electric: 0.0,
            phev: 0.0,
            hybrid: 0.0,
            diesel: 0.0,
            log_hp_weight: -3.0,
            wheelbase: 110.0,
            doors: 4.0,
            range_elec: 0.0,
            drivetype: "AWD".to_string(),
            bodytype: "SUV".to_string(),
            demand_instruments: vec![1.0, 2.0],
        }
    }

    #[test]
    fn numeric_accessor_reads_named_and_instrument_columns() {
        let r = row("2019", "a", 0.2);
        assert_eq!(r.numeric("shares"), Some(0.2));
        assert_eq!(r.numeric("demand_instruments1"), Some(2.0));
        assert_eq!(r.numeric("demand_instruments2"), None);
        assert_eq!(r.numeric("make"), None);
        assert_eq!(r.categorical("county_name"), Some(""));
        assert_eq!(r.categorical("prices"), None);
    }

    #[test]
    // Purpose
    // -------
    // `market_ranges` must split a sorted table into one range per market.
    fn market_ranges_follow_sorted_market_ids() {
        // Arrange
        let table = MarketTable::new(
            MarketDefinition::ModelYear,
            2,
            vec![row("2019", "a", 0.1), row("2019", "b", 0.2), row("2020", "a", 0.3)],
        );

        // Act
        let ranges = table.market_ranges();

        // Assert
        assert_eq!(ranges, vec![0..2, 2..3]);
    }

    #[test]
    fn market_definition_parses_config_names() {
        assert_eq!("county_model_year".parse(), Ok(MarketDefinition::CountyModelYear));
        assert_eq!(MarketDefinition::ModelYear.to_string(), "model_year");
        assert!("state".parse::<MarketDefinition>().is_err());
    }
}
