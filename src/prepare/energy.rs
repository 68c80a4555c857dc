//! prepare::energy — registration-panel finalization.
//!
//! Purpose
//! -------
//! Turn raw [`RegistrationRow`]s into [`VehicleRecord`]s by attaching
//! real energy prices and computing the operating cost `dollar_per_mile`.
//!
//! Key behaviors
//! -------------
//! - `report_year_month` (`YYYYMM`) is split into a year and a month.
//! - Gas and diesel prices join on `(year, month)`, electricity on `year`.
//! - Each join behaves like a left join: a key with no price row is fatal,
//!   and a key with several price rows would duplicate the vehicle, which is
//!   caught by the row-count check after all joins.
//! - Fuels with no cost formula are dropped and counted at `warn`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `combined` is MPG for combustion fuels and MPGe for electric vehicles.
//! - PHEVs are costed with a fixed electric share of miles driven because
//!   the panel carries only a combined efficiency.
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    market::{EnergyPrices, RegistrationRow, VehicleRecord},
    prepare::errors::{PrepareError, PrepareResult},
};

/// Share of PHEV miles driven on electricity.
pub const PHEV_ELECTRIC_SHARE: f64 = 0.563;

/// kWh per gallon of gasoline equivalent (EPA).
pub const KWH_PER_GALLON_EQUIVALENT: f64 = 33.7;

/// Fuel classes with a known operating-cost formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelKind {
    Gasoline,
    Hybrid,
    FlexFuel,
    Diesel,
    Phev,
    Electric,
}

impl FuelKind {
    /// Case-insensitive parse of a panel fuel label; `None` for fuels the
    /// pipeline cannot cost.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "gasoline" => Some(FuelKind::Gasoline),
            "hybrid" => Some(FuelKind::Hybrid),
            "flex fuel" => Some(FuelKind::FlexFuel),
            "diesel" => Some(FuelKind::Diesel),
            "phev" => Some(FuelKind::Phev),
            "electric" => Some(FuelKind::Electric),
            _ => None,
        }
    }

    /// Dollars per mile given the joined prices and combined efficiency.
    pub fn dollar_per_mile(&self, prices: &JoinedPrices, combined: f64) -> f64 {
        match self {
            FuelKind::Gasoline | FuelKind::Hybrid | FuelKind::FlexFuel => prices.gas / combined,
            FuelKind::Diesel => prices.diesel / combined,
            FuelKind::Phev => {
                let electric = prices.electricity * PHEV_ELECTRIC_SHARE;
                (electric + prices.gas * (1.0 - PHEV_ELECTRIC_SHARE)) / combined
            }
            FuelKind::Electric => prices.electricity * KWH_PER_GALLON_EQUIVALENT / combined,
        }
    }
}

/// Energy prices matched to one registration row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedPrices {
    pub gas: f64,
    pub diesel: f64,
    pub electricity: f64,
}

/// Split `YYYYMM` into `(year, month)`.
///
/// # Errors
/// [`PrepareError::InvalidReportYearMonth`] if the value is not six digits
/// or the month is outside `1..=12`.
pub fn split_report_year_month(value: i64) -> PrepareResult<(i32, u32)> {
    if !(100_000..=999_999).contains(&value) {
        return Err(PrepareError::InvalidReportYearMonth { value });
    }
    let year = (value / 100) as i32;
    let month = (value % 100) as u32;
    if !(1..=12).contains(&month) {
        return Err(PrepareError::InvalidReportYearMonth { value });
    }
    Ok((year, month))
}

struct PriceIndex {
    gas: HashMap<(i32, u32), Vec<f64>>,
    diesel: HashMap<(i32, u32), Vec<f64>>,
    electricity: HashMap<i32, Vec<f64>>,
}

impl PriceIndex {
    fn new(energy: &EnergyPrices) -> Self {
        let mut gas: HashMap<(i32, u32), Vec<f64>> = HashMap::new();
        for p in &energy.gas {
            gas.entry((p.year, p.month)).or_default().push(p.gas_price_21);
        }
        let mut diesel: HashMap<(i32, u32), Vec<f64>> = HashMap::new();
        for p in &energy.diesel {
            diesel.entry((p.year, p.month)).or_default().push(p.diesel_price_21);
        }
        let mut electricity: HashMap<i32, Vec<f64>> = HashMap::new();
        for p in &energy.electricity {
            electricity.entry(p.year).or_default().push(p.electricity_price_21);
        }
        Self { gas, diesel, electricity }
    }

    /// First matching prices plus the number of rows the joins would
    /// produce for this vehicle.
    fn lookup(&self, year: i32, month: u32) -> PrepareResult<(JoinedPrices, usize)> {
        let key = format!("{year}-{month:02}");
        let gas = self
            .gas
            .get(&(year, month))
            .ok_or_else(|| PrepareError::UnmatchedKey { table: "gas_prices", key: key.clone() })?;
        let diesel = self.diesel.get(&(year, month)).ok_or_else(|| PrepareError::UnmatchedKey {
            table: "diesel_prices",
            key: key.clone(),
        })?;
        let electricity = self.electricity.get(&year).ok_or_else(|| PrepareError::UnmatchedKey {
            table: "electricity_prices",
            key: year.to_string(),
        })?;
        let prices = JoinedPrices { gas: gas[0], diesel: diesel[0], electricity: electricity[0] };
        Ok((prices, gas.len() * diesel.len() * electricity.len()))
    }
}

/// Attach energy prices and compute `dollar_per_mile`, producing common
/// vehicle records.
///
/// Parameters
/// ----------
/// - `rows`: raw registration rows.
/// - `energy`: gas, diesel, and electricity price tables.
///
/// Returns
/// -------
/// Records for every row whose fuel can be costed, in input order.
///
/// Errors
/// ------
/// - [`PrepareError::InvalidReportYearMonth`] for a malformed date.
/// - [`PrepareError::UnmatchedKey`] when a date has no price row.
/// - [`PrepareError::RowCountMismatch`] when a price table repeats a key.
pub fn finalize_registration(
    rows: Vec<RegistrationRow>, energy: &EnergyPrices,
) -> PrepareResult<Vec<VehicleRecord>> {
    let index = PriceIndex::new(energy);
    let expected = rows.len();
    let mut joined_rows = 0usize;
    let mut dropped = 0usize;
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let (year, month) = split_report_year_month(row.report_year_month)?;
        let (prices, multiplicity) = index.lookup(year, month)?;
        joined_rows += multiplicity;

        let Some(kind) = FuelKind::parse(&row.fuel) else {
            dropped += 1;
            continue;
        };
        let dollar_per_mile = kind.dollar_per_mile(&prices, row.combined);
        records.push(VehicleRecord {
            model_year: row.model_year,
            make: row.make,
            model: row.model,
            trim: row.trim,
            fuel: row.fuel,
            range_elec: row.range_elec,
            county: Some(row.county_name),
            count: row.veh_count,
            price: row.msrp,
            dollar_per_mile,
            log_hp_weight: row.log_hp_wt,
            wheelbase: row.wheelbase,
            doors: row.doors,
            drivetype: row.drive_type,
            bodytype: row.body_type,
        });
    }

    if joined_rows != expected {
        return Err(PrepareError::RowCountMismatch {
            stage: "energy price join",
            expected,
            actual: joined_rows,
        });
    }
    if dropped > 0 {
        warn!(
            dropped,
            "Dropped vehicles that are not gasoline, hybrid, flex fuel, diesel, phev, or electric"
        );
    }
    debug!(kept = records.len(), "Finalized registration panel");
    Ok(records)
}
