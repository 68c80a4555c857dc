//! Auxiliary tables joined onto the panels: households, brand→OEM mapping,
//! and energy prices. Rows are kept exactly as read; key validation happens
//! in the preparer.
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HouseholdsByYear {
    pub year: i32,
    pub households: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HouseholdsByCounty {
    pub county_name: String,
    pub year: i32,
    pub households: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BrandMapping {
    pub make: String,
    pub oem: String,
}

/// Monthly gasoline price in 2021 dollars per gallon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GasPrice {
    pub year: i32,
    pub month: u32,
    pub gas_price_21: f64,
}

/// Monthly diesel price in 2021 dollars per gallon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DieselPrice {
    pub year: i32,
    pub month: u32,
    pub diesel_price_21: f64,
}

/// Yearly residential electricity price in 2021 dollars per kWh.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElectricityPrice {
    pub year: i32,
    pub electricity_price_21: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyPrices {
    pub gas: Vec<GasPrice>,
    pub diesel: Vec<DieselPrice>,
    pub electricity: Vec<ElectricityPrice>,
}

/// Everything the preparer joins onto a panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliaryTables {
    pub households_by_year: Vec<HouseholdsByYear>,
    pub households_by_county: Vec<HouseholdsByCounty>,
    pub brand_mapping: Vec<BrandMapping>,
    pub energy: EnergyPrices,
}
