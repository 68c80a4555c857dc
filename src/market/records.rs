//! Raw panel rows and the common pre-aggregation vehicle record.
use serde::Deserialize;

/// One row of the registration panel as delivered.
///
/// `combined` is the combined fuel economy (MPG, or MPGe for electric
/// vehicles) and `report_year_month` is encoded as `YYYYMM`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegistrationRow {
    pub model_year: i32,
    pub make: String,
    pub model: String,
    pub trim: String,
    pub fuel: String,
    pub range_elec: f64,
    pub veh_count: f64,
    pub county_name: String,
    pub combined: f64,
    pub report_year_month: i64,
    pub msrp: f64,
    pub log_hp_wt: f64,
    pub wheelbase: f64,
    pub doors: f64,
    pub drive_type: String,
    pub body_type: String,
}

/// One row of the survey-derived reference panel. It is state-level, so it
/// carries no county, and its `dollar_per_mile` is already computed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferenceRow {
    pub model_year: i32,
    pub make: String,
    pub model: String,
    pub trim: String,
    pub fuel: String,
    pub range_elec: f64,
    pub sales: f64,
    pub msrp: f64,
    pub dollar_per_mile: f64,
    pub log_hp_weight: f64,
    pub wheelbase: f64,
    pub doors: f64,
    pub drivetype: String,
    pub bodytype: String,
}

/// Vehicle observation in the schema shared by both panels, before products
/// are grouped into markets.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub model_year: i32,
    pub make: String,
    pub model: String,
    pub trim: String,
    pub fuel: String,
    pub range_elec: f64,
    pub county: Option<String>,
    pub count: f64,
    pub price: f64,
    pub dollar_per_mile: f64,
    pub log_hp_weight: f64,
    pub wheelbase: f64,
    pub doors: f64,
    pub drivetype: String,
    pub bodytype: String,
}

impl From<ReferenceRow> for VehicleRecord {
    fn from(row: ReferenceRow) -> Self {
        Self {
            model_year: row.model_year,
            make: row.make,
            model: row.model,
            trim: row.trim,
            fuel: row.fuel,
            range_elec: row.range_elec,
            county: None,
            count: row.sales,
            price: row.msrp,
            dollar_per_mile: row.dollar_per_mile,
            log_hp_weight: row.log_hp_weight,
            wheelbase: row.wheelbase,
            doors: row.doors,
            drivetype: row.drivetype,
            bodytype: row.bodytype,
        }
    }
}
