//! market — data model and CSV I/O for vehicle markets.
//!
//! Purpose
//! -------
//! Define the rows read from the two raw panels and the auxiliary tables,
//! the common [`VehicleRecord`] both panels are mapped into, and the
//! prepared [`MarketTable`] consumed by estimation.
//!
//! Key behaviors
//! -------------
//! - Raw rows deserialize directly from CSV headers via `serde`.
//! - [`MarketTable`] exposes columns by name so that formulations can refer
//!   to covariates and instruments as strings.
//! - [`io`] writes prepared tables deterministically: same table, same bytes.

pub mod auxiliary;
pub mod errors;
pub mod io;
pub mod records;
pub mod table;

pub use self::auxiliary::{
    AuxiliaryTables, BrandMapping, DieselPrice, ElectricityPrice, EnergyPrices, GasPrice,
    HouseholdsByCounty, HouseholdsByYear,
};
pub use self::errors::{DataError, DataResult};
pub use self::records::{ReferenceRow, RegistrationRow, VehicleRecord};
pub use self::table::{MarketDefinition, MarketRow, MarketTable, INSTRUMENT_PREFIX};
