//! Joins of auxiliary tables onto grouped products: households (market
//! size) and the brand→OEM firm mapping.
use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::{
    market::{AuxiliaryTables, BrandMapping, MarketDefinition},
    prepare::{
        errors::{PrepareError, PrepareResult},
        identifiers::ProductRecord,
    },
};

/// Households per market key (`"2019"` or `"Hartford_2019"`).
fn household_index(
    aux: &AuxiliaryTables, definition: MarketDefinition,
) -> PrepareResult<(HashMap<String, f64>, &'static str)> {
    let mut index = HashMap::new();
    let table = match definition {
        MarketDefinition::ModelYear => {
            for hh in &aux.households_by_year {
                let key = hh.year.to_string();
                if index.insert(key.clone(), hh.households).is_some() {
                    return Err(PrepareError::DuplicateKey { table: "households_by_year", key });
                }
            }
            "households_by_year"
        }
        MarketDefinition::CountyModelYear => {
            for hh in &aux.households_by_county {
                let key = format!("{}_{}", hh.county_name, hh.year);
                if index.insert(key.clone(), hh.households).is_some() {
                    return Err(PrepareError::DuplicateKey { table: "households_by_county", key });
                }
            }
            "households_by_county"
        }
    };
    Ok((index, table))
}

/// Market size for every product, in product order.
///
/// # Errors
/// - [`PrepareError::DuplicateKey`] if the household table repeats a key.
/// - [`PrepareError::UnmatchedKey`] if a market has no household row.
/// - [`PrepareError::NonFiniteValue`] if a matched household count is not
///   finite and positive.
pub fn market_sizes(
    products: &[ProductRecord], aux: &AuxiliaryTables, definition: MarketDefinition,
) -> PrepareResult<Vec<f64>> {
    let (index, table) = household_index(aux, definition)?;
    products
        .iter()
        .map(|p| {
            let households = *index
                .get(&p.market_id)
                .ok_or_else(|| PrepareError::UnmatchedKey { table, key: p.market_id.clone() })?;
            if !households.is_finite() || households <= 0.0 {
                return Err(PrepareError::NonFiniteValue {
                    column: "households",
                    key: p.market_id.clone(),
                    value: households,
                });
            }
            Ok(households)
        })
        .collect()
}

/// Firm id for every product. Makes absent from the mapping become their
/// own firm.
///
/// # Errors
/// [`PrepareError::DuplicateKey`] if a make is mapped more than once.
pub fn firm_ids(
    products: &[ProductRecord], mapping: &[BrandMapping],
) -> PrepareResult<Vec<String>> {
    let mut index: HashMap<&str, &str> = HashMap::with_capacity(mapping.len());
    for m in mapping {
        if index.insert(m.make.as_str(), m.oem.as_str()).is_some() {
            return Err(PrepareError::DuplicateKey {
                table: "brand_mapping",
                key: m.make.clone(),
            });
        }
    }

    let mut unmapped: BTreeSet<&str> = BTreeSet::new();
    let ids = products
        .iter()
        .map(|p| {
            let make = p.vehicle.make.as_str();
            match index.get(make) {
                Some(oem) => oem.to_string(),
                None => {
                    unmapped.insert(make);
                    make.to_string()
                }
            }
        })
        .collect();
    if !unmapped.is_empty() {
        warn!(makes = ?unmapped, "Makes missing from brand mapping are treated as their own firm");
    }
    Ok(ids)
}
