//! prepare::identifiers — product/market ids and product grouping.
//!
//! Key behaviors
//! -------------
//! - `product_ids = make_model_modelyear_trim_fuel_rangeprefix`, where the
//!   range prefix is the first three characters of the electric range
//!   rendered as a float (`0.0`, `22.0` → `22.`, `238.5` → `238`).
//! - `market_ids` is the model year, or `county_modelyear` for county
//!   markets.
//! - Records sharing both ids collapse into one [`ProductRecord`]: counts are
//!   summed, price and `dollar_per_mile` are count-weighted, and every other
//!   characteristic keeps the first value seen.
//! - Group order is first-seen order; the pipeline sorts later.
use std::collections::HashMap;

use crate::market::{MarketDefinition, VehicleRecord};

/// Electric range rendered the way the product key expects, truncated to
/// three characters.
pub fn range_prefix(range_elec: f64) -> String {
    let text = if range_elec.is_finite() && range_elec.fract() == 0.0 {
        format!("{range_elec:.1}")
    } else {
        range_elec.to_string()
    };
    text.chars().take(3).collect()
}

pub fn product_id(rec: &VehicleRecord) -> String {
    format!(
        "{}_{}_{}_{}_{}_{}",
        rec.make,
        rec.model,
        rec.model_year,
        rec.trim,
        rec.fuel,
        range_prefix(rec.range_elec)
    )
}

pub fn market_id(rec: &VehicleRecord, definition: MarketDefinition) -> String {
    match definition {
        MarketDefinition::ModelYear => rec.model_year.to_string(),
        MarketDefinition::CountyModelYear => {
            format!("{}_{}", rec.county.as_deref().unwrap_or_default(), rec.model_year)
        }
    }
}

/// One product in one market after grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub market_id: String,
    pub product_id: String,
    pub vehicle: VehicleRecord,
}

/// Collapse records with equal `(market_id, product_id)`.
pub fn group_products(
    records: Vec<VehicleRecord>, definition: MarketDefinition,
) -> Vec<ProductRecord> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<ProductRecord> = Vec::new();
    // Per group: (Σ count, Σ count·price, Σ count·dpm)
    let mut sums: Vec<(f64, f64, f64)> = Vec::new();

    for rec in records {
        let key = (market_id(&rec, definition), product_id(&rec));
        let weighted = (rec.count, rec.count * rec.price, rec.count * rec.dollar_per_mile);
        match index.get(&key) {
            Some(&slot) => {
                let s = &mut sums[slot];
                s.0 += weighted.0;
                s.1 += weighted.1;
                s.2 += weighted.2;
            }
            None => {
                index.insert(key.clone(), groups.len());
                sums.push(weighted);
                groups.push(ProductRecord { market_id: key.0, product_id: key.1, vehicle: rec });
            }
        }
    }

    for (group, (count, price_sum, dpm_sum)) in groups.iter_mut().zip(sums) {
        group.vehicle.count = count;
        if count != 0.0 {
            group.vehicle.price = price_sum / count;
            group.vehicle.dollar_per_mile = dpm_sum / count;
        }
    }
    groups
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(county: &str, model: &str, year: i32, count: f64) -> VehicleRecord {
        VehicleRecord {
            model_year: year,
            make: "Honda".to_string(),
            model: model.to_string(),
            trim: "Base".to_string(),
            fuel: "gasoline".to_string(),
            range_elec: 0.0,
            county: Some(county.to_string()),
            count,
            price: 25_000.0,
            dollar_per_mile: 0.1,
            log_hp_weight: -3.0,
            wheelbase: 105.0,
            doors: 4.0,
            drivetype: "FWD".to_string(),
            bodytype: "Sedan".to_string(),
        }
    }

    #[test]
    fn range_prefix_renders_like_float_text() {
        assert_eq!(range_prefix(0.0), "0.0");
        assert_eq!(range_prefix(22.0), "22.");
        assert_eq!(range_prefix(238.0), "238");
        assert_eq!(range_prefix(5.25), "5.2");
    }

    #[test]
    fn ids_follow_market_definition() {
        let rec = record("Hartford", "Civic", 2019, 1.0);
        assert_eq!(product_id(&rec), "Honda_Civic_2019_Base_gasoline_0.0");
        assert_eq!(market_id(&rec, MarketDefinition::ModelYear), "2019");
        assert_eq!(market_id(&rec, MarketDefinition::CountyModelYear), "Hartford_2019");
    }

    #[test]
    // Purpose
    // -------
    // Grouping must sum counts and count-weight price and dollar_per_mile.
    //
    // Given
    // -----
    // - Two Civic rows in Hartford (counts 1 and 3, prices 20k and 24k) and
    //   one Civic row in New Haven.
    //
    // Expect
    // ------
    // - County markets: two groups, the Hartford one with count 4 and
    //   price 23k.
    // - Model-year markets: one group with count 5.
    fn grouping_sums_counts_and_weights_prices() {
        // Arrange
        let mut a = record("Hartford", "Civic", 2019, 1.0);
        a.price = 20_000.0;
        a.dollar_per_mile = 0.2;
        let mut b = record("Hartford", "Civic", 2019, 3.0);
        b.price = 24_000.0;
        b.doors = 2.0;
        let c = record("New Haven", "Civic", 2019, 1.0);

        // Act
        let county = group_products(
            vec![a.clone(), b.clone(), c.clone()],
            MarketDefinition::CountyModelYear,
        );
        let state = group_products(vec![a, b, c], MarketDefinition::ModelYear);

        // Assert
        assert_eq!(county.len(), 2);
        let hartford = &county[0].vehicle;
        assert_eq!(hartford.count, 4.0);
        assert!((hartford.price - 23_000.0).abs() < 1e-9);
        assert!((hartford.dollar_per_mile - 0.125).abs() < 1e-12);
        assert_eq!(hartford.doors, 4.0);
        assert_eq!(state.len(), 1);
        assert_eq!(state[0].vehicle.count, 5.0);
    }
}
