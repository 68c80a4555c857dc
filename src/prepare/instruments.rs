//! prepare::instruments — BLP-style characteristic-sum instruments.
//!
//! Purpose
//! -------
//! For each product, sum exogenous characteristics over the other products
//! in its market, split by ownership. These sums shift markups but not the
//! product's own utility, which is what makes them usable for prices.
//!
//! Conventions
//! -----------
//! - Columns are laid out as the own-firm block followed by the rival
//!   block. Each block covers the constant and then
//!   [`INSTRUMENT_CHARACTERISTICS`] in order, so
//!   `demand_instruments0` counts the firm's other products and
//!   `demand_instruments6` counts rival products.
//! - The focal product is excluded from both sums.
//!
//! Invariants & assumptions
//! ------------------------
//! - Rows must be sorted by market so that
//!   [`MarketTable::market_ranges`] yields whole markets.
use std::collections::HashMap;

use crate::market::{MarketRow, MarketTable};

/// Characteristics summed into instruments, after the constant.
pub const INSTRUMENT_CHARACTERISTICS: [&str; 5] =
    ["dollar_per_mile", "log_hp_weight", "wheelbase", "doors", "range_elec"];

/// Total number of instrument columns.
pub const N_INSTRUMENTS: usize = 2 * (INSTRUMENT_CHARACTERISTICS.len() + 1);

/// Constant followed by the characteristics.
fn exogenous(row: &MarketRow) -> [f64; INSTRUMENT_CHARACTERISTICS.len() + 1] {
    [1.0, row.dollar_per_mile, row.log_hp_weight, row.wheelbase, row.doors, row.range_elec]
}

fn add_into(acc: &mut [f64], x: &[f64]) {
    for (a, v) in acc.iter_mut().zip(x) {
        *a += v;
    }
}

/// Overwrite `demand_instruments` on every row and set
/// `table.n_instruments`.
pub fn attach_instruments(table: &mut MarketTable) {
    const K: usize = INSTRUMENT_CHARACTERISTICS.len() + 1;
    for range in table.market_ranges() {
        let market = &mut table.rows[range];

        let mut market_total = [0.0; K];
        let mut firm_totals: HashMap<String, [f64; K]> = HashMap::new();
        for row in market.iter() {
            let x = exogenous(row);
            add_into(&mut market_total, &x);
            add_into(firm_totals.entry(row.firm_ids.clone()).or_insert([0.0; K]), &x);
        }

        for row in market.iter_mut() {
            let x = exogenous(row);
            let firm = firm_totals.get(&row.firm_ids).copied().unwrap_or(x);
            let mut z = Vec::with_capacity(N_INSTRUMENTS);
            z.extend((0..K).map(|k| firm[k] - x[k]));
            z.extend((0..K).map(|k| market_total[k] - firm[k]));
            row.demand_instruments = z;
        }
    }
    table.n_instruments = N_INSTRUMENTS;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{table::tests::row, MarketDefinition};

    #[test]
    // Purpose
    // -------
    // Own-firm and rival sums exclude the focal product and respect market
    // boundaries.
    //
    // Given
    // -----
    // - Market 2019: products a, b of firm F (doors 2 and 4) and c of firm R
    //   (doors 5).
    // - Market 2020: a single product of firm F.
    //
    // Expect
    // ------
    // - a: own count 1, rival count 1, own doors 4, rival doors 5.
    // - c: own count 0, rival count 2, rival doors 6.
    // - The lone 2020 product has all-zero instruments.
    fn sums_split_by_ownership_within_market() {
        // Arrange
        let mut rows = vec![
            row("2019", "a", 0.1),
            row("2019", "b", 0.1),
            row("2019", "c", 0.1),
            row("2020", "a", 0.1),
        ];
        let firms_doors = [("F", 2.0), ("F", 4.0), ("R", 5.0), ("F", 4.0)];
        for (r, (firm, doors)) in rows.iter_mut().zip(firms_doors) {
            r.firm_ids = firm.to_string();
            r.doors = doors;
        }
        let mut table = MarketTable::new(MarketDefinition::ModelYear, 0, rows);

        // Act
        attach_instruments(&mut table);

        // Assert
        assert_eq!(table.n_instruments, 12);
        let a = &table.rows[0].demand_instruments;
        assert_eq!(a.len(), 12);
        assert_eq!((a[0], a[6]), (1.0, 1.0));
        assert_eq!((a[4], a[10]), (4.0, 5.0));
        let c = &table.rows[2].demand_instruments;
        assert_eq!((c[0], c[6], c[10]), (0.0, 2.0, 6.0));
        assert!(table.rows[3].demand_instruments.iter().all(|&z| z == 0.0));
    }
}
