//! Product characteristics derived after grouping: fuel dummies, the time
//! trend, and the cleaning pass that drops unusable rows.
use tracing::warn;

use crate::market::MarketRow;

/// 0/1 indicators for the non-gasoline fuel classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelDummies {
    pub electric: f64,
    pub phev: f64,
    pub hybrid: f64,
    pub diesel: f64,
}

impl FuelDummies {
    /// Case-insensitive. Gasoline and flex fuel are the base category.
    pub fn from_label(fuel: &str) -> Self {
        let fuel = fuel.trim().to_ascii_lowercase();
        let flag = |name: &str| if fuel == name { 1.0 } else { 0.0 };
        Self {
            electric: flag("electric"),
            phev: flag("phev"),
            hybrid: flag("hybrid"),
            diesel: flag("diesel"),
        }
    }
}

/// `time_trend = model_year − min(model_year)` over the given rows.
pub fn assign_time_trend(rows: &mut [MarketRow]) {
    let Some(first) = rows.iter().map(|r| r.model_year).min() else {
        return;
    };
    for row in rows {
        row.time_trend = f64::from(row.model_year - first);
    }
}

fn is_usable(row: &MarketRow) -> bool {
    row.prices.is_finite()
        && row.prices > 0.0
        && [row.dollar_per_mile, row.log_hp_weight, row.wheelbase, row.doors, row.range_elec]
            .iter()
            .all(|v| v.is_finite())
}

/// Drop rows with a non-positive or non-finite price or a non-finite
/// characteristic. Returns the number dropped.
pub fn drop_unusable(rows: &mut Vec<MarketRow>) -> usize {
    let before = rows.len();
    rows.retain(is_usable);
    let dropped = before - rows.len();
    if dropped > 0 {
        warn!(dropped, "Dropped products with invalid price or characteristics");
    }
    dropped
}
