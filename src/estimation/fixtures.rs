//! Noiseless synthetic markets shared by the estimator tests.
use crate::{
    estimation::specification::{Formulation, Specification},
    market::{MarketDefinition, MarketRow, MarketTable},
    prepare::instruments::attach_instruments,
};

pub(crate) const TRUE_PRICE: f64 = -0.08;
pub(crate) const TRUE_MAKE: [(&str, f64); 3] =
    [("Acura", -1.0), ("Buick", -1.5), ("Chevrolet", -0.5)];
pub(crate) const TRUE_FWD: f64 = 0.3;
pub(crate) const TRUE_SEDAN: f64 = -0.2;

const MARKET_SIZE: f64 = 100_000.0;

/// Six model-year markets of eight products whose shares are generated
/// exactly by the logit model
/// `δ = β_p·price + C(make) + C(drivetype)[T.FWD] + C(bodytype)[T.Sedan]`.
pub(crate) fn synthetic_table() -> MarketTable {
    let mut rows = Vec::new();
    for m in 0..6usize {
        let year = 2015 + m as i32;
        let mut market: Vec<MarketRow> = (0..8usize)
            .map(|k| {
                let (make, make_fe) = TRUE_MAKE[k % 3];
                let fwd = (k + m) % 2 == 1;
                let sedan = (k / 2 + m) % 2 == 1;
                let price = 20.0 + ((k * 7 + m * 3) % 11) as f64 * 1.5 + 0.1 * k as f64;
                let delta = TRUE_PRICE * price
                    + make_fe
                    + if fwd { TRUE_FWD } else { 0.0 }
                    + if sedan { TRUE_SEDAN } else { 0.0 };
                MarketRow {
                    market_ids: year.to_string(),
                    product_ids: format!("P{k}"),
                    firm_ids: make.to_string(),
                    make: make.to_string(),
                    model: format!("M{k}"),
                    model_year: year,
                    trim: "Base".to_string(),
                    fuel: "gasoline".to_string(),
                    county_name: None,
                    prices: price,
                    quantity: 0.0,
                    market_size: MARKET_SIZE,
                    // Holds δ until shares are computed below.
                    shares: delta,
                    outside_share: 0.0,
                    time_trend: m as f64,
                    dollar_per_mile: 0.05 + 0.01 * ((k * 5 + m) % 7) as f64,
                    electric: 0.0,
                    phev: 0.0,
                    hybrid: 0.0,
                    diesel: 0.0,
                    log_hp_weight: -3.0 + 0.1 * ((k * 3 + m * 2) % 5) as f64,
                    wheelbase: 100.0 + ((k * 11 + m) % 13) as f64,
                    doors: 2.0 + 2.0 * (k % 2) as f64,
                    range_elec: 0.0,
                    drivetype: if fwd { "FWD" } else { "AWD" }.to_string(),
                    bodytype: if sedan { "Sedan" } else { "SUV" }.to_string(),
                    demand_instruments: Vec::new(),
                }
            })
            .collect();

        let denom = 1.0 + market.iter().map(|r| r.shares.exp()).sum::<f64>();
        for r in market.iter_mut() {
            r.shares = r.shares.exp() / denom;
            r.quantity = r.shares * MARKET_SIZE;
            r.outside_share = 1.0 / denom;
        }
        rows.extend(market);
    }
    let mut table = MarketTable::new(MarketDefinition::ModelYear, 0, rows);
    attach_instruments(&mut table);
    table
}

/// `(name, value)` pairs of the data-generating coefficients, named the way
/// the logit design names them.
pub(crate) fn true_coefficients() -> Vec<(String, f64)> {
    let mut out = vec![("prices".to_string(), TRUE_PRICE)];
    out.extend(TRUE_MAKE.iter().map(|(make, v)| (format!("C(make)[{make}]"), *v)));
    out.push(("C(drivetype)[T.FWD]".to_string(), TRUE_FWD));
    out.push(("C(bodytype)[T.Sedan]".to_string(), TRUE_SEDAN));
    out
}

/// Model-year formulation of specification `index`.
pub(crate) fn model_year_formulation(index: usize) -> Formulation {
    Formulation::new(Specification::new(index).expect("valid index"), MarketDefinition::ModelYear)
}
