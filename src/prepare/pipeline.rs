//! Preparation pipelines for the reference and registration panels.
use tracing::{debug, info};

use crate::{
    market::{
        AuxiliaryTables, MarketDefinition, MarketRow, MarketTable, ReferenceRow, RegistrationRow,
        VehicleRecord,
    },
    prepare::{
        characteristics::{assign_time_trend, drop_unusable, FuelDummies},
        energy::finalize_registration,
        errors::{PrepareError, PrepareResult},
        identifiers::{group_products, ProductRecord},
        instruments::attach_instruments,
        merge::{firm_ids, market_sizes},
        options::{MakeRemoval, PrepareOptions},
        shares::{assign_outside_shares, assign_shares},
        zms::replace_zero_counts,
    },
};

/// Prepare the survey reference panel. Reference markets are always model
/// years, so `opts.market_definition` is not consulted.
pub fn prepare_reference(
    rows: Vec<ReferenceRow>, aux: &AuxiliaryTables, opts: &PrepareOptions,
) -> PrepareResult<MarketTable> {
    let records = rows.into_iter().map(VehicleRecord::from).collect();
    prepare_records(records, aux, opts, MarketDefinition::ModelYear)
}

/// Prepare the registration panel: finalize energy prices, then run the
/// common steps with `opts.market_definition`.
pub fn prepare_registration(
    rows: Vec<RegistrationRow>, aux: &AuxiliaryTables, opts: &PrepareOptions,
) -> PrepareResult<MarketTable> {
    let records = finalize_registration(rows, &aux.energy)?;
    prepare_records(records, aux, opts, opts.market_definition)
}

fn remove_makes<T>(items: &mut Vec<T>, opts: &PrepareOptions, make: impl Fn(&T) -> &str) -> usize {
    let before = items.len();
    items.retain(|item| !opts.is_make_removed(make(item)));
    before - items.len()
}

fn non_empty<T>(items: &[T], stage: &'static str) -> PrepareResult<()> {
    if items.is_empty() {
        return Err(PrepareError::EmptyPanel { stage });
    }
    Ok(())
}

fn to_market_row(product: ProductRecord, firm_id: String, market_size: f64) -> MarketRow {
    let ProductRecord { market_id, product_id, vehicle: v } = product;
    let fuel = FuelDummies::from_label(&v.fuel);
    MarketRow {
        market_ids: market_id,
        product_ids: product_id,
        firm_ids: firm_id,
        make: v.make,
        model: v.model,
        model_year: v.model_year,
        trim: v.trim,
        fuel: v.fuel,
        county_name: v.county,
        prices: v.price,
        quantity: v.count,
        market_size,
        shares: 0.0,
        outside_share: 0.0,
        time_trend: 0.0,
        dollar_per_mile: v.dollar_per_mile,
        electric: fuel.electric,
        phev: fuel.phev,
        hybrid: fuel.hybrid,
        diesel: fuel.diesel,
        log_hp_weight: v.log_hp_weight,
        wheelbase: v.wheelbase,
        doors: v.doors,
        range_elec: v.range_elec,
        drivetype: v.drivetype,
        bodytype: v.bodytype,
        demand_instruments: Vec::new(),
    }
}

fn prepare_records(
    mut records: Vec<VehicleRecord>, aux: &AuxiliaryTables, opts: &PrepareOptions,
    definition: MarketDefinition,
) -> PrepareResult<MarketTable> {
    if opts.make_removal == MakeRemoval::Initial {
        let removed = remove_makes(&mut records, opts, |r| r.make.as_str());
        debug!(removed, "Removed excluded makes before preparation");
    }

    records.retain(|r| !opts.is_year_excluded(r.model_year));
    non_empty(&records, "model-year filter")?;

    let replaced = replace_zero_counts(&mut records, opts.zms_replaced_with());
    debug!(replaced, zms = opts.zms_replaced_with(), "Replaced zero counts");

    let products = group_products(records, definition);
    let sizes = market_sizes(&products, aux, definition)?;
    let firms = firm_ids(&products, &aux.brand_mapping)?;

    let mut rows: Vec<MarketRow> = products
        .into_iter()
        .zip(firms)
        .zip(sizes)
        .map(|((product, firm), size)| to_market_row(product, firm, size))
        .collect();

    drop_unusable(&mut rows);
    non_empty(&rows, "cleaning")?;
    assign_time_trend(&mut rows);
    assign_shares(&mut rows)?;
    assign_outside_shares(&mut rows)?;

    rows.sort_by(|a, b| {
        a.market_ids.cmp(&b.market_ids).then_with(|| a.product_ids.cmp(&b.product_ids))
    });
    let mut table = MarketTable::new(definition, 0, rows);
    attach_instruments(&mut table);

    if opts.make_removal == MakeRemoval::Final {
        let removed = remove_makes(&mut table.rows, opts, |r| r.make.as_str());
        debug!(removed, "Removed excluded makes after instruments");
        non_empty(&table.rows, "make removal")?;
        // Removed products' share mass moves to the outside good.
        assign_outside_shares(&mut table.rows)?;
    }

    info!(
        rows = table.len(),
        markets = table.market_ranges().len(),
        definition = %definition,
        "Prepared market table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{BrandMapping, HouseholdsByCounty, HouseholdsByYear};
    use crate::prepare::energy::tests::{energy_2019, registration_row};

    fn county_households(county_name: &str, households: f64) -> HouseholdsByCounty {
        HouseholdsByCounty { county_name: county_name.into(), year: 2019, households }
    }

    fn aux() -> AuxiliaryTables {
        AuxiliaryTables {
            households_by_year: vec![HouseholdsByYear { year: 2019, households: 1000.0 }],
            households_by_county: vec![
                county_households("Hartford", 400.0),
                county_households("New Haven", 600.0),
            ],
            brand_mapping: vec![
                BrandMapping { make: "Honda".into(), oem: "Honda".into() },
                BrandMapping { make: "Acura".into(), oem: "Honda".into() },
                BrandMapping { make: "Smart".into(), oem: "Mercedes".into() },
            ],
            energy: energy_2019(),
        }
    }

    fn reference_row(make: &str, model: &str, sales: f64) -> ReferenceRow {
        ReferenceRow {
            model_year: 2019,
            make: make.to_string(),
            model: model.to_string(),
            trim: "Base".to_string(),
            fuel: "gasoline".to_string(),
            range_elec: 0.0,
            sales,
            msrp: 30_000.0,
            dollar_per_mile: 0.1,
            log_hp_weight: -3.0,
            wheelbase: 105.0,
            doors: 4.0,
            drivetype: "FWD".to_string(),
            bodytype: "Sedan".to_string(),
        }
    }

    fn county_opts(removal: MakeRemoval) -> PrepareOptions {
        PrepareOptions::registration(MarketDefinition::CountyModelYear, removal)
    }

    #[test]
    // Purpose
    // -------
    // The toy registration panel: two counties, one model year, one zero
    // count.
    //
    // Given
    // -----
    // - Hartford: Honda (count 0); New Haven: Honda (count 60) and Acura
    //   (count 30).
    //
    // Expect
    // ------
    // - The zero row's share is zms / households = 0.001 / 400.
    // - Exactly one row per (market, product), sorted by market.
    // - Shares in [0, 1] and outside = 1 − Σ shares in (0, 1).
    fn toy_registration_panel_replaces_zero_share() {
        // Arrange
        let rows = vec![
            registration_row("Hartford", "Honda", "gasoline", 0.0),
            registration_row("New Haven", "Honda", "gasoline", 60.0),
            registration_row("New Haven", "Acura", "gasoline", 30.0),
        ];

        // Act
        let table = prepare_registration(rows, &aux(), &county_opts(MakeRemoval::Final))
            .expect("toy panel is valid");

        // Assert
        assert_eq!(table.len(), 3);
        let hartford = &table.rows[0];
        assert_eq!(hartford.market_ids, "Hartford_2019");
        assert!((hartford.shares - 0.001 / 400.0).abs() < 1e-15);
        let mut keys: Vec<(&str, &str)> =
            table.rows.iter().map(|r| (r.market_ids.as_str(), r.product_ids.as_str())).collect();
        keys.dedup();
        assert_eq!(keys.len(), 3);
        for range in table.market_ranges() {
            let market = &table.rows[range];
            let inside: f64 = market.iter().map(|r| r.shares).sum();
            for r in market {
                assert!((0.0..=1.0).contains(&r.shares));
                assert!((r.outside_share - (1.0 - inside)).abs() < 1e-12);
                assert!(r.outside_share > 0.0 && r.outside_share < 1.0);
            }
        }
        assert_eq!(table.n_instruments, 12);
    }

    #[test]
    // Purpose
    // -------
    // Removed makes leave no rows, and the removal ordering decides whether
    // they still act as rivals.
    //
    // Given
    // -----
    // - Reference panel with Honda, Acura (same firm) and Smart (rival).
    // - Smart removed, once Initial and once Final.
    //
    // Expect
    // ------
    // - No Smart rows either way.
    // - Honda's rival product count is 1 under Final and 0 under Initial.
    // - Under Final the outside share absorbs Smart's share.
    fn make_removal_ordering_changes_rival_instruments() {
        // Arrange
        let rows = vec![
            reference_row("Honda", "Civic", 100.0),
            reference_row("Acura", "ILX", 50.0),
            reference_row("Smart", "Fortwo", 10.0),
        ];
        let base = |removal| {
            PrepareOptions::reference(removal).with_makes_to_remove(vec!["Smart".to_string()])
        };

        // Act
        let initial = prepare_reference(rows.clone(), &aux(), &base(MakeRemoval::Initial))
            .expect("valid panel");
        let fin = prepare_reference(rows, &aux(), &base(MakeRemoval::Final)).expect("valid panel");

        // Assert
        for table in [&initial, &fin] {
            assert_eq!(table.len(), 2);
            assert!(table.rows.iter().all(|r| r.make != "Smart"));
        }
        let honda = |t: &MarketTable| {
            t.rows.iter().find(|r| r.make == "Honda").cloned().expect("Honda present")
        };
        assert_eq!(honda(&initial).demand_instruments[6], 0.0);
        assert_eq!(honda(&fin).demand_instruments[6], 1.0);
        assert_eq!(honda(&fin).demand_instruments[0], 1.0);
        assert_ne!(honda(&initial).demand_instruments, honda(&fin).demand_instruments);
        assert!((honda(&fin).outside_share - 0.85).abs() < 1e-12);
        assert!((honda(&initial).outside_share - 0.85).abs() < 1e-12);
    }

    #[test]
    fn missing_county_households_is_fatal() {
        let mut tables = aux();
        tables.households_by_county.retain(|h| h.county_name != "New Haven");
        let rows = vec![registration_row("New Haven", "Honda", "gasoline", 5.0)];

        let err = prepare_registration(rows, &tables, &county_opts(MakeRemoval::Initial))
            .expect_err("New Haven has no household row");

        assert_eq!(
            err,
            PrepareError::UnmatchedKey {
                table: "households_by_county",
                key: "New Haven_2019".to_string()
            }
        );
    }

    #[test]
    fn excluded_years_can_empty_the_panel() {
        let rows = vec![registration_row("Hartford", "Honda", "gasoline", 5.0)];
        let opts = county_opts(MakeRemoval::Initial).with_year_to_drop(Some(2019));

        let err = prepare_registration(rows, &aux(), &opts).expect_err("only year dropped");

        assert_eq!(err, PrepareError::EmptyPanel { stage: "model-year filter" });
    }
}
