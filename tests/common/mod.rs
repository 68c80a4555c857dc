//! Shared fixtures for the integration tests: a small two-year vehicle
//! market written as CSV files, a run configuration pointing at them, and a
//! deterministic stub estimator.
#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use demand_compare::{
    estimation::{
        DemandEstimator, Estimates, EstimationError, EstimationResult, Formulation, ParamEstimate,
    },
    market::MarketTable,
    orchestrator::RunConfig,
};

pub const COUNTIES: [&str; 2] = ["Fairfield", "New Haven"];
pub const YEARS: [i32; 2] = [2019, 2020];

/// (make, model, fuel, range_elec, combined, msrp, log_hp_wt, wheelbase, doors, drive, body)
type Product = (
    &'static str,
    &'static str,
    &'static str,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
    &'static str,
    &'static str,
);

pub const PRODUCTS: [Product; 10] = [
    ("Honda", "Civic", "gasoline", 0.0, 36.0, 24_000.0, -2.95, 107.7, 4.0, "FWD", "Sedan"),
    ("Honda", "Accord", "hybrid", 0.0, 48.0, 31_000.0, -2.80, 111.4, 4.0, "FWD", "Sedan"),
    ("Honda", "CR-V", "gasoline", 0.0, 30.0, 29_500.0, -2.90, 104.8, 4.0, "AWD", "SUV"),
    ("Honda", "Fit", "gasoline", 0.0, 33.0, 17_500.0, -3.05, 99.6, 4.0, "FWD", "Hatchback"),
    ("Honda", "Pilot", "gasoline", 0.0, 22.0, 38_000.0, -2.70, 111.0, 4.0, "AWD", "SUV"),
    ("Toyota", "Camry", "gasoline", 0.0, 32.0, 27_500.0, -2.85, 111.2, 4.0, "AWD", "Sedan"),
    ("Toyota", "Corolla", "gasoline", 0.0, 35.0, 21_000.0, -3.00, 106.3, 4.0, "FWD", "Sedan"),
    ("Toyota", "RAV4", "hybrid", 0.0, 40.0, 32_500.0, -2.75, 105.9, 4.0, "AWD", "SUV"),
    ("Toyota", "Prius", "hybrid", 0.0, 52.0, 26_000.0, -3.10, 106.3, 4.0, "FWD", "Hatchback"),
    ("Smart", "Fortwo", "electric", 58.0, 108.0, 25_000.0, -3.20, 73.7, 2.0, "FWD", "Hatchback"),
];

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).expect("fixture write");
}

fn registration_csv() -> String {
    let mut out = String::from(
        "model_year,make,model,trim,fuel,range_elec,veh_count,county_name,combined,\
         report_year_month,msrp,log_hp_wt,wheelbase,doors,drive_type,body_type\n",
    );
    for (y, year) in YEARS.iter().enumerate() {
        for (c, county) in COUNTIES.iter().enumerate() {
            for (p, (make, model, fuel, range, combined, msrp, hp, wb, doors, drive, body)) in
                PRODUCTS.iter().enumerate()
            {
                // one zero count so zero-share replacement is exercised
                let count = if *model == "Fortwo" && c == 1 && y == 1 {
                    0.0
                } else {
                    (100 + 37 * p + 11 * c + 5 * y) as f64
                };
                let price = msrp + 400.0 * y as f64 + 75.0 * c as f64;
                out.push_str(&format!(
                    "{year},{make},{model},Base,{fuel},{range},{count},{county},{combined},\
                     {year}06,{price},{hp},{wb},{doors},{drive},{body}\n"
                ));
            }
        }
    }
    out
}

fn reference_csv() -> String {
    let mut out = String::from(
        "model_year,make,model,trim,fuel,range_elec,sales,msrp,dollar_per_mile,log_hp_weight,\
         wheelbase,doors,drivetype,bodytype\n",
    );
    for (y, year) in YEARS.iter().enumerate() {
        for (p, (make, model, fuel, range, combined, msrp, hp, wb, doors, drive, body)) in
            PRODUCTS.iter().enumerate()
        {
            let sales = (5_000 + 613 * p + 150 * y) as f64;
            let dpm = 3.0 / combined + 0.002 * y as f64;
            let price = msrp + 350.0 * y as f64;
            out.push_str(&format!(
                "{year},{make},{model},Base,{fuel},{range},{sales},{price},{dpm},{hp},{wb},\
                 {doors},{drive},{body}\n"
            ));
        }
    }
    out
}

/// Write every input CSV under `dir`. `county_households` lists the counties
/// that get a household row.
pub fn write_inputs(dir: &Path, county_households: &[&str]) {
    fs::create_dir_all(dir).expect("inputs dir");
    write(&dir.join("registration.csv"), &registration_csv());
    write(&dir.join("reference.csv"), &reference_csv());
    write(
        &dir.join("gas.csv"),
        "year,month,gas_price_21\n2019,6,3.05\n2020,6,2.40\n",
    );
    write(
        &dir.join("diesel.csv"),
        "year,month,diesel_price_21\n2019,6,3.40\n2020,6,2.75\n",
    );
    write(
        &dir.join("electricity.csv"),
        "year,electricity_price_21\n2019,0.21\n2020,0.22\n",
    );
    write(
        &dir.join("hh_year.csv"),
        "year,households\n2019,1400000\n2020,1410000\n",
    );
    let mut by_county = String::from("county_name,year,households\n");
    for county in county_households {
        for year in YEARS {
            by_county.push_str(&format!("{county},{year},350000\n"));
        }
    }
    write(&dir.join("hh_county.csv"), &by_county);
    write(
        &dir.join("brands.csv"),
        "make,oem\nHonda,Honda Motor\nToyota,Toyota Motor\nSmart,Mercedes-Benz Group\n",
    );
}

/// Run configuration over the fixture inputs with results under `root`.
pub fn config(root: &Path, extra: &str) -> RunConfig {
    let inputs = root.join("inputs");
    let p = |name: &str| inputs.join(name).display().to_string();
    let text = format!(
        r#"
description = "fixture comparison"
output_root = '{out}'
data_root = '{data}'
specifications = [1, 2]
{extra}

[inputs]
reference = '{reference}'
registration = '{registration}'
gas_prices = '{gas}'
diesel_prices = '{diesel}'
electricity_prices = '{electricity}'
households_by_year = '{hh_year}'
households_by_county = '{hh_county}'
brand_mapping = '{brands}'

[preparation]
make_removal = "final"
makes_to_remove = ["Smart"]
"#,
        out = root.join("outputs").display(),
        data = root.join("data").display(),
        reference = p("reference.csv"),
        registration = p("registration.csv"),
        gas = p("gas.csv"),
        diesel = p("diesel.csv"),
        electricity = p("electricity.csv"),
        hh_year = p("hh_year.csv"),
        hh_county = p("hh_county.csv"),
        brands = p("brands.csv"),
    );
    RunConfig::from_toml_str(&text).expect("fixture config parses")
}

/// Fixture inputs plus configuration in a fresh temp dir.
pub fn setup(extra: &str) -> (tempfile::TempDir, RunConfig) {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_inputs(&tmp.path().join("inputs"), &COUNTIES);
    let cfg = config(tmp.path(), extra);
    (tmp, cfg)
}

/// Returns one estimate per covariate, `value = -0.1 · position`. Fails on
/// any table made only of `fail_year` rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubEstimator {
    pub fail_year: Option<i32>,
}

impl DemandEstimator for StubEstimator {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn estimate(
        &self, formulation: &Formulation, table: &MarketTable,
    ) -> EstimationResult<Estimates> {
        if let Some(year) = self.fail_year {
            if table.rows.iter().all(|r| r.model_year == year) {
                let status = "stub".to_string();
                return Err(EstimationError::NonConvergence { iterations: 0, status });
            }
        }
        Ok(formulation
            .covariates
            .iter()
            .enumerate()
            .map(|(i, name)| ParamEstimate {
                name: name.clone(),
                value: -0.1 * (i + 1) as f64,
                se: 0.01,
            })
            .collect())
    }
}

/// Values of one named column of a CSV file.
pub fn column(path: &Path, name: &str) -> Vec<String> {
    let mut reader = csv::Reader::from_path(path).expect("readable csv");
    let idx = reader
        .headers()
        .expect("header")
        .iter()
        .position(|h| h == name)
        .expect("column present");
    reader.records().map(|r| r.expect("record")[idx].to_string()).collect()
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> =
        fs::read_dir(dir).expect("dir").map(|e| e.expect("entry").path()).collect();
    files.sort();
    files
}
