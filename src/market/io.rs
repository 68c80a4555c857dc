//! CSV reading and writing for panels, auxiliary tables, and results.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{de::DeserializeOwned, Serialize};

use crate::market::{
    errors::{DataError, DataResult},
    table::{MarketRow, MarketTable},
};

/// Fixed leading columns of a prepared market table; instrument columns
/// follow.
pub const MARKET_TABLE_COLUMNS: [&str; 26] = [
    "market_ids",
    "product_ids",
    "firm_ids",
    "make",
    "model",
    "model_year",
    "trim",
    "fuel",
    "county_name",
    "prices",
    "quantity",
    "market_size",
    "shares",
    "outside_share",
    "time_trend",
    "dollar_per_mile",
    "electric",
    "phev",
    "hybrid",
    "diesel",
    "log_hp_weight",
    "wheelbase",
    "doors",
    "range_elec",
    "drivetype",
    "bodytype",
];

/// Deserialize every record of a headed CSV file, trimming whitespace.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> DataResult<Vec<T>> {
    let file = File::open(path)
        .map_err(|e| DataError::Io { path: path.to_path_buf(), message: e.to_string() })?;
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);
    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(i, rec)| {
            rec.map_err(|e| DataError::Csv {
                path: path.to_path_buf(),
                message: format!("record {}: {e}", i + 1),
            })
        })
        .collect()
}

/// Write serializable records (e.g. comparison results) with a header row.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> DataResult<()> {
    let mut writer = WriterBuilder::new().from_path(path).map_err(|e| DataError::csv(path, e))?;
    for rec in records {
        writer.serialize(rec).map_err(|e| DataError::csv(path, e))?;
    }
    writer
        .flush()
        .map_err(|e| DataError::Io { path: path.to_path_buf(), message: e.to_string() })
}

pub fn write_market_table(path: &Path, table: &MarketTable) -> DataResult<()> {
    let file = File::create(path)
        .map_err(|e| DataError::Io { path: path.to_path_buf(), message: e.to_string() })?;
    write_market_table_to(file, table).map_err(|e| DataError::csv(path, e))
}

/// Serialize a prepared table to any writer. Output is a pure function of
/// the table contents.
pub fn write_market_table_to<W: Write>(sink: W, table: &MarketTable) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().from_writer(sink);
    let mut header: Vec<String> = MARKET_TABLE_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(table.instrument_names());
    writer.write_record(&header)?;
    for row in &table.rows {
        writer.write_record(market_row_fields(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn market_row_fields(row: &MarketRow) -> Vec<String> {
    let mut fields = vec![
        row.market_ids.clone(),
        row.product_ids.clone(),
        row.firm_ids.clone(),
        row.make.clone(),
        row.model.clone(),
        row.model_year.to_string(),
        row.trim.clone(),
        row.fuel.clone(),
        row.county_name.clone().unwrap_or_default(),
    ];
    fields.extend(
        [
            row.prices,
            row.quantity,
            row.market_size,
            row.shares,
            row.outside_share,
            row.time_trend,
            row.dollar_per_mile,
            row.electric,
            row.phev,
            row.hybrid,
            row.diesel,
            row.log_hp_weight,
            row.wheelbase,
            row.doors,
            row.range_elec,
        ]
        .iter()
        .map(|v| v.to_string()),
    );
    fields.push(row.drivetype.clone());
    fields.push(row.bodytype.clone());
    fields.extend(row.demand_instruments.iter().map(|v| v.to_string()));
    fields
}
