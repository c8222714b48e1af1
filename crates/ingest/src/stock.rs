//! Stock-level CSV reader.
//!
//! Loads an `item,stock_qty` export into a [`TableStock`] so that low-stock
//! flagging runs against real counts instead of the flat stand-in. Unlike the
//! ledger readers this one is strict: a stock sheet is small and hand-kept,
//! so a bad row is an error rather than a reject to report.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use tiffinsight_core::TableStock;

#[derive(Debug, Error)]
pub enum StockCsvError {
    #[error("could not open stock file `{path}`: {source}")]
    OpenFile { path: String, source: std::io::Error },
    #[error("stock CSV could not be read: {0}")]
    Csv(#[from] csv::Error),
    #[error("stock CSV is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("stock CSV row {row_no}: unparseable quantity `{raw}`")]
    BadQuantity { row_no: usize, raw: String },
    #[error("stock CSV row {row_no}: empty item name")]
    EmptyItem { row_no: usize },
}

/// Reads stock levels from CSV data with `item` and `stock_qty` columns in
/// any order. Later rows win when an item repeats.
pub fn read_stock_csv<R: Read>(reader: R) -> Result<TableStock, StockCsvError> {
    let mut csv_reader =
        csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_ascii_lowercase().replace(' ', "_"))
        .collect();
    let item_idx = column_index(&headers, "item")?;
    let qty_idx = column_index(&headers, "stock_qty")?;

    let mut levels = BTreeMap::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row_no = index + 1;
        let row = row?;

        let item = row.get(item_idx).unwrap_or_default().trim();
        if item.is_empty() {
            return Err(StockCsvError::EmptyItem { row_no });
        }
        let qty_raw = row.get(qty_idx).unwrap_or_default().trim();
        let qty: u32 = qty_raw.parse().map_err(|_| StockCsvError::BadQuantity {
            row_no,
            raw: qty_raw.to_string(),
        })?;

        levels.insert(item.to_string(), qty);
    }

    debug!(items = levels.len(), "loaded stock CSV");
    Ok(TableStock::new(levels))
}

pub fn read_stock_file(path: &Path) -> Result<TableStock, StockCsvError> {
    let file = File::open(path).map_err(|source| StockCsvError::OpenFile {
        path: path.display().to_string(),
        source,
    })?;
    read_stock_csv(file)
}

fn column_index(headers: &[String], name: &'static str) -> Result<usize, StockCsvError> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or(StockCsvError::MissingColumn(name))
}
