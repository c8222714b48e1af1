//! Payment-transaction CSV reader.
//!
//! Bank and transfer-service exports vary in header casing and column order;
//! headers are normalized (lowercased, spaces to underscores) and the three
//! required columns are located by name. Extra columns are ignored. Rows
//! that fail to parse are reported, not silently coerced away.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use tiffinsight_core::{PaymentLedger, PaymentRecord};

use crate::dates::parse_flexible_date;

#[derive(Debug, Error)]
pub enum PaymentCsvError {
    #[error("could not open payments file `{path}`: {source}")]
    OpenFile { path: String, source: std::io::Error },
    #[error("payments CSV could not be read: {0}")]
    Csv(#[from] csv::Error),
    #[error("payments CSV is missing required column `{0}`")]
    MissingColumn(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "raw")]
pub enum PaymentRejectReason {
    BadDate(String),
    BadAmount(String),
    /// Row has fewer fields than the header row.
    ShortRow,
}

impl fmt::Display for PaymentRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentRejectReason::BadDate(raw) => write!(f, "unparseable date `{raw}`"),
            PaymentRejectReason::BadAmount(raw) => write!(f, "unparseable amount `{raw}`"),
            PaymentRejectReason::ShortRow => write!(f, "row is missing fields"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based data-row number (the header row is not counted).
    pub row_no: usize,
    pub reason: PaymentRejectReason,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentParseOutcome {
    pub records: Vec<PaymentRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl PaymentParseOutcome {
    pub fn into_ledger(self) -> PaymentLedger {
        PaymentLedger::new(self.records)
    }
}

/// Reads payment records from CSV data with `date`, `description`, and
/// `amount` columns in any order.
pub fn read_payments_csv<R: Read>(reader: R) -> Result<PaymentParseOutcome, PaymentCsvError> {
    let mut csv_reader =
        csv::ReaderBuilder::new().has_headers(true).flexible(true).trim(csv::Trim::All).from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_ascii_lowercase().replace(' ', "_"))
        .collect();
    let date_idx = column_index(&headers, "date")?;
    let description_idx = column_index(&headers, "description")?;
    let amount_idx = column_index(&headers, "amount")?;

    let mut outcome = PaymentParseOutcome::default();
    for (index, row) in csv_reader.records().enumerate() {
        let row_no = index + 1;
        let row = row?;

        let (Some(date_raw), Some(description), Some(amount_raw)) =
            (row.get(date_idx), row.get(description_idx), row.get(amount_idx))
        else {
            outcome.rejected.push(RejectedRow { row_no, reason: PaymentRejectReason::ShortRow });
            continue;
        };

        let Some(date) = parse_flexible_date(date_raw) else {
            outcome.rejected.push(RejectedRow {
                row_no,
                reason: PaymentRejectReason::BadDate(date_raw.to_string()),
            });
            continue;
        };

        let Ok(amount) = parse_amount(amount_raw) else {
            outcome.rejected.push(RejectedRow {
                row_no,
                reason: PaymentRejectReason::BadAmount(amount_raw.to_string()),
            });
            continue;
        };

        outcome.records.push(PaymentRecord {
            date,
            description: description.to_string(),
            amount,
        });
    }

    debug!(
        records = outcome.records.len(),
        rejected = outcome.rejected.len(),
        "parsed payments CSV"
    );
    Ok(outcome)
}

pub fn read_payments_file(path: &Path) -> Result<PaymentParseOutcome, PaymentCsvError> {
    let file = File::open(path).map_err(|source| PaymentCsvError::OpenFile {
        path: path.display().to_string(),
        source,
    })?;
    read_payments_csv(file)
}

fn column_index(headers: &[String], name: &'static str) -> Result<usize, PaymentCsvError> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or(PaymentCsvError::MissingColumn(name))
}

/// Accepts `12.50`, `$12.50`, and `1,250.00`.
fn parse_amount(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    Decimal::from_str(&cleaned)
}
