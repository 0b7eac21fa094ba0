//! Transaction file readers for offline analysis
//!
//! Two formats are accepted:
//! - JSON: an array of aggregator transaction objects
//! - CSV: header row with `date` and `amount` columns, optional `category`
//!   (`;`-separated hierarchy) and `name`

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{parse_date_prefix, Transaction};

/// Parse a JSON array of transactions
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    Ok(serde_json::from_reader(reader)?)
}

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Parse a CSV export of transactions
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_col = column(&headers, "date")
        .ok_or_else(|| Error::InvalidData("CSV is missing a date column".into()))?;
    let amount_col = column(&headers, "amount")
        .ok_or_else(|| Error::InvalidData("CSV is missing an amount column".into()))?;
    let category_col = column(&headers, "category");
    let name_col = column(&headers, "name");

    let mut transactions = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;

        let date_str = record.get(date_col).unwrap_or_default();
        let date = parse_date_prefix(date_str).map_err(|e| {
            Error::InvalidData(format!("Row {}: invalid date '{}': {}", line + 1, date_str, e))
        })?;

        let amount_str = record.get(amount_col).unwrap_or_default();
        let amount: f64 = amount_str.replace(['$', ','], "").parse().map_err(|_| {
            Error::InvalidData(format!("Row {}: invalid amount '{}'", line + 1, amount_str))
        })?;

        let category = category_col.and_then(|i| record.get(i)).map(|s| {
            s.split(';')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        });

        let name = name_col
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(String::from);

        transactions.push(Transaction {
            date,
            amount,
            category,
            name,
            transaction_id: None,
        });
    }

    debug!(count = transactions.len(), "Parsed CSV transactions");
    Ok(transactions)
}

/// Load transactions from a `.json` or `.csv` file
pub fn load_file(path: &Path) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => parse_json(file),
        Some("csv") => parse_csv(file),
        other => Err(Error::InvalidData(format!(
            "Unsupported transaction file type: {}",
            other.unwrap_or("(none)")
        ))),
    }
}
