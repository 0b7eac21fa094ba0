//! Manual financial entry operations

use rusqlite::{params, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{ExpenseBreakdown, FinancialEntry, NewFinancialEntry};

const ENTRY_COLUMNS: &str =
    "id, username, income, expenses, expense_breakdown, notes, created_at";

fn entry_from_row(row: &Row) -> rusqlite::Result<FinancialEntry> {
    let breakdown_json: Option<String> = row.get(4)?;
    let created_at_str: String = row.get(6)?;

    Ok(FinancialEntry {
        id: row.get(0)?,
        username: row.get(1)?,
        income: row.get(2)?,
        expenses: row.get(3)?,
        expense_breakdown: breakdown_json
            .and_then(|json| serde_json::from_str::<ExpenseBreakdown>(&json).ok()),
        notes: row.get(5)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Store a validated manual entry and return its ID
    pub fn insert_financial_entry(&self, username: &str, entry: &NewFinancialEntry) -> Result<i64> {
        entry.validate()?;
        let breakdown = entry
            .expense_breakdown
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO financial_data (username, income, expenses, expense_breakdown, notes)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![username, entry.income, entry.expenses, breakdown, entry.notes],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Latest entries for a user, newest first
    pub fn recent_financial_entries(&self, username: &str, limit: i64) -> Result<Vec<FinancialEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM financial_data WHERE username = ? ORDER BY created_at DESC, id DESC LIMIT ?",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map(params![username, limit], entry_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// All entries for a user, oldest first
    pub fn list_financial_entries(&self, username: &str) -> Result<Vec<FinancialEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM financial_data WHERE username = ? ORDER BY created_at, id",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map(params![username], entry_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
