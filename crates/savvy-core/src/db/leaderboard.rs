//! Leaderboard operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{LeaderboardEntry, RankedEntry};
use crate::scoring::Page;

fn entry_from_row(row: &Row) -> rusqlite::Result<LeaderboardEntry> {
    let created_at_str: String = row.get(4)?;
    Ok(LeaderboardEntry {
        id: row.get(0)?,
        username: row.get(1)?,
        score: row.get(2)?,
        savings: row.get(3)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Append a score submission
    pub fn insert_leaderboard_entry(
        &self,
        username: &str,
        score: i64,
        savings: Option<f64>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO leaderboard_entries (username, score, savings) VALUES (?, ?, ?)",
            params![username, score, savings],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// One page of the leaderboard, highest score first
    ///
    /// Equal scores keep submission order.
    pub fn leaderboard(&self, page: Page) -> Result<Vec<RankedEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, username, score, savings, created_at
            FROM leaderboard_entries
            ORDER BY score DESC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )?;

        let offset = page.offset();
        let entries = stmt
            .query_map(params![page.limit, offset], entry_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| RankedEntry {
                rank: offset.saturating_add(i as i64 + 1),
                entry,
            })
            .collect())
    }

    /// The user's most recent submission, if any
    pub fn latest_leaderboard_entry(&self, username: &str) -> Result<Option<LeaderboardEntry>> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                r#"
                SELECT id, username, score, savings, created_at
                FROM leaderboard_entries
                WHERE username = ?
                ORDER BY created_at DESC, id DESC
                LIMIT 1
                "#,
                params![username],
                entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }
}
