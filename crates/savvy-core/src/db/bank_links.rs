//! Connected bank operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::BankLink;

impl Database {
    /// Store (or replace) the user's aggregator access token
    pub fn set_bank_link(
        &self,
        username: &str,
        access_token: &str,
        item_id: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO bank_links (username, access_token, item_id)
            VALUES (?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                access_token = excluded.access_token,
                item_id = excluded.item_id,
                linked_at = CURRENT_TIMESTAMP
            "#,
            params![username, access_token, item_id],
        )?;
        Ok(())
    }

    pub fn get_bank_link(&self, username: &str) -> Result<Option<BankLink>> {
        let conn = self.conn()?;
        let link = conn
            .query_row(
                "SELECT username, access_token, item_id, linked_at FROM bank_links WHERE username = ?",
                params![username],
                |row| {
                    let linked_at_str: String = row.get(3)?;
                    Ok(BankLink {
                        username: row.get(0)?,
                        access_token: row.get(1)?,
                        item_id: row.get(2)?,
                        linked_at: parse_datetime(&linked_at_str),
                    })
                },
            )
            .optional()?;
        Ok(link)
    }

    /// Remove the user's link; returns whether one existed
    pub fn delete_bank_link(&self, username: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM bank_links WHERE username = ?",
            params![username],
        )?;
        Ok(removed > 0)
    }
}
