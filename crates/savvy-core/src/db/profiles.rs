//! Profile operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::Profile;

impl Database {
    /// Stored profile for a user, `None` if they never saved one
    pub fn get_profile(&self, username: &str) -> Result<Option<Profile>> {
        let conn = self.conn()?;
        let profile = conn
            .query_row(
                r#"
                SELECT goal, full_name, income, target_savings_rate,
                       monthly_budget, savings_goal, savings_timeframe
                FROM profiles WHERE username = ?
                "#,
                params![username],
                |row| {
                    Ok(Profile {
                        goal: row.get(0)?,
                        full_name: row.get(1)?,
                        income: row.get(2)?,
                        target_savings_rate: row.get(3)?,
                        monthly_budget: row.get(4)?,
                        savings_goal: row.get(5)?,
                        savings_timeframe: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    /// Insert or replace a user's profile
    pub fn upsert_profile(&self, username: &str, profile: &Profile) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO profiles (username, goal, full_name, income, target_savings_rate,
                                  monthly_budget, savings_goal, savings_timeframe)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                goal = excluded.goal,
                full_name = excluded.full_name,
                income = excluded.income,
                target_savings_rate = excluded.target_savings_rate,
                monthly_budget = excluded.monthly_budget,
                savings_goal = excluded.savings_goal,
                savings_timeframe = excluded.savings_timeframe,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                username,
                profile.goal,
                profile.full_name,
                profile.income,
                profile.target_savings_rate,
                profile.monthly_budget,
                profile.savings_goal,
                profile.savings_timeframe,
            ],
        )?;
        Ok(())
    }
}
