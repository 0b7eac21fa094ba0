//! Domain models for Savvy

use chrono::{DateTime, NaiveDate, ParseResult, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Category label used when a transaction carries no category
pub const DEFAULT_CATEGORY: &str = "Other";

/// Savings rate target applied to profiles that never set one
pub const DEFAULT_TARGET_SAVINGS_RATE: f64 = 20.0;

/// A bank ledger entry as supplied by the aggregator
///
/// Amounts follow the aggregator's sign convention: positive is money
/// leaving the account (expense), negative is money coming in (income).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Calendar day; any time-of-day suffix upstream is ignored
    #[serde(deserialize_with = "deserialize_date_prefix")]
    pub date: NaiveDate,
    pub amount: f64,
    /// Category hierarchy, most general first. May be null upstream.
    #[serde(default)]
    pub category: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Parse the leading `YYYY-MM-DD` of a date or datetime string
pub fn parse_date_prefix(value: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_and_remainder(value.trim_start(), "%Y-%m-%d").map(|(date, _)| date)
}

fn deserialize_date_prefix<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date_prefix(&raw)
        .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))
}

impl Transaction {
    pub fn new(date: NaiveDate, amount: f64, category: &[&str]) -> Self {
        Self {
            date,
            amount,
            category: Some(category.iter().map(|c| c.to_string()).collect()),
            name: None,
            transaction_id: None,
        }
    }

    /// Primary category label, falling back to "Other"
    pub fn primary_category(&self) -> &str {
        self.category
            .as_ref()
            .and_then(|c| c.first())
            .map(String::as_str)
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Whether this transaction is money coming in
    pub fn is_income(&self) -> bool {
        self.amount < 0.0
    }

    /// Month key in `YYYY-MM` form
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

/// Optional per-category split of a manual expense figure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBreakdown {
    pub housing: Option<f64>,
    pub utilities: Option<f64>,
    pub food: Option<f64>,
    pub transportation: Option<f64>,
    pub healthcare: Option<f64>,
    pub entertainment: Option<f64>,
    pub other: Option<f64>,
}

/// Manual income/expense submission (before persistence)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinancialEntry {
    pub income: f64,
    pub expenses: f64,
    #[serde(default)]
    pub expense_breakdown: Option<ExpenseBreakdown>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewFinancialEntry {
    /// Reject non-finite figures
    pub fn validate(&self) -> crate::Result<()> {
        if !self.income.is_finite() || !self.expenses.is_finite() {
            return Err(crate::Error::InvalidData(
                "Income and expenses must be numbers".to_string(),
            ));
        }
        Ok(())
    }
}

/// A persisted manual income/expense submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEntry {
    pub id: i64,
    pub username: String,
    pub income: f64,
    pub expenses: f64,
    pub expense_breakdown: Option<ExpenseBreakdown>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One score submission on the leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: i64,
    pub username: String,
    pub score: i64,
    /// Savings rate percentage, present when the score came from financial data
    pub savings: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Leaderboard entry with its absolute position
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: i64,
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
}

/// User profile and savings goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub goal: String,
    pub full_name: String,
    pub income: Option<f64>,
    pub target_savings_rate: f64,
    pub monthly_budget: Option<f64>,
    pub savings_goal: Option<f64>,
    /// Months to reach the savings goal
    pub savings_timeframe: Option<f64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            goal: String::new(),
            full_name: String::new(),
            income: None,
            target_savings_rate: DEFAULT_TARGET_SAVINGS_RATE,
            monthly_budget: None,
            savings_goal: None,
            savings_timeframe: None,
        }
    }
}

/// Partial profile update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub goal: Option<String>,
    pub full_name: Option<String>,
    pub income: Option<f64>,
    pub target_savings_rate: Option<f64>,
    pub monthly_budget: Option<f64>,
    pub savings_goal: Option<f64>,
    pub savings_timeframe: Option<f64>,
}

impl Profile {
    /// Apply an update on top of this profile
    pub fn merge(mut self, update: ProfileUpdate) -> Self {
        if let Some(goal) = update.goal {
            self.goal = goal;
        }
        if let Some(full_name) = update.full_name {
            self.full_name = full_name;
        }
        if let Some(rate) = update.target_savings_rate {
            self.target_savings_rate = rate;
        }
        self.income = update.income.or(self.income);
        self.monthly_budget = update.monthly_budget.or(self.monthly_budget);
        self.savings_goal = update.savings_goal.or(self.savings_goal);
        self.savings_timeframe = update.savings_timeframe.or(self.savings_timeframe);
        self
    }
}

/// Stored aggregator credentials for a user's connected bank
#[derive(Debug, Clone)]
pub struct BankLink {
    pub username: String,
    pub access_token: String,
    pub item_id: Option<String>,
    pub linked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_category_fallback() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        let tx = Transaction::new(date, 10.0, &["Food and Drink", "Restaurants"]);
        assert_eq!(tx.primary_category(), "Food and Drink");

        let tx = Transaction::new(date, 10.0, &[]);
        assert_eq!(tx.primary_category(), "Other");

        let tx = Transaction {
            category: None,
            ..tx
        };
        assert_eq!(tx.primary_category(), "Other");
    }

    #[test]
    fn test_transaction_deserializes_null_category() {
        let json = r#"{"date":"2024-03-09","amount":-1200.5,"category":null,"name":"PAYROLL"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.month_key(), "2024-03");
        assert!(tx.is_income());
        assert_eq!(tx.primary_category(), "Other");
        assert_eq!(tx.name.as_deref(), Some("PAYROLL"));
    }

    #[test]
    fn test_transaction_accepts_datetime_date() {
        let json = r#"{"date":"2024-01-05T10:00:00Z","amount":42.0,"category":["Shops"]}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(tx.month_key(), "2024-01");

        // Serializes back as a plain date
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["date"], "2024-01-05");
    }

    #[test]
    fn test_transaction_rejects_unparseable_date() {
        let json = r#"{"date":"Jan 5","amount":42.0}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());

        let json = r#"{"date":20240105,"amount":42.0}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_financial_entry_validation() {
        let entry = NewFinancialEntry {
            income: 3000.0,
            expenses: f64::NAN,
            expense_breakdown: None,
            notes: None,
        };
        assert!(entry.validate().is_err());

        let entry = NewFinancialEntry {
            expenses: 1500.0,
            ..entry
        };
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_profile_merge_keeps_unset_fields() {
        let profile = Profile {
            goal: "Save for a house".to_string(),
            monthly_budget: Some(2500.0),
            ..Default::default()
        };

        let merged = profile.merge(ProfileUpdate {
            full_name: Some("Sam Lee".to_string()),
            ..Default::default()
        });

        assert_eq!(merged.goal, "Save for a house");
        assert_eq!(merged.full_name, "Sam Lee");
        assert_eq!(merged.monthly_budget, Some(2500.0));
        assert_eq!(merged.target_savings_rate, 20.0);
    }
}
