//! Output types for the Insight Engine

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::models::Transaction;

/// Category label reported for a month with no expenses
pub const NO_CATEGORY: &str = "None";

/// Summed expense amounts per category, kept in first-seen order
///
/// Serializes as a JSON object whose keys follow insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    buckets: Vec<(String, f64)>,
    /// Position of each category in `buckets`
    index: HashMap<String, usize>,
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an amount to a category bucket, creating it on first use
    pub fn add(&mut self, category: &str, amount: f64) {
        match self.index.get(category) {
            Some(&slot) => self.buckets[slot].1 += amount,
            None => {
                self.index.insert(category.to_string(), self.buckets.len());
                self.buckets.push((category.to_string(), amount));
            }
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.index.get(category).map(|&slot| self.buckets[slot].1)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.buckets.iter().map(|(name, total)| (name.as_str(), *total))
    }

    /// Largest bucket; on a tie the category seen first wins
    pub fn top(&self) -> Option<(&str, f64)> {
        self.iter().fold(None, |max, item| match max {
            Some((_, best)) if item.1 <= best => max,
            _ => Some(item),
        })
    }

    /// Buckets ordered by amount, largest first (stable for equal amounts)
    pub fn sorted_desc(&self) -> Vec<(&str, f64)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (name, total) in &self.buckets {
            map.serialize_entry(name, total)?;
        }
        map.end()
    }
}

/// Running income/expense totals for a set of transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Ledger {
    pub income: f64,
    pub expenses: f64,
    pub categories: CategoryTotals,
}

impl Ledger {
    /// Count a transaction as income or as a categorized expense, never both
    pub fn record(&mut self, tx: &Transaction) {
        if tx.is_income() {
            self.income += tx.amount.abs();
        } else {
            self.expenses += tx.amount;
            self.categories.add(tx.primary_category(), tx.amount);
        }
    }
}

/// Categorized expense/income totals over a transaction window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub total_expenses: f64,
    pub total_income: f64,
    pub categories: CategoryTotals,
    pub savings_rate: f64,
}

/// One month's value in a trend series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthValue {
    pub month: String,
    pub value: f64,
}

/// Largest expense category for one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTopCategory {
    pub month: String,
    pub category: String,
    pub amount: f64,
}

/// Parallel per-month series, ordered by ascending month key
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub savings_rate: Vec<MonthValue>,
    pub top_expense_category: Vec<MonthTopCategory>,
    pub monthly_income: Vec<MonthValue>,
    pub monthly_expenses: Vec<MonthValue>,
}

/// Month-over-month trends plus human-readable commentary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendReport {
    pub trends: Trends,
    pub insights: Vec<String>,
}
