//! Whole-window categorization and savings-rate helpers

use crate::models::Transaction;

use super::types::{CategorySummary, Ledger};

/// Savings rate as a percentage of income, 0 when there is no income
pub fn savings_rate(income: f64, expenses: f64) -> f64 {
    if income > 0.0 {
        (income - expenses) / income * 100.0
    } else {
        0.0
    }
}

/// Categorize a transaction window into income, expenses and expense buckets
pub fn summarize(transactions: &[Transaction]) -> CategorySummary {
    let mut ledger = Ledger::default();
    for tx in transactions {
        ledger.record(tx);
    }

    CategorySummary {
        total_expenses: ledger.expenses,
        total_income: ledger.income,
        savings_rate: savings_rate(ledger.income, ledger.expenses),
        categories: ledger.categories,
    }
}

/// One-line dashboard comment on a single income/expense pair
///
/// Returns `None` unless both figures are non-zero.
pub fn recent_insight(income: f64, expenses: f64) -> Option<&'static str> {
    if income == 0.0 || expenses == 0.0 {
        return None;
    }

    let message = if income > expenses * 1.5 {
        "Great job! You're saving more than 33% of your income."
    } else if income > expenses {
        "You're saving money, but try to increase your savings rate."
    } else if income == expenses {
        "You're breaking even. Look for ways to reduce expenses."
    } else {
        "Watch out! Your expenses exceed your income."
    };
    Some(message)
}
