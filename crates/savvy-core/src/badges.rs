//! Achievement badges earned from manual financial entries

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::insights::savings_rate;
use crate::models::{FinancialEntry, Profile};

/// Savings rate (percent) needed for the Savings Star badge
pub const SAVINGS_STAR_RATE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub earned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earned_date: Option<NaiveDate>,
}

impl Badge {
    fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        icon: &'static str,
        earned_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            icon,
            earned: earned_date.is_some(),
            earned_date,
        }
    }
}

/// Months since year 0, so consecutive months differ by one
fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// Evaluate the badge catalog against a user's entries
///
/// Entries may be passed in any order; they are evaluated chronologically.
pub fn evaluate(entries: &[FinancialEntry], profile: &Profile) -> Vec<Badge> {
    let mut entries: Vec<&FinancialEntry> = entries.iter().collect();
    entries.sort_by_key(|e| e.created_at);

    vec![
        Badge::new(
            "first_entry",
            "First Entry",
            "Submit your first financial data",
            "📝",
            first_entry(&entries),
        ),
        Badge::new(
            "savings_star",
            "Savings Star",
            "Achieve a 20% or higher savings rate",
            "⭐",
            savings_star(&entries),
        ),
        Badge::new(
            "streak_master",
            "Streak Master",
            "Submit financial data for 3 consecutive months",
            "🔥",
            streak_master(&entries),
        ),
        Badge::new(
            "budget_guru",
            "Budget Guru",
            "Stay under budget for 2 consecutive months",
            "🧠",
            profile
                .monthly_budget
                .and_then(|budget| budget_guru(&entries, budget)),
        ),
        // Debt balances are not collected, so this one stays locked
        Badge::new(
            "debt_crusher",
            "Debt Crusher",
            "Reduce debt by 10% or more",
            "💪",
            None,
        ),
    ]
}

fn first_entry(entries: &[&FinancialEntry]) -> Option<NaiveDate> {
    entries.first().map(|e| e.created_at.date_naive())
}

fn savings_star(entries: &[&FinancialEntry]) -> Option<NaiveDate> {
    entries
        .iter()
        .find(|e| savings_rate(e.income, e.expenses) >= SAVINGS_STAR_RATE)
        .map(|e| e.created_at.date_naive())
}

fn streak_master(entries: &[&FinancialEntry]) -> Option<NaiveDate> {
    let mut months = BTreeSet::new();
    for entry in entries {
        let date = entry.created_at.date_naive();
        let idx = month_index(date);
        if months.insert(idx) && months.contains(&(idx - 1)) && months.contains(&(idx - 2)) {
            return Some(date);
        }
    }
    None
}

fn budget_guru(entries: &[&FinancialEntry], budget: f64) -> Option<NaiveDate> {
    // month -> (summed expenses, date of the month's last entry)
    let mut months: BTreeMap<i32, (f64, NaiveDate)> = BTreeMap::new();
    for entry in entries {
        let date = entry.created_at.date_naive();
        let slot = months.entry(month_index(date)).or_insert((0.0, date));
        slot.0 += entry.expenses;
        slot.1 = date;
    }

    let mut previous_under: Option<i32> = None;
    for (idx, (expenses, last_date)) in &months {
        if *expenses <= budget {
            if previous_under == Some(idx - 1) {
                return Some(*last_date);
            }
            previous_under = Some(*idx);
        } else {
            previous_under = None;
        }
    }
    None
}
