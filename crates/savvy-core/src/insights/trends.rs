//! Month-over-month trend analysis and text insights

use std::collections::BTreeMap;

use crate::models::Transaction;

use super::summary::savings_rate;
use super::types::{Ledger, MonthTopCategory, MonthValue, TrendReport, Trends, NO_CATEGORY};

/// Savings-rate change (percentage points) worth commenting on
const SAVINGS_RATE_SHIFT: f64 = 5.0;

/// Emitted when no other insight applies
pub const FALLBACK_INSIGHT: &str = "Collect more transaction data for personalized insights.";

/// Bucket transactions by month and derive trend series plus commentary
pub fn analyze_trends(transactions: &[Transaction]) -> TrendReport {
    // BTreeMap keeps `YYYY-MM` keys in chronological order
    let mut months: BTreeMap<String, Ledger> = BTreeMap::new();
    for tx in transactions {
        months.entry(tx.month_key()).or_default().record(tx);
    }

    let mut trends = Trends::default();
    for (month, ledger) in &months {
        let (category, amount) = ledger.categories.top().unwrap_or((NO_CATEGORY, 0.0));

        trends.savings_rate.push(MonthValue {
            month: month.clone(),
            value: savings_rate(ledger.income, ledger.expenses),
        });
        trends.top_expense_category.push(MonthTopCategory {
            month: month.clone(),
            category: category.to_string(),
            amount,
        });
        trends.monthly_income.push(MonthValue {
            month: month.clone(),
            value: ledger.income,
        });
        trends.monthly_expenses.push(MonthValue {
            month: month.clone(),
            value: ledger.expenses,
        });
    }

    let insights = describe(&trends, months.values().next_back());
    tracing::debug!(
        months = months.len(),
        insights = insights.len(),
        "Trend analysis complete"
    );

    TrendReport { trends, insights }
}

fn describe(trends: &Trends, latest: Option<&Ledger>) -> Vec<String> {
    let mut insights = Vec::new();

    if let [.., previous, current] = trends.savings_rate.as_slice() {
        let difference = current.value - previous.value;
        if difference > SAVINGS_RATE_SHIFT {
            insights.push(format!(
                "Great job! Your savings rate increased by {:.1}% compared to last month.",
                round_half_up(difference, 1)
            ));
        } else if difference < -SAVINGS_RATE_SHIFT {
            insights.push(format!(
                "Your savings rate decreased by {:.1}% compared to last month.",
                round_half_up(difference.abs(), 1)
            ));
        }
    }

    if let Some(ledger) = latest {
        let ranked = ledger.categories.sorted_desc();
        if let Some((category, amount)) = ranked.first() {
            if ledger.expenses > 0.0 {
                let percentage = amount / ledger.expenses * 100.0;
                insights.push(format!(
                    "Your highest spending category is {} at {:.0}% of your monthly expenses.",
                    category,
                    round_half_up(percentage, 0)
                ));
            }
        }
    }

    if insights.is_empty() {
        insights.push(FALLBACK_INSIGHT.to_string());
    }
    insights
}

/// Round to `decimals` places with halves going away from zero
///
/// `format!` precision alone rounds exact halves to even ("62.5" prints as "62").
fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(date: &str, amount: f64, category: &[&str]) -> Transaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Transaction::new(date, amount, category)
    }

    fn two_months(second_expenses: f64) -> Vec<Transaction> {
        vec![
            tx("2024-01-01", -3000.0, &["Transfer", "Payroll"]),
            tx("2024-01-03", 1500.0, &["Rent"]),
            tx("2024-01-20", 1000.0, &["Food and Drink"]),
            tx("2024-02-01", -3000.0, &["Transfer", "Payroll"]),
            tx("2024-02-03", second_expenses, &["Rent"]),
        ]
    }

    #[test]
    fn test_empty_input_yields_fallback() {
        let report = analyze_trends(&[]);
        assert!(report.trends.savings_rate.is_empty());
        assert!(report.trends.top_expense_category.is_empty());
        assert!(report.trends.monthly_income.is_empty());
        assert!(report.trends.monthly_expenses.is_empty());
        assert_eq!(report.insights, vec![FALLBACK_INSIGHT.to_string()]);
    }

    #[test]
    fn test_savings_rate_increase_insight() {
        // January: 3000 in, 2500 out (16.67%); February: 3000 in, 2000 out (33.33%)
        let report = analyze_trends(&two_months(2000.0));

        assert_eq!(report.trends.savings_rate.len(), 2);
        assert!((report.trends.savings_rate[0].value - 16.6667).abs() < 0.001);
        assert!((report.trends.savings_rate[1].value - 33.3333).abs() < 0.001);
        assert_eq!(
            report.insights[0],
            "Great job! Your savings rate increased by 16.7% compared to last month."
        );
        assert_eq!(
            report.insights[1],
            "Your highest spending category is Rent at 100% of your monthly expenses."
        );
    }

    #[test]
    fn test_savings_rate_decrease_insight() {
        let report = analyze_trends(&two_months(2900.0));
        assert_eq!(
            report.insights[0],
            "Your savings rate decreased by 13.3% compared to last month."
        );
    }

    #[test]
    fn test_small_shift_is_not_reported() {
        let report = analyze_trends(&two_months(2400.0));
        assert_eq!(report.insights.len(), 1);
        assert!(report.insights[0].starts_with("Your highest spending category is Rent"));
    }

    #[test]
    fn test_series_are_parallel_and_sorted() {
        let transactions = vec![
            tx("2024-03-14", 20.0, &["Shops"]),
            tx("2023-12-30", -100.0, &[]),
            tx("2024-01-02", 35.0, &["Travel"]),
            tx("2024-03-01", -400.0, &[]),
        ];
        let report = analyze_trends(&transactions);
        let trends = &report.trends;

        let months: Vec<&str> = trends.savings_rate.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-03"]);
        assert_eq!(trends.top_expense_category.len(), 3);
        assert_eq!(trends.monthly_income.len(), 3);
        assert_eq!(trends.monthly_expenses.len(), 3);
        for (i, month) in months.iter().enumerate() {
            assert_eq!(trends.top_expense_category[i].month, *month);
            assert_eq!(trends.monthly_income[i].month, *month);
            assert_eq!(trends.monthly_expenses[i].month, *month);
        }
        assert_eq!(trends.monthly_income[0].value, 100.0);
        assert_eq!(trends.monthly_expenses[1].value, 35.0);
    }

    #[test]
    fn test_month_without_expenses_reports_none() {
        let report = analyze_trends(&[tx("2024-05-01", -2500.0, &["Transfer"])]);
        let top = &report.trends.top_expense_category[0];
        assert_eq!(top.category, "None");
        assert_eq!(top.amount, 0.0);
        assert_eq!(report.insights, vec![FALLBACK_INSIGHT.to_string()]);
    }

    #[test]
    fn test_top_category_tie_keeps_first_seen() {
        let transactions = vec![
            tx("2024-06-02", 80.0, &["Travel"]),
            tx("2024-06-03", 120.0, &["Food and Drink"]),
            tx("2024-06-04", 40.0, &["Travel"]),
        ];
        let report = analyze_trends(&transactions);
        let top = &report.trends.top_expense_category[0];
        assert_eq!(top.category, "Travel");
        assert_eq!(top.amount, 120.0);
        assert_eq!(
            report.insights,
            vec!["Your highest spending category is Travel at 50% of your monthly expenses."]
        );
    }

    #[test]
    fn test_zero_expense_month_skips_share_insight() {
        let report = analyze_trends(&[tx("2024-07-01", 0.0, &["Service"])]);
        assert_eq!(report.trends.top_expense_category[0].category, "Service");
        assert_eq!(report.insights, vec![FALLBACK_INSIGHT.to_string()]);
    }

    #[test]
    fn test_category_share_rounds_half_up() {
        let transactions = vec![
            tx("2024-08-01", 5.0, &["Rent"]),
            tx("2024-08-02", 3.0, &["Food and Drink"]),
        ];
        let report = analyze_trends(&transactions);
        assert_eq!(
            report.insights,
            vec!["Your highest spending category is Rent at 63% of your monthly expenses."]
        );
    }

    #[test]
    fn test_savings_rate_shift_rounds_half_up() {
        // 0% then 6.25%
        let rising = vec![
            tx("2024-01-01", -16.0, &[]),
            tx("2024-01-02", 16.0, &["Rent"]),
            tx("2024-02-01", -16.0, &[]),
            tx("2024-02-02", 15.0, &["Rent"]),
        ];
        let report = analyze_trends(&rising);
        assert_eq!(
            report.insights[0],
            "Great job! Your savings rate increased by 6.3% compared to last month."
        );

        // 6.25% then 0%
        let falling = vec![
            tx("2024-01-01", -16.0, &[]),
            tx("2024-01-02", 15.0, &["Rent"]),
            tx("2024-02-01", -16.0, &[]),
            tx("2024-02-02", 16.0, &["Rent"]),
        ];
        let report = analyze_trends(&falling);
        assert_eq!(
            report.insights[0],
            "Your savings rate decreased by 6.3% compared to last month."
        );
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(62.5, 0), 63.0);
        assert_eq!(round_half_up(6.25, 1), 6.3);
        assert_eq!(round_half_up(16.6667, 1), 16.7);
    }

    #[test]
    fn test_analyze_trends_is_idempotent() {
        let transactions = two_months(2000.0);
        assert_eq!(analyze_trends(&transactions), analyze_trends(&transactions));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = analyze_trends(&two_months(2000.0));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["trends"]["savingsRate"][0]["month"], "2024-01");
        assert_eq!(json["trends"]["topExpenseCategory"][1]["category"], "Rent");
        assert_eq!(json["trends"]["monthlyIncome"][1]["value"], 3000.0);
        assert_eq!(json["trends"]["monthlyExpenses"][0]["value"], 2500.0);
        assert_eq!(json["insights"].as_array().unwrap().len(), 2);
    }
}
