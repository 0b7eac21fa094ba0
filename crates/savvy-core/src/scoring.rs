//! Leaderboard scoring and pagination

use serde::Serialize;

use crate::error::{Error, Result};
use crate::insights::savings_rate;

/// Points awarded per percentage point of savings rate
pub const POINTS_PER_PERCENT: f64 = 10.0;

/// Default leaderboard page size
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Maximum leaderboard page size
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Score derived from a manual income/expense submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    /// Leaderboard points, never negative
    pub score: i64,
    /// Savings rate percentage clamped at 0 and rounded to cents
    pub savings: f64,
}

/// Compute the leaderboard score for an income/expense pair
pub fn score_for(income: f64, expenses: f64) -> Score {
    let rate = savings_rate(income, expenses);
    let score = (rate * POINTS_PER_PERCENT).round().max(0.0) as i64;
    let savings = (rate.max(0.0) * 100.0).round() / 100.0;
    Score { score, savings }
}

/// Validate a directly submitted score
pub fn validate_score(score: f64) -> Result<i64> {
    if !score.is_finite() || score <= 0.0 {
        return Err(Error::InvalidData(
            "A positive score is required".to_string(),
        ));
    }
    Ok(score.round() as i64)
}

/// A leaderboard page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Page {
    /// Build a page from optional query values, clamping out-of-range input
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    /// Number of entries skipped before this page
    ///
    /// Saturates for page numbers past any possible table size.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
