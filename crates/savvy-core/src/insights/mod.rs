//! Insight Engine - Transaction Categorization and Trends
//!
//! Pure computation over a list of bank transactions. Nothing here performs
//! I/O or keeps state between calls; every result is recomputed from the
//! transactions it is given.
//!
//! ## Operations
//!
//! - **summarize** - Income/expense totals, expense buckets by primary category,
//!   and the overall savings rate
//! - **analyze_trends** - Per-month series (savings rate, top category, income,
//!   expenses) plus natural-language commentary
//!
//! ## Usage
//!
//! ```rust,ignore
//! use savvy_core::insights::{analyze_trends, summarize};
//!
//! let summary = summarize(&transactions);
//! let report = analyze_trends(&transactions);
//! ```

pub mod summary;
pub mod trends;
pub mod types;

pub use summary::{recent_insight, savings_rate, summarize};
pub use trends::{analyze_trends, FALLBACK_INSIGHT};
pub use types::{
    CategorySummary, CategoryTotals, MonthTopCategory, MonthValue, TrendReport, Trends,
    NO_CATEGORY,
};
