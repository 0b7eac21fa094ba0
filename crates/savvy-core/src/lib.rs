//! Savvy Core Library
//!
//! Shared functionality for the Savvy savings leaderboard:
//! - Insight engine (category summaries and month-over-month trends)
//! - Leaderboard scoring and pagination
//! - Lesson recommendations and achievement badges
//! - Database access and migrations
//! - Bank transaction sources and file import

pub mod badges;
pub mod db;
pub mod error;
pub mod import;
pub mod insights;
pub mod lessons;
pub mod models;
pub mod scoring;
pub mod source;

pub use db::{AuditEntry, Database, ResetScope};
pub use error::{Error, Result};
pub use insights::{analyze_trends, summarize, CategorySummary, TrendReport};
pub use source::{AggregatorClient, StaticSource, TransactionSource};
