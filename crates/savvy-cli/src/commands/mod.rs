//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - `init` and the shared `open_db` helper
//! - `serve` - Web server command
//! - `analyze` - Insight engine over a transaction file
//! - `leaderboard` - Ranking table
//! - `reset` - Data clearing

pub mod analyze;
pub mod core;
pub mod leaderboard;
pub mod reset;
pub mod serve;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use leaderboard::*;
pub use reset::*;
pub use serve::*;
