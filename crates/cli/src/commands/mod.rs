//! Command handlers for the RefugeeAssist CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod history;
pub mod info;
pub mod stats;
pub mod user;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use history::HistoryCommand;
pub use info::InfoCommand;
pub use stats::StatsCommand;
pub use user::UserCommand;
