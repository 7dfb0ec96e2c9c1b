//! RefugeeAssist Storage Library
//!
//! SQLite-backed persistence for the platform:
//! - Information records with FTS5 relevance search
//! - AI interaction history and analytics
//! - User accounts

pub mod db;
pub mod information;
pub mod interactions;
pub mod types;
pub mod users;

// Re-export the handle and repository seams
pub use db::Database;
pub use information::{InformationStore, SqliteInformationStore};
pub use interactions::{InteractionStore, SqliteInteractionStore};
pub use users::{SqliteUserStore, UserStore};
