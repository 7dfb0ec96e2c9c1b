//! SQLite database handle and schema migration.

use assist_core::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared handle to the application database.
///
/// Wraps a single SQLite connection behind a mutex; all stores clone
/// this handle. SQLite's single-document (row) atomicity is the only
/// consistency guarantee the application relies on.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Store(format!("Failed to create database directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Store(format!("Failed to open database: {}", e)))?;

        migrate(&conn)?;

        tracing::debug!("Opened database at {:?}", path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Store(format!("Failed to open in-memory database: {}", e)))?;

        migrate(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection guard.
    pub(crate) fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Store("Database lock poisoned".to_string()))
    }
}

/// Create tables and indexes if they do not exist.
fn migrate(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            preferred_language TEXT NOT NULL DEFAULT 'en',
            refugee_status TEXT NOT NULL,
            country_of_origin TEXT,
            district TEXT,
            settlement TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS information (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            category TEXT NOT NULL,
            target_audience TEXT NOT NULL DEFAULT '[]',
            priority TEXT NOT NULL DEFAULT 'medium',
            location TEXT NOT NULL DEFAULT '{}',
            tags TEXT NOT NULL DEFAULT '[]',
            is_verified INTEGER NOT NULL DEFAULT 0,
            verified_by TEXT,
            created_by TEXT NOT NULL,
            updated_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            views INTEGER NOT NULL DEFAULT 0,
            likes TEXT NOT NULL DEFAULT '[]',
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_information_category
            ON information(category, priority, created_at);

        CREATE VIRTUAL TABLE IF NOT EXISTS information_fts USING fts5(
            id UNINDEXED,
            title_en,
            content_en,
            tags,
            tokenize = 'porter unicode61'
        );

        CREATE TABLE IF NOT EXISTS ai_interactions (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            session_id TEXT,
            query TEXT NOT NULL,
            response TEXT NOT NULL,
            language TEXT NOT NULL DEFAULT 'en',
            context TEXT,
            confidence REAL,
            sources TEXT NOT NULL DEFAULT '[]',
            feedback TEXT,
            processing_time_ms INTEGER NOT NULL DEFAULT 0,
            timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_interactions_user
            ON ai_interactions(user_id, timestamp);
        "#,
    )
    .map_err(|e| AppError::Store(format!("Failed to run migrations: {}", e)))?;

    Ok(())
}
