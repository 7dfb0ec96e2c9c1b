//! User account store.
//!
//! Registration and lookup only; password hashing and session handling
//! live in the surface that fronts this store.

use crate::db::Database;
use crate::types::{NewUser, RefugeeStatus, User, SUPPORTED_LANGUAGES};
use assist_core::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

/// Repository seam for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Register a new user. Email and phone must be unique.
    async fn create(&self, new: NewUser) -> AppResult<User>;

    /// Fetch a user by id.
    async fn get(&self, id: &str) -> AppResult<User>;

    /// Look up a user by email, for login flows.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Soft-deactivate an account.
    async fn deactivate(&self, id: &str) -> AppResult<()>;
}

/// SQLite-backed user store.
#[derive(Clone)]
pub struct SqliteUserStore {
    db: Database,
}

impl SqliteUserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone, password_hash, \
     preferred_language, refugee_status, country_of_origin, district, settlement, \
     is_active, created_at, updated_at";

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        if !SUPPORTED_LANGUAGES.contains(&new.preferred_language.as_str()) {
            return Err(AppError::Store(format!(
                "Unsupported language code: {} (supported: {})",
                new.preferred_language,
                SUPPORTED_LANGUAGES.join(", ")
            )));
        }

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email.to_lowercase(),
            phone: new.phone,
            password_hash: new.password_hash,
            preferred_language: new.preferred_language,
            refugee_status: new.refugee_status,
            country_of_origin: new.country_of_origin,
            district: new.district,
            settlement: new.settlement,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let conn = self.db.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO users ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                USER_COLUMNS
            ),
            params![
                user.id,
                user.first_name,
                user.last_name,
                user.email,
                user.phone,
                user.password_hash,
                user.preferred_language,
                user.refugee_status.as_str(),
                user.country_of_origin,
                user.district,
                user.settlement,
                user.is_active,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AppError::Store("A user with this email or phone already exists".to_string())
            }
            other => AppError::Store(format!("Failed to create user: {}", other)),
        })?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    async fn get(&self, id: &str) -> AppResult<User> {
        let conn = self.db.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id],
            row_to_user,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("User {}", id)),
            other => AppError::Store(format!("Failed to fetch user: {}", other)),
        })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let conn = self.db.conn()?;
        let result = conn.query_row(
            &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
            params![email.to_lowercase()],
            row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Store(format!("Failed to look up user: {}", e))),
        }
    }

    async fn deactivate(&self, id: &str) -> AppResult<()> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "UPDATE users SET is_active = 0, updated_at = ?2 WHERE id = ?1",
                params![id, Utc::now().to_rfc3339()],
            )
            .map_err(|e| AppError::Store(format!("Failed to deactivate user: {}", e)))?;

        if changed == 0 {
            return Err(AppError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let status_str: String = row.get(7)?;
    let refugee_status = RefugeeStatus::parse(&status_str)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        password_hash: row.get(5)?,
        preferred_language: row.get(6)?,
        refugee_status,
        country_of_origin: row.get(8)?,
        district: row.get(9)?,
        settlement: row.get(10)?,
        is_active: row.get(11)?,
        created_at: parse_timestamp(row, 12)?,
        updated_at: parse_timestamp(row, 13)?,
    })
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteUserStore {
        SqliteUserStore::new(Database::open_in_memory().unwrap())
    }

    fn sample_user() -> NewUser {
        NewUser {
            first_name: "Amina".to_string(),
            last_name: "Okello".to_string(),
            email: "Amina@example.com".to_string(),
            phone: "+256700000001".to_string(),
            password_hash: "argon2-hash".to_string(),
            preferred_language: "sw".to_string(),
            refugee_status: RefugeeStatus::Refugee,
            country_of_origin: Some("South Sudan".to_string()),
            district: Some("Yumbe".to_string()),
            settlement: Some("Bidi Bidi".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_email_and_roundtrips() {
        let store = test_store();
        let created = store.create(sample_user()).await.unwrap();
        assert_eq!(created.email, "amina@example.com");

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched.preferred_language, "sw");
        assert_eq!(fetched.refugee_status, RefugeeStatus::Refugee);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_unsupported_language_rejected() {
        let store = test_store();

        let mut bad = sample_user();
        bad.preferred_language = "xx".to_string();
        match store.create(bad).await {
            Err(AppError::Store(msg)) => assert!(msg.contains("Unsupported language code")),
            other => panic!("Expected Store error, got {:?}", other.map(|u| u.id)),
        }

        // Every documented code is accepted
        for (i, lang) in SUPPORTED_LANGUAGES.iter().enumerate() {
            let mut user = sample_user();
            user.email = format!("user{}@example.com", i);
            user.phone = format!("+25670000010{}", i);
            user.preferred_language = lang.to_string();
            assert!(store.create(user).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = test_store();
        store.create(sample_user()).await.unwrap();

        let mut dup = sample_user();
        dup.phone = "+256700000002".to_string();
        assert!(store.create(dup).await.is_err());
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let store = test_store();
        let created = store.create(sample_user()).await.unwrap();

        let found = store.find_by_email("AMINA@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));

        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivate() {
        let store = test_store();
        let created = store.create(sample_user()).await.unwrap();

        store.deactivate(&created.id).await.unwrap();
        assert!(!store.get(&created.id).await.unwrap().is_active);

        assert!(matches!(
            store.deactivate("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_password_hash_never_serialized() {
        let store = test_store();
        let created = store.create(sample_user()).await.unwrap();

        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
