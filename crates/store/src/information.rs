//! Information record store: CRUD plus full-text relevance search.
//!
//! Records are indexed in an FTS5 table over the English title, English
//! content, and tags. Relevance search ranks matches by bm25 (negated so
//! higher is better) and only considers active records.

use crate::db::Database;
use crate::types::{
    Audience, Category, InformationRecord, Location, LocalizedText, NewInformationRecord,
    Priority, UpdateInformation,
};
use assist_core::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

/// Repository seam for information records.
#[async_trait]
pub trait InformationStore: Send + Sync {
    /// Create a new record authored by `new.created_by`.
    async fn create(&self, new: NewInformationRecord) -> AppResult<InformationRecord>;

    /// Fetch a record by id (active or retired).
    async fn get(&self, id: &str) -> AppResult<InformationRecord>;

    /// Apply a partial update and bump `updated_at`.
    async fn update(&self, id: &str, update: UpdateInformation) -> AppResult<InformationRecord>;

    /// Soft-delete: flip `is_active` to false. Records are never hard-deleted.
    async fn retire(&self, id: &str, updated_by: &str) -> AppResult<()>;

    /// List active records, optionally filtered by category, newest first.
    async fn list(
        &self,
        category: Option<Category>,
        page: u32,
        limit: u32,
    ) -> AppResult<Vec<InformationRecord>>;

    /// Increment the view counter and return the new count.
    async fn record_view(&self, id: &str) -> AppResult<u64>;

    /// Toggle a user's like. Returns true if the record is now liked.
    async fn toggle_like(&self, id: &str, user_id: &str) -> AppResult<bool>;

    /// Full-text relevance search over active records.
    ///
    /// Returns at most `limit` records with their relevance scores,
    /// highest score first. Callers decide how to degrade on failure.
    async fn search_relevant(
        &self,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<(InformationRecord, f64)>>;
}

/// SQLite-backed information store.
#[derive(Clone)]
pub struct SqliteInformationStore {
    db: Database,
}

impl SqliteInformationStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const RECORD_COLUMNS: &str = "id, title, content, category, target_audience, priority, \
     location, tags, is_verified, verified_by, created_by, updated_by, \
     created_at, updated_at, views, likes, is_active";

#[async_trait]
impl InformationStore for SqliteInformationStore {
    async fn create(&self, new: NewInformationRecord) -> AppResult<InformationRecord> {
        let now = Utc::now();
        let record = InformationRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title,
            content: new.content,
            category: new.category,
            target_audience: new.target_audience,
            priority: new.priority,
            location: new.location,
            tags: new.tags,
            is_verified: false,
            verified_by: None,
            created_by: new.created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
            views: 0,
            likes: Vec::new(),
            is_active: true,
        };

        let conn = self.db.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO information ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                RECORD_COLUMNS
            ),
            params![
                record.id,
                serde_json::to_string(&record.title)?,
                serde_json::to_string(&record.content)?,
                record.category.as_str(),
                serde_json::to_string(&record.target_audience)?,
                record.priority.as_str(),
                serde_json::to_string(&record.location)?,
                serde_json::to_string(&record.tags)?,
                record.is_verified,
                record.verified_by,
                record.created_by,
                record.updated_by,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
                record.views as i64,
                serde_json::to_string(&record.likes)?,
                record.is_active,
            ],
        )
        .map_err(|e| AppError::Store(format!("Failed to insert information record: {}", e)))?;

        sync_fts(&conn, &record)?;

        tracing::debug!("Created information record {}", record.id);
        Ok(record)
    }

    async fn get(&self, id: &str) -> AppResult<InformationRecord> {
        let conn = self.db.conn()?;
        fetch_record(&conn, id)
    }

    async fn update(&self, id: &str, update: UpdateInformation) -> AppResult<InformationRecord> {
        let conn = self.db.conn()?;
        let mut record = fetch_record(&conn, id)?;

        if let Some(title) = update.title {
            record.title = title;
        }
        if let Some(content) = update.content {
            record.content = content;
        }
        if let Some(category) = update.category {
            record.category = category;
        }
        if let Some(priority) = update.priority {
            record.priority = priority;
        }
        if let Some(tags) = update.tags {
            record.tags = tags;
        }
        if let Some(is_verified) = update.is_verified {
            record.is_verified = is_verified;
            if is_verified {
                record.verified_by = update.updated_by.clone();
            }
        }
        record.updated_by = update.updated_by;
        record.updated_at = Utc::now();

        conn.execute(
            "UPDATE information SET title = ?2, content = ?3, category = ?4, priority = ?5, \
             tags = ?6, is_verified = ?7, verified_by = ?8, updated_by = ?9, updated_at = ?10 \
             WHERE id = ?1",
            params![
                record.id,
                serde_json::to_string(&record.title)?,
                serde_json::to_string(&record.content)?,
                record.category.as_str(),
                record.priority.as_str(),
                serde_json::to_string(&record.tags)?,
                record.is_verified,
                record.verified_by,
                record.updated_by,
                record.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Store(format!("Failed to update information record: {}", e)))?;

        sync_fts(&conn, &record)?;

        Ok(record)
    }

    async fn retire(&self, id: &str, updated_by: &str) -> AppResult<()> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "UPDATE information SET is_active = 0, updated_by = ?2, updated_at = ?3 \
                 WHERE id = ?1",
                params![id, updated_by, Utc::now().to_rfc3339()],
            )
            .map_err(|e| AppError::Store(format!("Failed to retire record: {}", e)))?;

        if changed == 0 {
            return Err(AppError::NotFound(format!("Information record {}", id)));
        }

        tracing::info!("Retired information record {}", id);
        Ok(())
    }

    async fn list(
        &self,
        category: Option<Category>,
        page: u32,
        limit: u32,
    ) -> AppResult<Vec<InformationRecord>> {
        let conn = self.db.conn()?;
        let page = page.max(1);
        let offset = (page - 1) as i64 * limit as i64;

        let mut records = Vec::new();
        match category {
            Some(cat) => {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM information WHERE is_active = 1 AND category = ?1 \
                         ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                        RECORD_COLUMNS
                    ))
                    .map_err(|e| AppError::Store(format!("Failed to prepare list query: {}", e)))?;
                let rows = stmt
                    .query_map(params![cat.as_str(), limit as i64, offset], row_to_record)
                    .map_err(|e| AppError::Store(format!("Failed to list records: {}", e)))?;
                for row in rows {
                    records.push(row.map_err(|e| {
                        AppError::Store(format!("Failed to read record row: {}", e))
                    })?);
                }
            }
            None => {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM information WHERE is_active = 1 \
                         ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                        RECORD_COLUMNS
                    ))
                    .map_err(|e| AppError::Store(format!("Failed to prepare list query: {}", e)))?;
                let rows = stmt
                    .query_map(params![limit as i64, offset], row_to_record)
                    .map_err(|e| AppError::Store(format!("Failed to list records: {}", e)))?;
                for row in rows {
                    records.push(row.map_err(|e| {
                        AppError::Store(format!("Failed to read record row: {}", e))
                    })?);
                }
            }
        }

        Ok(records)
    }

    async fn record_view(&self, id: &str) -> AppResult<u64> {
        let conn = self.db.conn()?;
        let changed = conn
            .execute(
                "UPDATE information SET views = views + 1 WHERE id = ?1",
                params![id],
            )
            .map_err(|e| AppError::Store(format!("Failed to record view: {}", e)))?;

        if changed == 0 {
            return Err(AppError::NotFound(format!("Information record {}", id)));
        }

        let views: i64 = conn
            .query_row(
                "SELECT views FROM information WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Store(format!("Failed to read view count: {}", e)))?;

        Ok(views as u64)
    }

    async fn toggle_like(&self, id: &str, user_id: &str) -> AppResult<bool> {
        let conn = self.db.conn()?;
        let record = fetch_record(&conn, id)?;

        let mut likes = record.likes;
        let liked = if let Some(pos) = likes.iter().position(|u| u == user_id) {
            likes.remove(pos);
            false
        } else {
            likes.push(user_id.to_string());
            true
        };

        conn.execute(
            "UPDATE information SET likes = ?2 WHERE id = ?1",
            params![id, serde_json::to_string(&likes)?],
        )
        .map_err(|e| AppError::Store(format!("Failed to update likes: {}", e)))?;

        Ok(liked)
    }

    async fn search_relevant(
        &self,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<(InformationRecord, f64)>> {
        let match_expr = match build_match_expr(query) {
            Some(expr) => expr,
            None => return Ok(Vec::new()),
        };

        let conn = self.db.conn()?;
        let sql = format!(
            "SELECT {}, -bm25(information_fts) AS score \
             FROM information_fts \
             JOIN information i ON i.id = information_fts.id \
             WHERE information_fts MATCH ?1 AND i.is_active = 1 \
             ORDER BY score DESC \
             LIMIT ?2",
            RECORD_COLUMNS
                .split(", ")
                .map(|c| format!("i.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| AppError::Store(format!("Failed to prepare search query: {}", e)))?;

        let rows = stmt
            .query_map(params![match_expr, limit as i64], |row| {
                let record = row_to_record(row)?;
                let score: f64 = row.get(17)?;
                Ok((record, score))
            })
            .map_err(|e| AppError::Store(format!("Failed to run search query: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            results
                .push(row.map_err(|e| AppError::Store(format!("Failed to read search row: {}", e)))?);
        }

        tracing::debug!(
            "Relevance search for {:?} returned {} records",
            query,
            results.len()
        );

        Ok(results)
    }
}

/// Build an FTS5 MATCH expression from free text.
///
/// Terms are quoted so user punctuation cannot be parsed as FTS syntax,
/// and OR-joined to mirror any-term matching. Returns None when the
/// query has no searchable terms.
fn build_match_expr(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Replace the FTS row for a record with its current indexed fields.
fn sync_fts(conn: &Connection, record: &InformationRecord) -> AppResult<()> {
    conn.execute(
        "DELETE FROM information_fts WHERE id = ?1",
        params![record.id],
    )
    .map_err(|e| AppError::Store(format!("Failed to clear FTS row: {}", e)))?;

    conn.execute(
        "INSERT INTO information_fts (id, title_en, content_en, tags) VALUES (?1, ?2, ?3, ?4)",
        params![
            record.id,
            record.title.en,
            record.content.en,
            record.tags.join(" "),
        ],
    )
    .map_err(|e| AppError::Store(format!("Failed to index record: {}", e)))?;

    Ok(())
}

fn fetch_record(conn: &Connection, id: &str) -> AppResult<InformationRecord> {
    conn.query_row(
        &format!("SELECT {} FROM information WHERE id = ?1", RECORD_COLUMNS),
        params![id],
        row_to_record,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            AppError::NotFound(format!("Information record {}", id))
        }
        other => AppError::Store(format!("Failed to fetch record: {}", other)),
    })
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<InformationRecord> {
    let title: LocalizedText = parse_json(row, 1)?;
    let content: LocalizedText = parse_json(row, 2)?;
    let category_str: String = row.get(3)?;
    let target_audience: Vec<Audience> = parse_json(row, 4)?;
    let priority_str: String = row.get(5)?;
    let location: Location = parse_json(row, 6)?;
    let tags: Vec<String> = parse_json(row, 7)?;
    let likes: Vec<String> = parse_json(row, 15)?;

    Ok(InformationRecord {
        id: row.get(0)?,
        title,
        content,
        category: Category::parse(&category_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        target_audience,
        priority: Priority::parse(&priority_str)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        location,
        tags,
        is_verified: row.get(8)?,
        verified_by: row.get(9)?,
        created_by: row.get(10)?,
        updated_by: row.get(11)?,
        created_at: parse_timestamp(row, 12)?,
        updated_at: parse_timestamp(row, 13)?,
        views: row.get::<_, i64>(14)? as u64,
        likes,
        is_active: row.get(16)?,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
