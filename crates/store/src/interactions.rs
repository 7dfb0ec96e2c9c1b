//! AI interaction history store.
//!
//! Interactions are appended by the query pipeline, paged per user for
//! history views, annotated with feedback, and aggregated for analytics.

use crate::db::Database;
use crate::types::{
    AiInteraction, Feedback, InteractionAnalytics, InteractionPage, NewInteraction, SourceRef,
};
use assist_core::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use std::collections::HashMap;

/// Repository seam for logged AI interactions.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Append a new interaction. Query and response must be non-empty.
    async fn insert(&self, new: NewInteraction) -> AppResult<AiInteraction>;

    /// Fetch a single interaction by id.
    async fn get(&self, id: &str) -> AppResult<AiInteraction>;

    /// Page through a user's history, newest first. Pages are 1-based.
    async fn list_for_user(&self, user_id: &str, page: u32, limit: u32)
        -> AppResult<InteractionPage>;

    /// Attach feedback to an interaction owned by `user_id`.
    async fn attach_feedback(
        &self,
        id: &str,
        user_id: &str,
        feedback: Feedback,
    ) -> AppResult<AiInteraction>;

    /// Delete all interactions for a user. Returns the number removed.
    async fn clear_for_user(&self, user_id: &str) -> AppResult<u64>;

    /// Aggregate statistics across all interactions.
    async fn analytics(&self) -> AppResult<InteractionAnalytics>;
}

/// SQLite-backed interaction store.
#[derive(Clone)]
pub struct SqliteInteractionStore {
    db: Database,
}

impl SqliteInteractionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const INTERACTION_COLUMNS: &str = "id, user_id, session_id, query, response, language, \
     context, confidence, sources, feedback, processing_time_ms, timestamp";

#[async_trait]
impl InteractionStore for SqliteInteractionStore {
    async fn insert(&self, new: NewInteraction) -> AppResult<AiInteraction> {
        if new.query.trim().is_empty() {
            return Err(AppError::Store("Interaction query must not be empty".to_string()));
        }
        if new.response.trim().is_empty() {
            return Err(AppError::Store(
                "Interaction response must not be empty".to_string(),
            ));
        }

        let interaction = AiInteraction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new.user_id,
            session_id: new.session_id,
            query: new.query,
            response: new.response,
            language: new.language,
            context: new.context,
            confidence: new.confidence,
            sources: new.sources,
            feedback: None,
            processing_time_ms: new.processing_time_ms,
            timestamp: Utc::now(),
        };

        let conn = self.db.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO ai_interactions ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                INTERACTION_COLUMNS
            ),
            params![
                interaction.id,
                interaction.user_id,
                interaction.session_id,
                interaction.query,
                interaction.response,
                interaction.language,
                interaction.context,
                interaction.confidence,
                serde_json::to_string(&interaction.sources)?,
                Option::<String>::None,
                interaction.processing_time_ms as i64,
                interaction.timestamp.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Store(format!("Failed to insert interaction: {}", e)))?;

        Ok(interaction)
    }

    async fn get(&self, id: &str) -> AppResult<AiInteraction> {
        let conn = self.db.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM ai_interactions WHERE id = ?1",
                INTERACTION_COLUMNS
            ),
            params![id],
            row_to_interaction,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                AppError::NotFound(format!("Interaction {}", id))
            }
            other => AppError::Store(format!("Failed to fetch interaction: {}", other)),
        })
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> AppResult<InteractionPage> {
        let conn = self.db.conn()?;
        let page = page.max(1);
        let limit = limit.max(1);
        let offset = (page - 1) as i64 * limit as i64;

        let total: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM ai_interactions WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Store(format!("Failed to count interactions: {}", e)))?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM ai_interactions WHERE user_id = ?1 \
                 ORDER BY timestamp DESC LIMIT ?2 OFFSET ?3",
                INTERACTION_COLUMNS
            ))
            .map_err(|e| AppError::Store(format!("Failed to prepare history query: {}", e)))?;

        let rows = stmt
            .query_map(params![user_id, limit as i64, offset], row_to_interaction)
            .map_err(|e| AppError::Store(format!("Failed to list interactions: {}", e)))?;

        let mut interactions = Vec::new();
        for row in rows {
            interactions.push(
                row.map_err(|e| AppError::Store(format!("Failed to read interaction: {}", e)))?,
            );
        }

        let total_pages = ((total as u64 + limit as u64 - 1) / limit as u64).max(1) as u32;

        Ok(InteractionPage {
            interactions,
            current: page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        })
    }

    async fn attach_feedback(
        &self,
        id: &str,
        user_id: &str,
        feedback: Feedback,
    ) -> AppResult<AiInteraction> {
        if let Some(rating) = feedback.rating {
            if !(1..=5).contains(&rating) {
                return Err(AppError::Store(format!(
                    "Feedback rating must be between 1 and 5, got {}",
                    rating
                )));
            }
        }

        let interaction = self.get(id).await?;
        if interaction.user_id.as_deref() != Some(user_id) {
            return Err(AppError::NotFound(format!("Interaction {}", id)));
        }

        let conn = self.db.conn()?;
        conn.execute(
            "UPDATE ai_interactions SET feedback = ?2 WHERE id = ?1",
            params![id, serde_json::to_string(&feedback)?],
        )
        .map_err(|e| AppError::Store(format!("Failed to attach feedback: {}", e)))?;

        Ok(AiInteraction {
            feedback: Some(feedback),
            ..interaction
        })
    }

    async fn clear_for_user(&self, user_id: &str) -> AppResult<u64> {
        let conn = self.db.conn()?;
        let removed = conn
            .execute(
                "DELETE FROM ai_interactions WHERE user_id = ?1",
                params![user_id],
            )
            .map_err(|e| AppError::Store(format!("Failed to clear interactions: {}", e)))?;

        tracing::info!("Cleared {} interactions for user {}", removed, user_id);
        Ok(removed as u64)
    }

    async fn analytics(&self) -> AppResult<InteractionAnalytics> {
        let conn = self.db.conn()?;

        let (total, average_confidence, average_processing_time_ms): (i64, Option<f64>, Option<f64>) =
            conn.query_row(
                "SELECT COUNT(*), AVG(confidence), AVG(processing_time_ms) FROM ai_interactions",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| AppError::Store(format!("Failed to aggregate interactions: {}", e)))?;

        let mut stmt = conn
            .prepare("SELECT language, COUNT(*) FROM ai_interactions GROUP BY language")
            .map_err(|e| AppError::Store(format!("Failed to prepare language counts: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| AppError::Store(format!("Failed to count languages: {}", e)))?;

        let mut language_counts = HashMap::new();
        for row in rows {
            let (language, count) =
                row.map_err(|e| AppError::Store(format!("Failed to read language count: {}", e)))?;
            language_counts.insert(language, count as u64);
        }

        Ok(InteractionAnalytics {
            total_interactions: total as u64,
            average_confidence,
            average_processing_time_ms,
            language_counts,
        })
    }
}

fn row_to_interaction(row: &Row<'_>) -> rusqlite::Result<AiInteraction> {
    let sources_raw: String = row.get(8)?;
    let sources: Vec<SourceRef> = serde_json::from_str(&sources_raw)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let feedback: Option<Feedback> = match row.get::<_, Option<String>>(9)? {
        Some(raw) => Some(
            serde_json::from_str(&raw)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        ),
        None => None,
    };

    let timestamp_raw: String = row.get(11)?;
    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&timestamp_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    Ok(AiInteraction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        session_id: row.get(2)?,
        query: row.get(3)?,
        response: row.get(4)?,
        language: row.get(5)?,
        context: row.get(6)?,
        confidence: row.get(7)?,
        sources,
        feedback,
        processing_time_ms: row.get::<_, i64>(10)? as u64,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteInteractionStore {
        SqliteInteractionStore::new(Database::open_in_memory().unwrap())
    }

    fn sample(user_id: Option<&str>, query: &str) -> NewInteraction {
        NewInteraction {
            user_id: user_id.map(String::from),
            session_id: None,
            query: query.to_string(),
            response: "Visit the nearest registration point.".to_string(),
            language: "en".to_string(),
            context: None,
            confidence: Some(0.8),
            sources: vec![SourceRef::database("Registration Steps")],
            processing_time_ms: 120,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = test_store();
        let inserted = store.insert(sample(Some("u1"), "how do I register")).await.unwrap();

        let fetched = store.get(&inserted.id).await.unwrap();
        assert_eq!(fetched.query, "how do I register");
        assert_eq!(fetched.user_id.as_deref(), Some("u1"));
        assert_eq!(fetched.sources.len(), 1);
        assert!(fetched.feedback.is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_empty_fields() {
        let store = test_store();

        let mut blank_query = sample(None, "  ");
        assert!(store.insert(blank_query.clone()).await.is_err());

        blank_query.query = "q".to_string();
        blank_query.response = String::new();
        assert!(store.insert(blank_query).await.is_err());
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_paged() {
        let store = test_store();
        for i in 0..5 {
            store.insert(sample(Some("u1"), &format!("query {}", i))).await.unwrap();
            // Distinct timestamps for a stable ordering
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        store.insert(sample(Some("u2"), "other user")).await.unwrap();

        let page1 = store.list_for_user("u1", 1, 2).await.unwrap();
        assert_eq!(page1.interactions.len(), 2);
        assert_eq!(page1.interactions[0].query, "query 4");
        assert_eq!(page1.total_pages, 3);
        assert!(page1.has_next);
        assert!(!page1.has_prev);

        let page3 = store.list_for_user("u1", 3, 2).await.unwrap();
        assert_eq!(page3.interactions.len(), 1);
        assert_eq!(page3.interactions[0].query, "query 0");
        assert!(!page3.has_next);
        assert!(page3.has_prev);
    }

    #[tokio::test]
    async fn test_feedback_requires_ownership_and_valid_rating() {
        let store = test_store();
        let inserted = store.insert(sample(Some("u1"), "q")).await.unwrap();

        let feedback = Feedback {
            helpful: Some(true),
            rating: Some(4),
            comment: Some("clear answer".to_string()),
        };

        // Wrong owner
        assert!(matches!(
            store.attach_feedback(&inserted.id, "u2", feedback.clone()).await,
            Err(AppError::NotFound(_))
        ));

        // Out-of-range rating
        let bad = Feedback { rating: Some(6), ..Feedback::default() };
        assert!(store.attach_feedback(&inserted.id, "u1", bad).await.is_err());

        let updated = store.attach_feedback(&inserted.id, "u1", feedback).await.unwrap();
        assert_eq!(updated.feedback.as_ref().and_then(|f| f.rating), Some(4));

        let fetched = store.get(&inserted.id).await.unwrap();
        assert_eq!(fetched.feedback.and_then(|f| f.rating), Some(4));
    }

    #[tokio::test]
    async fn test_clear_for_user_only_removes_their_rows() {
        let store = test_store();
        store.insert(sample(Some("u1"), "a")).await.unwrap();
        store.insert(sample(Some("u1"), "b")).await.unwrap();
        let kept = store.insert(sample(Some("u2"), "c")).await.unwrap();

        assert_eq!(store.clear_for_user("u1").await.unwrap(), 2);
        assert!(store.get(&kept.id).await.is_ok());
        assert!(store.list_for_user("u1", 1, 10).await.unwrap().interactions.is_empty());
    }

    #[tokio::test]
    async fn test_analytics_aggregates() {
        let store = test_store();

        let empty = store.analytics().await.unwrap();
        assert_eq!(empty.total_interactions, 0);
        assert!(empty.average_confidence.is_none());

        store.insert(sample(Some("u1"), "a")).await.unwrap();
        let mut sw = sample(Some("u1"), "b");
        sw.language = "sw".to_string();
        sw.confidence = Some(0.4);
        store.insert(sw).await.unwrap();

        let stats = store.analytics().await.unwrap();
        assert_eq!(stats.total_interactions, 2);
        let avg = stats.average_confidence.unwrap();
        assert!((avg - 0.6).abs() < 1e-9);
        assert_eq!(stats.language_counts.get("en"), Some(&1));
        assert_eq!(stats.language_counts.get("sw"), Some(&1));
    }
}
