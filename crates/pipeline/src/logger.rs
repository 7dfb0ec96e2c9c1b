//! Asynchronous interaction logger.
//!
//! Persisting an interaction must never block or fail a query, so
//! writes are enqueued on a channel and drained by a background task.
//! A failed write is logged and dropped.

use assist_store::types::NewInteraction;
use assist_store::InteractionStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to the background interaction writer.
pub struct InteractionLogger {
    tx: mpsc::UnboundedSender<NewInteraction>,
    handle: JoinHandle<()>,
}

impl InteractionLogger {
    /// Spawn the writer task against the given store.
    pub fn spawn(store: Arc<dyn InteractionStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<NewInteraction>();

        let handle = tokio::spawn(async move {
            while let Some(interaction) = rx.recv().await {
                if let Err(e) = store.insert(interaction).await {
                    tracing::warn!("Failed to log interaction: {}", e);
                }
            }
        });

        Self { tx, handle }
    }

    /// Enqueue an interaction without waiting for the write.
    pub fn log(&self, interaction: NewInteraction) {
        if self.tx.send(interaction).is_err() {
            tracing::warn!("Interaction logger is closed; dropping entry");
        }
    }

    /// Close the channel and wait for queued writes to finish.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            tracing::warn!("Interaction writer task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_store::{Database, SqliteInteractionStore};

    fn sample(query: &str) -> NewInteraction {
        NewInteraction {
            user_id: Some("u1".to_string()),
            session_id: None,
            query: query.to_string(),
            response: "answer".to_string(),
            language: "en".to_string(),
            context: None,
            confidence: None,
            sources: vec![],
            processing_time_ms: 10,
        }
    }

    #[tokio::test]
    async fn test_logged_entries_are_persisted_on_close() {
        let store = Arc::new(SqliteInteractionStore::new(
            Database::open_in_memory().unwrap(),
        ));
        let logger = InteractionLogger::spawn(store.clone());

        logger.log(sample("first"));
        logger.log(sample("second"));
        logger.close().await;

        let page = store.list_for_user("u1", 1, 10).await.unwrap();
        assert_eq!(page.interactions.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_entry_is_dropped_not_fatal() {
        let store = Arc::new(SqliteInteractionStore::new(
            Database::open_in_memory().unwrap(),
        ));
        let logger = InteractionLogger::spawn(store.clone());

        let mut bad = sample("q");
        bad.response = String::new();
        logger.log(bad);
        logger.log(sample("good"));
        logger.close().await;

        let page = store.list_for_user("u1", 1, 10).await.unwrap();
        assert_eq!(page.interactions.len(), 1);
        assert_eq!(page.interactions[0].query, "good");
    }
}
