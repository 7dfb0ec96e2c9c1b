//! Query pipeline: retrieve, compose, complete, log.

use crate::logger::InteractionLogger;
use crate::outcome::QueryOutcome;
use crate::prompt::{compose_prompt, SYSTEM_PROMPT};
use assist_llm::{LlmClient, LlmRequest};
use assist_store::types::{InformationRecord, NewInteraction, SourceRef};
use assist_store::InformationStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

/// Records retrieved per query.
const TOP_K: usize = 3;

/// Sampling temperature for answers.
const TEMPERATURE: f32 = 0.7;

/// Completion token budget.
const MAX_TOKENS: u32 = 500;

/// The assistant pipeline.
///
/// Owns the retrieval store, the completion client, and the background
/// interaction logger. `process_query` is infallible; every failure
/// path produces a fallback outcome instead of an error.
pub struct Assistant {
    info_store: Arc<dyn InformationStore>,
    llm: Arc<dyn LlmClient>,
    logger: InteractionLogger,
    model: String,
}

impl Assistant {
    pub fn new(
        info_store: Arc<dyn InformationStore>,
        llm: Arc<dyn LlmClient>,
        logger: InteractionLogger,
        model: impl Into<String>,
    ) -> Self {
        Self {
            info_store,
            llm,
            logger,
            model: model.into(),
        }
    }

    /// Answer a query in the requested language.
    ///
    /// Retrieval failures degrade to an answer without context; a
    /// completion failure produces the localized fallback with `error`
    /// set. When `user_id` is present the interaction is logged in the
    /// background after a successful completion.
    pub async fn process_query(
        &self,
        query: &str,
        language: &str,
        user_id: Option<&str>,
    ) -> QueryOutcome {
        let start = Instant::now();

        let records = match self.info_store.search_relevant(query, TOP_K).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Relevance search failed, answering without context: {}", e);
                Vec::new()
            }
        };

        let prompt = compose_prompt(
            query,
            language,
            &records.iter().map(|(r, _)| r.clone()).collect::<Vec<_>>(),
        );

        let request = LlmRequest::new(prompt, &self.model)
            .with_system(SYSTEM_PROMPT)
            .with_temperature(TEMPERATURE)
            .with_max_tokens(MAX_TOKENS);

        let response = match self.llm.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Completion failed: {}", e);
                return QueryOutcome::fallback(language);
            }
        };

        let processing_time_ms = start.elapsed().as_millis() as u64;
        let sources = citations(&records, language);
        let confidence = records.first().map(|(_, score)| squash(*score));

        if let Some(user_id) = user_id {
            self.logger.log(NewInteraction {
                user_id: Some(user_id.to_string()),
                session_id: None,
                query: query.to_string(),
                response: response.content.clone(),
                language: language.to_string(),
                context: None,
                confidence,
                sources: sources.clone(),
                processing_time_ms,
            });
        }

        QueryOutcome {
            response: response.content,
            sources,
            confidence,
            processing_time_ms: Some(processing_time_ms),
            language: Some(language.to_string()),
            timestamp: Utc::now(),
            error: false,
        }
    }

    /// Flush queued interaction writes and stop the logger.
    pub async fn close(self) {
        self.logger.close().await;
    }
}

/// Localized citations for retrieved records.
fn citations(records: &[(InformationRecord, f64)], language: &str) -> Vec<SourceRef> {
    records
        .iter()
        .map(|(record, _)| SourceRef::database(record.title.resolve(language)))
        .collect()
}

/// Map an unbounded relevance score into (0, 1).
fn squash(score: f64) -> f64 {
    let score = score.max(0.0);
    score / (score + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squash_is_monotonic_and_bounded() {
        assert_eq!(squash(0.0), 0.0);
        assert!(squash(1.0) < squash(4.0));
        assert!(squash(1000.0) < 1.0);
        // Negative scores clamp to zero
        assert_eq!(squash(-2.0), 0.0);
    }
}
