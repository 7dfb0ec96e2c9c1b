//! Ask command handler.
//!
//! Runs a question through the full query pipeline: relevance search,
//! prompt composition, LLM completion, and background logging.

use assist_core::{config::AppConfig, AppError, AppResult};
use assist_llm::create_client;
use assist_pipeline::{Assistant, InteractionLogger};
use assist_store::{Database, SqliteInformationStore, SqliteInteractionStore};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Ask the assistant a question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: Option<String>,

    /// Read the question from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Response language code (en, sw, lg, ...)
    #[arg(short, long, default_value = "en")]
    pub language: String,

    /// Attribute and log the interaction to this user id
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let query = self
            .get_query()
            .ok_or_else(|| AppError::Config("No question provided".to_string()))?;

        config.validate()?;

        // Wire up the pipeline
        let db = Database::open(&config.db_path())?;
        let info_store = Arc::new(SqliteInformationStore::new(db.clone()));
        let interaction_store = Arc::new(SqliteInteractionStore::new(db));

        let endpoint = config.resolve_endpoint(&config.provider);
        let api_key = config.resolve_api_key(&config.provider);
        let llm = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())?;

        let logger = InteractionLogger::spawn(interaction_store);
        let assistant = Assistant::new(info_store, llm, logger, &config.model);

        let outcome = assistant
            .process_query(&query, &self.language, self.user_id.as_deref())
            .await;

        // Flush queued interaction writes before printing
        assistant.close().await;

        if self.json {
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", outcome.response);

            if !outcome.sources.is_empty() {
                println!();
                println!("Sources:");
                for source in &outcome.sources {
                    println!("  - {}", source.title);
                }
            }

            if let Some(ms) = outcome.processing_time_ms {
                tracing::debug!("Answered in {} ms", ms);
            }
        }

        if outcome.error {
            tracing::warn!("Query fell back to the apology response");
        }

        Ok(())
    }

    /// Get the question text from the positional argument or a file.
    fn get_query(&self) -> Option<String> {
        self.query.clone().or_else(|| {
            self.file.as_ref().and_then(|path| {
                std::fs::read_to_string(path)
                    .map_err(|e| tracing::error!("Failed to read question file: {}", e))
                    .ok()
                    .map(|s| s.trim().to_string())
            })
        })
    }
}
