//! Stats command handler.
//!
//! Displays aggregate interaction analytics.

use assist_core::{config::AppConfig, AppError, AppResult};
use assist_store::{Database, InteractionStore, SqliteInteractionStore};
use clap::Args;

/// Show interaction analytics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let db = Database::open(&config.db_path())?;
        let store = SqliteInteractionStore::new(db);
        let stats = store.analytics().await?;

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Total interactions: {}", stats.total_interactions);

            if let Some(confidence) = stats.average_confidence {
                println!("Average confidence: {:.2}", confidence);
            }
            if let Some(ms) = stats.average_processing_time_ms {
                println!("Average processing time: {:.0} ms", ms);
            }

            if !stats.language_counts.is_empty() {
                println!("By language:");
                let mut languages: Vec<_> = stats.language_counts.iter().collect();
                languages.sort_by(|a, b| b.1.cmp(a.1));
                for (language, count) in languages {
                    println!("  {}: {}", language, count);
                }
            }
        }

        Ok(())
    }
}
