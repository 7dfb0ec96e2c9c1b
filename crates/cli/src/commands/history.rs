//! History command handler.
//!
//! Pages through a user's logged interactions, attaches feedback, or
//! clears their history.

use assist_core::{config::AppConfig, AppError, AppResult};
use assist_store::types::Feedback;
use assist_store::{Database, InteractionStore, SqliteInteractionStore};
use clap::{Args, Subcommand};

/// Browse or clear a user's interaction history
#[derive(Args, Debug)]
pub struct HistoryCommand {
    #[command(subcommand)]
    pub action: HistoryAction,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List a user's interactions, newest first
    List {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Interactions per page
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Attach feedback to an interaction
    Feedback {
        /// Interaction id
        id: String,

        /// User id (must own the interaction)
        #[arg(short, long)]
        user: String,

        /// Whether the answer was helpful
        #[arg(long)]
        helpful: Option<bool>,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: Option<u8>,

        /// Free-text comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete all interactions for a user
    Clear {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl HistoryCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing history command");

        let db = Database::open(&config.db_path())?;
        let store = SqliteInteractionStore::new(db);

        match &self.action {
            HistoryAction::List {
                user,
                page,
                limit,
                json,
            } => {
                let history = store.list_for_user(user, *page, *limit).await?;

                if *json {
                    let json = serde_json::to_string_pretty(&history)
                        .map_err(|e| AppError::Serialization(e.to_string()))?;
                    println!("{}", json);
                } else if history.interactions.is_empty() {
                    println!("No interactions found for user {}", user);
                } else {
                    for interaction in &history.interactions {
                        println!(
                            "[{}] ({}) {}",
                            interaction.timestamp.format("%Y-%m-%d %H:%M"),
                            interaction.language,
                            interaction.query
                        );
                        println!("    {}", interaction.response);
                        println!("    id: {}", interaction.id);
                    }
                    println!();
                    println!(
                        "Page {} of {} ({} shown)",
                        history.current,
                        history.total_pages,
                        history.interactions.len()
                    );
                }
            }

            HistoryAction::Feedback {
                id,
                user,
                helpful,
                rating,
                comment,
            } => {
                if helpful.is_none() && rating.is_none() && comment.is_none() {
                    return Err(AppError::Config(
                        "Provide at least one of --helpful, --rating, --comment".to_string(),
                    ));
                }

                let feedback = Feedback {
                    helpful: *helpful,
                    rating: *rating,
                    comment: comment.clone(),
                };

                store.attach_feedback(id, user, feedback).await?;
                println!("Feedback recorded for interaction {}", id);
            }

            HistoryAction::Clear { user, yes } => {
                if !*yes {
                    return Err(AppError::Config(
                        "Clearing history is irreversible; pass --yes to confirm".to_string(),
                    ));
                }

                let removed = store.clear_for_user(user).await?;
                println!("Removed {} interactions for user {}", removed, user);
            }
        }

        Ok(())
    }
}
