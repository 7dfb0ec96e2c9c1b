//! Info command handler.
//!
//! Manages information records: create, list, show, search, verify,
//! and retire.

use assist_core::{config::AppConfig, AppError, AppResult};
use assist_store::types::{
    Audience, Category, Location, LocalizedText, NewInformationRecord, Priority,
    UpdateInformation,
};
use assist_store::{Database, InformationStore, SqliteInformationStore};
use clap::{Args, Subcommand};

/// Manage information records
#[derive(Args, Debug)]
pub struct InfoCommand {
    #[command(subcommand)]
    pub action: InfoAction,
}

#[derive(Subcommand, Debug)]
pub enum InfoAction {
    /// Add a new record (English title and content required)
    Add {
        /// English title
        #[arg(long)]
        title: String,

        /// English content
        #[arg(long)]
        content: String,

        /// Category (registration, legal_rights, healthcare, ...)
        #[arg(long)]
        category: String,

        /// Priority (low, medium, high, urgent)
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Tags, repeatable
        #[arg(short, long)]
        tag: Vec<String>,

        /// Record applies nationwide
        #[arg(long)]
        national: bool,

        /// Author user id
        #[arg(long)]
        by: String,
    },

    /// List active records
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Records per page
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one record and count the view
    Show {
        /// Record id
        id: String,

        /// Language for title and content
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Full-text relevance search over active records
    Search {
        /// Search text
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "3")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a record as verified
    Verify {
        /// Record id
        id: String,

        /// Verifying user id
        #[arg(long)]
        by: String,
    },

    /// Retire a record (soft delete)
    Retire {
        /// Record id
        id: String,

        /// Acting user id
        #[arg(long)]
        by: String,
    },
}

impl InfoCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing info command");

        let db = Database::open(&config.db_path())?;
        let store = SqliteInformationStore::new(db);

        match &self.action {
            InfoAction::Add {
                title,
                content,
                category,
                priority,
                tag,
                national,
                by,
            } => {
                let record = store
                    .create(NewInformationRecord {
                        title: LocalizedText::english(title),
                        content: LocalizedText::english(content),
                        category: Category::parse(category)?,
                        target_audience: vec![Audience::All],
                        priority: Priority::parse(priority)?,
                        location: Location {
                            districts: Vec::new(),
                            settlements: Vec::new(),
                            is_national: *national,
                        },
                        tags: tag.clone(),
                        created_by: by.clone(),
                    })
                    .await?;

                println!("Created record {}", record.id);
            }

            InfoAction::List {
                category,
                page,
                limit,
                json,
            } => {
                let filter = category.as_deref().map(Category::parse).transpose()?;
                let records = store.list(filter, *page, *limit).await?;

                if *json {
                    let json = serde_json::to_string_pretty(&records)
                        .map_err(|e| AppError::Serialization(e.to_string()))?;
                    println!("{}", json);
                } else if records.is_empty() {
                    println!("No records found");
                } else {
                    for record in &records {
                        let verified = if record.is_verified { " [verified]" } else { "" };
                        println!(
                            "{}  {} ({}){}",
                            record.id,
                            record.title.en,
                            record.category.as_str(),
                            verified
                        );
                    }
                }
            }

            InfoAction::Show { id, language, json } => {
                let record = store.get(id).await?;
                store.record_view(id).await?;

                if *json {
                    let json = serde_json::to_string_pretty(&record)
                        .map_err(|e| AppError::Serialization(e.to_string()))?;
                    println!("{}", json);
                } else {
                    println!("{}", record.title.resolve(language));
                    println!();
                    println!("{}", record.content.resolve(language));
                    println!();
                    println!(
                        "category: {}  priority: {}  views: {}  likes: {}",
                        record.category.as_str(),
                        record.priority.as_str(),
                        record.views + 1,
                        record.likes.len()
                    );
                }
            }

            InfoAction::Search { query, limit, json } => {
                let results = store.search_relevant(query, *limit).await?;

                if *json {
                    let payload: Vec<serde_json::Value> = results
                        .iter()
                        .map(|(record, score)| {
                            serde_json::json!({ "record": record, "score": score })
                        })
                        .collect();
                    let json = serde_json::to_string_pretty(&payload)
                        .map_err(|e| AppError::Serialization(e.to_string()))?;
                    println!("{}", json);
                } else if results.is_empty() {
                    println!("No matching records");
                } else {
                    for (record, score) in &results {
                        println!("{:.3}  {}  {}", score, record.id, record.title.en);
                    }
                }
            }

            InfoAction::Verify { id, by } => {
                store
                    .update(
                        id,
                        UpdateInformation {
                            is_verified: Some(true),
                            updated_by: Some(by.clone()),
                            ..UpdateInformation::default()
                        },
                    )
                    .await?;
                println!("Record {} marked verified", id);
            }

            InfoAction::Retire { id, by } => {
                store.retire(id, by).await?;
                println!("Record {} retired", id);
            }
        }

        Ok(())
    }
}
