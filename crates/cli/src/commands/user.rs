//! User command handler.
//!
//! Admin tooling for user accounts. Password hashing belongs to the web
//! surface; registration here accepts a precomputed hash.

use assist_core::{config::AppConfig, AppError, AppResult};
use assist_store::types::{NewUser, RefugeeStatus};
use assist_store::{Database, SqliteUserStore, UserStore};
use clap::{Args, Subcommand};

/// Manage user accounts
#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Register a new user
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        /// Precomputed password hash
        #[arg(long)]
        password_hash: String,

        /// Preferred language code
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Status (asylum_seeker, refugee, returnee, other)
        #[arg(long, default_value = "refugee")]
        status: String,

        #[arg(long)]
        country_of_origin: Option<String>,

        #[arg(long)]
        district: Option<String>,

        #[arg(long)]
        settlement: Option<String>,
    },

    /// Show a user account
    Show {
        /// User id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deactivate a user account
    Deactivate {
        /// User id
        id: String,
    },
}

impl UserCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing user command");

        let db = Database::open(&config.db_path())?;
        let store = SqliteUserStore::new(db);

        match &self.action {
            UserAction::Register {
                first_name,
                last_name,
                email,
                phone,
                password_hash,
                language,
                status,
                country_of_origin,
                district,
                settlement,
            } => {
                let user = store
                    .create(NewUser {
                        first_name: first_name.clone(),
                        last_name: last_name.clone(),
                        email: email.clone(),
                        phone: phone.clone(),
                        password_hash: password_hash.clone(),
                        preferred_language: language.clone(),
                        refugee_status: RefugeeStatus::parse(status)?,
                        country_of_origin: country_of_origin.clone(),
                        district: district.clone(),
                        settlement: settlement.clone(),
                    })
                    .await?;

                println!("Registered user {}", user.id);
            }

            UserAction::Show { id, json } => {
                let user = store.get(id).await?;

                if *json {
                    // password_hash is skipped by the serializer
                    let json = serde_json::to_string_pretty(&user)
                        .map_err(|e| AppError::Serialization(e.to_string()))?;
                    println!("{}", json);
                } else {
                    println!("{} {} <{}>", user.first_name, user.last_name, user.email);
                    println!(
                        "status: {}  language: {}  active: {}",
                        user.refugee_status.as_str(),
                        user.preferred_language,
                        user.is_active
                    );
                    if let Some(settlement) = &user.settlement {
                        println!("settlement: {}", settlement);
                    }
                }
            }

            UserAction::Deactivate { id } => {
                store.deactivate(id).await?;
                println!("User {} deactivated", id);
            }
        }

        Ok(())
    }
}
