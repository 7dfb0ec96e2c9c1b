//! RefugeeAssist CLI
//!
//! Main entry point for the refugee-assist command-line tool.
//! Provides the AI query pipeline, information record management, and
//! interaction history over a local SQLite database.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, HistoryCommand, InfoCommand, StatsCommand, UserCommand};
use assist_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// RefugeeAssist CLI - multilingual assistance for refugees in Uganda
#[derive(Parser, Debug)]
#[command(name = "refugee-assist")]
#[command(about = "Multilingual AI assistance for refugees in Uganda", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory (default: .assist)
    #[arg(short, long, global = true, env = "ASSIST_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "ASSIST_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "ASSIST_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "ASSIST_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the assistant a question
    Ask(AskCommand),

    /// Browse or clear a user's interaction history
    History(HistoryCommand),

    /// Manage information records
    Info(InfoCommand),

    /// Manage user accounts
    User(UserCommand),

    /// Show interaction analytics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.data_dir,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    // Log startup
    tracing::info!("RefugeeAssist CLI starting");
    tracing::debug!("Data dir: {:?}", config.data_dir);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    // Ensure the data directory exists
    config.ensure_data_dir()?;

    // Emit command span
    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::History(_) => "history",
        Commands::Info(_) => "info",
        Commands::User(_) => "user",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::History(cmd) => cmd.execute(&config).await,
        Commands::Info(cmd) => cmd.execute(&config).await,
        Commands::User(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
