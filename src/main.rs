//! Task Manager Bot - Main Entry Point
//!
//! A Telegram bot that manages personal task lists: add tasks with
//! tags, priorities, and due dates, then complete, search, and review
//! them through slash commands.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Confirm, Input};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use task_manager_bot::config::{BotSettings, BotToken, TelegramConfig};
use task_manager_bot::dispatch::{ControlMessage, Dispatcher, ReminderScheduler};
use task_manager_bot::storage::Store;
use task_manager_bot::telegram::TelegramBot;

/// Telegram bot for personal task management.
#[derive(Parser, Debug)]
#[command(name = "task_bot")]
#[command(about = "Manage your tasks through a Telegram bot")]
#[command(version)]
struct Args {
    /// Bot token from @BotFather (overrides the BOT_TOKEN environment variable).
    token: Option<String>,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Path to the SQLite task database (overrides TASKS_DB_PATH).
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let mut settings = BotSettings::from_env_with_defaults();
    if let Some(db) = args.db {
        settings.db_path = db;
    }

    let token = resolve_token(args.token, &args.env_file)?;
    info!("Bot token loaded ({})", token.masked());

    // Open the task database
    let store = Arc::new(
        Store::open(&settings.db_path)
            .with_context(|| format!("Failed to open task database {}", settings.db_path.display()))?,
    );
    info!("Task database ready: {}", settings.db_path.display());

    // Connect to Telegram
    let bot = TelegramBot::connect(&tg_config, settings.min_send_interval_secs)
        .await
        .context("Failed to connect to Telegram")?;

    // Handle authentication if needed
    if !bot.is_authorized().await.context("Failed to check authorization")? {
        bot.sign_in_bot(&token, &tg_config.session_path)
            .await
            .context("Bot sign in failed")?;
    }

    match bot.me().await {
        Ok(me) => info!(
            "Running as @{}",
            me.username().unwrap_or("<no username>")
        ),
        Err(e) => warn!("Could not fetch bot identity: {}", e),
    }

    let bot = Arc::new(bot);

    // Create control channels
    let (reminder_tx, reminder_rx) = mpsc::channel::<ControlMessage>(4);
    let (dispatch_tx, dispatch_rx) = mpsc::channel::<ControlMessage>(4);

    // Spawn the reminder scheduler
    let scheduler = ReminderScheduler::new(Arc::clone(&bot), Arc::clone(&store));
    let scheduler_handle = tokio::spawn(scheduler.run(reminder_rx));

    // Spawn the update dispatcher
    let dispatcher = Dispatcher::new(Arc::clone(&bot), Arc::clone(&store));
    let mut dispatcher_handle = tokio::spawn(async move { dispatcher.run(dispatch_rx).await });

    info!("Bot is running. Use Ctrl+C to stop.");

    let mut stream_failed = false;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        result = &mut dispatcher_handle => {
            match result {
                Ok(Ok(())) => info!("Update stream ended"),
                Ok(Err(e)) => {
                    tracing::error!("Update stream failed: {}", e);
                    stream_failed = true;
                }
                Err(e) => {
                    tracing::error!("Dispatcher task panicked: {}", e);
                    stream_failed = true;
                }
            }
        }
    }

    // Cleanup
    info!("Shutting down...");
    let _ = dispatch_tx.send(ControlMessage::Shutdown).await;
    let _ = reminder_tx.send(ControlMessage::Shutdown).await;
    if !dispatcher_handle.is_finished() {
        let _ = dispatcher_handle.await;
    }
    let _ = scheduler_handle.await;

    if let Err(e) = bot.save_session(&tg_config.session_path) {
        warn!("Failed to save session on shutdown: {}", e);
    }

    if stream_failed {
        anyhow::bail!("update stream terminated with an error");
    }
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves the bot token: environment first, then the CLI argument,
/// then an interactive prompt with an offer to persist it.
fn resolve_token(cli_token: Option<String>, env_file: &str) -> Result<BotToken> {
    if let Some(raw) = BotToken::raw_from_env() {
        return BotToken::new(raw).context("BOT_TOKEN environment variable is malformed");
    }

    if let Some(raw) = cli_token {
        return BotToken::new(raw).context("Token argument is malformed");
    }

    println!("🔒 Bot token not found!");
    println!("\nTo configure your bot token:");
    println!("1. Message @BotFather on Telegram and create a bot");
    println!("2. Put the token in {env_file} as: BOT_TOKEN=your_token_here");
    println!("3. Or enter it now\n");

    let raw: String = Input::new()
        .with_prompt("Bot token")
        .interact_text()
        .context("Failed to read token from terminal")?;

    let token = BotToken::new(raw).context("Entered token is malformed")?;

    let save = Confirm::new()
        .with_prompt(format!("Save the token to {env_file} for next time?"))
        .default(false)
        .interact()
        .unwrap_or(false);

    if save {
        append_token_to_env(env_file, &token)?;
        println!("✓ Token saved to {env_file}");
        println!("⚠ Keep {env_file} out of version control!");
    }

    Ok(token)
}

/// Appends a `BOT_TOKEN` line to the given .env file.
fn append_token_to_env(path: &str, token: &BotToken) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {path}"))?;

    writeln!(file, "BOT_TOKEN={}", token.as_str())?;
    Ok(())
}
