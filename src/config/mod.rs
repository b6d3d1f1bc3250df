//! Configuration module for the task bot.
//!
//! Handles environment-based configuration: Telegram API credentials,
//! the bot token, and runtime settings such as the database path.

mod settings;

pub use settings::{BotSettings, BotToken, ConfigError, TelegramConfig};

/// Maximum pending tasks shown by a single `/tasks` reply.
pub const TASK_PAGE_SIZE: usize = 10;

/// Maximum completed tasks shown by `/completed`.
pub const COMPLETED_PAGE_SIZE: usize = 8;

/// Maximum results shown by `/search`.
pub const SEARCH_PAGE_SIZE: usize = 8;

/// Maximum entries shown by `/deadlines`.
pub const DEADLINE_PAGE_SIZE: usize = 12;

/// How far ahead `/deadlines` looks, in days.
pub const DEADLINE_WINDOW_DAYS: i64 = 14;

/// Largest `/export` payload sent inline; bigger exports get a notice.
pub const EXPORT_INLINE_LIMIT: usize = 3500;
