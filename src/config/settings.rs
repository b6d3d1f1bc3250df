//! Application settings and Telegram configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Telegram API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Telegram API ID (obtain from <https://my.telegram.org>).
    pub api_id: i32,

    /// Telegram API hash (obtain from <https://my.telegram.org>).
    pub api_hash: String,

    /// Path to the session file.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("session.db")
}

impl TelegramConfig {
    /// Creates a new Telegram configuration.
    #[must_use]
    pub fn new(api_id: i32, api_hash: String) -> Self {
        Self {
            api_id,
            api_hash,
            session_path: default_session_path(),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TG_API_ID` and `TG_API_HASH` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_id: i32 = std::env::var("TG_API_ID")
            .map_err(|_| ConfigError::MissingEnvVar("TG_API_ID"))?
            .parse()
            .map_err(|_| ConfigError::InvalidApiId)?;

        let api_hash = std::env::var("TG_API_HASH")
            .map_err(|_| ConfigError::MissingEnvVar("TG_API_HASH"))?;

        let session_path =
            std::env::var("TG_SESSION_PATH").map_or_else(|_| default_session_path(), PathBuf::from);

        Ok(Self {
            api_id,
            api_hash,
            session_path,
        })
    }
}

/// Validated bot token issued by `@BotFather`.
///
/// Tokens look like `1234567890:ABCdefGhIJKlmNoPQRsTUVwxyZ`; the format
/// check mirrors that shape (a `:` separator, minimum length).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    /// Minimum plausible token length.
    const MIN_LEN: usize = 20;

    /// Validates and wraps a raw token string.
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        let raw = raw.trim().to_owned();
        if raw.len() < Self::MIN_LEN || !raw.contains(':') {
            return Err(ConfigError::InvalidToken);
        }
        Ok(Self(raw))
    }

    /// Reads the raw token from the `BOT_TOKEN` environment variable,
    /// if present. The value is not yet validated.
    #[must_use]
    pub fn raw_from_env() -> Option<String> {
        std::env::var("BOT_TOKEN").ok().filter(|t| !t.is_empty())
    }

    /// The full token, for signing in.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A masked form safe for logs (first 10 characters only).
    #[must_use]
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(10).collect();
        format!("{prefix}...")
    }
}

/// Bot-specific runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Path to the SQLite task database.
    pub db_path: PathBuf,

    /// Minimum interval between outgoing messages in seconds
    /// (flood protection).
    #[serde(default = "default_min_send_interval")]
    pub min_send_interval_secs: u64,

    /// Log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tasks.db")
}

fn default_min_send_interval() -> u64 {
    1
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            min_send_interval_secs: default_min_send_interval(),
            log_level: default_log_level(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            db_path: std::env::var("TASKS_DB_PATH")
                .map_or_else(|_| default_db_path(), PathBuf::from),
            min_send_interval_secs: std::env::var("MIN_SEND_INTERVAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_min_send_interval),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| default_log_level()),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid API ID format (must be a positive integer)")]
    InvalidApiId,

    #[error(
        "Invalid bot token format (expected something like 1234567890:ABCdefGhIJKlmNoPQRsTUVwxyZ \
         from @BotFather)"
    )]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = BotSettings::default();
        assert_eq!(settings.db_path, PathBuf::from("tasks.db"));
        assert_eq!(settings.min_send_interval_secs, 1);
    }

    #[test]
    fn test_telegram_config_new() {
        let config = TelegramConfig::new(12345, "abc123".to_owned());
        assert_eq!(config.api_id, 12345);
        assert_eq!(config.api_hash, "abc123");
        assert_eq!(config.session_path, PathBuf::from("session.db"));
    }

    #[test]
    fn test_token_accepts_botfather_shape() {
        let token = BotToken::new("1234567890:ABCdefGhIJKlmNoPQRsTUVwxyZ").unwrap();
        assert_eq!(token.as_str(), "1234567890:ABCdefGhIJKlmNoPQRsTUVwxyZ");
    }

    #[test]
    fn test_token_rejects_missing_separator() {
        assert!(BotToken::new("1234567890ABCdefGhIJKlmNoPQRsTUVwxyZ").is_err());
    }

    #[test]
    fn test_token_rejects_short_values() {
        assert!(BotToken::new("12:abc").is_err());
        assert!(BotToken::new("").is_err());
    }

    #[test]
    fn test_token_trims_whitespace() {
        let token = BotToken::new("  1234567890:ABCdefGhIJKlmNoPQRsTUVwxyZ \n").unwrap();
        assert!(!token.as_str().contains(' '));
    }

    #[test]
    fn test_token_masked_hides_tail() {
        let token = BotToken::new("1234567890:ABCdefGhIJKlmNoPQRsTUVwxyZ").unwrap();
        assert_eq!(token.masked(), "1234567890...");
        assert!(!token.masked().contains("ABCdef"));
    }
}
