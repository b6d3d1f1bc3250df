//! Telegram client wrapper for the task bot.

use std::path::Path;

use grammers_client::types::{Message, User};
use grammers_client::{Client, Config, InitParams, InputMessage, InvocationError, Update};
use grammers_session::{PackedChat, Session};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::RateLimiter;
use crate::config::{BotToken, TelegramConfig};

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Sign in failed: {0}")]
    SignInFailed(String),

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Stored peer for user {0} is invalid")]
    InvalidPeer(i64),

    #[error("API invocation error: {0}")]
    Invocation(String),
}

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        let err_str = err.to_string();

        // Check for flood wait errors
        if (err_str.contains("FLOOD_WAIT") || err_str.contains("flood"))
            && let Some(seconds) = extract_flood_wait_seconds(&err_str)
        {
            return Self::FloodWait(seconds);
        }

        Self::Invocation(err_str)
    }
}

/// Extracts flood wait seconds from an error message.
fn extract_flood_wait_seconds(err_msg: &str) -> Option<u32> {
    let patterns = ["FLOOD_WAIT_", "flood wait "];

    for pattern in patterns {
        if let Some(idx) = err_msg.to_lowercase().find(&pattern.to_lowercase()) {
            let start = idx + pattern.len();
            let num_str: String = err_msg[start..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(seconds) = num_str.parse() {
                return Some(seconds);
            }
        }
    }
    None
}

/// High-level Telegram client wrapper.
pub struct TelegramBot {
    /// The underlying grammers client.
    client: Client,

    /// Rate limiter for outgoing messages.
    rate_limiter: RateLimiter,
}

impl TelegramBot {
    /// Connects to Telegram with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if connection fails.
    pub async fn connect(
        config: &TelegramConfig,
        min_send_interval_secs: u64,
    ) -> Result<Self, TelegramError> {
        info!("Connecting to Telegram...");

        let session = Session::load_file_or_create(&config.session_path)
            .map_err(|e| TelegramError::Session(e.to_string()))?;

        let client = Client::connect(Config {
            session,
            api_id: config.api_id,
            api_hash: config.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| TelegramError::Connection(e.to_string()))?;

        let is_authorized = client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))?;

        info!("Connected to Telegram. Authorized: {}", is_authorized);

        Ok(Self {
            client,
            rate_limiter: RateLimiter::from_secs(min_send_interval_secs),
        })
    }

    /// Checks if the client is authorized.
    pub async fn is_authorized(&self) -> Result<bool, TelegramError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))
    }

    /// Signs in as a bot with the given token, persisting the session.
    pub async fn sign_in_bot(
        &self,
        token: &BotToken,
        session_path: &Path,
    ) -> Result<(), TelegramError> {
        info!("Signing in with bot token {}", token.masked());

        self.client
            .bot_sign_in(token.as_str())
            .await
            .map_err(|e| TelegramError::SignInFailed(e.to_string()))?;

        self.save_session(session_path)?;
        info!("Bot signed in, session saved");
        Ok(())
    }

    /// Saves the current session to disk.
    pub fn save_session(&self, path: &Path) -> Result<(), TelegramError> {
        self.client
            .session()
            .save_to_file(path)
            .map_err(|e| TelegramError::Session(e.to_string()))
    }

    /// Returns the bot's own account info.
    pub async fn me(&self) -> Result<User, TelegramError> {
        Ok(self.client.get_me().await?)
    }

    /// Waits for the next update from Telegram.
    pub async fn next_update(&self) -> Result<Update, TelegramError> {
        Ok(self.client.next_update().await?)
    }

    /// Replies to a message, respecting the send rate limit.
    pub async fn reply(&self, message: &Message, text: &str) -> Result<(), TelegramError> {
        let waited = self.rate_limiter.wait_and_acquire().await;
        if !waited.is_zero() {
            debug!("Waited {:?} for send rate limit", waited);
        }

        match message.reply(InputMessage::text(text)).await {
            Ok(_sent) => Ok(()),
            Err(e) => {
                let err: TelegramError = e.into();
                if let TelegramError::FloodWait(seconds) = &err {
                    warn!("Flood wait triggered on reply: {} seconds", seconds);
                    self.rate_limiter.handle_flood_wait(*seconds).await;
                }
                Err(err)
            }
        }
    }

    /// Sends a message to a stored peer (used by the reminder scheduler).
    pub async fn send_to(&self, chat: PackedChat, text: &str) -> Result<(), TelegramError> {
        let waited = self.rate_limiter.wait_and_acquire().await;
        if !waited.is_zero() {
            debug!("Waited {:?} for send rate limit", waited);
        }

        match self.client.send_message(chat, InputMessage::text(text)).await {
            Ok(_sent) => Ok(()),
            Err(e) => {
                let err: TelegramError = e.into();
                if let TelegramError::FloodWait(seconds) = &err {
                    warn!("Flood wait triggered on send: {} seconds", seconds);
                    self.rate_limiter.handle_flood_wait(*seconds).await;
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

/// Deserializes a peer stored in the users table.
pub fn unpack_chat(user_id: i64, bytes: &[u8]) -> Result<PackedChat, TelegramError> {
    PackedChat::from_bytes(bytes).map_err(|_| TelegramError::InvalidPeer(user_id))
}
