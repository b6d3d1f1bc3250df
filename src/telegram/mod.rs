//! Telegram client wrapper module.
//!
//! Provides high-level abstractions for interacting with Telegram,
//! including bot sign-in, the update stream, and rate-limited sends.

mod client;
mod rate_limiter;

pub use client::{unpack_chat, TelegramBot, TelegramError};
pub use grammers_client::types::{Chat, Message};
pub use grammers_client::Update;
pub use rate_limiter::RateLimiter;
