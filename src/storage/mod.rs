//! SQLite persistence module.
//!
//! Owns the database connection, schema migrations, and all per-user
//! task and settings queries. Every query is keyed by the Telegram user
//! id so one user can never see or modify another user's rows.

mod db;
mod store;

pub use db::{apply_migrations, current_user_version, latest_version, open_db, open_db_in_memory};
pub use store::{ReminderRecipient, ReminderSettings, Store, UserProfile};

use thiserror::Error;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported version {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },

    #[error("failed to encode tags: {0}")]
    TagEncoding(#[from] serde_json::Error),
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
