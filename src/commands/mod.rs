//! Command handling module.
//!
//! Parses slash commands (`/add`, `/tasks`, `/done`, ...) from incoming
//! messages and executes them against the task store.

mod handler;
mod types;

pub use handler::{CommandContext, CommandHandler};
pub use types::{BotCommand, CommandResult, RemindAction};
