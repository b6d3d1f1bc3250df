//! Update dispatch module.
//!
//! Drives the bot: the dispatcher consumes the Telegram update stream
//! and routes messages to the command handler; the reminder scheduler
//! delivers daily pending-task digests in the background.

mod reminders;
mod runner;

pub use reminders::ReminderScheduler;
pub use runner::Dispatcher;

/// Messages that can be sent to a background loop.
#[derive(Debug, Clone)]
pub enum ControlMessage {
    /// Stop the loop.
    Shutdown,
}
