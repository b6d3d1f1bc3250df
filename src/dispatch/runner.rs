//! Update dispatcher.
//!
//! The loop is deliberately defensive: a failure while handling one
//! message is logged and dropped so the stream keeps flowing. Only
//! update-stream errors terminate the loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::ControlMessage;
use crate::commands::{CommandContext, CommandHandler};
use crate::storage::{Store, UserProfile};
use crate::telegram::{Chat, Message, TelegramBot, TelegramError, Update};

/// Longest echo of user text in the add-suggestion reply.
const SUGGESTION_PREVIEW_LEN: usize = 100;

/// Routes incoming messages to the command handler.
pub struct Dispatcher {
    bot: Arc<TelegramBot>,
    store: Arc<Store>,
    handler: CommandHandler,
}

impl Dispatcher {
    /// Creates a new dispatcher.
    #[must_use]
    pub fn new(bot: Arc<TelegramBot>, store: Arc<Store>) -> Self {
        let handler = CommandHandler::new(Arc::clone(&store));
        Self {
            bot,
            store,
            handler,
        }
    }

    /// Runs the dispatch loop until shutdown or a stream error.
    pub async fn run(&self, mut rx: mpsc::Receiver<ControlMessage>) -> Result<(), TelegramError> {
        info!("Dispatcher started, waiting for messages");

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(ControlMessage::Shutdown) | None => {
                            info!("Dispatcher shutting down");
                            return Ok(());
                        }
                    }
                }
                update = self.bot.next_update() => {
                    self.handle_update(update?).await;
                }
            }
        }
    }

    async fn handle_update(&self, update: Update) {
        let Update::NewMessage(message) = update else {
            return;
        };
        if message.outgoing() {
            return;
        }
        let Some(sender) = message.sender() else {
            debug!("Dropping message without sender");
            return;
        };

        let profile = profile_from_sender(&sender);
        let packed_chat = message.chat().pack().to_bytes().to_vec();
        if let Err(e) = self.store.upsert_user(&profile, &packed_chat).await {
            warn!("Failed to upsert user {}: {}", profile.user_id, e);
        }

        let text = message.text().trim().to_owned();
        if text.is_empty() {
            self.send_reply(
                &message,
                "🤖 I understand text only!\n\n\
                 Send me a task description or a command like /add or /tasks.",
            )
            .await;
            return;
        }

        let ctx = CommandContext {
            user_id: profile.user_id,
            first_name: profile.first_name.clone(),
        };

        match self.handler.try_handle(&ctx, &text).await {
            Some(result) => self.send_reply(&message, &result.message).await,
            None if text.starts_with('/') => {
                self.send_reply(&message, "❓ Unknown command. Try /help.")
                    .await;
            }
            None => {
                // Free text: offer to turn it into a task.
                let preview = truncate(&text, SUGGESTION_PREVIEW_LEN);
                self.send_reply(
                    &message,
                    &format!(
                        "📝 Add this as a task?\n\n{preview}\n\n\
                         Use /add {preview}\n\
                         Tip: add #tags and due dates, e.g. /add {preview} by tomorrow"
                    ),
                )
                .await;
            }
        }
    }

    async fn send_reply(&self, message: &Message, text: &str) {
        if let Err(e) = self.bot.reply(message, text).await {
            warn!("Failed to send reply: {}", e);
        }
    }
}

fn profile_from_sender(sender: &Chat) -> UserProfile {
    match sender {
        Chat::User(user) => UserProfile {
            user_id: user.id(),
            username: user.username().map(str::to_owned),
            first_name: user.first_name().to_owned(),
            last_name: user.last_name().map(str::to_owned),
        },
        _ => UserProfile {
            user_id: sender.id(),
            username: None,
            first_name: sender.name().to_owned(),
            last_name: None,
        },
    }
}

/// Truncates a string to a maximum length, adding "..." if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", chars[..max_len].iter().collect::<String>())
    }
}
