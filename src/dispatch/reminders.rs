//! Daily reminder scheduler.
//!
//! Every tick, users with reminders enabled are checked against their
//! local clock; once their configured time has passed for the day, a
//! pending-task digest is sent to their stored peer. A day-keyed map
//! keeps each user at one reminder per day.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use super::ControlMessage;
use crate::storage::Store;
use crate::tasks::Task;
use crate::telegram::{unpack_chat, TelegramBot};

/// Maximum tasks listed in a reminder digest.
const DIGEST_SIZE: usize = 10;

/// Sends daily pending-task digests.
pub struct ReminderScheduler {
    bot: Arc<TelegramBot>,
    store: Arc<Store>,
    check_interval: Duration,

    /// Last date a reminder was sent, per user.
    sent: HashMap<i64, NaiveDate>,
}

impl ReminderScheduler {
    /// Creates a new reminder scheduler with a 60 second check interval.
    #[must_use]
    pub fn new(bot: Arc<TelegramBot>, store: Arc<Store>) -> Self {
        Self {
            bot,
            store,
            check_interval: Duration::from_secs(60),
            sent: HashMap::new(),
        }
    }

    /// Overrides the check interval.
    #[must_use]
    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    /// Runs the scheduler loop.
    pub async fn run(mut self, mut rx: mpsc::Receiver<ControlMessage>) {
        info!("Reminder scheduler started");

        let mut check_timer = interval(self.check_interval);

        loop {
            tokio::select! {
                _ = check_timer.tick() => {
                    self.tick().await;
                }
                msg = rx.recv() => {
                    match msg {
                        Some(ControlMessage::Shutdown) | None => {
                            info!("Reminder scheduler shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Single tick of the scheduler.
    async fn tick(&mut self) {
        let recipients = match self.store.reminder_recipients().await {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!("Failed to load reminder recipients: {}", e);
                return;
            }
        };

        let now_utc = Utc::now();

        for recipient in recipients {
            let tz: Tz = recipient.timezone.parse().unwrap_or(chrono_tz::UTC);
            let local = now_utc.with_timezone(&tz);
            let today = local.date_naive();

            if !should_send(
                &self.sent,
                recipient.user_id,
                today,
                local.time(),
                &recipient.reminder_time,
            ) {
                continue;
            }

            // Mark before sending so a failing peer is not retried
            // every minute for the rest of the day.
            self.sent.insert(recipient.user_id, today);

            let tasks = match self.store.pending_tasks(recipient.user_id).await {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(
                        "Failed to load tasks for reminder to user {}: {}",
                        recipient.user_id, e
                    );
                    continue;
                }
            };

            if tasks.is_empty() {
                debug!(
                    "User {} has no pending tasks, skipping reminder",
                    recipient.user_id
                );
                continue;
            }

            let chat = match unpack_chat(recipient.user_id, &recipient.packed_chat) {
                Ok(chat) => chat,
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            };

            match self.bot.send_to(chat, &digest(&tasks)).await {
                Ok(()) => info!("Sent daily reminder to user {}", recipient.user_id),
                Err(e) => warn!(
                    "Failed to send reminder to user {}: {}",
                    recipient.user_id, e
                ),
            }
        }
    }
}

/// Whether a reminder is due: the configured time has passed in the
/// user's local day and nothing was sent for that day yet, so a bot
/// that was down at the exact minute still delivers late.
///
/// The stored time is parsed rather than string-compared, so an
/// unpadded value like `9:00` behaves the same as `09:00`.
fn should_send(
    sent: &HashMap<i64, NaiveDate>,
    user_id: i64,
    today: NaiveDate,
    now: NaiveTime,
    target_hm: &str,
) -> bool {
    if sent.get(&user_id) == Some(&today) {
        return false;
    }
    NaiveTime::parse_from_str(target_hm, "%H:%M").is_ok_and(|target| now >= target)
}

/// Builds the reminder message body.
fn digest(tasks: &[Task]) -> String {
    let mut lines = vec![
        "⏰ Daily reminder".to_owned(),
        String::new(),
        format!("You have {} pending task(s):", tasks.len()),
    ];

    for task in tasks.iter().take(DIGEST_SIZE) {
        let mut line = format!("• {} {}", task.priority.icon(), task.title);
        if let Some(due) = task.due_date {
            line.push_str(&format!(" (due {due})"));
        }
        lines.push(line);
    }

    if tasks.len() > DIGEST_SIZE {
        lines.push(format!("…and {} more", tasks.len() - DIGEST_SIZE));
    }

    lines.push(String::new());
    lines.push("Use /tasks for the full list, /remind off to stop.".to_owned());
    lines.join("\n")
}
