//! Command handler implementation.

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::types::{BotCommand, CommandResult, RemindAction};
use crate::config::{
    COMPLETED_PAGE_SIZE, DEADLINE_PAGE_SIZE, DEADLINE_WINDOW_DAYS, EXPORT_INLINE_LIMIT,
    SEARCH_PAGE_SIZE, TASK_PAGE_SIZE,
};
use crate::storage::{Store, StoreError};
use crate::tasks::{parse_task_text, Task};

/// Who sent the command, as captured from the incoming message.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub user_id: i64,
    pub first_name: String,
}

/// Handles bot commands against the task store.
pub struct CommandHandler {
    store: Arc<Store>,
}

/// Serialized shape of an `/export` reply.
#[derive(Debug, Serialize)]
struct ExportPayload<'a> {
    user_id: i64,
    export_date: String,
    total_tasks: usize,
    tasks: &'a [Task],
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Tries to parse and execute a command from a message.
    ///
    /// Returns `None` if the message is not a command.
    pub async fn try_handle(&self, ctx: &CommandContext, text: &str) -> Option<CommandResult> {
        let command = BotCommand::parse(text)?;

        debug!("Handling command from user {}: {}", ctx.user_id, command);
        let result = self.execute(ctx, command).await;
        info!(
            "Command result for user {}: success={}",
            ctx.user_id, result.success
        );

        Some(result)
    }

    /// Executes a parsed command.
    async fn execute(&self, ctx: &CommandContext, command: BotCommand) -> CommandResult {
        match command {
            BotCommand::Start | BotCommand::Help => self.handle_start(ctx),
            BotCommand::Add(text) => self.handle_add(ctx, text.as_deref()).await,
            BotCommand::List => self.handle_list(ctx).await,
            BotCommand::Completed => self.handle_completed(ctx).await,
            BotCommand::Done(id) => self.handle_done(ctx, id).await,
            BotCommand::Delete(id) => self.handle_delete(ctx, id).await,
            BotCommand::Search(keyword) => self.handle_search(ctx, keyword.as_deref()).await,
            BotCommand::Stats => self.handle_stats(ctx).await,
            BotCommand::Deadlines => self.handle_deadlines(ctx).await,
            BotCommand::Categories => self.handle_categories(ctx).await,
            BotCommand::Clear { confirmed } => self.handle_clear(ctx, confirmed).await,
            BotCommand::Export => self.handle_export(ctx).await,
            BotCommand::Remind(action) => self.handle_remind(ctx, action).await,
            BotCommand::Timezone(tz) => self.handle_timezone(ctx, tz.as_deref()).await,
        }
    }

    fn handle_start(&self, ctx: &CommandContext) -> CommandResult {
        let mut lines = vec![
            format!("👋 Hello {}!", ctx.first_name),
            String::new(),
            "🤖 Task Manager Bot".to_owned(),
            String::new(),
            "📝 Commands:".to_owned(),
        ];

        for (cmd, aliases, desc) in BotCommand::all_commands() {
            let alias_str = if aliases.is_empty() {
                String::new()
            } else {
                format!(" {aliases}")
            };
            lines.push(format!("  {cmd}{alias_str} - {desc}"));
        }

        lines.extend([
            String::new(),
            "💡 Examples:".to_owned(),
            "  /add #work Finish report by tomorrow".to_owned(),
            "  /add Buy groceries #personal #shopping".to_owned(),
            "  /add Team meeting #urgent by Friday".to_owned(),
            String::new(),
            "🏷️ Tags: #work #personal #study #shopping #health".to_owned(),
            "🎯 Priorities: #urgent #important #high #medium #low".to_owned(),
            "📅 Dates: by today, by tomorrow, by Monday, by 2024-12-31".to_owned(),
        ]);

        CommandResult::success(lines.join("\n"))
    }

    async fn handle_add(&self, ctx: &CommandContext, text: Option<&str>) -> CommandResult {
        let Some(text) = text else {
            return CommandResult::error(
                "📝 How to add tasks:\n\n\
                 /add <description>\n\n\
                 You can use:\n\
                 • Hashtags: #work #personal #study\n\
                 • Priorities: #urgent #important #low\n\
                 • Due dates: by today/tomorrow/Monday\n\n\
                 Examples:\n\
                 /add #work Team meeting by tomorrow\n\
                 /add Buy milk #personal #shopping",
            );
        };

        let draft = parse_task_text(text, Local::now().date_naive());

        let task_id = match self.store.add_task(ctx.user_id, &draft).await {
            Ok(id) => id,
            Err(e) => return store_failure("add task", &e),
        };

        let mut response = format!(
            "✅ Task #{task_id} added!\n\n\
             📝 {}\n\
             📁 Category: #{}\n\
             🎯 Priority: {}\n",
            draft.title,
            draft.category,
            draft.priority.label()
        );

        if !draft.tags.is_empty() {
            let tags: Vec<String> = draft.tags.iter().map(|t| format!("#{t}")).collect();
            response.push_str(&format!("🏷️ Tags: {}\n", tags.join(" ")));
        }

        if let Some(due) = draft.due_date {
            response.push_str(&format!("📅 Due: {due}\n"));
        }

        response.push_str(&format!(
            "\n🆔 Complete: /done {task_id}\n🗑️ Delete: /delete {task_id}"
        ));

        CommandResult::success(response)
    }

    async fn handle_list(&self, ctx: &CommandContext) -> CommandResult {
        let tasks = match self.store.pending_tasks(ctx.user_id).await {
            Ok(tasks) => tasks,
            Err(e) => return store_failure("list tasks", &e),
        };

        if tasks.is_empty() {
            return CommandResult::success(
                "📭 No pending tasks!\n\nAdd your first task:\n/add <your task description>",
            );
        }

        let mut lines = vec![format!("📋 Your tasks ({})", tasks.len()), String::new()];

        for task in tasks.iter().take(TASK_PAGE_SIZE) {
            lines.push(task_listing_entry(task));
        }

        if tasks.len() > TASK_PAGE_SIZE {
            lines.push(format!(
                "📄 Showing {TASK_PAGE_SIZE} of {} tasks.\nUse /search to find specific tasks.",
                tasks.len()
            ));
        }

        CommandResult::success(lines.join("\n"))
    }

    async fn handle_completed(&self, ctx: &CommandContext) -> CommandResult {
        let tasks = match self.store.completed_tasks(ctx.user_id).await {
            Ok(tasks) => tasks,
            Err(e) => return store_failure("list completed tasks", &e),
        };

        if tasks.is_empty() {
            return CommandResult::success(
                "🎉 No completed tasks yet!\n\n\
                 Complete your first task:\n\
                 1. Check tasks: /tasks\n\
                 2. Complete: /done <task id>",
            );
        }

        let mut lines = vec![format!("✅ Completed tasks ({})", tasks.len()), String::new()];

        for task in tasks.iter().take(COMPLETED_PAGE_SIZE) {
            lines.push(format!("✓ {}\n   #{} | ID: {}", task.title, task.category, task.id));
            if let Some(completed_at) = &task.completed_at {
                let date: String = completed_at.chars().take(10).collect();
                lines.push(format!("   ✅ Completed: {date}"));
            }
            lines.push(String::new());
        }

        lines.push("🎯 Keep up the good work!".to_owned());

        CommandResult::success(lines.join("\n"))
    }

    async fn handle_done(&self, ctx: &CommandContext, id: Option<i64>) -> CommandResult {
        let Some(id) = id else {
            return CommandResult::error(
                "✅ Complete a task:\n\nUsage: /done <task id>\nExample: /done 5\n\n\
                 Get task ids from /tasks",
            );
        };

        match self.store.complete_task(ctx.user_id, id).await {
            Ok(true) => CommandResult::success(format!("🎉 Task #{id} completed!")),
            Ok(false) => {
                CommandResult::error(format!("❌ Task #{id} not found or already completed"))
            }
            Err(e) => store_failure("complete task", &e),
        }
    }

    async fn handle_delete(&self, ctx: &CommandContext, id: Option<i64>) -> CommandResult {
        let Some(id) = id else {
            return CommandResult::error(
                "🗑️ Delete a task:\n\nUsage: /delete <task id>\nExample: /delete 5\n\n\
                 Get task ids from /tasks",
            );
        };

        match self.store.delete_task(ctx.user_id, id).await {
            Ok(true) => CommandResult::success(format!("🗑️ Task #{id} deleted!")),
            Ok(false) => CommandResult::error(format!("❌ Task #{id} not found")),
            Err(e) => store_failure("delete task", &e),
        }
    }

    async fn handle_search(&self, ctx: &CommandContext, keyword: Option<&str>) -> CommandResult {
        let Some(keyword) = keyword else {
            return CommandResult::error(
                "🔍 Search tasks:\n\nUsage: /search <keyword>\n\n\
                 Examples:\n/search meeting\n/search report",
            );
        };

        let tasks = match self.store.search_tasks(ctx.user_id, keyword).await {
            Ok(tasks) => tasks,
            Err(e) => return store_failure("search tasks", &e),
        };

        if tasks.is_empty() {
            return CommandResult::success(format!(
                "🔍 No tasks found for '{keyword}'\n\n\
                 Try:\n• Different keywords\n• General terms\n• Tags like work"
            ));
        }

        let mut lines = vec![
            format!("🔍 Search results for '{keyword}' ({})", tasks.len()),
            String::new(),
        ];

        for task in tasks.iter().take(SEARCH_PAGE_SIZE) {
            lines.push(task_listing_entry(task));
        }

        if tasks.len() > SEARCH_PAGE_SIZE {
            lines.push(format!(
                "📄 Showing {SEARCH_PAGE_SIZE} of {} results",
                tasks.len()
            ));
        }

        CommandResult::success(lines.join("\n"))
    }

    async fn handle_stats(&self, ctx: &CommandContext) -> CommandResult {
        let stats = match self.store.stats(ctx.user_id).await {
            Ok(stats) => stats,
            Err(e) => return store_failure("load stats", &e),
        };

        if stats.total == 0 {
            return CommandResult::success(
                "📊 No tasks yet!\n\nStart tracking your productivity:\n/add <your first task>",
            );
        }

        let rate = stats.completion_rate();
        let (achievement, emoji) = if rate >= 90.0 {
            ("🏆 Productivity master! 🌟", "🚀")
        } else if rate >= 70.0 {
            ("👍 Excellent progress!", "💪")
        } else if rate >= 50.0 {
            ("📈 Good going!", "✅")
        } else {
            ("💪 Keep going!", "🎯")
        };

        let message = format!(
            "{emoji} Your statistics\n\n\
             📊 Total tasks: {}\n\
             ✅ Completed: {}\n\
             ⏳ Pending: {}\n\
             📈 Completion rate: {rate:.1}%\n\
             {}\n\n\
             {achievement}",
            stats.total,
            stats.completed,
            stats.pending,
            progress_bar(rate, 10),
        );

        CommandResult::success(message)
    }

    async fn handle_deadlines(&self, ctx: &CommandContext) -> CommandResult {
        let today = Local::now().date_naive();
        let tasks = match self
            .store
            .upcoming_deadlines(ctx.user_id, today, DEADLINE_WINDOW_DAYS)
            .await
        {
            Ok(tasks) => tasks,
            Err(e) => return store_failure("load deadlines", &e),
        };

        if tasks.is_empty() {
            return CommandResult::success(
                "⏰ No upcoming deadlines!\n\n\
                 Add deadlines to your tasks:\n\
                 /add Report #work by Friday\n\
                 /add Buy presents by 2024-12-24",
            );
        }

        let mut lines = vec!["⏰ Upcoming deadlines".to_owned(), String::new()];

        for task in tasks.iter().take(DEADLINE_PAGE_SIZE) {
            let Some(due) = task.due_date else { continue };
            lines.push(format!(
                "{} {}\n   📅 {} | #{}\n   🆔 {} | /done {}",
                task.priority.icon(),
                task.title,
                deadline_label(due, today),
                task.category,
                task.id,
                task.id
            ));
            lines.push(String::new());
        }

        lines.push("💡 Use /add <task> by <date> to set deadlines".to_owned());

        CommandResult::success(lines.join("\n"))
    }

    async fn handle_categories(&self, ctx: &CommandContext) -> CommandResult {
        let summary = match self.store.category_summary(ctx.user_id).await {
            Ok(summary) => summary,
            Err(e) => return store_failure("load categories", &e),
        };

        if summary.is_empty() {
            return CommandResult::success(
                "📂 No categories yet!\n\n\
                 Add tasks with hashtags:\n\
                 /add #work Team meeting\n\
                 /add #personal Buy groceries",
            );
        }

        let mut lines = vec!["📂 Your task categories".to_owned(), String::new()];

        #[allow(clippy::cast_precision_loss)]
        for stat in &summary {
            let rate = if stat.total == 0 {
                0.0
            } else {
                stat.completed as f64 / stat.total as f64 * 100.0
            };
            lines.push(format!(
                "#{}\n   {}/{} completed\n   {} {rate:.0}%",
                stat.category,
                stat.completed,
                stat.total,
                progress_bar(rate, 8),
            ));
            lines.push(String::new());
        }

        lines.push("🏷️ Known categories: work, personal, study, shopping, health, other".to_owned());

        CommandResult::success(lines.join("\n"))
    }

    async fn handle_clear(&self, ctx: &CommandContext, confirmed: bool) -> CommandResult {
        if !confirmed {
            return CommandResult::success(
                "⚠️ DANGER ZONE ⚠️\n\n\
                 This will delete ALL your tasks!\n\
                 This action cannot be undone!\n\n\
                 Send /clear confirm to continue.",
            );
        }

        match self.store.clear_tasks(ctx.user_id).await {
            Ok(count) => CommandResult::success(format!(
                "🗑️ All tasks deleted!\n\nRemoved {count} tasks.\n\nStart fresh with /add <new task>"
            )),
            Err(e) => store_failure("clear tasks", &e),
        }
    }

    async fn handle_export(&self, ctx: &CommandContext) -> CommandResult {
        let tasks = match self.store.all_tasks(ctx.user_id).await {
            Ok(tasks) => tasks,
            Err(e) => return store_failure("export tasks", &e),
        };

        if tasks.is_empty() {
            return CommandResult::success("📭 No tasks to export!");
        }

        let payload = ExportPayload {
            user_id: ctx.user_id,
            export_date: chrono::Utc::now().to_rfc3339(),
            total_tasks: tasks.len(),
            tasks: &tasks,
        };

        let json = match serde_json::to_string_pretty(&payload) {
            Ok(json) => json,
            Err(e) => {
                warn!("Export serialization failed: {}", e);
                return CommandResult::error("❌ Export failed, please try again.");
            }
        };

        if json.len() <= EXPORT_INLINE_LIMIT {
            CommandResult::success(format!(
                "📤 Task export ({} tasks)\n\n{json}",
                tasks.len()
            ))
        } else {
            CommandResult::success(format!(
                "📤 Export contains {} tasks.\n\n\
                 Data too large for a message ({} chars).\n\
                 Use /search to pull out specific tasks.",
                tasks.len(),
                json.len()
            ))
        }
    }

    async fn handle_remind(&self, ctx: &CommandContext, action: RemindAction) -> CommandResult {
        match action {
            RemindAction::Show => {
                let settings = match self.store.reminder_settings(ctx.user_id).await {
                    Ok(settings) => settings,
                    Err(e) => return store_failure("load reminder settings", &e),
                };

                let state = if settings.daily_reminder {
                    format!("on, daily at {} ({})", settings.reminder_time, settings.timezone)
                } else {
                    "off".to_owned()
                };
                CommandResult::success(format!(
                    "⏰ Daily reminder: {state}\n\n\
                     /remind on [HH:MM] - enable\n\
                     /remind off - disable\n\
                     /timezone <name> - set your timezone"
                ))
            }
            RemindAction::On(time) => {
                // Stored zero-padded so "9:00" and "09:00" mean the same
                // to the scheduler.
                let time = match time.as_deref() {
                    None => None,
                    Some(raw) => match NaiveTime::parse_from_str(raw, "%H:%M") {
                        Ok(parsed) => Some(parsed.format("%H:%M").to_string()),
                        Err(_) => {
                            return CommandResult::error(format!(
                                "❌ Invalid time '{raw}'. Use 24h HH:MM, e.g. /remind on 09:00"
                            ));
                        }
                    },
                };

                match self
                    .store
                    .set_reminder(ctx.user_id, true, time.as_deref())
                    .await
                {
                    Ok(()) => {
                        let settings = self
                            .store
                            .reminder_settings(ctx.user_id)
                            .await
                            .unwrap_or_default();
                        CommandResult::success(format!(
                            "⏰ Daily reminder enabled at {} ({}).",
                            settings.reminder_time, settings.timezone
                        ))
                    }
                    Err(e) => store_failure("enable reminder", &e),
                }
            }
            RemindAction::Off => match self.store.set_reminder(ctx.user_id, false, None).await {
                Ok(()) => CommandResult::success("⏰ Daily reminder disabled."),
                Err(e) => store_failure("disable reminder", &e),
            },
        }
    }

    async fn handle_timezone(&self, ctx: &CommandContext, tz: Option<&str>) -> CommandResult {
        let Some(tz) = tz else {
            let settings = self
                .store
                .reminder_settings(ctx.user_id)
                .await
                .unwrap_or_default();
            return CommandResult::success(format!(
                "🌍 Your timezone: {}\n\nChange it with /timezone <name>, e.g.\n\
                 /timezone Europe/Berlin\n/timezone America/New_York",
                settings.timezone
            ));
        };

        let Ok(parsed) = tz.parse::<Tz>() else {
            return CommandResult::error(format!(
                "❌ Unknown timezone '{tz}'. Use an IANA name like Europe/Berlin."
            ));
        };

        match self.store.set_timezone(ctx.user_id, parsed.name()).await {
            Ok(()) => CommandResult::success(format!("🌍 Timezone set to {}.", parsed.name())),
            Err(e) => store_failure("set timezone", &e),
        }
    }
}

fn store_failure(action: &str, err: &StoreError) -> CommandResult {
    warn!("Failed to {}: {}", action, err);
    CommandResult::error("⚠️ Something went wrong, please try again.")
}

/// One `/tasks` or `/search` entry with id, category, due date, and
/// quick-action hints.
fn task_listing_entry(task: &Task) -> String {
    let mut entry = format!(
        "{} {}\n   🆔 {} | #{}",
        task.priority.icon(),
        task.title,
        task.id,
        task.category
    );
    if let Some(due) = task.due_date {
        entry.push_str(&format!(" | 📅 {due}"));
    }
    entry.push_str(&format!("\n   /done {}  /delete {}\n", task.id, task.id));
    entry
}

/// Renders a textual progress bar, e.g. `███░░░░░░░` for 30%.
fn progress_bar(rate: f64, cells: usize) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((rate / 100.0 * cells as f64) as usize).min(cells);
    format!("{}{}", "█".repeat(filled), "░".repeat(cells - filled))
}

/// Human label for a deadline relative to `today`.
fn deadline_label(due: NaiveDate, today: NaiveDate) -> String {
    let days_left = (due - today).num_days();
    if days_left < 0 {
        "OVERDUE! ⚠️".to_owned()
    } else if days_left == 0 {
        "TODAY! ⏰".to_owned()
    } else if days_left == 1 {
        "Tomorrow".to_owned()
    } else if days_left <= 7 {
        format!("{days_left} days")
    } else {
        format!("{due} ({days_left} days)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UserProfile;

    const USER: i64 = 1;

    async fn handler() -> CommandHandler {
        let store = Arc::new(Store::open_in_memory().unwrap());
        store
            .upsert_user(
                &UserProfile {
                    user_id: USER,
                    username: Some("alice".to_owned()),
                    first_name: "Alice".to_owned(),
                    last_name: None,
                },
                b"peer",
            )
            .await
            .unwrap();
        CommandHandler::new(store)
    }

    fn ctx() -> CommandContext {
        CommandContext {
            user_id: USER,
            first_name: "Alice".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_non_command_is_ignored() {
        let handler = handler().await;
        assert!(handler.try_handle(&ctx(), "just some text").await.is_none());
    }

    #[tokio::test]
    async fn test_add_and_list_flow() {
        let handler = handler().await;

        let added = handler
            .try_handle(&ctx(), "/add #work Finish report #urgent")
            .await
            .unwrap();
        assert!(added.success);
        assert!(added.message.contains("Finish report"));
        assert!(added.message.contains("#work"));
        assert!(added.message.contains("URGENT"));

        let listed = handler.try_handle(&ctx(), "/tasks").await.unwrap();
        assert!(listed.success);
        assert!(listed.message.contains("Finish report"));
    }

    #[tokio::test]
    async fn test_add_without_text_shows_usage() {
        let handler = handler().await;
        let result = handler.try_handle(&ctx(), "/add").await.unwrap();
        assert!(!result.success);
        assert!(result.message.contains("/add <description>"));
    }

    #[tokio::test]
    async fn test_done_flow_and_missing_id() {
        let handler = handler().await;
        handler.try_handle(&ctx(), "/add Buy milk").await.unwrap();

        let done = handler.try_handle(&ctx(), "/done 1").await.unwrap();
        assert!(done.success);

        // Completing again reports not found.
        let again = handler.try_handle(&ctx(), "/done 1").await.unwrap();
        assert!(!again.success);

        let completed = handler.try_handle(&ctx(), "/completed").await.unwrap();
        assert!(completed.message.contains("Buy milk"));
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let handler = handler().await;
        handler.try_handle(&ctx(), "/add Buy milk").await.unwrap();

        let warning = handler.try_handle(&ctx(), "/clear").await.unwrap();
        assert!(warning.message.contains("/clear confirm"));

        // Task is still there.
        let listed = handler.try_handle(&ctx(), "/tasks").await.unwrap();
        assert!(listed.message.contains("Buy milk"));

        let cleared = handler.try_handle(&ctx(), "/clear confirm").await.unwrap();
        assert!(cleared.message.contains("Removed 1 tasks"));
    }

    #[tokio::test]
    async fn test_stats_empty_and_after_completion() {
        let handler = handler().await;

        let empty = handler.try_handle(&ctx(), "/stats").await.unwrap();
        assert!(empty.message.contains("No tasks yet"));

        handler.try_handle(&ctx(), "/add One").await.unwrap();
        handler.try_handle(&ctx(), "/add Two").await.unwrap();
        handler.try_handle(&ctx(), "/done 1").await.unwrap();

        let stats = handler.try_handle(&ctx(), "/stats").await.unwrap();
        assert!(stats.message.contains("Total tasks: 2"));
        assert!(stats.message.contains("Completed: 1"));
        assert!(stats.message.contains("50.0%"));
    }

    #[tokio::test]
    async fn test_search_scopes_results() {
        let handler = handler().await;
        handler.try_handle(&ctx(), "/add Team meeting").await.unwrap();
        handler.try_handle(&ctx(), "/add Buy milk").await.unwrap();

        let found = handler.try_handle(&ctx(), "/search meeting").await.unwrap();
        assert!(found.message.contains("Team meeting"));
        assert!(!found.message.contains("Buy milk"));
    }

    #[tokio::test]
    async fn test_export_inline() {
        let handler = handler().await;
        handler.try_handle(&ctx(), "/add Buy milk").await.unwrap();

        let export = handler.try_handle(&ctx(), "/export").await.unwrap();
        assert!(export.success);
        assert!(export.message.contains("\"total_tasks\": 1"));
        assert!(export.message.contains("Buy milk"));
    }

    #[tokio::test]
    async fn test_remind_rejects_bad_time() {
        let handler = handler().await;
        let result = handler.try_handle(&ctx(), "/remind on 25:99").await.unwrap();
        assert!(!result.success);

        let enabled = handler.try_handle(&ctx(), "/remind on 08:30").await.unwrap();
        assert!(enabled.success);
        assert!(enabled.message.contains("08:30"));
    }

    #[tokio::test]
    async fn test_remind_normalizes_unpadded_time() {
        let handler = handler().await;

        let enabled = handler.try_handle(&ctx(), "/remind on 9:00").await.unwrap();
        assert!(enabled.success);
        assert!(enabled.message.contains("09:00"));

        // The padded form is what gets persisted.
        let shown = handler.try_handle(&ctx(), "/remind").await.unwrap();
        assert!(shown.message.contains("09:00"));
        assert!(!shown.message.contains(" 9:00"));
    }

    #[tokio::test]
    async fn test_timezone_validation() {
        let handler = handler().await;

        let bad = handler.try_handle(&ctx(), "/timezone Mars/Olympus").await.unwrap();
        assert!(!bad.success);

        let good = handler
            .try_handle(&ctx(), "/timezone Europe/Berlin")
            .await
            .unwrap();
        assert!(good.success);

        let shown = handler.try_handle(&ctx(), "/timezone").await.unwrap();
        assert!(shown.message.contains("Europe/Berlin"));
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 10), "░░░░░░░░░░");
        assert_eq!(progress_bar(50.0, 10), "█████░░░░░");
        assert_eq!(progress_bar(100.0, 10), "██████████");
        // Rates above 100 are clamped.
        assert_eq!(progress_bar(150.0, 4), "████");
    }

    #[test]
    fn test_deadline_label() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();

        assert_eq!(deadline_label(day(10), today), "OVERDUE! ⚠️");
        assert_eq!(deadline_label(day(12), today), "TODAY! ⏰");
        assert_eq!(deadline_label(day(13), today), "Tomorrow");
        assert_eq!(deadline_label(day(17), today), "5 days");
        assert_eq!(deadline_label(day(25), today), "2024-06-25 (13 days)");
    }
}
