//! Per-user task and settings queries.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use tracing::debug;

use super::db::{open_db, open_db_in_memory};
use super::StoreResult;
use crate::tasks::{CategoryStat, NewTask, Priority, Task, TaskStats};

const TASK_COLUMNS: &str = "id, user_id, title, description, category, priority, due_date, \
                            is_completed, created_at, completed_at, tags";

/// Identity fields captured from an incoming message sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// A user's daily reminder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSettings {
    pub timezone: String,
    pub daily_reminder: bool,
    pub reminder_time: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_owned(),
            daily_reminder: false,
            reminder_time: "09:00".to_owned(),
        }
    }
}

/// A user due to receive daily reminders, with the serialized peer
/// needed to message them proactively.
#[derive(Debug, Clone)]
pub struct ReminderRecipient {
    pub user_id: i64,
    pub packed_chat: Vec<u8>,
    pub timezone: String,
    pub reminder_time: String,
}

/// Task database handle. All operations are scoped by user id.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_db(path)?),
        })
    }

    /// Opens an in-memory database, mainly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_db_in_memory()?),
        })
    }

    /// Inserts or refreshes a user row, including the serialized peer
    /// used for proactive messages.
    pub async fn upsert_user(&self, profile: &UserProfile, packed_chat: &[u8]) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (user_id, username, first_name, last_name, packed_chat)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 username = excluded.username,
                 first_name = excluded.first_name,
                 last_name = excluded.last_name,
                 packed_chat = excluded.packed_chat",
            params![
                profile.user_id,
                profile.username,
                profile.first_name,
                profile.last_name,
                packed_chat,
            ],
        )?;
        Ok(())
    }

    /// Inserts a new task and returns its id.
    pub async fn add_task(&self, user_id: i64, draft: &NewTask) -> StoreResult<i64> {
        let tags_json = serde_json::to_string(&draft.tags)?;
        let due = draft.due_date.map(|d| d.format("%Y-%m-%d").to_string());

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO tasks (user_id, title, category, priority, tags, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                draft.title,
                draft.category,
                draft.priority.rank(),
                tags_json,
                due,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Task {} added for user {}", id, user_id);
        Ok(id)
    }

    /// Pending tasks, most urgent first.
    pub async fn pending_tasks(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND is_completed = 0
             ORDER BY priority ASC, due_date ASC, created_at DESC"
        ))?;
        let tasks = stmt
            .query_map(params![user_id], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Completed tasks, most recently completed first.
    pub async fn completed_tasks(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND is_completed = 1
             ORDER BY completed_at DESC"
        ))?;
        let tasks = stmt
            .query_map(params![user_id], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// All tasks regardless of state, for export.
    pub async fn all_tasks(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY id ASC"
        ))?;
        let tasks = stmt
            .query_map(params![user_id], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Marks a pending task as completed. Returns false when the id does
    /// not exist, is already completed, or belongs to another user.
    pub async fn complete_task(&self, user_id: i64, task_id: i64) -> StoreResult<bool> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE tasks SET is_completed = 1, completed_at = CURRENT_TIMESTAMP
             WHERE id = ?1 AND user_id = ?2 AND is_completed = 0",
            params![task_id, user_id],
        )?;
        Ok(changed > 0)
    }

    /// Deletes a task. Returns false when the id does not exist or
    /// belongs to another user.
    pub async fn delete_task(&self, user_id: i64, task_id: i64) -> StoreResult<bool> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![task_id, user_id],
        )?;
        Ok(changed > 0)
    }

    /// Case-insensitive substring search over pending tasks.
    pub async fn search_tasks(&self, user_id: i64, keyword: &str) -> StoreResult<Vec<Task>> {
        let pattern = format!("%{keyword}%");
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND is_completed = 0
               AND (title LIKE ?2 OR description LIKE ?2 OR tags LIKE ?2)
             ORDER BY priority ASC"
        ))?;
        let tasks = stmt
            .query_map(params![user_id, pattern], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Total/completed/pending counters for one user.
    pub async fn stats(&self, user_id: i64) -> StoreResult<TaskStats> {
        let conn = self.conn.lock().await;
        let stats = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN is_completed = 1 THEN 1 ELSE 0 END), 0)
             FROM tasks WHERE user_id = ?1",
            params![user_id],
            |row| {
                let total: u64 = row.get(0)?;
                let completed: u64 = row.get(1)?;
                Ok(TaskStats {
                    total,
                    completed,
                    pending: total - completed,
                })
            },
        )?;
        Ok(stats)
    }

    /// Pending tasks with a due date up to `within_days` from `today`,
    /// overdue included, nearest deadline first.
    pub async fn upcoming_deadlines(
        &self,
        user_id: i64,
        today: NaiveDate,
        within_days: i64,
    ) -> StoreResult<Vec<Task>> {
        let cutoff = (today + chrono::Duration::days(within_days))
            .format("%Y-%m-%d")
            .to_string();
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND is_completed = 0
               AND due_date IS NOT NULL AND due_date <= ?2
             ORDER BY due_date ASC"
        ))?;
        let tasks = stmt
            .query_map(params![user_id, cutoff], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Per-category totals, largest category first.
    pub async fn category_summary(&self, user_id: i64) -> StoreResult<Vec<CategoryStat>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT category, COUNT(*),
                    COALESCE(SUM(CASE WHEN is_completed = 1 THEN 1 ELSE 0 END), 0)
             FROM tasks WHERE user_id = ?1
             GROUP BY category ORDER BY COUNT(*) DESC",
        )?;
        let stats = stmt
            .query_map(params![user_id], |row| {
                Ok(CategoryStat {
                    category: row.get(0)?,
                    total: row.get(1)?,
                    completed: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stats)
    }

    /// Deletes all tasks for a user. Returns the number removed.
    pub async fn clear_tasks(&self, user_id: i64) -> StoreResult<usize> {
        let conn = self.conn.lock().await;
        let removed = conn.execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])?;
        Ok(removed)
    }

    /// Reads a user's reminder settings, defaults if never configured.
    pub async fn reminder_settings(&self, user_id: i64) -> StoreResult<ReminderSettings> {
        let conn = self.conn.lock().await;
        let settings = conn
            .query_row(
                "SELECT timezone, daily_reminder, reminder_time
                 FROM user_settings WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(ReminderSettings {
                        timezone: row.get(0)?,
                        daily_reminder: row.get::<_, i64>(1)? != 0,
                        reminder_time: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(settings.unwrap_or_default())
    }

    /// Enables or disables the daily reminder, optionally changing the time.
    pub async fn set_reminder(
        &self,
        user_id: i64,
        enabled: bool,
        time: Option<&str>,
    ) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        ensure_settings_row(&conn, user_id)?;
        conn.execute(
            "UPDATE user_settings
             SET daily_reminder = ?2, reminder_time = COALESCE(?3, reminder_time)
             WHERE user_id = ?1",
            params![user_id, i64::from(enabled), time],
        )?;
        Ok(())
    }

    /// Sets the user's timezone (IANA name, validated by the caller).
    pub async fn set_timezone(&self, user_id: i64, timezone: &str) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        ensure_settings_row(&conn, user_id)?;
        conn.execute(
            "UPDATE user_settings SET timezone = ?2 WHERE user_id = ?1",
            params![user_id, timezone],
        )?;
        Ok(())
    }

    /// Users with daily reminders enabled and a known peer.
    pub async fn reminder_recipients(&self) -> StoreResult<Vec<ReminderRecipient>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT s.user_id, u.packed_chat, s.timezone, s.reminder_time
             FROM user_settings s
             JOIN users u ON u.user_id = s.user_id
             WHERE s.daily_reminder = 1 AND u.packed_chat IS NOT NULL",
        )?;
        let recipients = stmt
            .query_map([], |row| {
                Ok(ReminderRecipient {
                    user_id: row.get(0)?,
                    packed_chat: row.get(1)?,
                    timezone: row.get(2)?,
                    reminder_time: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipients)
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let due_date: Option<String> = row.get(6)?;
    let tags_json: String = row.get(10)?;

    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        priority: Priority::from_rank(row.get(5)?),
        due_date: due_date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        is_completed: row.get::<_, i64>(7)? != 0,
        created_at: row.get(8)?,
        completed_at: row.get(9)?,
        // Malformed tag blobs are treated as untagged rather than failing
        // the whole listing.
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
    })
}

fn ensure_settings_row(conn: &Connection, user_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO user_settings (user_id) VALUES (?1)",
        params![user_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::DEFAULT_CATEGORY;

    const ALICE: i64 = 100;
    const BOB: i64 = 200;

    fn profile(user_id: i64, name: &str) -> UserProfile {
        UserProfile {
            user_id,
            username: Some(name.to_lowercase()),
            first_name: name.to_owned(),
            last_name: None,
        }
    }

    fn draft(title: &str) -> NewTask {
        NewTask {
            title: title.to_owned(),
            category: DEFAULT_CATEGORY.to_owned(),
            ..NewTask::default()
        }
    }

    async fn store_with_users() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.upsert_user(&profile(ALICE, "Alice"), b"peer-a").await.unwrap();
        store.upsert_user(&profile(BOB, "Bob"), b"peer-b").await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_add_and_list_pending() {
        let store = store_with_users().await;
        let id = store.add_task(ALICE, &draft("Buy milk")).await.unwrap();

        let tasks = store.pending_tasks(ALICE).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].title, "Buy milk");
        assert!(!tasks[0].is_completed);
    }

    #[tokio::test]
    async fn test_pending_ordered_by_priority() {
        let store = store_with_users().await;
        let mut low = draft("Low");
        low.priority = Priority::Low;
        let mut high = draft("High");
        high.priority = Priority::High;

        store.add_task(ALICE, &low).await.unwrap();
        store.add_task(ALICE, &high).await.unwrap();

        let tasks = store.pending_tasks(ALICE).await.unwrap();
        assert_eq!(tasks[0].title, "High");
        assert_eq!(tasks[1].title, "Low");
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = store_with_users().await;
        let alice_task = store.add_task(ALICE, &draft("Alice's task")).await.unwrap();
        store.add_task(BOB, &draft("Bob's task")).await.unwrap();

        assert_eq!(store.pending_tasks(ALICE).await.unwrap().len(), 1);
        assert_eq!(store.pending_tasks(BOB).await.unwrap().len(), 1);

        // Bob cannot complete or delete Alice's task.
        assert!(!store.complete_task(BOB, alice_task).await.unwrap());
        assert!(!store.delete_task(BOB, alice_task).await.unwrap());
        assert_eq!(store.pending_tasks(ALICE).await.unwrap().len(), 1);

        // Bob's clear only touches Bob's rows.
        assert_eq!(store.clear_tasks(BOB).await.unwrap(), 1);
        assert_eq!(store.pending_tasks(ALICE).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_task_lifecycle() {
        let store = store_with_users().await;
        let id = store.add_task(ALICE, &draft("Finish report")).await.unwrap();

        assert!(store.complete_task(ALICE, id).await.unwrap());
        // Completing twice reports not found.
        assert!(!store.complete_task(ALICE, id).await.unwrap());

        assert!(store.pending_tasks(ALICE).await.unwrap().is_empty());
        let done = store.completed_tasks(ALICE).await.unwrap();
        assert_eq!(done.len(), 1);
        assert!(done[0].is_completed);
        assert!(done[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_task() {
        let store = store_with_users().await;
        assert!(!store.delete_task(ALICE, 12345).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_matches_title_and_tags() {
        let store = store_with_users().await;
        let mut tagged = draft("Buy groceries");
        tagged.tags = vec!["shopping-list".to_owned()];
        store.add_task(ALICE, &tagged).await.unwrap();
        store.add_task(ALICE, &draft("Team meeting")).await.unwrap();

        let by_title = store.search_tasks(ALICE, "meeting").await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Team meeting");

        let by_tag = store.search_tasks(ALICE, "shopping-list").await.unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].title, "Buy groceries");

        assert!(store.search_tasks(ALICE, "nothing").await.unwrap().is_empty());
        // Another user's search never sees these tasks.
        assert!(store.search_tasks(BOB, "meeting").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_counts() {
        let store = store_with_users().await;
        let a = store.add_task(ALICE, &draft("One")).await.unwrap();
        store.add_task(ALICE, &draft("Two")).await.unwrap();
        store.complete_task(ALICE, a).await.unwrap();

        let stats = store.stats(ALICE).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 1);

        let empty = store.stats(BOB).await.unwrap();
        assert_eq!(empty.total, 0);
    }

    #[tokio::test]
    async fn test_deadline_window() {
        let store = store_with_users().await;
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();

        let mut overdue = draft("Overdue");
        overdue.due_date = NaiveDate::from_ymd_opt(2024, 6, 10);
        let mut soon = draft("Soon");
        soon.due_date = NaiveDate::from_ymd_opt(2024, 6, 20);
        let mut far = draft("Far");
        far.due_date = NaiveDate::from_ymd_opt(2024, 9, 1);
        let undated = draft("Undated");

        for d in [&overdue, &soon, &far, &undated] {
            store.add_task(ALICE, d).await.unwrap();
        }

        let due = store.upcoming_deadlines(ALICE, today, 14).await.unwrap();
        let titles: Vec<_> = due.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Overdue", "Soon"]);
    }

    #[tokio::test]
    async fn test_category_summary() {
        let store = store_with_users().await;
        let mut work = draft("Report");
        work.category = "work".to_owned();
        let mut work2 = draft("Meeting");
        work2.category = "work".to_owned();
        store.add_task(ALICE, &work).await.unwrap();
        let id = store.add_task(ALICE, &work2).await.unwrap();
        store.add_task(ALICE, &draft("Misc")).await.unwrap();
        store.complete_task(ALICE, id).await.unwrap();

        let summary = store.category_summary(ALICE).await.unwrap();
        assert_eq!(summary[0].category, "work");
        assert_eq!(summary[0].total, 2);
        assert_eq!(summary[0].completed, 1);
        assert_eq!(summary[1].category, DEFAULT_CATEGORY);
    }

    #[tokio::test]
    async fn test_tags_round_trip() {
        let store = store_with_users().await;
        let mut tagged = draft("Tagged");
        tagged.tags = vec!["alpha".to_owned(), "beta".to_owned()];
        store.add_task(ALICE, &tagged).await.unwrap();

        let tasks = store.pending_tasks(ALICE).await.unwrap();
        assert_eq!(tasks[0].tags, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_reminder_settings_defaults_and_updates() {
        let store = store_with_users().await;

        let defaults = store.reminder_settings(ALICE).await.unwrap();
        assert!(!defaults.daily_reminder);
        assert_eq!(defaults.timezone, "UTC");
        assert_eq!(defaults.reminder_time, "09:00");

        store.set_reminder(ALICE, true, Some("08:30")).await.unwrap();
        store.set_timezone(ALICE, "Europe/Berlin").await.unwrap();

        let settings = store.reminder_settings(ALICE).await.unwrap();
        assert!(settings.daily_reminder);
        assert_eq!(settings.reminder_time, "08:30");
        assert_eq!(settings.timezone, "Europe/Berlin");

        // Disabling keeps the configured time.
        store.set_reminder(ALICE, false, None).await.unwrap();
        let settings = store.reminder_settings(ALICE).await.unwrap();
        assert!(!settings.daily_reminder);
        assert_eq!(settings.reminder_time, "08:30");
    }

    #[tokio::test]
    async fn test_reminder_recipients() {
        let store = store_with_users().await;
        store.set_reminder(ALICE, true, None).await.unwrap();
        store.set_reminder(BOB, false, None).await.unwrap();

        let recipients = store.reminder_recipients().await.unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].user_id, ALICE);
        assert_eq!(recipients[0].packed_chat, b"peer-a");
    }
}
