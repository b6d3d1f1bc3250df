//! Command types and definitions.

use std::fmt;

/// Daily reminder subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemindAction {
    /// Show the current reminder settings.
    Show,
    /// Enable the daily reminder, optionally at a new `HH:MM` time.
    On(Option<String>),
    /// Disable the daily reminder.
    Off,
}

/// Available bot commands.
///
/// Argument-taking commands carry `None` when the argument was missing
/// or malformed; the handler answers those with a usage hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Register the user and show the welcome/help text.
    Start,

    /// Show the command guide.
    Help,

    /// Add a new task from free text (tags and due dates are parsed out).
    Add(Option<String>),

    /// List pending tasks.
    List,

    /// List completed tasks.
    Completed,

    /// Mark a task as completed by id.
    Done(Option<i64>),

    /// Delete a task by id.
    Delete(Option<i64>),

    /// Search pending tasks by keyword.
    Search(Option<String>),

    /// Show productivity statistics.
    Stats,

    /// Show upcoming deadlines.
    Deadlines,

    /// Show the per-category overview.
    Categories,

    /// Delete all tasks. Requires `confirm` as the argument.
    Clear { confirmed: bool },

    /// Export all tasks as JSON.
    Export,

    /// Manage the daily reminder.
    Remind(RemindAction),

    /// Set the user's timezone (IANA name).
    Timezone(Option<String>),
}

impl BotCommand {
    /// Parses a command from a message text.
    ///
    /// Commands start with `/`, are case-insensitive, and may carry an
    /// `@botname` suffix (ignored). Returns `None` if the message is not
    /// a command at all.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let after_slash = text.strip_prefix('/')?;

        let (cmd, args) = match after_slash.split_once(char::is_whitespace) {
            Some((cmd, args)) => (cmd, Some(args.trim())),
            None => (after_slash, None),
        };

        // Group chats address commands as /cmd@botname.
        let cmd = cmd.split('@').next().unwrap_or(cmd).to_lowercase();
        let args = args.filter(|a| !a.is_empty());

        match cmd.as_str() {
            "start" => Some(Self::Start),
            "help" | "h" | "?" => Some(Self::Help),
            "add" | "new" => Some(Self::Add(args.map(str::to_owned))),
            "tasks" | "list" | "ls" => Some(Self::List),
            "completed" => Some(Self::Completed),
            "done" | "complete" => Some(Self::Done(args.and_then(|a| a.parse().ok()))),
            "delete" | "del" | "rm" | "remove" => {
                Some(Self::Delete(args.and_then(|a| a.parse().ok())))
            }
            "search" | "find" => Some(Self::Search(args.map(str::to_owned))),
            "stats" | "statistics" => Some(Self::Stats),
            "deadlines" | "due" => Some(Self::Deadlines),
            "categories" | "cats" => Some(Self::Categories),
            "clear" => Some(Self::Clear {
                confirmed: args.is_some_and(|a| a.eq_ignore_ascii_case("confirm")),
            }),
            "export" => Some(Self::Export),
            "remind" | "reminder" => Some(Self::Remind(parse_remind(args))),
            "timezone" | "tz" => Some(Self::Timezone(args.map(str::to_owned))),
            _ => None,
        }
    }

    /// Returns the command name as it appears in help.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Add(_) => "add",
            Self::List => "tasks",
            Self::Completed => "completed",
            Self::Done(_) => "done",
            Self::Delete(_) => "delete",
            Self::Search(_) => "search",
            Self::Stats => "stats",
            Self::Deadlines => "deadlines",
            Self::Categories => "categories",
            Self::Clear { .. } => "clear",
            Self::Export => "export",
            Self::Remind(_) => "remind",
            Self::Timezone(_) => "timezone",
        }
    }

    /// Returns all commands with aliases and descriptions, for help.
    #[must_use]
    pub fn all_commands() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("/add <task>", "", "Add a task (use #tags, by tomorrow)"),
            ("/tasks", "(ls)", "Show pending tasks"),
            ("/done <id>", "", "Mark a task as completed"),
            ("/delete <id>", "(rm)", "Delete a task"),
            ("/completed", "", "Show completed tasks"),
            ("/search <text>", "(find)", "Search in tasks"),
            ("/stats", "", "Your productivity statistics"),
            ("/deadlines", "(due)", "Upcoming deadlines"),
            ("/categories", "(cats)", "Task categories overview"),
            ("/clear", "", "Delete all tasks (asks to confirm)"),
            ("/export", "", "Export tasks to JSON"),
            ("/remind on 09:00", "", "Daily pending-task reminder"),
            ("/timezone <name>", "(tz)", "Set timezone, e.g. Europe/Berlin"),
            ("/help", "(h, ?)", "Show this help message"),
        ]
    }
}

fn parse_remind(args: Option<&str>) -> RemindAction {
    let Some(args) = args else {
        return RemindAction::Show;
    };

    let mut parts = args.split_whitespace();
    match parts.next().map(str::to_lowercase).as_deref() {
        Some("on") => RemindAction::On(parts.next().map(str::to_owned)),
        Some("off") => RemindAction::Off,
        _ => RemindAction::Show,
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(Some(text)) => write!(f, "add {text}"),
            Self::Done(Some(id)) => write!(f, "done {id}"),
            Self::Delete(Some(id)) => write!(f, "delete {id}"),
            Self::Search(Some(keyword)) => write!(f, "search {keyword}"),
            Self::Timezone(Some(tz)) => write!(f, "timezone {tz}"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Result of command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command was successful.
    pub success: bool,

    /// Response message to show the user.
    pub message: String,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_commands() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/help"), Some(BotCommand::Help));
        assert_eq!(BotCommand::parse("/tasks"), Some(BotCommand::List));
        assert_eq!(BotCommand::parse("/stats"), Some(BotCommand::Stats));
        assert_eq!(BotCommand::parse("/export"), Some(BotCommand::Export));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(BotCommand::parse("/ls"), Some(BotCommand::List));
        assert_eq!(BotCommand::parse("/rm 3"), Some(BotCommand::Delete(Some(3))));
        assert_eq!(
            BotCommand::parse("/find milk"),
            Some(BotCommand::Search(Some("milk".to_owned())))
        );
        assert_eq!(BotCommand::parse("/due"), Some(BotCommand::Deadlines));
    }

    #[test]
    fn test_parse_add_with_text() {
        assert_eq!(
            BotCommand::parse("/add Buy milk #shopping by tomorrow"),
            Some(BotCommand::Add(Some(
                "Buy milk #shopping by tomorrow".to_owned()
            )))
        );
    }

    #[test]
    fn test_parse_add_without_text() {
        assert_eq!(BotCommand::parse("/add"), Some(BotCommand::Add(None)));
        assert_eq!(BotCommand::parse("/add   "), Some(BotCommand::Add(None)));
    }

    #[test]
    fn test_parse_done_id() {
        assert_eq!(BotCommand::parse("/done 5"), Some(BotCommand::Done(Some(5))));
        assert_eq!(BotCommand::parse("/done"), Some(BotCommand::Done(None)));
        // Non-numeric id falls back to the usage hint.
        assert_eq!(BotCommand::parse("/done five"), Some(BotCommand::Done(None)));
    }

    #[test]
    fn test_parse_bot_mention_suffix() {
        assert_eq!(
            BotCommand::parse("/tasks@my_task_bot"),
            Some(BotCommand::List)
        );
        assert_eq!(
            BotCommand::parse("/done@my_task_bot 7"),
            Some(BotCommand::Done(Some(7)))
        );
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(BotCommand::parse("/TASKS"), Some(BotCommand::List));
        assert_eq!(BotCommand::parse("/Done 2"), Some(BotCommand::Done(Some(2))));
    }

    #[test]
    fn test_parse_clear_confirmation() {
        assert_eq!(
            BotCommand::parse("/clear"),
            Some(BotCommand::Clear { confirmed: false })
        );
        assert_eq!(
            BotCommand::parse("/clear confirm"),
            Some(BotCommand::Clear { confirmed: true })
        );
        assert_eq!(
            BotCommand::parse("/clear yes"),
            Some(BotCommand::Clear { confirmed: false })
        );
    }

    #[test]
    fn test_parse_remind_forms() {
        assert_eq!(
            BotCommand::parse("/remind"),
            Some(BotCommand::Remind(RemindAction::Show))
        );
        assert_eq!(
            BotCommand::parse("/remind on"),
            Some(BotCommand::Remind(RemindAction::On(None)))
        );
        assert_eq!(
            BotCommand::parse("/remind on 08:30"),
            Some(BotCommand::Remind(RemindAction::On(Some(
                "08:30".to_owned()
            ))))
        );
        assert_eq!(
            BotCommand::parse("/remind off"),
            Some(BotCommand::Remind(RemindAction::Off))
        );
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(
            BotCommand::parse("/tz Europe/Berlin"),
            Some(BotCommand::Timezone(Some("Europe/Berlin".to_owned())))
        );
    }

    #[test]
    fn test_parse_non_commands() {
        assert_eq!(BotCommand::parse("Buy milk"), None);
        assert_eq!(BotCommand::parse("/unknowncmd"), None);
        assert_eq!(BotCommand::parse(""), None);
    }

    #[test]
    fn test_parse_with_extra_whitespace() {
        assert_eq!(BotCommand::parse("  /tasks  "), Some(BotCommand::List));
        assert_eq!(
            BotCommand::parse("/done   5 "),
            Some(BotCommand::Done(Some(5)))
        );
    }
}
