//! Task data model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Categories recognized as `#hashtags` in task text.
pub const CATEGORIES: &[&str] = &["work", "personal", "study", "shopping", "health", "other"];

/// Category assigned when no category hashtag is present.
pub const DEFAULT_CATEGORY: &str = "general";

/// Task priority. Stored as an integer rank where lower is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank used for storage and sort order (1 = high, 3 = low).
    #[must_use]
    pub const fn rank(self) -> i64 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    /// Converts a stored rank back to a priority, defaulting to medium
    /// for anything out of range.
    #[must_use]
    pub const fn from_rank(rank: i64) -> Self {
        match rank {
            1 => Self::High,
            3 => Self::Low,
            _ => Self::Medium,
        }
    }

    /// Maps a priority hashtag word to a priority.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "urgent" | "important" | "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Icon shown in task listings.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::High => "🔥",
            Self::Medium => "⚠️",
            Self::Low => "💤",
        }
    }

    /// Label shown in the add-confirmation reply.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "🔥 URGENT",
            Self::Medium => "⚠️ Medium",
            Self::Low => "💤 Low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// A stored task owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub tags: Vec<String>,
}

/// A task draft produced by the text parser, ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub due_date: Option<NaiveDate>,
}

/// Per-user productivity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

impl TaskStats {
    /// Completion rate in percent (0.0 when there are no tasks).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Per-category totals for the categories overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStat {
    pub category: String,
    pub total: u64,
    pub completed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_round_trip() {
        for p in [Priority::High, Priority::Medium, Priority::Low] {
            assert_eq!(Priority::from_rank(p.rank()), p);
        }
    }

    #[test]
    fn test_priority_from_rank_out_of_range() {
        assert_eq!(Priority::from_rank(0), Priority::Medium);
        assert_eq!(Priority::from_rank(99), Priority::Medium);
    }

    #[test]
    fn test_priority_from_keyword() {
        assert_eq!(Priority::from_keyword("urgent"), Some(Priority::High));
        assert_eq!(Priority::from_keyword("important"), Some(Priority::High));
        assert_eq!(Priority::from_keyword("low"), Some(Priority::Low));
        assert_eq!(Priority::from_keyword("work"), None);
    }

    #[test]
    fn test_completion_rate() {
        let stats = TaskStats {
            total: 4,
            completed: 3,
            pending: 1,
        };
        assert!((stats.completion_rate() - 75.0).abs() < f64::EPSILON);

        let empty = TaskStats::default();
        assert!((empty.completion_rate()).abs() < f64::EPSILON);
    }
}
