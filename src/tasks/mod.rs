//! Task domain module.
//!
//! Defines the task data model and the free-text parser that turns
//! `/add` input into a structured task draft.

mod model;
mod parser;

pub use model::{CategoryStat, NewTask, Priority, Task, TaskStats, CATEGORIES, DEFAULT_CATEGORY};
pub use parser::{parse_date, parse_task_text};
