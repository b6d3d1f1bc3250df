//! Task Manager Bot Library
//!
//! A Telegram bot for personal task management.
//!
//! This crate provides the core functionality for:
//! - Parsing task text with `#tags`, priorities, and due dates
//! - Storing tasks per user in SQLite
//! - Connecting to Telegram and dispatching slash commands
//! - Sending daily pending-task reminders

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod storage;
pub mod tasks;
pub mod telegram;
