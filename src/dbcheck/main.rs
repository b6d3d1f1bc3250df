//! Standalone checker for task bot databases.
//!
//! Opens a database file, applies any pending schema migrations, and
//! prints row counts so a broken or stale database can be spotted
//! without starting the bot.

use std::process::ExitCode;

use clap::Parser;
use rusqlite::Connection;

use task_manager_bot::storage::{current_user_version, open_db};

/// Task database checker.
#[derive(Parser, Debug)]
#[command(name = "taskdb_check")]
#[command(about = "Checks and migrates a task bot SQLite database")]
#[command(version)]
struct Args {
    /// Path to the SQLite task database.
    #[arg(short, long, default_value = "tasks.db")]
    db: String,

    /// Show per-user task counts.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    check_db(&args.db, args.verbose)
}

fn check_db(path: &str, verbose: bool) -> ExitCode {
    println!("Checking: {path}");

    // open_db runs migrations, so an out-of-date file is upgraded here.
    let conn = match open_db(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    match current_user_version(&conn) {
        Ok(version) => println!("✓ Schema version: {version}"),
        Err(e) => {
            eprintln!("✗ Failed to read schema version: {e}");
            return ExitCode::FAILURE;
        }
    }

    let totals = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM tasks WHERE is_completed = 0),
                (SELECT COUNT(*) FROM tasks WHERE is_completed = 1),
                (SELECT COUNT(*) FROM user_settings WHERE daily_reminder = 1)",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        },
    );

    let (users, pending, completed, reminders) = match totals {
        Ok(t) => t,
        Err(e) => {
            eprintln!("✗ Failed to read counts: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("\nContents:");
    println!("  Users:             {users}");
    println!("  Pending tasks:     {pending}");
    println!("  Completed tasks:   {completed}");
    println!("  Reminders enabled: {reminders}");

    if verbose {
        if let Err(e) = print_per_user(&conn) {
            eprintln!("✗ Failed to read per-user counts: {e}");
            return ExitCode::FAILURE;
        }
    }

    println!("\n✓ Database is healthy");
    ExitCode::SUCCESS
}

fn print_per_user(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "SELECT u.user_id,
                COALESCE(u.username, u.first_name, 'unknown'),
                COUNT(t.id),
                COALESCE(SUM(CASE WHEN t.is_completed = 0 THEN 1 ELSE 0 END), 0)
         FROM users u
         LEFT JOIN tasks t ON t.user_id = u.user_id
         GROUP BY u.user_id
         ORDER BY COUNT(t.id) DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    println!("\nPer user:");
    for row in rows {
        let (user_id, name, total, pending) = row?;
        println!("  [{user_id}] {name}: {total} task(s), {pending} pending");
    }
    Ok(())
}
