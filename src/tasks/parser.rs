//! Free-text task parser.
//!
//! Turns `/add` input like `#work Finish report #urgent by tomorrow` into
//! a structured draft: hashtags select the category, priority, or become
//! free tags; `by <date>` / `due <date>` sets the due date; everything
//! else is the title.

use chrono::{Datelike, NaiveDate, Weekday};

use super::model::{NewTask, Priority, CATEGORIES, DEFAULT_CATEGORY};

/// Parses task text into a draft relative to `today`.
///
/// If stripping tags and dates leaves no title, the original text is used
/// as the title so a task is never silently lost.
#[must_use]
pub fn parse_task_text(text: &str, today: NaiveDate) -> NewTask {
    let mut title_parts: Vec<&str> = Vec::new();
    let mut category = DEFAULT_CATEGORY.to_owned();
    let mut priority = Priority::default();
    let mut tags: Vec<String> = Vec::new();
    let mut due_date = None;

    let parts: Vec<&str> = text.split_whitespace().collect();
    let mut i = 0;
    while i < parts.len() {
        let part = parts[i];

        if let Some(tag) = part.strip_prefix('#').filter(|t| !t.is_empty()) {
            let tag = tag.to_lowercase();
            if CATEGORIES.contains(&tag.as_str()) {
                category = tag;
            } else if let Some(p) = Priority::from_keyword(&tag) {
                priority = p;
            } else {
                tags.push(tag);
            }
        } else if (part == "by" || part == "due") && i + 1 < parts.len() {
            match parse_date(parts[i + 1], today) {
                Some(date) => {
                    due_date = Some(date);
                    i += 1;
                }
                // Not a date: treat "by"/"due" as ordinary title words.
                None => title_parts.push(part),
            }
        } else {
            title_parts.push(part);
        }

        i += 1;
    }

    let mut title = title_parts.join(" ");
    if title.is_empty() {
        title = text.trim().to_owned();
    }

    NewTask {
        title,
        category,
        priority,
        tags,
        due_date,
    }
}

/// Parses a due date token relative to `today`.
///
/// Accepts `today`, `tomorrow`, weekday names (next occurrence, never
/// today), `YYYY-MM-DD`, and `DD.MM.YYYY` / `DD/MM/YYYY` / `DD-MM-YYYY`.
#[must_use]
pub fn parse_date(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let token = token.to_lowercase();

    match token.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        _ => {}
    }

    if let Some(weekday) = parse_weekday(&token) {
        let mut ahead = i64::from(
            (weekday.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7,
        );
        if ahead == 0 {
            ahead = 7; // same weekday means next week
        }
        return today.checked_add_signed(chrono::Duration::days(ahead));
    }

    if let Ok(date) = NaiveDate::parse_from_str(&token, "%Y-%m-%d") {
        return Some(date);
    }

    for fmt in ["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&token, fmt) {
            return Some(date);
        }
    }

    None
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    match token {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}
