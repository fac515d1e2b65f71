//! Text rendering of the wall for the terminal.

use chrono::{DateTime, Utc};

use crate::models::FeedbackEntry;
use crate::state::{Presentation, WallState};
use crate::validation::FieldErrors;
use crate::{APP_NAME, APP_VERSION};

const LOADING: &str = "Loading feedback...";
const EMPTY: &str = "No feedback yet. Be the first to share your thoughts!";
const ERROR_TITLE: &str = "Error loading feedback";
const BULLET: char = '●';

/// Human-friendly age of a timestamp relative to `now`.
///
/// ```text
/// Just now
/// 5 minutes ago
/// 1 hour ago
/// Jan 1, 2024
/// ```
pub fn relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_minutes();
    let hours = minutes / 60;

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{} minute{} ago", minutes, if minutes == 1 { "" } else { "s" })
    } else if hours < 24 {
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else {
        created_at.format("%b %-d, %Y").to_string()
    }
}

fn entry_age(entry: &FeedbackEntry, now: DateTime<Utc>) -> String {
    match entry.created_at_utc() {
        Some(created) => relative_time(created, now),
        None => entry.created_at.clone(),
    }
}

/// Render one entry as a card.
pub fn render_entry(entry: &FeedbackEntry, now: DateTime<Utc>) -> String {
    let mut output = format!("{} {} · {}\n", BULLET, entry.name, entry_age(entry, now));
    for line in entry.message.lines() {
        output.push_str("  ");
        output.push_str(line);
        output.push('\n');
    }
    output
}

pub fn render_header() -> String {
    let title = format!("{} v{}", APP_NAME, APP_VERSION);
    format!("{}\n{}\n", title, "=".repeat(title.chars().count()))
}

/// Render whichever view the state calls for.
pub fn render_wall(state: &WallState, now: DateTime<Utc>) -> String {
    match state.presentation() {
        Presentation::Loading => format!("{}\n", LOADING),
        Presentation::Error => format!(
            "! {}\n  {}\n  Press [r] to retry.\n",
            ERROR_TITLE,
            state.error().unwrap_or_default()
        ),
        Presentation::Empty => format!("{}\n", EMPTY),
        Presentation::Populated => state
            .entries()
            .iter()
            .map(|entry| render_entry(entry, now))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Label for the submit control.
pub fn submit_label(state: &WallState) -> &'static str {
    if state.is_submitting() {
        "Sending..."
    } else if state.is_success() {
        "Sent!"
    } else {
        "Send Feedback"
    }
}

pub fn render_field_errors(errors: &FieldErrors) -> String {
    let mut output = String::new();
    for (field, message) in [("name", &errors.name), ("message", &errors.message)] {
        if let Some(message) = message {
            output.push_str(&format!("  {}: {}\n", field, message));
        }
    }
    output
}
