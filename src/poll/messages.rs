//! Texts the bot posts, all in Telegram HTML mode.

use chrono::{DateTime, Utc};

use crate::poll::tally::Tally;
use crate::utils::datetime::{format_minutes, format_poll_timestamp};
use crate::utils::html::{bold, escape_html};

/// Poll questions are plain text, Telegram does not parse markup in them.
pub fn poll_question(title: &str, now: &DateTime<Utc>) -> String {
    format!("📊 {} - {}", title, format_poll_timestamp(now))
}

pub fn reminder_text(reminder_mins: u64) -> String {
    format!(
        "⏰ {}\n\nPoll closes in {}!\nMake sure to cast your vote! 🗳️",
        bold("Reminder!"),
        format_minutes(reminder_mins)
    )
}

pub fn results_text(tally: &Tally) -> String {
    let mut text = format!("📊 {}\n\nTotal Votes: {}\n", bold("Poll Results"), tally.total_votes);

    for option in &tally.options {
        text.push_str(&format!(
            "{}: {} votes ({:.1}%)\n",
            escape_html(&option.option_text),
            option.votes,
            option.percentage
        ));
    }

    text.push('\n');
    text.push_str(&bold(&format!("Result: {}", escape_html(&tally.outcome.to_string()))));
    text
}
