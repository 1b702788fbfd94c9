use crate::error::BotError;

/// Telegram accepts between 2 and 10 answer options per poll.
pub const MIN_POLL_OPTIONS: usize = 2;
/// Upper bound on answer options per poll.
pub const MAX_POLL_OPTIONS: usize = 10;
/// Telegram limit for a single option label.
pub const MAX_OPTION_LENGTH: usize = 100;
/// Longest poll accepted, one week.
pub const MAX_POLL_DURATION_MINS: u64 = 7 * 24 * 60;

pub fn validate_telegram_chat_id(chat_id: i64) -> Result<(), BotError> {
    // Telegram chat IDs should be non-zero
    if chat_id == 0 {
        return Err(BotError::config("TG_CHAT_ID cannot be zero"));
    }

    // Positive IDs should be within reasonable range for user chats (up to 2^31-1)
    if chat_id > 2147483647 {
        return Err(BotError::config("TG_CHAT_ID is outside the user chat range"));
    }

    // Negative IDs can be:
    // - Group chats: small negative numbers like -12345 (up to around -2^31)
    // - Supergroups: very large negative numbers starting around -1000000000000
    if chat_id < -2000000000000 {
        return Err(BotError::config("TG_CHAT_ID is out of the valid range"));
    }

    Ok(())
}

/// Splits a pipe-delimited option list, trimming every label.
pub fn validate_poll_options(options: &str) -> Result<Vec<String>, BotError> {
    let options = options.trim();

    if options.is_empty() {
        return Err(BotError::config("POLL_OPTIONS cannot be empty"));
    }

    let option_list: Vec<String> = options
        .split('|')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if option_list.len() < MIN_POLL_OPTIONS {
        return Err(BotError::config(format!(
            "POLL_OPTIONS needs at least {MIN_POLL_OPTIONS} options separated by '|', got {}",
            option_list.len()
        )));
    }

    if option_list.len() > MAX_POLL_OPTIONS {
        return Err(BotError::config(format!(
            "POLL_OPTIONS cannot have more than {MAX_POLL_OPTIONS} options"
        )));
    }

    for option in &option_list {
        if option.chars().count() > MAX_OPTION_LENGTH {
            return Err(BotError::config(format!(
                "Poll option '{option}' is too long (max {MAX_OPTION_LENGTH} characters)"
            )));
        }
    }

    Ok(option_list)
}

/// The reminder has to land strictly inside the poll window.
pub fn validate_poll_timing(duration_mins: u64, reminder_mins: u64) -> Result<(), BotError> {
    if duration_mins == 0 {
        return Err(BotError::config("POLL_DURATION_IN_MINS must be greater than zero"));
    }

    if duration_mins > MAX_POLL_DURATION_MINS {
        return Err(BotError::config(format!(
            "POLL_DURATION_IN_MINS ({duration_mins}) cannot be longer than {MAX_POLL_DURATION_MINS} minutes"
        )));
    }

    if duration_mins <= reminder_mins {
        return Err(BotError::config(format!(
            "POLL_DURATION_IN_MINS ({duration_mins}) must be greater than REMINDER_MINS ({reminder_mins})"
        )));
    }

    Ok(())
}

pub fn validate_poll_title(title: &str) -> Result<(), BotError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(BotError::config("POLL_TITLE cannot be empty"));
    }

    // Leaves room for the " - YYYY-MM-DD HH:MM UTC" suffix inside Telegram's 300 character limit
    if title.chars().count() > 200 {
        return Err(BotError::config("POLL_TITLE cannot be longer than 200 characters"));
    }

    if title.contains('\n') || title.contains('\r') {
        return Err(BotError::config("POLL_TITLE cannot contain line breaks"));
    }

    Ok(())
}
