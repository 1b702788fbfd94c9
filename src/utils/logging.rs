use tracing::{debug, error, info, warn};

/// Logs a lifecycle stage change with consistent format
pub fn log_stage_transition(from: &str, to: &str, poll_id: Option<&str>) {
    match poll_id {
        Some(id) => info!("STAGE: {} -> {} for poll {}", from, to, id),
        None => info!("STAGE: {} -> {}", from, to),
    }
}

/// Logs a successful chat platform call
pub fn log_chat_operation(operation: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("CHAT: {} - {}", operation, d),
        None => info!("CHAT: {}", operation),
    }
}

/// Logs chat platform failures with consistent format
pub fn log_chat_error(operation: &str, error: &str, fatal: bool) {
    if fatal {
        error!("CHAT_ERROR: {} failed (fatal): {}", operation, error);
    } else {
        warn!("CHAT_ERROR: {} failed: {}", operation, error);
    }
}

/// Logs an incoming vote with consistent format
pub fn log_vote_event(user: &str, user_id: u64, poll_id: &str, option: &str) {
    info!("VOTE: {}({}) voted '{}' in poll {}", user, user_id, option, poll_id);
}

/// Logs a vote that could not be recorded
pub fn log_vote_rejected(user: &str, user_id: u64, poll_id: &str, reason: &str) {
    warn!("VOTE_REJECTED: {}({}) in poll {} - {}", user, user_id, poll_id, reason);
}

/// Logs database operations with consistent format
pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs timeout events with consistent format
pub fn log_timeout(operation: &str, duration_secs: u64, details: Option<&str>) {
    match details {
        Some(d) => warn!("TIMEOUT: {} after {}s - {}", operation, duration_secs, d),
        None => warn!("TIMEOUT: {} after {}s", operation, duration_secs),
    }
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
