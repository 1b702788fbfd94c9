use thiserror::Error;

/// Every failure the bot distinguishes, grouped by how it is handled.
///
/// Only [`BotError::Config`] and [`BotError::Critical`] stop forward progress.
/// Everything else is logged and the bot carries on in a degraded way.
#[derive(Debug, Error)]
pub enum BotError {
    /// A missing or invalid setting. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// A chat call whose failure the lifecycle tolerates (image, reminder, delete, results).
    #[error("{operation} failed: {reason}")]
    Transient {
        /// The chat operation that failed
        operation: &'static str,
        /// What the chat platform reported
        reason: String,
    },

    /// A chat call the lifecycle cannot continue without (posting or closing the poll).
    #[error("{operation} failed critically: {reason}")]
    Critical {
        /// The chat operation that failed
        operation: &'static str,
        /// What the chat platform reported
        reason: String,
    },

    /// A store write or read failed. Always best-effort.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A vote event that cannot be recorded (unknown option, no option selected).
    #[error("malformed vote: {0}")]
    MalformedVote(String),
}

impl BotError {
    /// Whether this error must halt the lifecycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BotError::Config(_) | BotError::Critical { .. })
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        BotError::Config(message.into())
    }
}

impl From<sqlx::Error> for BotError {
    fn from(e: sqlx::Error) -> Self {
        BotError::Persistence(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for BotError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        BotError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        BotError::Persistence(format!("serialization failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_and_critical_are_fatal() {
        assert!(BotError::config("TG_CHAT_ID must be set").is_fatal());
        assert!(BotError::Critical { operation: "close poll", reason: "timeout".into() }.is_fatal());

        assert!(!BotError::Transient { operation: "send image", reason: "404".into() }.is_fatal());
        assert!(!BotError::Persistence("disk full".into()).is_fatal());
        assert!(!BotError::MalformedVote("option 7".into()).is_fatal());
    }

    #[test]
    fn test_error_messages_name_the_operation() {
        let err = BotError::Transient { operation: "delete message 42", reason: "message not found".into() };
        assert_eq!(err.to_string(), "delete message 42 failed: message not found");
    }
}
