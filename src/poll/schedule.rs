use std::time::Duration;
use tokio::time::Instant;

use crate::config::PollSettings;
use crate::error::BotError;
use crate::utils::validation::validate_poll_timing;

/// When the reminder and the close happen, relative to the moment the poll was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    until_reminder: Duration,
    until_close: Duration,
}

impl PollSchedule {
    pub fn new(duration_mins: u64, reminder_mins: u64) -> Result<Self, BotError> {
        validate_poll_timing(duration_mins, reminder_mins)?;

        Ok(Self {
            until_reminder: minutes(duration_mins - reminder_mins)?,
            until_close: minutes(reminder_mins)?,
        })
    }

    pub fn from_settings(settings: &PollSettings) -> Result<Self, BotError> {
        Self::new(settings.duration_mins, settings.reminder_mins)
    }

    /// Wait between posting the poll and sending the reminder.
    pub fn until_reminder(&self) -> Duration {
        self.until_reminder
    }

    /// Wait between the reminder and closing the poll.
    pub fn until_close(&self) -> Duration {
        self.until_close
    }

    pub fn total(&self) -> Duration {
        self.until_reminder + self.until_close
    }

    pub fn reminder_at(&self, started: Instant) -> Instant {
        started + self.until_reminder
    }

    pub fn close_at(&self, started: Instant) -> Instant {
        started + self.total()
    }
}

/// Time left until `deadline`, or `None` once it has passed.
pub fn remaining(deadline: Instant, now: Instant) -> Option<Duration> {
    let left = deadline.saturating_duration_since(now);
    if left.is_zero() {
        None
    } else {
        Some(left)
    }
}

fn minutes(mins: u64) -> Result<Duration, BotError> {
    mins.checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| BotError::config(format!("{mins} minutes does not fit in a duration")))
}
