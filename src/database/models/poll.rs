use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::bot::client::PostedPoll;
use crate::error::BotError;
use crate::poll::tally::Tally;

/// Where a poll is in its life. Moves forward only: `Active` to `Closed` or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Active,
    Closed,
    Cancelled,
}

impl PollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollStatus::Active => "active",
            PollStatus::Closed => "closed",
            PollStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(PollStatus::Active),
            "closed" => Some(PollStatus::Closed),
            "cancelled" => Some(PollStatus::Cancelled),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: PollStatus) -> bool {
        matches!(
            (self, next),
            (PollStatus::Active, PollStatus::Closed) | (PollStatus::Active, PollStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct OptionTally {
    pub option_text: String,
    pub votes: i64,
    pub percentage: f64,
}

/// One poll execution, built up in memory and written once when the lifecycle ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollRecord {
    pub poll_id: String,
    pub poll_message_id: i32,
    /// Every message posted for this poll, poll message first. May contain duplicates.
    pub message_ids: Vec<i32>,
    pub reminder_message_id: Option<i32>,
    pub poll_creation_date: NaiveDate,
    pub poll_start_time: DateTime<Utc>,
    pub poll_end_time: Option<DateTime<Utc>>,
    pub poll_question: String,
    pub poll_options: Vec<String>,
    pub status: PollStatus,
    pub total_votes: i64,
    /// Empty until the poll is tallied, and stays empty when nobody voted
    pub option_votes: Vec<OptionTally>,
    pub outcome: Option<String>,
}

#[derive(FromRow)]
struct PollRow {
    poll_id: String,
    poll_message_id: i32,
    reminder_message_id: Option<i32>,
    message_ids: String,
    poll_creation_date: NaiveDate,
    poll_start_time: DateTime<Utc>,
    poll_end_time: Option<DateTime<Utc>>,
    poll_question: String,
    poll_options: String,
    status: String,
    total_votes: i64,
    outcome: Option<String>,
}

impl PollRecord {
    pub fn new(posted: &PostedPoll, started_at: DateTime<Utc>, question: String, options: Vec<String>) -> Self {
        Self {
            poll_id: posted.poll_id.clone(),
            poll_message_id: posted.message_id,
            message_ids: vec![posted.message_id],
            reminder_message_id: None,
            poll_creation_date: started_at.date_naive(),
            poll_start_time: started_at,
            poll_end_time: None,
            poll_question: question,
            poll_options: options,
            status: PollStatus::Active,
            total_votes: 0,
            option_votes: Vec::new(),
            outcome: None,
        }
    }

    pub fn track_message(&mut self, message_id: i32) {
        self.message_ids.push(message_id);
    }

    /// Marks the poll closed and stores its tally. Refused unless the poll is still active.
    pub fn close(&mut self, ended_at: DateTime<Utc>, tally: &Tally) -> bool {
        if !self.set_status(PollStatus::Closed) {
            return false;
        }
        self.poll_end_time = Some(ended_at);
        self.total_votes = tally.total_votes;
        self.option_votes = tally.options.clone();
        self.outcome = Some(tally.outcome.to_string());
        true
    }

    /// Marks an aborted poll. Refused unless the poll is still active.
    pub fn cancel(&mut self, ended_at: DateTime<Utc>) -> bool {
        if !self.set_status(PollStatus::Cancelled) {
            return false;
        }
        self.poll_end_time = Some(ended_at);
        true
    }

    fn set_status(&mut self, next: PollStatus) -> bool {
        if !self.status.can_transition_to(next) {
            tracing::warn!(
                "Refusing poll {} status change {} -> {}",
                self.poll_id,
                self.status.as_str(),
                next.as_str()
            );
            return false;
        }
        self.status = next;
        true
    }

    /// Writes the poll and its per-option results in one transaction. Fails if the poll was already stored.
    pub async fn insert(&self, pool: &sqlx::SqlitePool, namespace: &str) -> Result<(), BotError> {
        let message_ids = serde_json::to_string(&self.message_ids)?;
        let options = serde_json::to_string(&self.poll_options)?;

        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO polls (
                namespace, poll_id, poll_message_id, reminder_message_id, message_ids,
                poll_creation_date, poll_start_time, poll_end_time, poll_question,
                poll_options, status, total_votes, outcome
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(namespace)
        .bind(&self.poll_id)
        .bind(self.poll_message_id)
        .bind(self.reminder_message_id)
        .bind(&message_ids)
        .bind(self.poll_creation_date)
        .bind(self.poll_start_time)
        .bind(self.poll_end_time)
        .bind(&self.poll_question)
        .bind(&options)
        .bind(self.status.as_str())
        .bind(self.total_votes)
        .bind(&self.outcome)
        .execute(&mut tx)
        .await?;

        for (position, tally) in self.option_votes.iter().enumerate() {
            sqlx::query(
                "INSERT INTO poll_results (namespace, poll_id, position, option_text, votes, percentage) VALUES (?, ?, ?, ?, ?, ?)"
            )
            .bind(namespace)
            .bind(&self.poll_id)
            .bind(position as i64)
            .bind(&tally.option_text)
            .bind(tally.votes)
            .bind(tally.percentage)
            .execute(&mut tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        namespace: &str,
        poll_id: &str,
    ) -> Result<Option<Self>, BotError> {
        let row = sqlx::query_as::<_, PollRow>(
            "SELECT poll_id, poll_message_id, reminder_message_id, message_ids, poll_creation_date, poll_start_time, poll_end_time, poll_question, poll_options, status, total_votes, outcome FROM polls WHERE namespace = ? AND poll_id = ?"
        )
        .bind(namespace)
        .bind(poll_id)
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status = PollStatus::parse(&row.status)
            .ok_or_else(|| BotError::Persistence(format!("unknown poll status '{}'", row.status)))?;
        let option_votes = Self::results(pool, namespace, poll_id).await?;

        Ok(Some(Self {
            poll_id: row.poll_id,
            poll_message_id: row.poll_message_id,
            message_ids: serde_json::from_str(&row.message_ids)?,
            reminder_message_id: row.reminder_message_id,
            poll_creation_date: row.poll_creation_date,
            poll_start_time: row.poll_start_time,
            poll_end_time: row.poll_end_time,
            poll_question: row.poll_question,
            poll_options: serde_json::from_str(&row.poll_options)?,
            status,
            total_votes: row.total_votes,
            option_votes,
            outcome: row.outcome,
        }))
    }

    /// Per-option results in the poll's option order.
    pub async fn results(
        pool: &sqlx::SqlitePool,
        namespace: &str,
        poll_id: &str,
    ) -> Result<Vec<OptionTally>, BotError> {
        let rows = sqlx::query_as::<_, OptionTally>(
            "SELECT option_text, votes, percentage FROM poll_results WHERE namespace = ? AND poll_id = ? ORDER BY position"
        )
        .bind(namespace)
        .bind(poll_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::tally::{Outcome, Tally};

    fn posted() -> PostedPoll {
        PostedPoll { poll_id: "5012".into(), message_id: 9 }
    }

    #[test]
    fn test_new_record_is_active_and_tracks_poll_message() {
        let started = Utc::now();
        let record = PollRecord::new(&posted(), started, "Daily Poll".into(), vec!["A".into(), "B".into()]);

        assert_eq!(record.status, PollStatus::Active);
        assert_eq!(record.message_ids, vec![9]);
        assert_eq!(record.poll_creation_date, started.date_naive());
        assert!(record.option_votes.is_empty());
        assert!(record.poll_end_time.is_none());
    }

    #[test]
    fn test_status_only_moves_forward() {
        let mut record = PollRecord::new(&posted(), Utc::now(), "Q".into(), vec!["A".into(), "B".into()]);
        let tally = Tally { total_votes: 0, options: Vec::new(), outcome: Outcome::NoVotes };

        assert!(record.close(Utc::now(), &tally));
        assert_eq!(record.status, PollStatus::Closed);

        assert!(!record.cancel(Utc::now()));
        assert!(!record.close(Utc::now(), &tally));
        assert_eq!(record.status, PollStatus::Closed);
        assert_eq!(record.outcome.as_deref(), Some("No votes received"));
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [PollStatus::Active, PollStatus::Closed, PollStatus::Cancelled] {
            assert_eq!(PollStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PollStatus::parse("paused"), None);
    }
}
