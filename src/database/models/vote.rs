use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One voter's answer to one poll. Keyed by `(user_id, poll_id)`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct VoteRecord {
    pub user_id: i64,
    pub username: String,
    pub selected_option: i64,
    pub poll_id: String,
    /// Creation date of the poll that was active when the vote arrived
    pub poll_creation_date: Option<NaiveDate>,
    pub vote_timestamp: DateTime<Utc>,
}

impl VoteRecord {
    /// Inserts the vote, replacing an earlier vote by the same user in the same poll.
    pub async fn upsert(&self, pool: &sqlx::SqlitePool, namespace: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO votes (namespace, user_id, poll_id, username, selected_option, poll_creation_date, vote_timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (namespace, user_id, poll_id) DO UPDATE SET
                username = excluded.username,
                selected_option = excluded.selected_option,
                poll_creation_date = excluded.poll_creation_date,
                vote_timestamp = excluded.vote_timestamp
            "#,
        )
        .bind(namespace)
        .bind(self.user_id)
        .bind(&self.poll_id)
        .bind(&self.username)
        .bind(self.selected_option)
        .bind(self.poll_creation_date)
        .bind(self.vote_timestamp)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn find(
        pool: &sqlx::SqlitePool,
        namespace: &str,
        user_id: i64,
        poll_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, VoteRecord>(
            "SELECT user_id, username, selected_option, poll_id, poll_creation_date, vote_timestamp FROM votes WHERE namespace = ? AND user_id = ? AND poll_id = ?"
        )
        .bind(namespace)
        .bind(user_id)
        .bind(poll_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_poll(
        pool: &sqlx::SqlitePool,
        namespace: &str,
        poll_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, VoteRecord>(
            "SELECT user_id, username, selected_option, poll_id, poll_creation_date, vote_timestamp FROM votes WHERE namespace = ? AND poll_id = ? ORDER BY vote_timestamp, user_id"
        )
        .bind(namespace)
        .bind(poll_id)
        .fetch_all(pool)
        .await
    }
}
