use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

use crate::database::models::VoteRecord;
use crate::database::store::{RecordStore, StoreWrite};
use crate::error::BotError;
use crate::poll::ActivePoll;
use crate::utils::logging::{log_vote_event, log_vote_rejected};

/// Display name stored for voters without a username
pub const UNKNOWN_VOTER: &str = "Unknown";

/// A vote as pushed by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteEvent {
    pub voter_id: u64,
    pub voter_display_name: Option<String>,
    pub poll_id: String,
    pub selected_option_index: i64,
}

/// What happened to a vote event.
#[derive(Debug, Clone, PartialEq)]
pub enum VoteDisposition {
    Stored(VoteRecord),
    /// Valid vote, but the store skipped or rejected it
    NotPersisted(VoteRecord),
    /// Malformed event, nothing was built or written
    Dropped,
}

/// Turns vote events into stored [`VoteRecord`]s.
///
/// Never blocks on the lifecycle: the only thing it reads from it is the
/// latest [`ActivePoll`] published on a watch channel.
pub struct VoteRecorder {
    store: Arc<dyn RecordStore>,
    options: Vec<String>,
    active_poll: watch::Receiver<Option<ActivePoll>>,
}

impl VoteRecorder {
    pub fn new(
        store: Arc<dyn RecordStore>,
        options: Vec<String>,
        active_poll: watch::Receiver<Option<ActivePoll>>,
    ) -> Self {
        Self {
            store,
            options,
            active_poll,
        }
    }

    /// Validates and stores one vote. Failures are logged, never returned.
    pub async fn on_vote_event(&self, event: VoteEvent) -> VoteDisposition {
        let record = match self.build_record(&event) {
            Ok(record) => record,
            Err(e) => {
                log_vote_rejected(display_name(&event), event.voter_id, &event.poll_id, &e.to_string());
                return VoteDisposition::Dropped;
            }
        };

        if let Some(option) = self.options.get(record.selected_option as usize) {
            log_vote_event(&record.username, event.voter_id, &record.poll_id, option);
        }

        match self.store.upsert_vote(&record).await {
            Ok(StoreWrite::Written) => {
                tracing::info!("Vote saved to database");
                VoteDisposition::Stored(record)
            }
            Ok(StoreWrite::Skipped) => VoteDisposition::NotPersisted(record),
            Err(e) => {
                tracing::warn!("Vote by {} in poll {} was not saved: {}", record.user_id, record.poll_id, e);
                VoteDisposition::NotPersisted(record)
            }
        }
    }

    fn build_record(&self, event: &VoteEvent) -> Result<VoteRecord, BotError> {
        let index = event.selected_option_index;
        if index < 0 || index as usize >= self.options.len() {
            return Err(BotError::MalformedVote(format!(
                "option index {} outside 0..{}",
                index,
                self.options.len()
            )));
        }

        let user_id = i64::try_from(event.voter_id)
            .map_err(|_| BotError::MalformedVote(format!("voter id {} out of range", event.voter_id)))?;

        let poll_creation_date = self.active_poll.borrow().as_ref().map(|active| active.creation_date);

        Ok(VoteRecord {
            user_id,
            username: display_name(event).to_string(),
            selected_option: index,
            poll_id: event.poll_id.clone(),
            poll_creation_date,
            vote_timestamp: Utc::now(),
        })
    }
}

fn display_name(event: &VoteEvent) -> &str {
    event
        .voter_display_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(UNKNOWN_VOTER)
}
