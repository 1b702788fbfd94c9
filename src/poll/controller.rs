use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::bot::client::{ChatClient, ChatError, ClosedPoll, PostedPoll};
use crate::config::{ImageSettings, PollSettings};
use crate::database::models::PollRecord;
use crate::database::store::{RecordStore, StoreWrite};
use crate::error::BotError;
use crate::poll::messages;
use crate::poll::schedule::{remaining, PollSchedule};
use crate::poll::stage::LifecycleStage;
use crate::poll::tally::Tally;
use crate::services::shutdown::{Shutdown, ShutdownReason};
use crate::utils::logging::{log_chat_error, log_chat_operation, log_stage_transition};

/// The poll votes are currently being collected for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePoll {
    pub poll_id: String,
    pub creation_date: NaiveDate,
}

/// How a lifecycle run ended.
#[derive(Debug)]
pub struct LifecycleReport {
    /// `Done` or `Aborted`
    pub stage: LifecycleStage,
    /// `None` when the poll was never posted
    pub record: Option<PollRecord>,
    /// The critical failure behind an abort. `None` on success or when interrupted.
    pub error: Option<BotError>,
}

impl LifecycleReport {
    pub fn is_success(&self) -> bool {
        self.stage == LifecycleStage::Done
    }
}

enum Abort {
    Failed(BotError),
    Interrupted(ShutdownReason),
}

/// Drives one poll through its stages. Consumed by [`PollLifecycle::run`].
pub struct PollLifecycle {
    chat: Arc<dyn ChatClient>,
    store: Arc<dyn RecordStore>,
    settings: PollSettings,
    image: Option<ImageSettings>,
    schedule: PollSchedule,
    shutdown: Shutdown,
    stage: LifecycleStage,
    stage_tx: watch::Sender<LifecycleStage>,
    active_tx: watch::Sender<Option<ActivePoll>>,
}

impl PollLifecycle {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        store: Arc<dyn RecordStore>,
        settings: PollSettings,
        image: Option<ImageSettings>,
        shutdown: Shutdown,
    ) -> Result<Self, BotError> {
        let schedule = PollSchedule::from_settings(&settings)?;
        let (stage_tx, _) = watch::channel(LifecycleStage::Creating);
        let (active_tx, _) = watch::channel(None);

        Ok(Self {
            chat,
            store,
            settings,
            image,
            schedule,
            shutdown,
            stage: LifecycleStage::Creating,
            stage_tx,
            active_tx,
        })
    }

    pub fn schedule(&self) -> PollSchedule {
        self.schedule
    }

    /// Follows the current stage, for health reporting.
    pub fn stage_receiver(&self) -> watch::Receiver<LifecycleStage> {
        self.stage_tx.subscribe()
    }

    /// Follows the poll being voted on, for the vote recorder.
    pub fn active_poll_receiver(&self) -> watch::Receiver<Option<ActivePoll>> {
        self.active_tx.subscribe()
    }

    /// Runs every stage in order and signals shutdown at the end, whatever the outcome.
    pub async fn run(mut self) -> LifecycleReport {
        tracing::info!("=================== Starting Poll ===================");

        let started_at = Utc::now();
        let question = messages::poll_question(&self.settings.title, &started_at);

        let posted = match self.post_poll(&question).await {
            Ok(posted) => posted,
            Err(e) => return self.abort(None, Abort::Failed(e)).await,
        };
        let started = Instant::now();

        let mut record = PollRecord::new(&posted, started_at, question, self.settings.options.clone());
        self.active_tx.send_replace(Some(ActivePoll {
            poll_id: record.poll_id.clone(),
            creation_date: record.poll_creation_date,
        }));

        if let Some(message_id) = self.send_image().await {
            record.track_message(message_id);
        }
        self.advance(LifecycleStage::Active, &record.poll_id);

        if let Err(reason) = self.wait_until(self.schedule.reminder_at(started)).await {
            return self.abort(Some(record), Abort::Interrupted(reason)).await;
        }
        self.advance(LifecycleStage::Reminding, &record.poll_id);
        record.reminder_message_id = self.send_reminder().await;

        if let Err(reason) = self.wait_until(self.schedule.close_at(started)).await {
            return self.abort(Some(record), Abort::Interrupted(reason)).await;
        }
        self.advance(LifecycleStage::Closing, &record.poll_id);

        let closed = match self.close_poll(record.poll_message_id).await {
            Ok(closed) => closed,
            Err(e) => return self.abort(Some(record), Abort::Failed(e)).await,
        };

        self.advance(LifecycleStage::Tallying, &record.poll_id);
        let tally = Tally::from_counts(closed.total_voters, &closed.options);
        for option in &tally.options {
            tracing::info!("Option '{}': {} votes ({:.1}%)", option.option_text, option.votes, option.percentage);
        }
        if tally.total_votes == 0 {
            tracing::warn!("No votes received");
        }
        record.close(Utc::now(), &tally);

        self.advance(LifecycleStage::Announcing, &record.poll_id);
        self.announce(&tally).await;

        self.advance(LifecycleStage::CleaningUp, &record.poll_id);
        self.clean_up(&record).await;
        self.persist(&record).await;

        self.advance(LifecycleStage::Done, &record.poll_id);
        tracing::info!("Poll workflow completed successfully");
        self.shutdown.trigger(ShutdownReason::Completed);

        LifecycleReport {
            stage: LifecycleStage::Done,
            record: Some(record),
            error: None,
        }
    }

    async fn post_poll(&self, question: &str) -> Result<PostedPoll, BotError> {
        let posted = self
            .chat
            .create_poll(question, &self.settings.options)
            .await
            .map_err(|e| critical_failure("post poll", e))?;

        log_chat_operation("post poll", Some(&format!("poll {} in message {}", posted.poll_id, posted.message_id)));
        Ok(posted)
    }

    async fn send_image(&self) -> Option<i32> {
        let image = self.image.as_ref()?;

        match self.chat.send_photo(&image.source, &image.caption).await {
            Ok(message_id) => {
                log_chat_operation("send image", Some(&format!("message {message_id}")));
                Some(message_id)
            }
            Err(e) => {
                log_chat_error("send image", &e.to_string(), false);
                None
            }
        }
    }

    async fn send_reminder(&self) -> Option<i32> {
        let text = messages::reminder_text(self.settings.reminder_mins);

        match self.chat.send_message(&text).await {
            Ok(message_id) => {
                log_chat_operation("send reminder", Some(&format!("{}-minute reminder", self.settings.reminder_mins)));
                Some(message_id)
            }
            Err(e) => {
                log_chat_error("send reminder", &e.to_string(), false);
                None
            }
        }
    }

    async fn close_poll(&self, message_id: i32) -> Result<ClosedPoll, BotError> {
        let closed = self
            .chat
            .close_poll(message_id)
            .await
            .map_err(|e| critical_failure("close poll", e))?;

        log_chat_operation("close poll", Some(&format!("{} voters", closed.total_voters)));
        Ok(closed)
    }

    async fn announce(&self, tally: &Tally) {
        match self.chat.send_message(&messages::results_text(tally)).await {
            Ok(_) => log_chat_operation("announce results", Some(&tally.outcome.to_string())),
            Err(e) => log_chat_error("announce results", &e.to_string(), false),
        }
    }

    /// Deletes every transient message once. The poll message itself stays in the chat.
    async fn clean_up(&self, record: &PollRecord) {
        let mut targets = cleanup_targets(&record.message_ids, record.poll_message_id);
        if let Some(reminder) = record.reminder_message_id {
            if reminder != record.poll_message_id && !targets.contains(&reminder) {
                targets.push(reminder);
            }
        }

        for message_id in targets {
            match self.chat.delete_message(message_id).await {
                Ok(()) => log_chat_operation("delete message", Some(&format!("message {message_id}"))),
                Err(e) => log_chat_error(&format!("delete message {message_id}"), &e.to_string(), false),
            }
        }
    }

    async fn persist(&self, record: &PollRecord) {
        match self.store.insert_poll(record).await {
            Ok(StoreWrite::Written) => tracing::info!("Poll data saved to database"),
            Ok(StoreWrite::Skipped) => {}
            Err(e) => tracing::warn!("Poll {} was not saved: {}", record.poll_id, e),
        }
    }

    /// Sleeps until `deadline` unless shutdown is requested first. A passed deadline does not sleep.
    async fn wait_until(&self, deadline: Instant) -> Result<(), ShutdownReason> {
        if let Some(reason) = self.shutdown.reason() {
            return Err(reason);
        }

        let Some(left) = remaining(deadline, Instant::now()) else {
            tracing::debug!("Stage deadline already passed, continuing without waiting");
            return Ok(());
        };
        tracing::debug!("Waiting {}s for the next stage", left.as_secs());

        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => Ok(()),
            reason = self.shutdown.wait() => Err(reason),
        }
    }

    fn advance(&mut self, next: LifecycleStage, poll_id: &str) {
        if !self.stage.can_transition_to(next) {
            tracing::warn!("Ignoring invalid stage change {} -> {}", self.stage, next);
            return;
        }
        log_stage_transition(self.stage.as_str(), next.as_str(), Some(poll_id));
        self.stage = next;
        self.stage_tx.send_replace(next);
    }

    async fn abort(mut self, record: Option<PollRecord>, abort: Abort) -> LifecycleReport {
        let error = match abort {
            Abort::Failed(e) => {
                tracing::error!("Error in poll lifecycle during {}: {}", self.stage, e);
                Some(e)
            }
            Abort::Interrupted(reason) => {
                tracing::warn!("Poll lifecycle stopped during {}: {}", self.stage, reason);
                None
            }
        };

        let poll_id = record.as_ref().map(|r| r.poll_id.clone()).unwrap_or_default();
        self.advance(LifecycleStage::Aborted, &poll_id);

        let record = record.map(|mut record| {
            record.cancel(Utc::now());
            record
        });
        if let Some(record) = &record {
            self.persist(record).await;
        }

        self.shutdown.trigger(ShutdownReason::Aborted);

        LifecycleReport {
            stage: LifecycleStage::Aborted,
            record,
            error,
        }
    }
}

/// Message ids to delete during cleanup: first occurrence of each id, in order, without the poll message.
pub fn cleanup_targets(tracked: &[i32], poll_message_id: i32) -> Vec<i32> {
    let mut seen = HashSet::new();
    tracked
        .iter()
        .copied()
        .filter(|id| *id != poll_message_id && seen.insert(*id))
        .collect()
}

/// Logs a chat failure that ends the lifecycle and turns it into the error it aborts with.
fn critical_failure(operation: &'static str, error: ChatError) -> BotError {
    let reason = error.to_string();
    log_chat_error(operation, &reason, true);
    BotError::Critical { operation, reason }
}
