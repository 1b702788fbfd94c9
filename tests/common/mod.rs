//! In-memory stand-ins for the chat platform and the record store.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use teloxide::{ApiError, RequestError};
use tokio::time::Instant;

use daily_poll_bot::bot::client::{ChatClient, ChatError, ClosedPoll, OptionCount, PostedPoll};
use daily_poll_bot::config::{ImageSettings, ImageSource, PollSettings};
use daily_poll_bot::database::models::{PollRecord, VoteRecord};
use daily_poll_bot::database::store::{RecordStore, StoreWrite};
use daily_poll_bot::error::BotError;

pub const POLL_ID: &str = "5012";

#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    CreatePoll { question: String, options: Vec<String> },
    SendMessage(String),
    SendPhoto(String),
    DeleteMessage(i32),
    ClosePoll(i32),
}

/// Records every call with the (paused) tokio time it happened at.
pub struct FakeChat {
    calls: Mutex<Vec<(Instant, ChatCall)>>,
    message_ids: Mutex<VecDeque<i32>>,
    next_message_id: AtomicI32,
    closed: Mutex<ClosedPoll>,
    pub fail_create: AtomicBool,
    pub fail_photo: AtomicBool,
    pub fail_messages: AtomicBool,
    pub fail_close: AtomicBool,
    pub fail_deletes: Mutex<HashSet<i32>>,
    /// How long `send_photo` takes before it answers.
    pub photo_delay: Mutex<Duration>,
}

impl FakeChat {
    /// Message ids are handed out from `message_ids` first, then counting up from 100.
    pub fn new(message_ids: &[i32]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            message_ids: Mutex::new(message_ids.iter().copied().collect()),
            next_message_id: AtomicI32::new(100),
            closed: Mutex::new(ClosedPoll { total_voters: 0, options: Vec::new() }),
            fail_create: AtomicBool::new(false),
            fail_photo: AtomicBool::new(false),
            fail_messages: AtomicBool::new(false),
            fail_close: AtomicBool::new(false),
            fail_deletes: Mutex::new(HashSet::new()),
            photo_delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn with_results(self, counts: &[(&str, i64)]) -> Self {
        let options: Vec<OptionCount> = counts
            .iter()
            .map(|(text, voter_count)| OptionCount { text: text.to_string(), voter_count: *voter_count })
            .collect();
        *self.closed.lock().unwrap() = ClosedPoll {
            total_voters: options.iter().map(|o| o.voter_count).sum(),
            options,
        };
        self
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().iter().map(|(_, call)| call.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, ChatCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<i32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::DeleteMessage(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::SendMessage(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ChatCall) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }

    fn next_id(&self) -> i32 {
        self.message_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }
}

fn failure(operation: &str) -> ChatError {
    ChatError::Request(RequestError::Api(ApiError::Unknown(format!("simulated {operation} failure"))))
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn create_poll(&self, question: &str, options: &[String]) -> Result<PostedPoll, ChatError> {
        self.record(ChatCall::CreatePoll { question: question.to_string(), options: options.to_vec() });
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(failure("create poll"));
        }
        Ok(PostedPoll { poll_id: POLL_ID.to_string(), message_id: self.next_id() })
    }

    async fn send_message(&self, text: &str) -> Result<i32, ChatError> {
        self.record(ChatCall::SendMessage(text.to_string()));
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(failure("send message"));
        }
        Ok(self.next_id())
    }

    async fn send_photo(&self, _source: &ImageSource, caption: &str) -> Result<i32, ChatError> {
        self.record(ChatCall::SendPhoto(caption.to_string()));
        let delay = *self.photo_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_photo.load(Ordering::SeqCst) {
            return Err(failure("send photo"));
        }
        Ok(self.next_id())
    }

    async fn delete_message(&self, message_id: i32) -> Result<(), ChatError> {
        self.record(ChatCall::DeleteMessage(message_id));
        if self.fail_deletes.lock().unwrap().contains(&message_id) {
            return Err(failure("delete message"));
        }
        Ok(())
    }

    async fn close_poll(&self, message_id: i32) -> Result<ClosedPoll, ChatError> {
        self.record(ChatCall::ClosePoll(message_id));
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(failure("close poll"));
        }
        Ok(self.closed.lock().unwrap().clone())
    }
}

/// Keeps polls and votes in memory with the same insert-once / upsert rules as SQLite.
#[derive(Default)]
pub struct FakeStore {
    polls: Mutex<Vec<PollRecord>>,
    votes: Mutex<HashMap<(i64, String), VoteRecord>>,
    pub fail_writes: AtomicBool,
    pub closed: AtomicBool,
}

impl FakeStore {
    pub fn polls(&self) -> Vec<PollRecord> {
        self.polls.lock().unwrap().clone()
    }

    pub fn votes(&self) -> Vec<VoteRecord> {
        self.votes.lock().unwrap().values().cloned().collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), BotError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BotError::Persistence("simulated write failure".to_string()));
        }
        if self.is_closed() {
            return Err(BotError::Persistence("store is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn insert_poll(&self, record: &PollRecord) -> Result<StoreWrite, BotError> {
        self.check_writable()?;
        let mut polls = self.polls.lock().unwrap();
        if polls.iter().any(|p| p.poll_id == record.poll_id) {
            return Err(BotError::Persistence(format!("poll {} already stored", record.poll_id)));
        }
        polls.push(record.clone());
        Ok(StoreWrite::Written)
    }

    async fn upsert_vote(&self, vote: &VoteRecord) -> Result<StoreWrite, BotError> {
        self.check_writable()?;
        self.votes
            .lock()
            .unwrap()
            .insert((vote.user_id, vote.poll_id.clone()), vote.clone());
        Ok(StoreWrite::Written)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_available(&self) -> bool {
        !self.is_closed()
    }
}

pub fn poll_settings(duration_mins: u64, reminder_mins: u64) -> PollSettings {
    PollSettings {
        title: "Daily Poll".to_string(),
        duration_mins,
        reminder_mins,
        options: vec!["Pizza".to_string(), "Tacos".to_string(), "Sushi".to_string()],
    }
}

pub fn image_settings() -> ImageSettings {
    ImageSettings {
        source: ImageSource::File("poll.png".into()),
        caption: "Vote below".to_string(),
    }
}
