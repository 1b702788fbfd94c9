//! The chat platform as seen by the poll lifecycle.
//!
//! [`ChatClient`] is the narrow set of calls the lifecycle makes. The
//! Telegram implementation posts everything to one configured chat in HTML
//! mode with forwarding/saving protected.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode};
use thiserror::Error;

use crate::config::ImageSource;

/// Why a chat call failed. The caller decides whether that is transient or critical.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Request(#[from] teloxide::RequestError),
    #[error("the sent message carries no poll")]
    MissingPoll,
    #[error("image unavailable: {0}")]
    Image(String),
}

/// Identifiers handed back when a poll is posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedPoll {
    pub poll_id: String,
    pub message_id: i32,
}

/// Vote count of one option in a closed poll, in the poll's option order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCount {
    pub text: String,
    pub voter_count: i64,
}

/// Final state of a poll after it has been stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedPoll {
    pub total_voters: i64,
    pub options: Vec<OptionCount>,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Posts a non-anonymous single-choice poll.
    async fn create_poll(&self, question: &str, options: &[String]) -> Result<PostedPoll, ChatError>;

    async fn send_message(&self, text: &str) -> Result<i32, ChatError>;

    async fn send_photo(&self, source: &ImageSource, caption: &str) -> Result<i32, ChatError>;

    async fn delete_message(&self, message_id: i32) -> Result<(), ChatError>;

    /// Stops the poll posted as `message_id` and returns its final counts.
    async fn close_poll(&self, message_id: i32) -> Result<ClosedPoll, ChatError>;
}

/// [`ChatClient`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramClient {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl ChatClient for TelegramClient {
    async fn create_poll(&self, question: &str, options: &[String]) -> Result<PostedPoll, ChatError> {
        let message = self
            .bot
            .send_poll(self.chat_id, question, options.to_vec())
            .is_anonymous(false)
            .allows_multiple_answers(false)
            .protect_content(true)
            .await?;

        let poll = message.poll().ok_or(ChatError::MissingPoll)?;

        Ok(PostedPoll {
            poll_id: poll.id.clone(),
            message_id: message.id.0,
        })
    }

    async fn send_message(&self, text: &str) -> Result<i32, ChatError> {
        let message = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .protect_content(true)
            .await?;

        Ok(message.id.0)
    }

    async fn send_photo(&self, source: &ImageSource, caption: &str) -> Result<i32, ChatError> {
        let photo = match source {
            ImageSource::Url(url) => InputFile::url(url.clone()),
            ImageSource::File(path) => {
                if !path.is_file() {
                    return Err(ChatError::Image(format!("{} is not a readable file", path.display())));
                }
                InputFile::file(path.clone())
            }
        };

        let message = self
            .bot
            .send_photo(self.chat_id, photo)
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .protect_content(true)
            .await?;

        Ok(message.id.0)
    }

    async fn delete_message(&self, message_id: i32) -> Result<(), ChatError> {
        self.bot
            .delete_message(self.chat_id, MessageId(message_id))
            .await?;
        Ok(())
    }

    async fn close_poll(&self, message_id: i32) -> Result<ClosedPoll, ChatError> {
        let poll = self
            .bot
            .stop_poll(self.chat_id, MessageId(message_id))
            .await?;

        Ok(ClosedPoll {
            total_voters: i64::from(poll.total_voter_count),
            options: poll
                .options
                .into_iter()
                .map(|o| OptionCount {
                    text: o.text,
                    voter_count: i64::from(o.voter_count),
                })
                .collect(),
        })
    }
}
