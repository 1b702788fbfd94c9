pub mod poll_answer;

use std::sync::Arc;
use teloxide::{dispatching::UpdateHandler, prelude::*, types::PollAnswer};

use crate::services::vote_recorder::VoteRecorder;

/// Error type shared by every update endpoint
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

pub struct BotHandler {
    pub recorder: Arc<VoteRecorder>,
}

impl BotHandler {
    pub fn new(recorder: Arc<VoteRecorder>) -> Self {
        Self { recorder }
    }

    /// Poll answers are the only updates the bot reacts to.
    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let recorder = self.recorder.clone();

        Update::filter_poll_answer().endpoint(move |answer: PollAnswer| {
            let recorder = recorder.clone();
            async move { poll_answer::handle_poll_answer(answer, recorder).await }
        })
    }
}
