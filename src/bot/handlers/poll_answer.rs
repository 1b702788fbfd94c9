use std::sync::Arc;
use teloxide::types::PollAnswer;

use crate::bot::handlers::HandlerResult;
use crate::services::vote_recorder::{VoteEvent, VoteRecorder};

pub async fn handle_poll_answer(answer: PollAnswer, recorder: Arc<VoteRecorder>) -> HandlerResult {
    let Some(event) = vote_event(&answer) else {
        tracing::info!(
            "User {} ({}) retracted their vote in poll {}",
            answer.user.username.as_deref().unwrap_or("unknown"),
            answer.user.id.0,
            answer.poll_id
        );
        return Ok(());
    };

    recorder.on_vote_event(event).await;
    Ok(())
}

/// Single-choice polls carry at most one option. An empty list means the vote was retracted.
pub fn vote_event(answer: &PollAnswer) -> Option<VoteEvent> {
    let selected = answer.option_ids.first().copied()?;

    Some(VoteEvent {
        voter_id: answer.user.id.0,
        voter_display_name: answer.user.username.clone(),
        poll_id: answer.poll_id.clone(),
        selected_option_index: i64::from(selected),
    })
}
