use async_trait::async_trait;
use std::sync::Arc;
use teloxide::dispatching::ShutdownToken;
use teloxide::prelude::*;
use tokio::task::JoinHandle;

use crate::bot::handlers::BotHandler;

/// The continuously running receiver of vote events.
#[async_trait]
pub trait VoteListener: Send {
    /// Stops accepting updates and waits for in-flight handlers to finish.
    async fn stop(&mut self);
}

/// Long-polls Telegram for poll answers on a background task.
pub struct DispatcherListener {
    token: ShutdownToken,
    task: Option<JoinHandle<()>>,
}

impl DispatcherListener {
    pub fn spawn(bot: Bot, handler: BotHandler) -> Self {
        let mut dispatcher = Dispatcher::builder(bot, handler.schema())
            .default_handler(|update: Arc<Update>| async move {
                tracing::trace!("Ignoring update {}", update.id);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the vote listener",
            ))
            .build();

        let token = dispatcher.shutdown_token();
        let task = tokio::spawn(async move {
            tracing::info!("Vote listener started");
            dispatcher.dispatch().await;
            tracing::info!("Vote listener stopped");
        });

        Self {
            token,
            task: Some(task),
        }
    }
}

#[async_trait]
impl VoteListener for DispatcherListener {
    async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        match self.token.shutdown() {
            Ok(stopped) => stopped.await,
            Err(_) => {
                // Not polling yet, so there is nothing in flight to wait for
                tracing::debug!("Vote listener was idle, aborting it");
                task.abort();
            }
        }

        if let Err(e) = task.await {
            if !e.is_cancelled() {
                tracing::warn!("Vote listener task failed: {}", e);
            }
        }
    }
}
