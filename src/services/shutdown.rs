//! Shutdown coordination for the bot.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Why the process is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The poll lifecycle ran to the end
    Completed,
    /// The poll lifecycle hit a critical failure
    Aborted,
    /// Ctrl-C or another outside request
    Interrupted,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ShutdownReason::Completed => "poll lifecycle completed",
            ShutdownReason::Aborted => "poll lifecycle aborted",
            ShutdownReason::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

/// One-shot shutdown signal shared by every task.
///
/// The first [`Shutdown::trigger`] wins; later calls are no-ops. Tasks that
/// start waiting after the signal was set see it immediately.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Sets the signal. Returns `true` only for the call that actually set it.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        let first = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });

        if first {
            tracing::info!("Shutdown requested: {}", reason);
        } else {
            tracing::debug!("Shutdown already requested, ignoring {}", reason);
        }
        first
    }

    pub fn is_triggered(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.tx.borrow()
    }

    /// Resolves once the signal is set, immediately if it already is.
    pub async fn wait(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(reason) = *rx.borrow_and_update() {
                return reason;
            }
            // The sender lives as long as `self`, so this only errors if it was dropped mid-wait
            if rx.changed().await.is_err() {
                return ShutdownReason::Interrupted;
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
