//! Top-level supervision of the concurrently running units.
//!
//! The [`Runner`] waits for the shared [`Shutdown`] signal and then tears
//! everything down in a fixed order: listener, lifecycle, bot session, store,
//! health server. Teardown never takes longer than the grace period.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::bot::client::ChatClient;
use crate::bot::listener::VoteListener;
use crate::database::store::RecordStore;
use crate::poll::LifecycleReport;
use crate::services::shutdown::{Shutdown, ShutdownReason};
use crate::utils::logging::{log_system_event, log_timeout};

/// Everything started by `main` that has to be stopped again.
pub struct RunningUnits {
    pub listener: Box<dyn VoteListener>,
    pub lifecycle: JoinHandle<LifecycleReport>,
    pub chat: Arc<dyn ChatClient>,
    pub store: Arc<dyn RecordStore>,
    pub health: Option<JoinHandle<()>>,
}

/// How the process went down.
#[derive(Debug)]
pub struct ShutdownReport {
    pub reason: ShutdownReason,
    /// `None` when the lifecycle task had to be aborted or panicked
    pub lifecycle: Option<LifecycleReport>,
    /// Teardown hit the grace period
    pub timed_out: bool,
}

impl ShutdownReport {
    pub fn is_success(&self) -> bool {
        self.lifecycle.as_ref().is_some_and(LifecycleReport::is_success)
    }
}

pub struct Runner {
    shutdown: Shutdown,
    grace: Duration,
}

impl Runner {
    pub fn new(shutdown: Shutdown, grace: Duration) -> Self {
        Self { shutdown, grace }
    }

    /// Blocks until shutdown is requested, then tears down `units`.
    pub async fn supervise(&self, units: RunningUnits) -> ShutdownReport {
        let reason = self.shutdown.wait().await;
        log_system_event("shutdown", Some(&format!("{reason}, grace period {}s", self.grace.as_secs())));

        let lifecycle_abort = units.lifecycle.abort_handle();
        let health_abort = units.health.as_ref().map(JoinHandle::abort_handle);

        let mut lifecycle = None;
        let timed_out = tokio::time::timeout(self.grace, self.teardown(units, &mut lifecycle))
            .await
            .is_err();

        if timed_out {
            log_timeout("shutdown", self.grace.as_secs(), Some("abandoning remaining teardown"));
            lifecycle_abort.abort();
            if let Some(health) = health_abort {
                health.abort();
            }
        }

        log_system_event("shutdown complete", None);
        ShutdownReport {
            reason,
            lifecycle,
            timed_out,
        }
    }

    async fn teardown(&self, units: RunningUnits, lifecycle: &mut Option<LifecycleReport>) {
        let RunningUnits {
            mut listener,
            lifecycle: mut task,
            chat,
            store,
            health,
        } = units;

        listener.stop().await;
        log_system_event("vote listener stopped", None);

        // On the normal path the lifecycle already finished; otherwise it is
        // waiting on the same signal and winds down on its own
        let wait = self.grace / 2;
        match tokio::time::timeout(wait, &mut task).await {
            Ok(Ok(report)) => *lifecycle = Some(report),
            Ok(Err(e)) => tracing::error!("Poll lifecycle task failed: {}", e),
            Err(_) => {
                log_timeout("poll lifecycle", wait.as_secs(), Some("aborting it"));
                task.abort();
            }
        }

        drop(chat);
        log_system_event("bot session released", None);

        store.close().await;
        log_system_event("store closed", None);

        if let Some(health) = health {
            if let Err(e) = health.await {
                if !e.is_cancelled() {
                    tracing::warn!("Health server task failed: {}", e);
                }
            }
        }
    }
}

/// Triggers an `Interrupted` shutdown on Ctrl-C. Exits quietly once shutdown was requested elsewhere.
pub fn watch_ctrl_c(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    tracing::info!("Received Ctrl-C");
                    shutdown.trigger(ShutdownReason::Interrupted);
                }
                Err(e) => tracing::warn!("Unable to listen for Ctrl-C: {}", e),
            },
            _ = shutdown.wait() => {}
        }
    })
}
