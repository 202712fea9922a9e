// ABOUTME: Background change listener triggering debounced sync runs on local-store notifications
// ABOUTME: Collapses notification bursts into one run; stops cleanly on shutdown signal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use crate::models::StoreChange;
use crate::orchestrator::SyncOrchestrator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// Handle to a running change listener.
///
/// Dropping the handle does not stop the listener; call [`shutdown`] to stop
/// it and wait for the loop to exit.
///
/// [`shutdown`]: ListenerHandle::shutdown
pub struct ListenerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ListenerHandle {
    /// Signal the listener to stop and wait for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if self.join.await.is_err() {
            warn!("change listener task panicked during shutdown");
        }
    }
}

/// Watches the local store's change notifications and schedules syncs.
///
/// Several categories changing together (a workout writes activity and
/// heart rate at once) produce a notification burst; each event pushes the
/// deadline out, so one quiet debounce window later exactly one sync runs.
pub struct ChangeListener {
    orchestrator: Arc<SyncOrchestrator>,
    debounce: Duration,
}

impl ChangeListener {
    /// Create a listener that triggers the given orchestrator
    #[must_use]
    pub fn new(orchestrator: Arc<SyncOrchestrator>, debounce: Duration) -> Self {
        Self {
            orchestrator,
            debounce,
        }
    }

    /// Spawn the listening loop over a change-notification stream.
    #[must_use]
    pub fn spawn(self, mut changes: broadcast::Receiver<StoreChange>) -> ListenerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            let mut deadline: Option<Instant> = None;
            loop {
                let debounce_expiry = async move {
                    match deadline {
                        Some(at) => sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                };
                tokio::select! {
                    changed = changes.recv() => match changed {
                        Ok(change) => {
                            debug!(category = %change.category, "store change, extending debounce window");
                            deadline = Some(Instant::now() + self.debounce);
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            // Missed notifications still mean data changed
                            debug!(missed, "change stream lagged, scheduling sync anyway");
                            deadline = Some(Instant::now() + self.debounce);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("change stream closed, listener exiting");
                            break;
                        }
                    },
                    () = debounce_expiry => {
                        deadline = None;
                        debug!("debounce window elapsed, running sync");
                        self.orchestrator.run_sync().await;
                    }
                    _ = shutdown_rx.changed() => {
                        info!("change listener shutting down");
                        break;
                    }
                }
            }
        });
        ListenerHandle { shutdown_tx, join }
    }
}
