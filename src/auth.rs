// ABOUTME: Authorization state machine smoothing probe results into a stable connected indicator
// ABOUTME: Cooldown suppression, settle-delay debounce, and sequence-keyed cancellable transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

//! Probe results are noisy: a store under memory pressure fails a read, the
//! next one succeeds, and a naive consumer would flap the "connected" badge
//! twice a second. This machine absorbs that noise. At most one transition
//! is in flight at a time, and reports arriving inside the cooldown window
//! are dropped. A flip only commits after the settle delay elapses
//! unchallenged. Flips happen only on actual value changes backed by
//! success evidence; errors never un-authorize.

use crate::models::ProbeReport;
use crate::state::SharedHealthState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// What the machine did with a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluateOutcome {
    /// Dropped: a transition with the same candidate is already pending
    DroppedPending,
    /// Dropped: inside the cooldown window of the last applied change
    DroppedCooldown,
    /// Candidate matched the current value; checked-at refreshed, no flip
    Unchanged,
    /// A flip was scheduled behind the settle delay
    TransitionScheduled,
}

struct PendingFlip {
    seq: u64,
    candidate: bool,
    handle: JoinHandle<()>,
}

struct MonitorInner {
    next_seq: u64,
    pending: Option<PendingFlip>,
    /// Set only when a flip is applied; cooldown is measured from here, so
    /// re-confirmations of the same value never extend it
    cooldown_anchor: Option<Instant>,
}

/// Consumes probe reports and fetch evidence, publishing a stable
/// authorization state into [`SharedHealthState`].
pub struct AuthorizationMonitor {
    state: Arc<SharedHealthState>,
    cooldown: Duration,
    settle_delay: Duration,
    inner: Arc<Mutex<MonitorInner>>,
}

impl AuthorizationMonitor {
    /// Create a monitor writing into the shared state
    #[must_use]
    pub fn new(state: Arc<SharedHealthState>, cooldown: Duration, settle_delay: Duration) -> Self {
        Self {
            state,
            cooldown,
            settle_delay,
            inner: Arc::new(Mutex::new(MonitorInner {
                next_seq: 0,
                pending: None,
                cooldown_anchor: None,
            })),
        }
    }

    /// Evaluate a fresh probe report against the transition rules.
    pub async fn evaluate(&self, report: ProbeReport) -> EvaluateOutcome {
        let candidate = report.indicates_capability();
        debug!(
            succeeded = report.succeeded,
            attempted = report.attempted,
            candidate,
            "evaluating probe report"
        );
        self.apply_candidate(candidate, true).await
    }

    /// Authorization-by-evidence shortcut: a category fetch succeeded while
    /// unauthorized, which is stronger evidence than any probe. Enters the
    /// transition at the scheduling step, bypassing the cooldown.
    pub async fn confirm_by_evidence(&self) -> EvaluateOutcome {
        debug!("authorization confirmed by fetch evidence");
        self.apply_candidate(true, false).await
    }

    async fn apply_candidate(&self, candidate: bool, respect_cooldown: bool) -> EvaluateOutcome {
        let mut inner = self.inner.lock().await;

        if let Some(pending) = &inner.pending {
            if pending.candidate == candidate {
                debug!(candidate, "dropping report, identical transition pending");
                return EvaluateOutcome::DroppedPending;
            }
            // Contradicting report: abandon the pending flip and evaluate fresh
            pending.handle.abort();
            inner.pending = None;
            self.state.set_authorization_pending(false).await;
            debug!(candidate, "abandoned pending transition on contradicting report");
        }

        if respect_cooldown {
            if let Some(anchor) = inner.cooldown_anchor {
                if anchor.elapsed() < self.cooldown {
                    debug!(candidate, "dropping report inside cooldown window");
                    return EvaluateOutcome::DroppedCooldown;
                }
            }
        }

        let current = self.state.authorization().await.is_authorized;
        if candidate == current {
            self.state.touch_authorization_checked(Utc::now()).await;
            return EvaluateOutcome::Unchanged;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        self.state.set_authorization_pending(true).await;

        let state = Arc::clone(&self.state);
        let monitor_inner = Arc::clone(&self.inner);
        let settle_delay = self.settle_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(settle_delay).await;
            let mut inner = monitor_inner.lock().await;
            let still_current = inner.pending.as_ref().is_some_and(|p| p.seq == seq);
            if !still_current {
                return;
            }
            inner.pending = None;
            inner.cooldown_anchor = Some(Instant::now());
            state.commit_authorization(candidate, Utc::now()).await;
            info!(is_authorized = candidate, "authorization state changed");
        });

        inner.pending = Some(PendingFlip {
            seq,
            candidate,
            handle,
        });
        EvaluateOutcome::TransitionScheduled
    }
}
