// ABOUTME: Shared health state holder with single-writer discipline and read-only consumer handle
// ABOUTME: Merges provider results under last-writer-by-data-time-wins, rejecting stale payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use crate::models::{
    AuthorizationState, AuthorizationStatus, CategoryMetrics, CategoryPayload, DataCategory,
    HealthSnapshot, SyncStatus,
};
use crate::routing::ProviderId;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// The engine's single mutable snapshot of current health state.
///
/// Writers are the sync orchestrator and the authorization monitor, nothing
/// else; everything outside the engine reads through [`HealthStateReader`].
/// All mutation goes through one lock, so observers always see a snapshot in
/// which no category is half-written.
#[derive(Debug, Default)]
pub struct SharedHealthState {
    snapshot: RwLock<HealthSnapshot>,
}

impl SharedHealthState {
    /// Create empty state: no values, `Idle`, authorization not determined
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Consistent copy of the current snapshot
    pub async fn snapshot(&self) -> HealthSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Current authorization state only
    pub async fn authorization(&self) -> AuthorizationState {
        self.snapshot.read().await.authorization.clone()
    }

    /// Publish a new aggregate sync status
    pub async fn set_sync_status(&self, status: SyncStatus) {
        self.snapshot.write().await.sync_status = status;
    }

    /// Merge one successful category fetch.
    ///
    /// Applies only when the payload's data timestamp is not older than what
    /// is stored: last-writer-by-data-time-wins, not by merge wall clock.
    /// Returns `false` when the payload was rejected as stale.
    pub async fn apply_payload(
        &self,
        category: DataCategory,
        provider: ProviderId,
        payload: CategoryPayload,
    ) -> bool {
        let mut snapshot = self.snapshot.write().await;
        if let Some(existing) = snapshot.categories.get(&category) {
            if payload.sampled_at < existing.sampled_at {
                debug!(
                    %category,
                    %provider,
                    incoming = %payload.sampled_at,
                    stored = %existing.sampled_at,
                    "rejecting stale payload"
                );
                return false;
            }
        }
        snapshot.categories.insert(
            category,
            CategoryMetrics {
                values: payload.values,
                sampled_at: payload.sampled_at,
                provider,
            },
        );
        true
    }

    /// Close out a sync run: stamp the sync time (partial syncs count too)
    /// and publish the aggregate status.
    pub async fn finish_sync(&self, completed_at: DateTime<Utc>, status: SyncStatus) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.last_sync_date = Some(completed_at);
        snapshot.sync_status = status;
    }

    /// Record that a probe re-confirmed the current authorization value
    pub async fn touch_authorization_checked(&self, at: DateTime<Utc>) {
        self.snapshot.write().await.authorization.last_checked_at = Some(at);
    }

    /// Mark or clear the pending-transition flag
    pub async fn set_authorization_pending(&self, pending: bool) {
        self.snapshot.write().await.authorization.pending_update = pending;
    }

    /// Commit an authorization flip after the settle delay has elapsed
    pub async fn commit_authorization(&self, is_authorized: bool, at: DateTime<Utc>) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.authorization = AuthorizationState {
            is_authorized,
            status: if is_authorized {
                AuthorizationStatus::Authorized
            } else {
                AuthorizationStatus::NotDetermined
            },
            last_checked_at: Some(at),
            pending_update: false,
        };
    }
}

/// Read-only handle handed to consumers (UI, insight readers).
///
/// Cloneable and cheap; exposes snapshots only, so no component outside the
/// engine can mutate shared state.
#[derive(Clone)]
pub struct HealthStateReader {
    state: Arc<SharedHealthState>,
}

impl HealthStateReader {
    /// Wrap shared state in a read-only view
    #[must_use]
    pub fn new(state: Arc<SharedHealthState>) -> Self {
        Self { state }
    }

    /// Consistent copy of the current snapshot
    pub async fn snapshot(&self) -> HealthSnapshot {
        self.state.snapshot().await
    }
}
