// ABOUTME: Sync orchestrator fanning out per-category fetches and merging results into shared state
// ABOUTME: Structured join over independent tasks; partial failures never abort a session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

//! The top-level sync entry point.
//!
//! One `run_sync` call is one session: load preferences, resolve a provider
//! per category, launch one task per category, join them all, merge what
//! succeeded. Tasks are independent; a dead remote for nutrition does not
//! delay or fail sleep. Nothing outlives the call: dropping the returned
//! future aborts every in-flight task, and since merging happens only after
//! the join, a cancelled run writes nothing to shared state.
//!
//! Overlapping calls are allowed. Merges are per-category and guarded by
//! the payload's data timestamp, so two racing sessions converge on the
//! newest data rather than the last merge to run.

use crate::auth::AuthorizationMonitor;
use crate::config::SyncConfig;
use crate::models::{CategoryOutcome, DataCategory, SyncSession, SyncStatus};
use crate::preferences::PreferenceStore;
use crate::providers::core::TimeRange;
use crate::providers::registry::ProviderRegistry;
use crate::routing::{resolve_source, SourcePreferences};
use crate::state::SharedHealthState;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, info_span, warn, Instrument};

/// Coordinates one sync run across all categories.
pub struct SyncOrchestrator {
    registry: Arc<ProviderRegistry>,
    preferences: Arc<dyn PreferenceStore>,
    state: Arc<SharedHealthState>,
    auth: Arc<AuthorizationMonitor>,
    config: SyncConfig,
    user_id: String,
}

impl SyncOrchestrator {
    /// Assemble an orchestrator from its collaborators
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        preferences: Arc<dyn PreferenceStore>,
        state: Arc<SharedHealthState>,
        auth: Arc<AuthorizationMonitor>,
        config: SyncConfig,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            preferences,
            state,
            auth,
            config,
            user_id: user_id.into(),
        }
    }

    /// Read-only view of the state this orchestrator writes
    #[must_use]
    pub fn state(&self) -> &Arc<SharedHealthState> {
        &self.state
    }

    /// Run one full sync session and return its per-category record.
    ///
    /// Never returns an error: individual failures land in the session and
    /// in the aggregate `sync_status`, and a failed preference load degrades
    /// to the all-local default set.
    pub async fn run_sync(&self) -> SyncSession {
        let mut session = SyncSession::begin(Utc::now());
        let span = info_span!("run_sync", session = %session.id);
        async {
            self.state.set_sync_status(SyncStatus::Syncing).await;

            let preferences = match self.preferences.load_preferences(&self.user_id).await {
                Ok(preferences) => preferences,
                Err(error) => {
                    warn!(%error, "preference load failed, using all-local defaults");
                    SourcePreferences::all_local()
                }
            };

            let now = Utc::now();
            let range = TimeRange::last_day(now);
            let mut tasks = JoinSet::new();
            for category in DataCategory::ALL {
                let provider = resolve_source(category, &preferences);
                let registry = Arc::clone(&self.registry);
                let fetch_timeout = self.config.fetch_timeout;
                tasks.spawn(async move {
                    registry
                        .fetch_category(provider, category, range, fetch_timeout)
                        .await
                });
            }

            while let Some(joined) = tasks.join_next().await {
                let Ok(result) = joined else {
                    // A panicked fetch task counts as a failed category; the
                    // category is unknown at this point so it is logged only.
                    warn!("category fetch task panicked");
                    continue;
                };
                let outcome = match result.payload {
                    Ok(payload) => {
                        self.state
                            .apply_payload(result.category, result.provider, payload)
                            .await;
                        CategoryOutcome::Success
                    }
                    Err(error) => {
                        warn!(
                            category = %result.category,
                            provider = %result.provider,
                            %error,
                            "category fetch failed"
                        );
                        CategoryOutcome::Failed(error.to_string())
                    }
                };
                session.per_category.insert(result.category, outcome);
            }

            if session.succeeded_count() >= 1 {
                let authorization = self.state.authorization().await;
                if !authorization.is_authorized {
                    self.auth.confirm_by_evidence().await;
                }
            }

            let failed = session.failed_categories();
            let status = if failed.is_empty() {
                SyncStatus::Success
            } else {
                let names: Vec<&str> = failed.iter().map(|c| c.as_str()).collect();
                SyncStatus::Error(format!(
                    "{} of {} categories failed: {}",
                    failed.len(),
                    DataCategory::ALL.len(),
                    names.join(", ")
                ))
            };

            let completed_at = Utc::now();
            // A partial sync still counts as synced
            self.state.finish_sync(completed_at, status).await;
            session.completed_at = Some(completed_at);

            info!(
                succeeded = session.succeeded_count(),
                failed = failed.len(),
                "sync session complete"
            );
            session
        }
        .instrument(span)
        .await
    }
}
