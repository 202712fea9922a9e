// ABOUTME: Capability prober inferring local-store read access from bounded sample queries
// ABOUTME: Runs a small concurrent battery with per-probe timeouts and returns success counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

//! Empirical authorization probing.
//!
//! The platform's permission API under-reports on real devices, so the
//! engine does not ask it. Instead it issues a fixed battery of cheap,
//! bounded reads against representative categories and counts how many
//! complete cleanly. Absence of data is not evidence of missing
//! authorization; an empty result set is still a successful read. The
//! caller applies the threshold (one success is enough); this module only
//! counts.

use crate::models::{DataCategory, ProbeReport};
use crate::providers::core::{HealthStore, TimeRange};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

/// How far back each probe query looks
#[derive(Debug, Clone, Copy)]
enum ProbeWindow {
    LastHour,
    LastDay,
}

/// Representative categories probed, with a deliberately mixed set of
/// windows so a store that prunes recent data aggressively still answers
const PROBE_BATTERY: [(DataCategory, ProbeWindow); 3] = [
    (DataCategory::Activity, ProbeWindow::LastHour),
    (DataCategory::HeartRate, ProbeWindow::LastDay),
    (DataCategory::Sleep, ProbeWindow::LastDay),
];

/// Issues the probe battery against the local store.
pub struct CapabilityProber {
    store: Arc<dyn HealthStore>,
    probe_timeout: Duration,
}

impl CapabilityProber {
    /// Create a prober over the local store with the configured per-probe timeout
    #[must_use]
    pub fn new(store: Arc<dyn HealthStore>, probe_timeout: Duration) -> Self {
        Self {
            store,
            probe_timeout,
        }
    }

    /// Run the full battery concurrently and count clean completions.
    ///
    /// A probe succeeds when its query returns `Ok`, with or without
    /// samples. Permission denials, transient store errors, and timeouts
    /// are all non-successes; only the caller decides what the counts mean.
    pub async fn probe(&self) -> ProbeReport {
        let now = Utc::now();
        let mut tasks: JoinSet<bool> = JoinSet::new();

        for (category, window) in PROBE_BATTERY {
            let store = Arc::clone(&self.store);
            let probe_timeout = self.probe_timeout;
            let range = match window {
                ProbeWindow::LastHour => TimeRange::last_hour(now),
                ProbeWindow::LastDay => TimeRange::last_day(now),
            };
            tasks.spawn(async move {
                let timeout_ms = probe_timeout.as_millis() as u64;
                match timeout(probe_timeout, store.query_samples(category, range)).await {
                    Ok(Ok(samples)) => {
                        debug!(%category, samples = samples.len(), "probe succeeded");
                        true
                    }
                    Ok(Err(error)) if error.is_permission_class() => {
                        debug!(%category, "probe denied by store permissions");
                        false
                    }
                    Ok(Err(error)) => {
                        warn!(%category, %error, "probe failed transiently");
                        false
                    }
                    Err(_) => {
                        warn!(%category, timeout_ms, "probe timed out");
                        false
                    }
                }
            });
        }

        let mut succeeded = 0u32;
        let mut attempted = 0u32;
        while let Some(joined) = tasks.join_next().await {
            attempted += 1;
            if matches!(joined, Ok(true)) {
                succeeded += 1;
            }
        }

        debug!(succeeded, attempted, "probe battery complete");
        ProbeReport {
            succeeded,
            attempted,
        }
    }
}
