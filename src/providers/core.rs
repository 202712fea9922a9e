// ABOUTME: Core provider traits for unified health data access across local and remote sources
// ABOUTME: Defines the fetch contract every adapter implements and the local-store interface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

//! The provider contract.
//!
//! Every data source, the on-device store and remote partners alike, is
//! reached through [`HealthDataProvider`], a category-scoped fetch returning
//! a uniform [`CategoryPayload`] or a structured [`ProviderError`]. Partner
//! protocol details (OAuth, pagination, response shapes) live behind the
//! trait; the orchestrator never sees them.
//!
//! The local store gets its own narrower trait, [`HealthStore`], because the
//! engine needs two things from it that remotes never provide: bounded raw
//! sample queries for capability probing, and a change-notification stream
//! for the background listener.

use crate::errors::ProviderError;
use crate::models::{CategoryPayload, DataCategory, Sample, StoreChange};
use crate::routing::ProviderId;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;

/// Half-open time interval `[start, end)` for data queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive start of the range
    pub start: DateTime<Utc>,
    /// Exclusive end of the range
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// The hour ending at `end`
    #[must_use]
    pub fn last_hour(end: DateTime<Utc>) -> Self {
        Self {
            start: end - Duration::hours(1),
            end,
        }
    }

    /// The 24 hours ending at `end`
    #[must_use]
    pub fn last_day(end: DateTime<Utc>) -> Self {
        Self {
            start: end - Duration::days(1),
            end,
        }
    }

    /// Whether an instant falls inside the range
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// A data source serving category-scoped reads.
///
/// Implementations must be `Send + Sync`; the orchestrator fans fetches out
/// across concurrent tasks. Adapters map partner-specific failures into
/// [`ProviderError`] variants; classification there decides circuit breaker
/// counting and probe accounting, so adapters should be precise about it.
#[async_trait]
pub trait HealthDataProvider: Send + Sync {
    /// Which source this adapter fronts
    fn id(&self) -> ProviderId;

    /// Fetch current values for one category over a time range.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] describing the failure; the caller records
    /// it per-category and never aborts the surrounding sync.
    async fn fetch_category(
        &self,
        category: DataCategory,
        range: TimeRange,
    ) -> Result<CategoryPayload, ProviderError>;
}

/// The opaque on-device health store.
///
/// Only two capabilities are required: bounded per-category sample queries
/// and a change-notification stream. Everything else about the platform
/// store stays behind this trait.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Read raw samples for a category within a bounded range.
    ///
    /// # Errors
    ///
    /// [`ProviderError::PermissionDenied`] when the platform refuses the
    /// read, [`ProviderError::StoreUnavailable`] for transient store
    /// trouble. The distinction matters: only the former counts against
    /// capability probes.
    async fn query_samples(
        &self,
        category: DataCategory,
        range: TimeRange,
    ) -> Result<Vec<Sample>, ProviderError>;

    /// Subscribe to change notifications for all categories of interest
    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_range_is_half_open() {
        let end = Utc::now();
        let range = TimeRange::last_hour(end);
        assert!(range.contains(range.start));
        assert!(!range.contains(end));
        assert!(range.contains(end - Duration::minutes(30)));
    }
}
