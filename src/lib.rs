// ABOUTME: Main library entry point for the VitalSync health data synchronization engine
// ABOUTME: Routes per-category reads across local and remote providers into one shared snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

#![deny(unsafe_code)]

//! # VitalSync
//!
//! A multi-source health data synchronization engine. VitalSync ingests
//! personal health metrics from a local on-device health store and several
//! remote partner services (Withings, Oura, Fitbit, WHOOP, Strava) and
//! publishes a single, consistent snapshot of the user's health state.
//!
//! ## Features
//!
//! - **Per-category source routing**: each health category independently
//!   prefers a provider, with free-form preference names normalized against
//!   an alias table and unknown input degrading to the local store
//! - **Concurrent fan-out with structured join**: one task per category,
//!   independent failures, per-task timeouts, nothing outlives the call
//! - **Empirical capability probing**: read access to the local store is
//!   inferred from bounded sample queries, not the platform permission API
//! - **Flicker-free authorization**: cooldown and settle-delay smoothing
//!   keep the user-facing connected indicator stable
//! - **Stale-write rejection**: merges are last-writer-by-data-time-wins,
//!   so overlapping syncs converge on the newest data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vitalsync::config::SyncConfig;
//! use vitalsync::logging::LoggingConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     LoggingConfig::from_env().init()?;
//!     let config = SyncConfig::from_env();
//!     println!("remote fetch timeout: {:?}", config.fetch_timeout);
//!     Ok(())
//! }
//! ```
//!
//! The embedding shell supplies the external collaborators (a
//! [`providers::HealthStore`] for the on-device store, one
//! [`providers::HealthDataProvider`] per connected partner, and a
//! [`preferences::PreferenceStore`]), then wires them into a
//! [`orchestrator::SyncOrchestrator`] and, optionally, a
//! [`listener::ChangeListener`] for background syncs.

/// Authorization state machine with cooldown and settle-delay smoothing
pub mod auth;

/// Engine configuration for timeouts, cooldowns, and debounce windows
pub mod config;

/// Structured error taxonomy for fetches, probes, and preference loads
pub mod errors;

/// Background change listener with debounced sync triggering
pub mod listener;

/// Logging configuration and structured tracing setup
pub mod logging;

/// Shared domain types: categories, metrics, sessions, snapshots
pub mod models;

/// Sync orchestrator: per-category fan-out, join, and merge
pub mod orchestrator;

/// Preference store abstraction for per-user source choices
pub mod preferences;

/// Capability prober inferring local-store read access empirically
pub mod probe;

/// Provider adapters for the local store and remote partner services
pub mod providers;

/// Source router mapping categories to providers from free-form preferences
pub mod routing;

/// Shared health state with single-writer discipline and read-only views
pub mod state;

pub use auth::{AuthorizationMonitor, EvaluateOutcome};
pub use config::SyncConfig;
pub use errors::{PreferenceError, ProviderError};
pub use models::{
    AuthorizationState, AuthorizationStatus, CategoryOutcome, CategoryPayload, DataCategory,
    HealthSnapshot, MetricKind, MetricUnit, MetricValue, ProbeReport, ProviderResult, Sample,
    StoreChange, SyncSession, SyncStatus,
};
pub use orchestrator::SyncOrchestrator;
pub use probe::CapabilityProber;
pub use routing::{resolve_source, ProviderId, RemoteService, SourcePreferences};
pub use state::{HealthStateReader, SharedHealthState};
