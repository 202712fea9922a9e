// ABOUTME: Shared domain types for the health data synchronization engine
// ABOUTME: Categories, metric values, provider payloads, probe reports, and published state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use crate::errors::ProviderError;
use crate::routing::ProviderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Health data domains the engine synchronizes.
///
/// This is a closed set: adding a category requires adapter coverage in
/// every registered provider and a routing alias entry, so new variants are
/// a deliberate, reviewed change rather than free-form configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    /// Steps, active energy, exercise minutes
    Activity,
    /// Sleep duration and quality
    Sleep,
    /// Calories and macronutrients consumed
    Nutrition,
    /// Weight, body fat, muscle mass
    BodyComposition,
    /// Resting heart rate and variability
    HeartRate,
}

impl DataCategory {
    /// Every category, in a stable order used for fan-out and reporting
    pub const ALL: [Self; 5] = [
        Self::Activity,
        Self::Sleep,
        Self::Nutrition,
        Self::BodyComposition,
        Self::HeartRate,
    ];

    /// Stable lowercase identifier used in preferences, logs, and wire formats
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Sleep => "sleep",
            Self::Nutrition => "nutrition",
            Self::BodyComposition => "body_composition",
            Self::HeartRate => "heart_rate",
        }
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Units attached to published metric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    /// Dimensionless count (steps, wake events)
    Count,
    /// Energy in kilocalories
    Kilocalories,
    /// Distance in kilometers
    Kilometers,
    /// Duration in minutes
    Minutes,
    /// Percentage (0-100)
    Percent,
    /// Mass in kilograms
    Kilograms,
    /// Mass in grams (macronutrients)
    Grams,
    /// Heart rate in beats per minute
    Bpm,
    /// Heart rate variability in milliseconds
    Milliseconds,
}

/// Metric types the engine publishes, each owned by exactly one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Step count for the day
    Steps,
    /// Active energy burned (kcal)
    ActiveEnergy,
    /// Distance covered (km)
    Distance,
    /// Minutes of exercise
    ExerciseMinutes,
    /// Total sleep time (minutes)
    SleepDuration,
    /// Sleep efficiency (percent of time in bed asleep)
    SleepEfficiency,
    /// Time in bed (minutes)
    TimeInBed,
    /// Calories consumed (kcal)
    CaloriesConsumed,
    /// Protein consumed (g)
    Protein,
    /// Carbohydrates consumed (g)
    Carbohydrates,
    /// Fat consumed (g)
    Fat,
    /// Body weight (kg)
    Weight,
    /// Body fat percentage
    BodyFatPercentage,
    /// Muscle mass (kg)
    MuscleMass,
    /// Resting heart rate (bpm)
    RestingHeartRate,
    /// Heart rate variability (ms)
    HeartRateVariability,
}

impl MetricKind {
    /// The category this metric belongs to
    #[must_use]
    pub const fn category(self) -> DataCategory {
        match self {
            Self::Steps | Self::ActiveEnergy | Self::Distance | Self::ExerciseMinutes => {
                DataCategory::Activity
            }
            Self::SleepDuration | Self::SleepEfficiency | Self::TimeInBed => DataCategory::Sleep,
            Self::CaloriesConsumed | Self::Protein | Self::Carbohydrates | Self::Fat => {
                DataCategory::Nutrition
            }
            Self::Weight | Self::BodyFatPercentage | Self::MuscleMass => {
                DataCategory::BodyComposition
            }
            Self::RestingHeartRate | Self::HeartRateVariability => DataCategory::HeartRate,
        }
    }
}

/// A single metric reading with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    /// Numeric value in `unit`
    pub value: f64,
    /// Unit of measure
    pub unit: MetricUnit,
}

impl MetricValue {
    /// Create a new metric value
    #[must_use]
    pub const fn new(value: f64, unit: MetricUnit) -> Self {
        Self { value, unit }
    }
}

/// One raw reading from the local health store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Metric this sample measures
    pub kind: MetricKind,
    /// Measured value
    pub value: MetricValue,
    /// When the sample was recorded by the device
    pub recorded_at: DateTime<Utc>,
}

/// Change notification emitted by the local health store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    /// Category whose data changed
    pub category: DataCategory,
}

/// What one category fetch returns on success.
///
/// `sampled_at` is the data timestamp, not the fetch wall clock. Merge into
/// shared state compares this field, so a slow fetch carrying old data loses
/// to a faster fetch that already delivered newer data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPayload {
    /// Latest value per metric kind
    pub values: HashMap<MetricKind, MetricValue>,
    /// Timestamp of the newest sample backing these values
    pub sampled_at: DateTime<Utc>,
}

impl CategoryPayload {
    /// Create an empty payload stamped with the given data time
    #[must_use]
    pub fn empty(sampled_at: DateTime<Utc>) -> Self {
        Self {
            values: HashMap::new(),
            sampled_at,
        }
    }

    /// Whether the fetch returned any metric values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of one category fetch, successful or not
#[derive(Debug)]
pub struct ProviderResult {
    /// Category that was fetched
    pub category: DataCategory,
    /// Provider that served (or failed) the fetch
    pub provider: ProviderId,
    /// Values on success, structured error on failure
    pub payload: Result<CategoryPayload, ProviderError>,
}

/// Counts from one capability probe battery.
///
/// Counts, not a boolean: the caller applies its own threshold. The engine
/// treats `succeeded >= 1` as read capability, a deliberately high-recall
/// heuristic for platforms whose permission APIs under-report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Probes that completed without a permission-class error
    pub succeeded: u32,
    /// Probes attempted
    pub attempted: u32,
}

impl ProbeReport {
    /// Apply the engine's capability threshold
    #[must_use]
    pub const fn indicates_capability(self) -> bool {
        self.succeeded >= 1
    }
}

/// Coarse authorization status published to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// No applied evidence either way yet
    NotDetermined,
    /// Read capability confirmed by probe or fetch evidence
    Authorized,
}

/// Smoothed authorization state for the local health store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationState {
    /// Stable connected indicator shown to the user
    pub is_authorized: bool,
    /// Coarse status enum
    pub status: AuthorizationStatus,
    /// When a probe result was last applied or re-confirmed
    pub last_checked_at: Option<DateTime<Utc>>,
    /// A transition is scheduled and waiting out the settle delay
    pub pending_update: bool,
}

impl Default for AuthorizationState {
    fn default() -> Self {
        Self {
            is_authorized: false,
            status: AuthorizationStatus::NotDetermined,
            last_checked_at: None,
            pending_update: false,
        }
    }
}

/// Aggregate sync status published to consumers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum SyncStatus {
    /// No sync has run yet
    #[default]
    Idle,
    /// A sync is in flight
    Syncing,
    /// The last sync updated every category
    Success,
    /// At least one category failed; summary is human-readable, never a raw error chain
    Error(String),
}

/// Per-category outcome within one sync session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum CategoryOutcome {
    /// Task launched, not yet resolved
    Pending,
    /// Fetch succeeded and was merged (or rejected as stale, which still counts)
    Success,
    /// Fetch failed; prior values left untouched
    Failed(String),
}

/// Transient record of one orchestrator run.
///
/// Lives only for the duration of the call and is returned to the caller for
/// inspection; it is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSession {
    /// Unique id for correlating log events of this run
    pub id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Outcome per category
    pub per_category: HashMap<DataCategory, CategoryOutcome>,
    /// Set once every category task has resolved
    pub completed_at: Option<DateTime<Utc>>,
}

impl SyncSession {
    /// Start a new session covering every category
    #[must_use]
    pub fn begin(started_at: DateTime<Utc>) -> Self {
        let per_category = DataCategory::ALL
            .iter()
            .map(|c| (*c, CategoryOutcome::Pending))
            .collect();
        Self {
            id: Uuid::new_v4(),
            started_at,
            per_category,
            completed_at: None,
        }
    }

    /// Categories whose fetch failed, in stable order
    #[must_use]
    pub fn failed_categories(&self) -> Vec<DataCategory> {
        DataCategory::ALL
            .iter()
            .copied()
            .filter(|c| matches!(self.per_category.get(c), Some(CategoryOutcome::Failed(_))))
            .collect()
    }

    /// Number of categories that fetched successfully
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.per_category
            .values()
            .filter(|o| matches!(o, CategoryOutcome::Success))
            .count()
    }
}

/// Current merged values for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMetrics {
    /// Latest value per metric kind
    pub values: HashMap<MetricKind, MetricValue>,
    /// Data timestamp of the stored values, used for stale-write rejection
    pub sampled_at: DateTime<Utc>,
    /// Provider that produced the stored values
    pub provider: ProviderId,
}

/// The externally observed health state snapshot.
///
/// Created empty at engine construction and overwritten in place for the
/// process lifetime. Consumers always read a consistent clone; partial
/// per-category updates are never visible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Merged current values per category; absent until first successful fetch
    pub categories: HashMap<DataCategory, CategoryMetrics>,
    /// Wall-clock time of the last completed sync, partial or full
    pub last_sync_date: Option<DateTime<Utc>>,
    /// Aggregate status of the most recent sync
    pub sync_status: SyncStatus,
    /// Smoothed local-store authorization state
    pub authorization: AuthorizationState,
}
