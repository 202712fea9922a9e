// ABOUTME: Shared in-memory fakes for integration tests
// ABOUTME: Configurable local store, scripted remote providers, and counting preference stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project
#![allow(missing_docs, dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use vitalsync::errors::{PreferenceError, ProviderError};
use vitalsync::models::{
    CategoryPayload, DataCategory, MetricKind, MetricUnit, MetricValue, Sample, StoreChange,
};
use vitalsync::preferences::PreferenceStore;
use vitalsync::providers::core::{HealthDataProvider, HealthStore, TimeRange};
use vitalsync::routing::{ProviderId, SourcePreferences};

/// In-memory local health store with per-category failure modes.
pub struct MemoryHealthStore {
    samples: Mutex<HashMap<DataCategory, Vec<Sample>>>,
    denied: Mutex<HashSet<DataCategory>>,
    unavailable: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    changes: broadcast::Sender<StoreChange>,
    queries: AtomicU32,
}

impl MemoryHealthStore {
    pub fn new() -> Arc<Self> {
        let (changes, _) = broadcast::channel(64);
        Arc::new(Self {
            samples: Mutex::new(HashMap::new()),
            denied: Mutex::new(HashSet::new()),
            unavailable: Mutex::new(false),
            delay: Mutex::new(None),
            changes,
            queries: AtomicU32::new(0),
        })
    }

    pub fn push_sample(&self, sample: Sample) {
        self.samples
            .lock()
            .unwrap()
            .entry(sample.kind.category())
            .or_default()
            .push(sample);
    }

    /// Seed one representative sample per category, stamped now.
    pub fn seed_all_categories(&self) {
        let now = Utc::now();
        let seeds = [
            (MetricKind::Steps, 8000.0, MetricUnit::Count),
            (MetricKind::SleepDuration, 420.0, MetricUnit::Minutes),
            (MetricKind::CaloriesConsumed, 2100.0, MetricUnit::Kilocalories),
            (MetricKind::Weight, 72.5, MetricUnit::Kilograms),
            (MetricKind::RestingHeartRate, 58.0, MetricUnit::Bpm),
        ];
        for (kind, value, unit) in seeds {
            self.push_sample(Sample {
                kind,
                value: MetricValue::new(value, unit),
                recorded_at: now,
            });
        }
    }

    pub fn deny(&self, category: DataCategory) {
        self.denied.lock().unwrap().insert(category);
    }

    pub fn deny_all(&self) {
        for category in DataCategory::ALL {
            self.deny(category);
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn notify(&self, category: DataCategory) {
        let _ = self.changes.send(StoreChange { category });
    }

    pub fn query_count(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthStore for MemoryHealthStore {
    async fn query_samples(
        &self,
        category: DataCategory,
        _range: TimeRange,
    ) -> Result<Vec<Sample>, ProviderError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.denied.lock().unwrap().contains(&category) {
            return Err(ProviderError::PermissionDenied { category });
        }
        if *self.unavailable.lock().unwrap() {
            return Err(ProviderError::StoreUnavailable {
                message: "store busy".into(),
            });
        }
        Ok(self
            .samples
            .lock()
            .unwrap()
            .get(&category)
            .cloned()
            .unwrap_or_default())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

/// What a scripted remote provider should do when fetched.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Payload(CategoryPayload),
    AuthRejected,
    Network(String),
}

/// Remote provider fake with a fixed response and optional artificial delay.
pub struct ScriptedProvider {
    id: ProviderId,
    response: ScriptedResponse,
    delay: Option<Duration>,
    fetches: AtomicU32,
}

impl ScriptedProvider {
    pub fn new(id: ProviderId, response: ScriptedResponse) -> Arc<Self> {
        Arc::new(Self {
            id,
            response,
            delay: None,
            fetches: AtomicU32::new(0),
        })
    }

    pub fn with_delay(id: ProviderId, response: ScriptedResponse, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            id,
            response,
            delay: Some(delay),
            fetches: AtomicU32::new(0),
        })
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthDataProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn fetch_category(
        &self,
        _category: DataCategory,
        _range: TimeRange,
    ) -> Result<CategoryPayload, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.response {
            ScriptedResponse::Payload(payload) => Ok(payload.clone()),
            ScriptedResponse::AuthRejected => Err(ProviderError::AuthRejected {
                provider: self.id,
            }),
            ScriptedResponse::Network(message) => Err(ProviderError::Network {
                provider: self.id,
                message: message.clone(),
            }),
        }
    }
}

/// Preference store that always fails, for fallback tests.
pub struct FailingPreferences;

#[async_trait]
impl PreferenceStore for FailingPreferences {
    async fn load_preferences(&self, _user_id: &str) -> Result<SourcePreferences, PreferenceError> {
        Err(PreferenceError::Unavailable("connection refused".into()))
    }
}

/// Preference store that counts loads; one load per sync run.
pub struct CountingPreferences {
    preferences: SourcePreferences,
    loads: AtomicU32,
}

impl CountingPreferences {
    pub fn new(preferences: SourcePreferences) -> Arc<Self> {
        Arc::new(Self {
            preferences,
            loads: AtomicU32::new(0),
        })
    }

    pub fn load_count(&self) -> u32 {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PreferenceStore for CountingPreferences {
    async fn load_preferences(&self, _user_id: &str) -> Result<SourcePreferences, PreferenceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.preferences.clone())
    }
}

/// Build a payload with a single metric value stamped at the given time.
pub fn payload_with(
    kind: MetricKind,
    value: f64,
    unit: MetricUnit,
    sampled_at: chrono::DateTime<Utc>,
) -> CategoryPayload {
    let mut values = HashMap::new();
    values.insert(kind, MetricValue::new(value, unit));
    CategoryPayload { values, sampled_at }
}
