// ABOUTME: Source router mapping categories to providers from free-form user preferences
// ABOUTME: Normalizes arbitrary source names against a static alias table, defaulting to the local store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use crate::models::DataCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Remote partner services the engine can route reads to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteService {
    /// Withings body scales and sleep mats
    Withings,
    /// Oura ring
    Oura,
    /// Fitbit trackers
    Fitbit,
    /// WHOOP straps
    Whoop,
    /// Strava activity feed
    Strava,
}

impl RemoteService {
    /// Stable lowercase identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Withings => "withings",
            Self::Oura => "oura",
            Self::Fitbit => "fitbit",
            Self::Whoop => "whoop",
            Self::Strava => "strava",
        }
    }

    /// Categories this partner actually serves.
    ///
    /// A preference naming a partner for a category outside this set routes
    /// to the local store instead; routing stays total either way.
    #[must_use]
    pub const fn supports(self, category: DataCategory) -> bool {
        match self {
            Self::Withings => matches!(
                category,
                DataCategory::BodyComposition | DataCategory::Sleep | DataCategory::HeartRate
            ),
            Self::Oura => matches!(
                category,
                DataCategory::Sleep | DataCategory::Activity | DataCategory::HeartRate
            ),
            Self::Fitbit => matches!(
                category,
                DataCategory::Activity
                    | DataCategory::Sleep
                    | DataCategory::HeartRate
                    | DataCategory::Nutrition
            ),
            Self::Whoop => matches!(
                category,
                DataCategory::Sleep | DataCategory::Activity | DataCategory::HeartRate
            ),
            Self::Strava => matches!(
                category,
                DataCategory::Activity | DataCategory::HeartRate
            ),
        }
    }
}

impl fmt::Display for RemoteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete data source: the on-device store or a named remote partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// The local on-device health store
    LocalStore,
    /// A remote partner service
    Remote(RemoteService),
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalStore => f.write_str("local"),
            Self::Remote(service) => write!(f, "remote:{service}"),
        }
    }
}

/// Per-user mapping from category to a free-form source name.
///
/// Values are whatever the preference store holds ("Apple Health", "oura",
/// "my spreadsheet"); resolution is where they gain meaning. Absent entries
/// and unrecognized names both resolve to the local store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePreferences {
    entries: HashMap<DataCategory, String>,
}

impl SourcePreferences {
    /// Empty preference set; every category resolves to the local store
    #[must_use]
    pub fn all_local() -> Self {
        Self::default()
    }

    /// Set the preferred source name for one category
    pub fn set(&mut self, category: DataCategory, source: impl Into<String>) {
        self.entries.insert(category, source.into());
    }

    /// Raw preference string for a category, if any
    #[must_use]
    pub fn get(&self, category: DataCategory) -> Option<&str> {
        self.entries.get(&category).map(String::as_str)
    }
}

/// Lowercase the input and collapse whitespace, hyphen, and dot runs into a
/// single underscore so "Apple Health", "apple-health", and "APPLE_HEALTH"
/// all normalize identically.
fn normalize_source(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '.' || ch == '_' {
            pending_separator = !out.is_empty();
            continue;
        }
        if pending_separator {
            out.push('_');
            pending_separator = false;
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Aliases that name the local on-device store
const LOCAL_ALIASES: &[&str] = &["apple", "apple_health", "healthkit", "health_kit", "local"];

fn match_remote(normalized: &str) -> Option<RemoteService> {
    match normalized {
        "withings" => Some(RemoteService::Withings),
        "oura" | "oura_ring" => Some(RemoteService::Oura),
        "fitbit" => Some(RemoteService::Fitbit),
        "whoop" => Some(RemoteService::Whoop),
        "strava" => Some(RemoteService::Strava),
        _ => None,
    }
}

/// Resolve the provider that should serve reads for a category.
///
/// Pure and total: any input, including garbage, resolves to some provider.
/// Unknown names, absent entries, and partners that do not serve the
/// category all degrade to the local store rather than erroring.
#[must_use]
pub fn resolve_source(category: DataCategory, preferences: &SourcePreferences) -> ProviderId {
    let Some(raw) = preferences.get(category) else {
        return ProviderId::LocalStore;
    };
    let normalized = normalize_source(raw);
    if LOCAL_ALIASES.contains(&normalized.as_str()) {
        return ProviderId::LocalStore;
    }
    match match_remote(&normalized) {
        Some(service) if service.supports(category) => ProviderId::Remote(service),
        _ => ProviderId::LocalStore,
    }
}
