// ABOUTME: Preference store abstraction for loading per-user source preferences
// ABOUTME: Read-only from the engine's perspective; load failures degrade to all-local
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use crate::errors::PreferenceError;
use crate::routing::SourcePreferences;
use async_trait::async_trait;

/// External preference store the engine reads source choices from.
///
/// The engine never writes preferences; the settings surface owns them. A
/// load failure is not fatal anywhere in the engine: callers substitute
/// [`SourcePreferences::all_local`].
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Load the source preferences for a user.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::Unavailable`] when the backing store
    /// cannot be reached or read.
    async fn load_preferences(&self, user_id: &str) -> Result<SourcePreferences, PreferenceError>;
}

/// Fixed in-memory preference set, for embedding shells and tests
#[derive(Debug, Clone, Default)]
pub struct StaticPreferences {
    preferences: SourcePreferences,
}

impl StaticPreferences {
    /// Wrap a fixed preference set
    #[must_use]
    pub fn new(preferences: SourcePreferences) -> Self {
        Self { preferences }
    }
}

#[async_trait]
impl PreferenceStore for StaticPreferences {
    async fn load_preferences(&self, _user_id: &str) -> Result<SourcePreferences, PreferenceError> {
        Ok(self.preferences.clone())
    }
}
