// ABOUTME: Provider registry resolving provider ids to registered adapters
// ABOUTME: Wraps remote fetches in the timeout race and per-provider circuit breaker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use crate::errors::ProviderError;
use crate::models::{DataCategory, ProviderResult};
use crate::providers::circuit_breaker::CircuitBreaker;
use crate::providers::core::{HealthDataProvider, TimeRange};
use crate::routing::{ProviderId, RemoteService};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

struct RemoteEntry {
    provider: Arc<dyn HealthDataProvider>,
    breaker: CircuitBreaker,
}

/// Holds every registered adapter and funnels fetches to the right one.
///
/// The local adapter is mandatory; remotes are optional. Asking for an
/// unregistered remote degrades to the local store rather than failing, so
/// routing stays total from preference string all the way to a fetch.
pub struct ProviderRegistry {
    local: Arc<dyn HealthDataProvider>,
    remotes: HashMap<RemoteService, RemoteEntry>,
}

impl ProviderRegistry {
    /// Create a registry around the mandatory local adapter
    #[must_use]
    pub fn new(local: Arc<dyn HealthDataProvider>) -> Self {
        Self {
            local,
            remotes: HashMap::new(),
        }
    }

    /// Register a remote partner adapter with its own circuit breaker
    #[must_use]
    pub fn with_remote(
        mut self,
        service: RemoteService,
        provider: Arc<dyn HealthDataProvider>,
    ) -> Self {
        self.remotes.insert(
            service,
            RemoteEntry {
                provider,
                breaker: CircuitBreaker::new(ProviderId::Remote(service)),
            },
        );
        self
    }

    /// Fetch one category from the requested provider.
    ///
    /// Remote fetches race the configured timeout: whichever resolves first
    /// wins and the loser is dropped, so a late fetch result can never be
    /// observed after the timeout was recorded. Remote fetches also pass
    /// through the provider's circuit breaker. Local fetches go straight to
    /// the store.
    pub async fn fetch_category(
        &self,
        requested: ProviderId,
        category: DataCategory,
        range: TimeRange,
        fetch_timeout: Duration,
    ) -> ProviderResult {
        let (provider, entry) = match requested {
            ProviderId::LocalStore => (ProviderId::LocalStore, None),
            ProviderId::Remote(service) => match self.remotes.get(&service) {
                Some(entry) => (requested, Some(entry)),
                None => {
                    warn!(
                        provider = %requested,
                        %category,
                        "remote provider not registered, falling back to local store"
                    );
                    (ProviderId::LocalStore, None)
                }
            },
        };

        let payload = match entry {
            None => self.local.fetch_category(category, range).await,
            Some(entry) => {
                entry
                    .breaker
                    .call(async {
                        match timeout(fetch_timeout, entry.provider.fetch_category(category, range))
                            .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(ProviderError::Timeout {
                                provider,
                                elapsed_ms: fetch_timeout.as_millis() as u64,
                            }),
                        }
                    })
                    .await
            }
        };

        match &payload {
            Ok(p) => debug!(%provider, %category, values = p.values.len(), "category fetch succeeded"),
            Err(e) => debug!(%provider, %category, error = %e, "category fetch failed"),
        }

        ProviderResult {
            category,
            provider,
            payload,
        }
    }
}
