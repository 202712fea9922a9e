// ABOUTME: Adapter exposing the opaque local health store as a provider
// ABOUTME: Reduces raw samples to the latest value per metric kind
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use crate::errors::ProviderError;
use crate::models::{CategoryPayload, DataCategory};
use crate::providers::core::{HealthDataProvider, HealthStore, TimeRange};
use crate::routing::ProviderId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Fronts the on-device store behind the uniform provider contract.
///
/// Raw samples are reduced to the newest reading per metric kind; the
/// payload's `sampled_at` is the newest sample time so merge ordering
/// follows data age, not fetch latency. An empty query window yields an
/// empty payload stamped at the range end: a successful read of nothing,
/// which still counts as authorization evidence upstream.
pub struct LocalStoreProvider {
    store: Arc<dyn HealthStore>,
}

impl LocalStoreProvider {
    /// Wrap a local store handle
    #[must_use]
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HealthDataProvider for LocalStoreProvider {
    fn id(&self) -> ProviderId {
        ProviderId::LocalStore
    }

    async fn fetch_category(
        &self,
        category: DataCategory,
        range: TimeRange,
    ) -> Result<CategoryPayload, ProviderError> {
        let samples = self.store.query_samples(category, range).await?;

        if samples.is_empty() {
            return Ok(CategoryPayload::empty(range.end));
        }

        let mut newest_per_kind = HashMap::new();
        let mut newest_at = samples[0].recorded_at;
        for sample in samples {
            if sample.kind.category() != category {
                continue;
            }
            if sample.recorded_at > newest_at {
                newest_at = sample.recorded_at;
            }
            newest_per_kind
                .entry(sample.kind)
                .and_modify(|(at, value)| {
                    if sample.recorded_at > *at {
                        *at = sample.recorded_at;
                        *value = sample.value;
                    }
                })
                .or_insert((sample.recorded_at, sample.value));
        }

        Ok(CategoryPayload {
            values: newest_per_kind
                .into_iter()
                .map(|(kind, (_, value))| (kind, value))
                .collect(),
            sampled_at: newest_at,
        })
    }
}
