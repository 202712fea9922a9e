// ABOUTME: Provider adapter layer for the local health store and remote partner services
// ABOUTME: Core traits, local-store adapter, circuit breaker, and the provider registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

/// Fail-fast guard for flaky remote providers
pub mod circuit_breaker;
/// Core provider and local-store traits
pub mod core;
/// Adapter exposing the local store as a provider
pub mod local;
/// Registry resolving provider ids to concrete adapters
pub mod registry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use core::{HealthDataProvider, HealthStore, TimeRange};
pub use local::LocalStoreProvider;
pub use registry::ProviderRegistry;
