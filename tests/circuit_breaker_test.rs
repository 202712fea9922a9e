// ABOUTME: Tests for the remote-provider circuit breaker state transitions
// ABOUTME: Open/half-open/closed behavior, retryable-only counting, fail-fast while open
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project
#![allow(missing_docs)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use vitalsync::errors::ProviderError;
use vitalsync::models::DataCategory;
use vitalsync::providers::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use vitalsync::routing::{ProviderId, RemoteService};

const OURA: ProviderId = ProviderId::Remote(RemoteService::Oura);

fn network_error() -> ProviderError {
    ProviderError::Network {
        provider: OURA,
        message: "connection reset".into(),
    }
}

fn breaker(failure_threshold: u32, recovery: Duration) -> CircuitBreaker {
    CircuitBreaker::with_config(
        OURA,
        CircuitBreakerConfig {
            failure_threshold,
            recovery_timeout: recovery,
        },
    )
}

#[tokio::test]
async fn test_breaker_starts_closed() {
    let cb = CircuitBreaker::new(OURA);
    assert_eq!(cb.state(), CircuitState::Closed);
    assert!(cb.admit().is_ok());
}

#[tokio::test]
async fn test_opens_after_threshold_retryable_failures() {
    let cb = breaker(3, Duration::from_secs(30));

    cb.record_failure(&network_error());
    cb.record_failure(&network_error());
    assert_eq!(cb.state(), CircuitState::Closed);
    cb.record_failure(&network_error());
    assert_eq!(cb.state(), CircuitState::Open);
    assert!(matches!(
        cb.admit(),
        Err(ProviderError::CircuitOpen { .. })
    ));
}

#[tokio::test]
async fn test_deterministic_failures_never_trip_the_breaker() {
    let cb = breaker(2, Duration::from_secs(30));
    let auth = ProviderError::AuthRejected { provider: OURA };
    let unsupported = ProviderError::Unsupported {
        provider: OURA,
        category: DataCategory::Nutrition,
    };

    for _ in 0..10 {
        cb.record_failure(&auth);
        cb.record_failure(&unsupported);
    }
    assert_eq!(cb.state(), CircuitState::Closed);
    assert_eq!(cb.failure_count(), 0);
}

#[tokio::test]
async fn test_success_resets_consecutive_failures() {
    let cb = breaker(3, Duration::from_secs(30));

    cb.record_failure(&network_error());
    cb.record_failure(&network_error());
    assert_eq!(cb.failure_count(), 2);
    cb.record_success();
    assert_eq!(cb.failure_count(), 0);
    assert_eq!(cb.state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_open_circuit_fails_fast_without_running_operation() {
    let cb = breaker(1, Duration::from_secs(30));
    cb.record_failure(&network_error());
    assert_eq!(cb.state(), CircuitState::Open);

    let runs = AtomicU32::new(0);
    let result = cb
        .call(async {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ProviderError>(())
        })
        .await;

    assert!(matches!(result, Err(ProviderError::CircuitOpen { .. })));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_recovery_trial_closes_on_success() {
    let cb = breaker(1, Duration::from_secs(30));
    cb.record_failure(&network_error());
    assert_eq!(cb.state(), CircuitState::Open);

    tokio::time::sleep(Duration::from_secs(31)).await;

    // First admit after the recovery timeout is the half-open trial
    assert!(cb.admit().is_ok());
    assert_eq!(cb.state(), CircuitState::HalfOpen);
    // A concurrent fetch is rejected while the trial is in flight
    assert!(matches!(
        cb.admit(),
        Err(ProviderError::CircuitOpen { .. })
    ));

    cb.record_success();
    assert_eq!(cb.state(), CircuitState::Closed);
    assert!(cb.admit().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_failed_recovery_trial_reopens() {
    let cb = breaker(1, Duration::from_secs(30));
    cb.record_failure(&network_error());

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(cb.admit().is_ok());
    assert_eq!(cb.state(), CircuitState::HalfOpen);

    cb.record_failure(&network_error());
    assert_eq!(cb.state(), CircuitState::Open);
    assert!(matches!(
        cb.admit(),
        Err(ProviderError::CircuitOpen { .. })
    ));
}
