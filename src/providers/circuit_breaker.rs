// ABOUTME: Circuit breaker guarding remote provider fetches against repeated failures
// ABOUTME: Fails fast while open, admits a single half-open trial after the recovery timeout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use crate::errors::ProviderError;
use crate::routing::ProviderId;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation; failures are counted
    Closed,
    /// Tripped; fetches fail immediately without touching the provider
    Open,
    /// One trial fetch in flight to test recovery
    HalfOpen,
}

/// Thresholds and timeouts for breaker behavior
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Consecutive retryable failures before the circuit opens
    pub failure_threshold: u32,
    /// How long the circuit stays open before admitting a trial
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Per-provider circuit breaker.
///
/// Counts only retryable failures (timeouts, transport errors); auth
/// rejections and unsupported categories are deterministic and pass through
/// without tripping anything. While open, fetches short-circuit with
/// [`ProviderError::CircuitOpen`] carrying a retry-after hint.
pub struct CircuitBreaker {
    provider: ProviderId,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a breaker with default thresholds
    #[must_use]
    pub fn new(provider: ProviderId) -> Self {
        Self::with_config(provider, CircuitBreakerConfig::default())
    }

    /// Create a breaker with custom thresholds
    #[must_use]
    pub fn with_config(provider: ProviderId, config: CircuitBreakerConfig) -> Self {
        Self {
            provider,
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Current state, resolving an elapsed recovery timeout to half-open
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.lock_inner().state
    }

    /// Consecutive retryable failures recorded in the closed state
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.lock_inner().consecutive_failures
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        // Lock poisoning cannot occur: no panics happen while holding it
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Admit or reject a fetch attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::CircuitOpen`] while the circuit is open and
    /// the recovery timeout has not elapsed, or while a half-open trial is
    /// already in flight.
    pub fn admit(&self) -> Result<(), ProviderError> {
        let mut inner = self.lock_inner();
        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::HalfOpen => Err(self.open_error(&inner)),
            CircuitState::Open => {
                let elapsed = inner.opened_at.map_or(Duration::ZERO, |t| t.elapsed());
                if elapsed >= self.config.recovery_timeout {
                    inner.state = CircuitState::HalfOpen;
                    info!(provider = %self.provider, "circuit half-open, admitting recovery trial");
                    Ok(())
                } else {
                    Err(self.open_error(&inner))
                }
            }
        }
    }

    fn open_error(&self, inner: &BreakerInner) -> ProviderError {
        let elapsed = inner.opened_at.map_or(Duration::ZERO, |t| t.elapsed());
        let remaining = self.config.recovery_timeout.saturating_sub(elapsed);
        ProviderError::CircuitOpen {
            provider: self.provider,
            retry_after_secs: remaining.as_secs().max(1),
        }
    }

    /// Record a successful fetch, closing the circuit if it was half-open
    pub fn record_success(&self) {
        let mut inner = self.lock_inner();
        if inner.state == CircuitState::HalfOpen {
            info!(provider = %self.provider, "circuit closed, provider recovered");
        }
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Record a failed fetch; only retryable failures count toward tripping
    pub fn record_failure(&self, error: &ProviderError) {
        if !error.is_retryable() {
            return;
        }
        let mut inner = self.lock_inner();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    warn!(
                        provider = %self.provider,
                        failures = inner.consecutive_failures,
                        recovery_secs = self.config.recovery_timeout.as_secs(),
                        "circuit opened, provider failing"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                warn!(provider = %self.provider, "circuit re-opened, recovery trial failed");
            }
            CircuitState::Open => {
                inner.opened_at = Some(Instant::now());
            }
        }
    }

    /// Run an operation under breaker protection.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::CircuitOpen`] without running the operation
    /// when the circuit rejects it, otherwise the operation's own result
    /// with success/failure recorded.
    pub async fn call<F, T>(&self, operation: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        self.admit()?;
        match operation.await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(error) => {
                self.record_failure(&error);
                Err(error)
            }
        }
    }
}
