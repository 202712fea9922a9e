// ABOUTME: Engine configuration for timeouts, cooldowns, and debounce windows
// ABOUTME: Environment-variable driven with validated defaults, no config files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use std::env;
use std::time::Duration;

/// Environment variable overriding the remote fetch timeout (milliseconds)
pub const ENV_FETCH_TIMEOUT_MS: &str = "VITALSYNC_FETCH_TIMEOUT_MS";
/// Environment variable overriding the per-probe timeout (milliseconds)
pub const ENV_PROBE_TIMEOUT_MS: &str = "VITALSYNC_PROBE_TIMEOUT_MS";
/// Environment variable overriding the authorization cooldown (milliseconds)
pub const ENV_AUTH_COOLDOWN_MS: &str = "VITALSYNC_AUTH_COOLDOWN_MS";
/// Environment variable overriding the authorization settle delay (milliseconds)
pub const ENV_AUTH_SETTLE_MS: &str = "VITALSYNC_AUTH_SETTLE_MS";
/// Environment variable overriding the change-listener debounce (milliseconds)
pub const ENV_LISTENER_DEBOUNCE_MS: &str = "VITALSYNC_LISTENER_DEBOUNCE_MS";

/// Tunable timing knobs for the synchronization engine.
///
/// Defaults match production behavior; every knob can be overridden through
/// the environment for integration environments and soak tests. Values are
/// read once at construction, not watched.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Ceiling for one remote category fetch before it loses the timeout race
    pub fetch_timeout: Duration,
    /// Ceiling for one capability probe query
    pub probe_timeout: Duration,
    /// Window after an applied authorization change during which new probe
    /// reports are dropped to prevent indicator flicker
    pub auth_cooldown: Duration,
    /// Delay between detecting an authorization change and committing it,
    /// absorbing near-simultaneous duplicate signals
    pub auth_settle_delay: Duration,
    /// Quiet period the change listener waits before triggering a sync,
    /// collapsing notification bursts into one run
    pub listener_debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(8),
            probe_timeout: Duration::from_secs(2),
            auth_cooldown: Duration::from_secs(3),
            auth_settle_delay: Duration::from_millis(500),
            listener_debounce: Duration::from_millis(1500),
        }
    }
}

fn env_duration_ms(var: &str, default: Duration) -> Duration {
    env::var(var)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}

impl SyncConfig {
    /// Build configuration from the environment, falling back to defaults
    /// for unset or unparseable variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fetch_timeout: env_duration_ms(ENV_FETCH_TIMEOUT_MS, defaults.fetch_timeout),
            probe_timeout: env_duration_ms(ENV_PROBE_TIMEOUT_MS, defaults.probe_timeout),
            auth_cooldown: env_duration_ms(ENV_AUTH_COOLDOWN_MS, defaults.auth_cooldown),
            auth_settle_delay: env_duration_ms(ENV_AUTH_SETTLE_MS, defaults.auth_settle_delay),
            listener_debounce: env_duration_ms(
                ENV_LISTENER_DEBOUNCE_MS,
                defaults.listener_debounce,
            ),
        }
    }
}
