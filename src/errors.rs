// ABOUTME: Structured error taxonomy for provider fetches, capability probes, and preference loads
// ABOUTME: Classification helpers drive circuit breaker counting and authorization decisions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitalSync Project

use crate::models::DataCategory;
use crate::routing::ProviderId;
use thiserror::Error;

/// Errors a provider fetch or local-store query can produce.
///
/// None of these abort a sync session: the orchestrator records them
/// per-category and carries on. Classification matters more than the message:
/// permission-class errors count against capability probes, retryable errors
/// count against the remote circuit breaker, and everything else is just a
/// failed category.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The fetch lost the race against the per-task timeout
    #[error("{provider} fetch timed out after {elapsed_ms}ms")]
    Timeout {
        /// Provider that timed out
        provider: ProviderId,
        /// How long the fetch was allowed to run
        elapsed_ms: u64,
    },

    /// The remote rejected our credentials; treated like any other fetch failure
    #[error("{provider} rejected authorization")]
    AuthRejected {
        /// Provider that rejected the request
        provider: ProviderId,
    },

    /// Transport-level failure talking to a remote provider
    #[error("{provider} network error: {message}")]
    Network {
        /// Provider the request was addressed to
        provider: ProviderId,
        /// Transport error description
        message: String,
    },

    /// The remote answered with something we could not decode
    #[error("{provider} returned a malformed response: {message}")]
    MalformedResponse {
        /// Provider that answered
        provider: ProviderId,
        /// Decode failure description
        message: String,
    },

    /// The provider does not serve this category at all
    #[error("{provider} does not support {category}")]
    Unsupported {
        /// Provider asked
        provider: ProviderId,
        /// Category it cannot serve
        category: DataCategory,
    },

    /// The local store refused the read for lack of permission
    #[error("local store denied read access for {category}")]
    PermissionDenied {
        /// Category the read targeted
        category: DataCategory,
    },

    /// The local store was busy or unreachable; transient, not a permission signal
    #[error("local store unavailable: {message}")]
    StoreUnavailable {
        /// Store error description
        message: String,
    },

    /// The provider's circuit breaker is open; fetch was not attempted
    #[error("{provider} circuit open, retry in ~{retry_after_secs}s")]
    CircuitOpen {
        /// Provider whose breaker is open
        provider: ProviderId,
        /// Estimated seconds until a recovery trial is admitted
        retry_after_secs: u64,
    },
}

impl ProviderError {
    /// Whether this error is evidence of missing read permission.
    ///
    /// Only these count against a capability probe; a busy store or a slow
    /// network says nothing about authorization.
    #[must_use]
    pub const fn is_permission_class(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Whether a later attempt could plausibly succeed without operator action.
    ///
    /// Drives circuit breaker counting: auth rejections and unsupported
    /// categories are deterministic and must not trip the breaker.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Network { .. } | Self::StoreUnavailable { .. }
        )
    }

    /// Whether this is the timeout subtype of a fetch failure
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Preference store failure.
///
/// Never surfaces past the orchestrator: a failed load is logged and
/// substituted with the all-local default set, so sync cannot hard-fail on
/// missing configuration.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The preference store could not be reached or read
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RemoteService;

    #[test]
    fn permission_denied_is_the_only_permission_class() {
        let denied = ProviderError::PermissionDenied {
            category: DataCategory::Activity,
        };
        let busy = ProviderError::StoreUnavailable {
            message: "store busy".into(),
        };
        assert!(denied.is_permission_class());
        assert!(!busy.is_permission_class());
    }

    #[test]
    fn deterministic_failures_are_not_retryable() {
        let auth = ProviderError::AuthRejected {
            provider: ProviderId::Remote(RemoteService::Oura),
        };
        let unsupported = ProviderError::Unsupported {
            provider: ProviderId::Remote(RemoteService::Strava),
            category: DataCategory::Nutrition,
        };
        let timeout = ProviderError::Timeout {
            provider: ProviderId::Remote(RemoteService::Withings),
            elapsed_ms: 8000,
        };
        assert!(!auth.is_retryable());
        assert!(!unsupported.is_retryable());
        assert!(timeout.is_retryable());
        assert!(timeout.is_timeout());
    }
}
