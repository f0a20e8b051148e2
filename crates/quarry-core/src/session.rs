//! Resolution session state.
//!
//! A [`Session`] carries the cross-request settings for one embedding of
//! the resolver: configuration properties, the offline flag, the
//! error-cache policy, and an optional transfer listener. Sessions are
//! cheap to clone and safe to share across concurrently running resolve
//! calls.

use std::fmt;
use std::sync::Arc;

use crate::config::ConfigMap;
use crate::transfer::TransferListener;

/// Which resolution failures may be cached and suppressed until their
/// update policy says a re-check is due.
///
/// Policies are bit sets so embedders can cache not-found outcomes,
/// transfer errors, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorCachePolicy(u32);

impl ErrorCachePolicy {
    /// Cache nothing; every resolution retries failed downloads.
    pub const DISABLED: Self = Self(0);
    /// Cache not-found outcomes.
    pub const NOT_FOUND: Self = Self(1);
    /// Cache transfer errors.
    pub const TRANSFER_ERROR: Self = Self(1 << 1);
    /// Cache all failures.
    pub const ALL: Self = Self(1 | (1 << 1));

    /// Combines two policies.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns whether any failure kind is cached, which is what gates the
    /// update-check consultation during download planning.
    #[must_use]
    pub const fn caches_errors(self) -> bool {
        self.0 & Self::ALL.0 != 0
    }
}

/// Cross-request settings for one embedding of the resolver.
#[derive(Clone, Default)]
pub struct Session {
    config: ConfigMap,
    offline: bool,
    error_cache: ErrorCachePolicy,
    transfer_listener: Option<Arc<dyn TransferListener>>,
}

impl Session {
    /// Creates a session with default settings: online, no error caching,
    /// empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the configuration map.
    #[must_use]
    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    /// Returns whether the session forbids remote repository access.
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        self.offline
    }

    /// Returns the error-cache policy.
    #[must_use]
    pub const fn error_cache_policy(&self) -> ErrorCachePolicy {
        self.error_cache
    }

    /// Returns the transfer listener, if one is attached.
    #[must_use]
    pub fn transfer_listener(&self) -> Option<&Arc<dyn TransferListener>> {
        self.transfer_listener.as_ref()
    }

    /// Sets a configuration property.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.set(key, value);
        self
    }

    /// Sets the offline flag.
    #[must_use]
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Sets the error-cache policy.
    #[must_use]
    pub fn with_error_cache_policy(mut self, policy: ErrorCachePolicy) -> Self {
        self.error_cache = policy;
        self
    }

    /// Attaches a transfer listener.
    #[must_use]
    pub fn with_transfer_listener(mut self, listener: Arc<dyn TransferListener>) -> Self {
        self.transfer_listener = Some(listener);
        self
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("offline", &self.offline)
            .field("error_cache", &self.error_cache)
            .field("transfer_listener", &self.transfer_listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys;

    #[test]
    fn error_cache_policy_bits() {
        assert!(!ErrorCachePolicy::DISABLED.caches_errors());
        assert!(ErrorCachePolicy::NOT_FOUND.caches_errors());
        assert!(ErrorCachePolicy::TRANSFER_ERROR.caches_errors());
        assert!(ErrorCachePolicy::ALL.caches_errors());
        assert_eq!(
            ErrorCachePolicy::NOT_FOUND.union(ErrorCachePolicy::TRANSFER_ERROR),
            ErrorCachePolicy::ALL
        );
    }

    #[test]
    fn session_defaults() {
        let session = Session::new();
        assert!(!session.is_offline());
        assert!(!session.error_cache_policy().caches_errors());
        assert!(session.config().get_bool(keys::SNAPSHOT_NORMALIZATION, true));
    }

    #[test]
    fn session_builders() {
        let session = Session::new()
            .with_offline(true)
            .with_config(keys::SIMPLE_LRM_INTEROP, "true")
            .with_error_cache_policy(ErrorCachePolicy::ALL);
        assert!(session.is_offline());
        assert!(session.config().get_bool(keys::SIMPLE_LRM_INTEROP, false));
        assert!(session.error_cache_policy().caches_errors());
    }
}
