//! Update check SPI.
//!
//! When the session caches resolution failures, the resolver asks the
//! update-check manager whether a re-fetch is due before scheduling a
//! download, and persists the outcome afterwards. The check's stored
//! error is what gets surfaced when a re-fetch is suppressed.

use std::path::PathBuf;

use async_trait::async_trait;

use quarry_core::artifact::Artifact;
use quarry_core::error::ResolveError;
use quarry_core::repository::{RemoteRepository, UpdatePolicy};
use quarry_core::session::Session;

/// A stored decision about whether a cached artifact or cached failure
/// should be re-fetched.
#[derive(Debug, Clone)]
pub struct UpdateCheck {
    /// The artifact the check is about.
    pub artifact: Artifact,
    /// The cache file the check is keyed on.
    pub file: PathBuf,
    /// Whether the file's presence alone satisfies the check.
    pub file_valid: bool,
    /// The repository a re-fetch would go to.
    pub repository: RemoteRepository,
    /// The update cadence in effect.
    pub policy: UpdatePolicy,
    /// Whether a re-fetch is due; managers fill this in during
    /// [`UpdateCheckManager::check_artifact`].
    pub required: bool,
    /// The outcome of the last attempt: the prior failure when the check
    /// suppresses a re-fetch, or the fresh outcome when touched.
    pub error: Option<ResolveError>,
}

impl UpdateCheck {
    /// Creates a check for the given artifact and cache file.
    #[must_use]
    pub fn new(
        artifact: Artifact,
        file: impl Into<PathBuf>,
        repository: RemoteRepository,
        policy: UpdatePolicy,
    ) -> Self {
        Self {
            artifact,
            file: file.into(),
            file_valid: false,
            repository,
            policy,
            required: true,
            error: None,
        }
    }
}

/// Timestamp-based "is a re-fetch due" policy.
#[async_trait]
pub trait UpdateCheckManager: Send + Sync {
    /// Fills in the check's `required` flag and, when the answer is "not
    /// required" because of a cached failure, its prior error.
    async fn check_artifact(&self, session: &Session, check: &mut UpdateCheck);

    /// Persists the check's outcome so later resolutions see it.
    async fn touch_artifact(&self, session: &Session, check: &UpdateCheck);
}

/// Update-check manager that always requires a re-fetch and stores
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUpdateCheckManager;

#[async_trait]
impl UpdateCheckManager for NoopUpdateCheckManager {
    async fn check_artifact(&self, _session: &Session, check: &mut UpdateCheck) {
        check.required = true;
    }

    async fn touch_artifact(&self, _session: &Session, _check: &UpdateCheck) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_manager_always_requires() {
        let session = Session::new();
        let mut check = UpdateCheck::new(
            Artifact::new("org.example", "widget", "jar", "1.0"),
            "/tmp/widget.jar",
            RemoteRepository::new("central", "https://repo.example.org"),
            UpdatePolicy::Daily,
        );
        check.required = false;

        NoopUpdateCheckManager
            .check_artifact(&session, &mut check)
            .await;
        assert!(check.required);
    }
}
