//! Resolution error kinds.
//!
//! Per-artifact errors ([`ResolveError`]) accumulate on the owning result
//! and never abort a batch; they are `Clone` because one outcome can be
//! attached to a result, recorded on an update check, and carried on the
//! final `Resolved` event. The batch-level [`ResolutionFailure`] is raised
//! once at the end of a resolve call and carries every per-request outcome
//! so callers can see partial successes.

use std::fmt::Write as _;

use crate::artifact::Artifact;
use crate::repository::RemoteRepository;
use crate::resolution::ArtifactResult;

/// A per-artifact resolution error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// No tier produced the artifact, offline mode prevented access, or a
    /// pre-hosted file was missing.
    #[error("artifact {artifact} was not found{}{}", fmt_repository(.repository), fmt_reason(.reason))]
    NotFound {
        /// The artifact that could not be produced.
        artifact: Artifact,
        /// The repository that was consulted, if any single one was.
        repository: Option<RemoteRepository>,
        /// Extra context, e.g. the offline explanation.
        reason: Option<String>,
    },

    /// A remote-repository filter rejected the repository for this artifact.
    #[error("artifact {artifact} was filtered out of {} ({}): {reason}", .repository.id(), .repository.url())]
    FilteredOut {
        /// The artifact the filter was consulted for.
        artifact: Artifact,
        /// The rejected repository.
        repository: RemoteRepository,
        /// The filter's reasoning.
        reason: String,
    },

    /// A connector failure, an I/O failure while materializing a file, or a
    /// missing connector.
    #[error("transfer of {artifact}{} failed: {message}", fmt_repository(.repository))]
    Transfer {
        /// The artifact being transferred.
        artifact: Artifact,
        /// The repository involved, when the failure is repository-specific.
        repository: Option<RemoteRepository>,
        /// Description of the failure.
        message: String,
    },

    /// The external version resolver failed.
    #[error("version resolution of {artifact} failed: {message}")]
    Version {
        /// The artifact whose version could not be resolved.
        artifact: Artifact,
        /// Description of the failure.
        message: String,
    },
}

impl ResolveError {
    /// Creates a bare not-found error with no repository attribution.
    #[must_use]
    pub const fn not_found(artifact: Artifact) -> Self {
        Self::NotFound {
            artifact,
            repository: None,
            reason: None,
        }
    }

    /// Returns whether this is a not-found outcome.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns whether this is a transfer failure.
    #[must_use]
    pub const fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer { .. })
    }
}

fn fmt_repository(repository: &Option<RemoteRepository>) -> String {
    repository.as_ref().map_or_else(String::new, |repository| {
        format!(" in {} ({})", repository.id(), repository.url())
    })
}

fn fmt_reason(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map_or_else(String::new, |reason| format!(": {reason}"))
}

/// Raised when a resolve call ends with at least one unresolved result.
///
/// Carries the complete, order-preserving result list; successfully
/// resolved requests keep their files even though the batch failed.
#[derive(Debug, thiserror::Error)]
#[error("{}", describe(.results))]
pub struct ResolutionFailure {
    results: Vec<ArtifactResult>,
}

impl ResolutionFailure {
    /// Wraps the full result list of a failed resolve call.
    #[must_use]
    pub fn new(results: Vec<ArtifactResult>) -> Self {
        Self { results }
    }

    /// Returns every per-request outcome, in request order.
    #[must_use]
    pub fn results(&self) -> &[ArtifactResult] {
        &self.results
    }

    /// Consumes the failure and returns the result list.
    #[must_use]
    pub fn into_results(self) -> Vec<ArtifactResult> {
        self.results
    }
}

fn describe(results: &[ArtifactResult]) -> String {
    let mut message = String::from("the following artifacts could not be resolved:");
    let mut first = true;
    for result in results.iter().filter(|result| !result.is_resolved()) {
        if !first {
            message.push(',');
        }
        let _ = write!(message, " {}", result.request.artifact);
        first = false;
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::ArtifactRequest;

    fn artifact() -> Artifact {
        Artifact::new("org.example", "widget", "jar", "1.0")
    }

    #[test]
    fn not_found_message_cites_repository_and_reason() {
        let repository = RemoteRepository::new("central", "https://repo.example.org");
        let error = ResolveError::NotFound {
            artifact: artifact(),
            repository: Some(repository),
            reason: Some("offline mode".to_string()),
        };
        let message = error.to_string();
        assert!(message.contains("central"));
        assert!(message.contains("https://repo.example.org"));
        assert!(message.contains("offline mode"));
    }

    #[test]
    fn bare_not_found_message() {
        let error = ResolveError::not_found(artifact());
        assert_eq!(
            error.to_string(),
            "artifact org.example:widget:jar:1.0 was not found"
        );
    }

    #[test]
    fn filtered_out_message_carries_reasoning() {
        let error = ResolveError::FilteredOut {
            artifact: artifact(),
            repository: RemoteRepository::new("central", "https://repo.example.org"),
            reason: "policy".to_string(),
        };
        assert!(error.to_string().contains("policy"));
    }

    #[test]
    fn failure_lists_unresolved_artifacts() {
        let result = ArtifactResult::new(ArtifactRequest::new(artifact()));
        let failure = ResolutionFailure::new(vec![result]);
        assert!(failure.to_string().contains("org.example:widget:jar:1.0"));
        assert_eq!(failure.results().len(), 1);
    }
}
