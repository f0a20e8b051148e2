//! Filter and offline gates.
//!
//! Both gates are pure decisions whose only side effect is error
//! accumulation on the caller's result: the filter gate prunes candidate
//! repositories and records why, and the offline gate turns a forbidden
//! remote access into the not-found error the result surfaces.

use std::sync::Arc;

use quarry_core::artifact::Artifact;
use quarry_core::error::ResolveError;
use quarry_core::repository::RemoteRepository;
use quarry_core::resolution::ArtifactResult;
use quarry_core::session::Session;

use crate::spi::filter::{FilterDecision, RemoteRepositoryFilter};
use crate::spi::offline::{OfflineController, OfflineDecision};

/// Applies the session's remote-repository filter, when one is active.
pub(crate) struct FilterGate {
    filter: Option<Arc<dyn RemoteRepositoryFilter>>,
}

impl FilterGate {
    pub(crate) fn new(filter: Option<Arc<dyn RemoteRepositoryFilter>>) -> Self {
        Self { filter }
    }

    /// Whether a filter is configured. This changes the locally-installed
    /// decision downstream, not just the candidate list.
    pub(crate) fn is_active(&self) -> bool {
        self.filter.is_some()
    }

    /// Returns the candidates the filter accepts, recording a
    /// [`ResolveError::FilteredOut`] on the result for each rejection.
    pub(crate) fn apply(
        &self,
        artifact: &Artifact,
        repositories: &[RemoteRepository],
        result: &mut ArtifactResult,
    ) -> Vec<RemoteRepository> {
        let Some(filter) = &self.filter else {
            return repositories.to_vec();
        };

        let mut accepted = Vec::with_capacity(repositories.len());
        for repository in repositories {
            match filter.accept_artifact(repository, artifact) {
                FilterDecision::Accepted => accepted.push(repository.clone()),
                FilterDecision::Rejected(reason) => {
                    result.add_error(ResolveError::FilteredOut {
                        artifact: artifact.clone(),
                        repository: repository.clone(),
                        reason,
                    });
                }
            }
        }
        accepted
    }
}

/// Applies the offline controller to one candidate repository.
pub(crate) struct OfflineGate<'a> {
    controller: &'a dyn OfflineController,
}

impl<'a> OfflineGate<'a> {
    pub(crate) fn new(controller: &'a dyn OfflineController) -> Self {
        Self { controller }
    }

    /// Checks whether the repository may be accessed.
    ///
    /// On refusal, returns the not-found error to accumulate: it cites the
    /// repository id and url so offline failures are diagnosable from the
    /// message alone.
    pub(crate) fn check(
        &self,
        session: &Session,
        artifact: &Artifact,
        repository: &RemoteRepository,
    ) -> Result<(), ResolveError> {
        match self.controller.check_offline(session, repository) {
            OfflineDecision::Allowed => Ok(()),
            OfflineDecision::Offline => Err(ResolveError::NotFound {
                artifact: artifact.clone(),
                repository: Some(repository.clone()),
                reason: Some(format!(
                    "cannot access {} ({}) in offline mode and the artifact has not been downloaded from it before",
                    repository.id(),
                    repository.url()
                )),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::resolution::ArtifactRequest;

    use crate::spi::offline::SessionOfflineController;

    struct RejectById(&'static str);

    impl RemoteRepositoryFilter for RejectById {
        fn accept_artifact(
            &self,
            repository: &RemoteRepository,
            _artifact: &Artifact,
        ) -> FilterDecision {
            if repository.id() == self.0 {
                FilterDecision::Rejected("policy".to_string())
            } else {
                FilterDecision::Accepted
            }
        }
    }

    fn artifact() -> Artifact {
        Artifact::new("org.example", "widget", "jar", "1.0")
    }

    #[test]
    fn inactive_gate_passes_everything_through() {
        let gate = FilterGate::new(None);
        let mut result = ArtifactResult::new(ArtifactRequest::new(artifact()));
        let repositories = vec![RemoteRepository::new("a", "https://a.example.org")];

        let accepted = gate.apply(&artifact(), &repositories, &mut result);
        assert!(!gate.is_active());
        assert_eq!(accepted.len(), 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn rejections_prune_and_accumulate() {
        let gate = FilterGate::new(Some(Arc::new(RejectById("a"))));
        let mut result = ArtifactResult::new(ArtifactRequest::new(artifact()));
        let repositories = vec![
            RemoteRepository::new("a", "https://a.example.org"),
            RemoteRepository::new("b", "https://b.example.org"),
        ];

        let accepted = gate.apply(&artifact(), &repositories, &mut result);
        assert!(gate.is_active());
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id(), "b");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].to_string().contains("policy"));
    }

    #[test]
    fn offline_error_cites_id_and_url() {
        let controller = SessionOfflineController;
        let gate = OfflineGate::new(&controller);
        let session = Session::new().with_offline(true);
        let repository = RemoteRepository::new("central", "https://repo.example.org");

        let error = gate
            .check(&session, &artifact(), &repository)
            .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("central"));
        assert!(message.contains("https://repo.example.org"));
        assert!(message.contains("offline"));
    }

    #[test]
    fn online_session_passes() {
        let controller = SessionOfflineController;
        let gate = OfflineGate::new(&controller);
        let repository = RemoteRepository::new("central", "https://repo.example.org");
        assert!(gate.check(&Session::new(), &artifact(), &repository).is_ok());
    }
}
