//! Remote repository filter SPI.
//!
//! A filter decides per (repository, artifact) pair whether the repository
//! is an admissible source. Whether a filter is configured at all changes
//! the locally-installed decision: with filtering active, only tracked
//! availability counts, because the filter must stay authoritative over
//! where each artifact may have come from.

use std::sync::Arc;

use quarry_core::artifact::Artifact;
use quarry_core::repository::RemoteRepository;
use quarry_core::session::Session;

/// The outcome of consulting a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// The repository may serve the artifact.
    Accepted,
    /// The repository may not serve the artifact, with the filter's
    /// reasoning.
    Rejected(String),
}

impl FilterDecision {
    /// Returns whether the repository was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Decides which repositories may serve which artifacts.
pub trait RemoteRepositoryFilter: Send + Sync {
    /// Decides whether `repository` may serve `artifact`.
    fn accept_artifact(&self, repository: &RemoteRepository, artifact: &Artifact)
        -> FilterDecision;
}

/// Produces the session's filter, if filtering is configured.
pub trait RemoteRepositoryFilterManager: Send + Sync {
    /// Returns the active filter, or `None` when no filtering applies.
    fn filter(&self, session: &Session) -> Option<Arc<dyn RemoteRepositoryFilter>>;
}

/// Filter manager for sessions without filtering.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilterManager;

impl RemoteRepositoryFilterManager for NoFilterManager {
    fn filter(&self, _session: &Session) -> Option<Arc<dyn RemoteRepositoryFilter>> {
        None
    }
}
