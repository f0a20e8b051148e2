//! Local repository manager SPI.
//!
//! The local repository manager owns the on-disk cache: its byte layout,
//! its path mapping, and the tracking metadata that records which remote
//! repository each cached artifact was installed from. The resolver never
//! writes into the cache except through paths this manager hands out.

use std::path::PathBuf;

use async_trait::async_trait;

use quarry_core::artifact::Artifact;
use quarry_core::repository::{LocalRepository, RemoteRepository};
use quarry_core::resolution::LocalArtifactResult;
use quarry_core::session::Session;

/// A cache lookup for one artifact.
#[derive(Debug, Clone)]
pub struct LocalArtifactRequest {
    /// The artifact to look up.
    pub artifact: Artifact,
    /// The remote repositories the caller would accept the artifact from.
    pub repositories: Vec<RemoteRepository>,
    /// Tag describing the context this request originates from.
    pub request_context: String,
}

impl LocalArtifactRequest {
    /// Creates a cache lookup request.
    #[must_use]
    pub fn new(
        artifact: Artifact,
        repositories: Vec<RemoteRepository>,
        request_context: impl Into<String>,
    ) -> Self {
        Self {
            artifact,
            repositories,
            request_context: request_context.into(),
        }
    }
}

/// Tells the cache that an artifact now exists locally.
#[derive(Debug, Clone)]
pub struct LocalArtifactRegistration {
    /// The artifact that was installed or downloaded.
    pub artifact: Artifact,
    /// The remote repository the artifact came from; `None` for artifacts
    /// installed from the workspace or a sibling build.
    pub repository: Option<RemoteRepository>,
    /// The request contexts the registration is valid for.
    pub contexts: Vec<String>,
}

impl LocalArtifactRegistration {
    /// Registers a locally installed artifact with no remote origin.
    #[must_use]
    pub fn installed(artifact: Artifact) -> Self {
        Self {
            artifact,
            repository: None,
            contexts: Vec::new(),
        }
    }

    /// Registers an artifact downloaded from a remote repository.
    #[must_use]
    pub fn downloaded(
        artifact: Artifact,
        repository: RemoteRepository,
        contexts: Vec<String>,
    ) -> Self {
        Self {
            artifact,
            repository: Some(repository),
            contexts,
        }
    }
}

/// Owns the on-disk cache layout and tracking metadata.
#[async_trait]
pub trait LocalRepositoryManager: Send + Sync {
    /// Returns the local repository this manager administers.
    fn repository(&self) -> &LocalRepository;

    /// Looks an artifact up in the cache.
    ///
    /// The returned availability flag is true iff the tracking metadata
    /// records the artifact as installed for one of the requested
    /// repositories; a file may be present without being available.
    async fn find(&self, session: &Session, request: LocalArtifactRequest) -> LocalArtifactResult;

    /// Records that an artifact now exists in the cache.
    async fn add(&self, session: &Session, registration: LocalArtifactRegistration);

    /// Returns the cache-relative path a remote artifact downloads to.
    fn path_for_remote_artifact(
        &self,
        artifact: &Artifact,
        repository: &RemoteRepository,
        request_context: &str,
    ) -> PathBuf;
}
