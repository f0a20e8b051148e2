//! Version resolution SPI.
//!
//! Turns an artifact's declared version (possibly a range or a snapshot
//! line) into the concrete version to fetch. The resolver overwrites the
//! artifact's version with the answer before any cache or remote work.

use std::sync::Arc;

use async_trait::async_trait;

use quarry_core::artifact::Artifact;
use quarry_core::error::ResolveError;
use quarry_core::repository::{ArtifactRepository, RemoteRepository};
use quarry_core::resolution::RequestTrace;
use quarry_core::session::Session;

/// One version to resolve against a set of candidate repositories.
#[derive(Debug, Clone)]
pub struct VersionRequest {
    /// The artifact whose version is being resolved.
    pub artifact: Artifact,
    /// Candidate remote repositories, post-filtering.
    pub repositories: Vec<RemoteRepository>,
    /// Tag describing the context this request originates from.
    pub request_context: String,
    /// Optional observability trace.
    pub trace: Option<Arc<RequestTrace>>,
}

impl VersionRequest {
    /// Creates a version request.
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
            trace: None,
        }
    }

    /// Attaches an observability trace.
    #[must_use]
    pub fn with_trace(mut self, trace: Arc<RequestTrace>) -> Self {
        self.trace = Some(trace);
        self
    }
}

/// The concrete version an artifact resolves to.
#[derive(Debug, Clone)]
pub struct VersionResult {
    /// The resolved version.
    pub version: String,
    /// The repository the version came from, when the resolver can pin
    /// one. A remote pin narrows the download candidates to that single
    /// repository; any other pin forces local-only resolution.
    pub repository: Option<ArtifactRepository>,
}

impl VersionResult {
    /// Creates a result with no repository pin.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            repository: None,
        }
    }

    /// Pins the version to the repository it was read from.
    #[must_use]
    pub fn with_repository(mut self, repository: ArtifactRepository) -> Self {
        self.repository = Some(repository);
        self
    }
}

/// Resolves declared versions to concrete ones.
#[async_trait]
pub trait VersionResolver: Send + Sync {
    /// Resolves the request's version.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Version`] when the version cannot be
    /// determined; the error is accumulated on the owning result and the
    /// rest of the batch continues.
    async fn resolve_version(
        &self,
        session: &Session,
        request: VersionRequest,
    ) -> Result<VersionResult, ResolveError>;
}
