//! Resolution requests, results, and request traces.
//!
//! One [`ArtifactRequest`] produces exactly one [`ArtifactResult`] at the
//! same position in the batch. Results accumulate errors instead of
//! aborting: a result is successful iff its artifact carries a file, and
//! a result can be successful while still carrying the errors of earlier
//! attempts (a failed first repository, say).

use std::path::PathBuf;
use std::sync::Arc;

use crate::artifact::Artifact;
use crate::error::ResolveError;
use crate::repository::{ArtifactRepository, RemoteRepository};

/// A breadcrumb chain describing why a request was issued.
///
/// Traces are observability-only: they flow through events and downloads
/// so listeners can attribute nested work to the operation that caused it.
#[derive(Debug, Clone)]
pub struct RequestTrace {
    data: String,
    parent: Option<Arc<RequestTrace>>,
}

impl RequestTrace {
    /// Creates a root trace.
    #[must_use]
    pub fn root(data: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            data: data.into(),
            parent: None,
        })
    }

    /// Creates a child trace pointing back at `self`.
    #[must_use]
    pub fn child(self: &Arc<Self>, data: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            data: data.into(),
            parent: Some(Arc::clone(self)),
        })
    }

    /// Returns the trace label.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Returns the parent trace, if this is not a root.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<RequestTrace>> {
        self.parent.as_ref()
    }
}

/// A single artifact to resolve, with its candidate remote repositories.
#[derive(Debug, Clone)]
pub struct ArtifactRequest {
    /// The artifact to resolve.
    pub artifact: Artifact,
    /// Candidate remote repositories, in caller preference order.
    pub repositories: Vec<RemoteRepository>,
    /// Tag describing the context this request originates from.
    pub request_context: String,
    /// Optional observability trace.
    pub trace: Option<Arc<RequestTrace>>,
}

impl ArtifactRequest {
    /// Creates a request with no candidate repositories.
    #[must_use]
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            repositories: Vec::new(),
            request_context: String::new(),
            trace: None,
        }
    }

    /// Adds a candidate repository at the end of the preference order.
    #[must_use]
    pub fn with_repository(mut self, repository: RemoteRepository) -> Self {
        self.repositories.push(repository);
        self
    }

    /// Replaces the candidate repository list.
    #[must_use]
    pub fn with_repositories(mut self, repositories: Vec<RemoteRepository>) -> Self {
        self.repositories = repositories;
        self
    }

    /// Sets the request context tag.
    #[must_use]
    pub fn with_request_context(mut self, request_context: impl Into<String>) -> Self {
        self.request_context = request_context.into();
        self
    }

    /// Attaches an observability trace.
    #[must_use]
    pub fn with_trace(mut self, trace: Arc<RequestTrace>) -> Self {
        self.trace = Some(trace);
        self
    }
}

/// What the local repository manager knows about an artifact.
#[derive(Debug, Clone, Default)]
pub struct LocalArtifactResult {
    /// The cached file, if one exists on disk. Presence of a file does not
    /// imply availability: the file may have been cached from a repository
    /// that is not usable in the current context.
    pub file: Option<PathBuf>,
    /// Whether the cache's tracking metadata records the artifact as
    /// installed for one of the requested repositories.
    pub available: bool,
    /// The remote repository the cache attributes the file to, if known.
    pub repository: Option<RemoteRepository>,
}

impl LocalArtifactResult {
    /// Creates a miss: no file, not available.
    #[must_use]
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// The outcome of resolving one [`ArtifactRequest`].
#[derive(Debug, Clone)]
pub struct ArtifactResult {
    /// The originating request.
    pub request: ArtifactRequest,
    /// The resolved artifact; `None` or file-less on failure.
    pub artifact: Option<Artifact>,
    /// The repository the artifact was sourced from.
    pub repository: Option<ArtifactRepository>,
    /// Errors accumulated while resolving, oldest first.
    pub errors: Vec<ResolveError>,
    /// The local-cache lookup snapshot, when one was performed.
    pub local: Option<LocalArtifactResult>,
}

impl ArtifactResult {
    /// Creates an empty result for the given request.
    #[must_use]
    pub fn new(request: ArtifactRequest) -> Self {
        Self {
            request,
            artifact: None,
            repository: None,
            errors: Vec::new(),
            local: None,
        }
    }

    /// Records an error without aborting the request.
    pub fn add_error(&mut self, error: ResolveError) {
        self.errors.push(error);
    }

    /// Returns whether the result carries a resolved file.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.artifact
            .as_ref()
            .is_some_and(|artifact| artifact.file().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> Artifact {
        Artifact::new("org.example", "widget", "jar", "1.0")
    }

    #[test]
    fn trace_chain() {
        let root = RequestTrace::root("build");
        let child = root.child("resolve widget");
        assert_eq!(child.data(), "resolve widget");
        assert_eq!(child.parent().unwrap().data(), "build");
        assert!(root.parent().is_none());
    }

    #[test]
    fn request_builders_preserve_order() {
        let request = ArtifactRequest::new(artifact())
            .with_repository(RemoteRepository::new("a", "https://a.example.org"))
            .with_repository(RemoteRepository::new("b", "https://b.example.org"))
            .with_request_context("project");
        assert_eq!(request.repositories[0].id(), "a");
        assert_eq!(request.repositories[1].id(), "b");
        assert_eq!(request.request_context, "project");
    }

    #[test]
    fn result_resolved_requires_file() {
        let mut result = ArtifactResult::new(ArtifactRequest::new(artifact()));
        assert!(!result.is_resolved());

        result.artifact = Some(artifact());
        assert!(!result.is_resolved());

        result.artifact = Some(artifact().with_file("/tmp/widget.jar"));
        assert!(result.is_resolved());
    }

    #[test]
    fn errors_accumulate() {
        let mut result = ArtifactResult::new(ArtifactRequest::new(artifact()));
        result.add_error(ResolveError::not_found(artifact()));
        result.add_error(ResolveError::Transfer {
            artifact: artifact(),
            repository: None,
            message: "boom".to_string(),
        });
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].is_not_found());
        assert!(result.errors[1].is_transfer());
    }
}
