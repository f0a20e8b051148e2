//! Resolution lifecycle events.
//!
//! The resolver emits one [`RepositoryEvent`] per lifecycle transition:
//! `Resolving` when work on an artifact begins, `Downloading`/`Downloaded`
//! around remote transfers, and `Resolved` exactly once per result with the
//! final error set. Event ids are ULIDs so a recorded stream sorts
//! chronologically by id alone.
//!
//! Dispatch is a side effect only. The [`EventDispatcher`] signature is
//! synchronous and infallible by construction, so observability can never
//! change a resolution outcome.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ulid::Ulid;

use crate::artifact::Artifact;
use crate::error::ResolveError;
use crate::repository::ArtifactRepository;
use crate::resolution::RequestTrace;

/// The lifecycle transition an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Resolution of an artifact has begun.
    Resolving,
    /// A remote transfer for an artifact has started.
    Downloading,
    /// A remote transfer has finished, successfully or not.
    Downloaded,
    /// Resolution of an artifact has finished, successfully or not.
    Resolved,
}

impl EventKind {
    /// Returns the canonical lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
            Self::Resolved => "resolved",
        }
    }
}

/// One resolution lifecycle transition.
#[derive(Debug, Clone)]
pub struct RepositoryEvent {
    /// Unique, chronologically sortable event id.
    pub id: Ulid,
    /// The transition this event describes.
    pub kind: EventKind,
    /// The artifact the transition applies to.
    pub artifact: Artifact,
    /// The repository involved, when one is attributable.
    pub repository: Option<ArtifactRepository>,
    /// The file involved, when one exists.
    pub file: Option<PathBuf>,
    /// The errors accumulated so far; final and complete on `Resolved`.
    pub errors: Vec<ResolveError>,
    /// The request trace, when the caller supplied one.
    pub trace: Option<Arc<RequestTrace>>,
    /// When the event was created.
    pub time: DateTime<Utc>,
}

impl RepositoryEvent {
    /// Creates an event for the given transition and artifact.
    #[must_use]
    pub fn new(kind: EventKind, artifact: Artifact) -> Self {
        Self {
            id: Ulid::new(),
            kind,
            artifact,
            repository: None,
            file: None,
            errors: Vec::new(),
            trace: None,
            time: Utc::now(),
        }
    }

    /// Attributes the event to a repository.
    #[must_use]
    pub fn with_repository(mut self, repository: ArtifactRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Attaches the file involved in the transition.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attaches the errors accumulated so far.
    #[must_use]
    pub fn with_errors(mut self, errors: Vec<ResolveError>) -> Self {
        self.errors = errors;
        self
    }

    /// Attaches the request trace.
    #[must_use]
    pub fn with_trace(mut self, trace: Arc<RequestTrace>) -> Self {
        self.trace = Some(trace);
        self
    }
}

/// Sink for resolution lifecycle events.
///
/// Implementations must be best-effort: the signature leaves no room for
/// failure, and implementations should swallow their own internal errors
/// rather than panic.
pub trait EventDispatcher: Send + Sync {
    /// Delivers one event.
    fn dispatch(&self, event: RepositoryEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventDispatcher;

impl EventDispatcher for NoopEventDispatcher {
    fn dispatch(&self, _event: RepositoryEvent) {}
}
