//! Lifecycle event construction and dispatch.
//!
//! One emitter per resolve call wraps the configured dispatcher. Per
//! artifact, the order is `Resolving` → (`Downloading` → `Downloaded`)* →
//! `Resolved`, and the `Resolved` event always carries the result's final
//! error list.

use std::sync::Arc;

use quarry_core::artifact::Artifact;
use quarry_core::error::ResolveError;
use quarry_core::event::{EventDispatcher, EventKind, RepositoryEvent};
use quarry_core::repository::{ArtifactRepository, RemoteRepository};
use quarry_core::resolution::RequestTrace;

pub(crate) struct EventEmitter<'a> {
    dispatcher: &'a dyn EventDispatcher,
}

impl<'a> EventEmitter<'a> {
    pub(crate) fn new(dispatcher: &'a dyn EventDispatcher) -> Self {
        Self { dispatcher }
    }

    pub(crate) fn resolving(&self, artifact: &Artifact, trace: &Arc<RequestTrace>) {
        self.dispatcher.dispatch(
            RepositoryEvent::new(EventKind::Resolving, artifact.clone())
                .with_trace(Arc::clone(trace)),
        );
    }

    /// Builds (without dispatching) the terminal event for a result, so
    /// planning passes can defer emission until the pass is known final.
    pub(crate) fn resolved_event(
        &self,
        artifact: &Artifact,
        repository: Option<&ArtifactRepository>,
        errors: &[ResolveError],
        trace: &Arc<RequestTrace>,
    ) -> RepositoryEvent {
        let mut event = RepositoryEvent::new(EventKind::Resolved, artifact.clone())
            .with_errors(errors.to_vec())
            .with_trace(Arc::clone(trace));
        if let Some(repository) = repository {
            event = event.with_repository(repository.clone());
        }
        if let Some(file) = artifact.file() {
            event = event.with_file(file);
        }
        event
    }

    pub(crate) fn resolved(
        &self,
        artifact: &Artifact,
        repository: Option<&ArtifactRepository>,
        errors: &[ResolveError],
        trace: &Arc<RequestTrace>,
    ) {
        self.dispatch(self.resolved_event(artifact, repository, errors, trace));
    }

    pub(crate) fn downloading(
        &self,
        artifact: &Artifact,
        repository: &RemoteRepository,
        trace: &Arc<RequestTrace>,
    ) {
        self.dispatcher.dispatch(
            RepositoryEvent::new(EventKind::Downloading, artifact.clone())
                .with_repository(ArtifactRepository::Remote(repository.clone()))
                .with_trace(Arc::clone(trace)),
        );
    }

    pub(crate) fn downloaded(
        &self,
        artifact: &Artifact,
        repository: &RemoteRepository,
        error: Option<&ResolveError>,
        trace: &Arc<RequestTrace>,
    ) {
        let mut event = RepositoryEvent::new(EventKind::Downloaded, artifact.clone())
            .with_repository(ArtifactRepository::Remote(repository.clone()))
            .with_trace(Arc::clone(trace));
        if let Some(error) = error {
            event = event.with_errors(vec![error.clone()]);
        }
        if let Some(file) = artifact.file() {
            event = event.with_file(file);
        }
        self.dispatch(event);
    }

    pub(crate) fn dispatch(&self, event: RepositoryEvent) {
        self.dispatcher.dispatch(event);
    }
}
