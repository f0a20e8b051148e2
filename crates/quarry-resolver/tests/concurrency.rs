//! Concurrent resolution against a shared local repository.

use std::sync::Arc;

use quarry_core::event::EventDispatcher;
use quarry_core::resolution::ArtifactRequest;
use quarry_core::session::Session;
use quarry_resolver::ArtifactResolver;
use quarry_resolver::spi::connector::RepositoryConnectorProvider;
use quarry_resolver::spi::local::LocalRepositoryManager;
use quarry_resolver::spi::version::VersionResolver;
use quarry_test_utils::{
    RecordingEventDispatcher, ScriptedConnectorProvider, StubVersionResolver, artifact,
    remote_repo, temp_lrm,
};

/// Two concurrent resolve calls for the same artifact must invoke the
/// connector exactly once: both plan under shared acquisitions, both
/// escalate, and whichever exclusive pass runs second finds the artifact
/// registered by the first and downloads nothing.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolutions_download_once() {
    quarry_test_utils::init_test_logging();

    let (_cache, lrm) = temp_lrm();
    let connectors = ScriptedConnectorProvider::new();
    let events = Arc::new(RecordingEventDispatcher::new());
    let widget = artifact("widget", "1.0");
    connectors.serve("central", &widget, &b"widget bytes"[..]);

    let resolver = Arc::new(
        ArtifactResolver::builder(
            Arc::new(StubVersionResolver::identity()) as Arc<dyn VersionResolver>,
            Arc::clone(&lrm) as Arc<dyn LocalRepositoryManager>,
            Arc::new(connectors.clone()) as Arc<dyn RepositoryConnectorProvider>,
        )
        .with_event_dispatcher(Arc::clone(&events) as Arc<dyn EventDispatcher>)
        .build(),
    );

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let resolver = Arc::clone(&resolver);
        let widget = widget.clone();
        tasks.push(tokio::spawn(async move {
            let session = Session::new();
            let request = ArtifactRequest::new(widget)
                .with_repository(remote_repo("central", "https://repo.example.org"));
            resolver.resolve_artifact(&session, request).await
        }));
    }

    for task in tasks {
        let result = task.await.expect("task completes").expect("resolution succeeds");
        assert!(result.is_resolved());
    }

    // Exactly one download happened across both calls.
    assert_eq!(connectors.batches(), 1);
    assert_eq!(lrm.registrations().len(), 1);
}

/// Repeated sequential resolution of an already-downloaded artifact stays
/// in shared mode and performs no remote work.
#[tokio::test]
async fn repeat_resolution_is_read_only() {
    let (_cache, lrm) = temp_lrm();
    let connectors = ScriptedConnectorProvider::new();
    let widget = artifact("widget", "1.0");
    connectors.serve("central", &widget, &b"widget bytes"[..]);

    let resolver = ArtifactResolver::builder(
        Arc::new(StubVersionResolver::identity()) as Arc<dyn VersionResolver>,
        Arc::clone(&lrm) as Arc<dyn LocalRepositoryManager>,
        Arc::new(connectors.clone()) as Arc<dyn RepositoryConnectorProvider>,
    )
    .build();

    let session = Session::new();
    for _ in 0..3 {
        let request = ArtifactRequest::new(widget.clone())
            .with_repository(remote_repo("central", "https://repo.example.org"));
        let result = resolver
            .resolve_artifact(&session, request)
            .await
            .expect("resolution succeeds");
        assert!(result.is_resolved());
    }

    assert_eq!(connectors.batches(), 1);
}
