//! Factory functions for test artifacts, repositories, and cache layouts.

use std::sync::Arc;

use tempfile::TempDir;

use quarry_core::artifact::Artifact;
use quarry_core::repository::RemoteRepository;

use crate::collaborators::MemoryLocalRepositoryManager;

/// Creates a release artifact in the `org.example` group.
pub fn artifact(artifact_id: &str, version: &str) -> Artifact {
    Artifact::new("org.example", artifact_id, "jar", version)
}

/// Creates a `-SNAPSHOT` artifact in the `org.example` group.
pub fn snapshot_artifact(artifact_id: &str, base: &str) -> Artifact {
    Artifact::new("org.example", artifact_id, "jar", format!("{base}-SNAPSHOT"))
}

/// Creates a remote repository with default policies.
pub fn remote_repo(id: &str, url: &str) -> RemoteRepository {
    RemoteRepository::new(id, url)
}

/// Creates a local repository manager rooted in a fresh temp directory.
///
/// Keep the returned guard alive for the duration of the test; dropping
/// it deletes the cache directory.
pub fn temp_lrm() -> (TempDir, Arc<MemoryLocalRepositoryManager>) {
    let dir = TempDir::new().expect("create temp local repository");
    let lrm = Arc::new(MemoryLocalRepositoryManager::new(dir.path()));
    (dir, lrm)
}
