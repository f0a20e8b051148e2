//! Workspace reader SPI.
//!
//! The workspace is the in-process artifact tier: modules built by a
//! sibling build are served straight from memory-known paths, bypassing
//! both the cache and the network. Lookups are synchronous because no I/O
//! beyond a path handoff is involved.

use std::path::PathBuf;

use quarry_core::artifact::Artifact;
use quarry_core::repository::WorkspaceRepository;

/// In-process artifact provider.
pub trait WorkspaceReader: Send + Sync {
    /// Returns the repository results are attributed to on a hit.
    fn repository(&self) -> WorkspaceRepository;

    /// Returns the workspace file for the artifact, if the workspace
    /// provides it.
    fn find_artifact(&self, artifact: &Artifact) -> Option<PathBuf>;
}
