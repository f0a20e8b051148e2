//! # quarry-core
//!
//! Core contracts for the quarry artifact-resolution library.
//!
//! This crate provides the types shared by every quarry component:
//!
//! - **Artifact Model**: Coordinates, snapshot semantics, and properties
//! - **Repositories**: Remote, local-cache, and workspace tiers with policies
//! - **Session**: Per-embedding configuration, offline flag, error caching
//! - **Resolution Types**: Requests, results, and request traces
//! - **Error Types**: Per-artifact error kinds and the batch failure
//! - **Events**: Resolution lifecycle events and the dispatcher contract
//!
//! ## Crate Boundary
//!
//! `quarry-core` is the **only** crate allowed to define shared primitives.
//! The resolver and every collaborator implementation speak to each other
//! exclusively through the contracts defined here.
//!
//! ## Example
//!
//! ```rust
//! use quarry_core::prelude::*;
//!
//! let artifact = Artifact::new("org.example", "widget", "jar", "1.0-SNAPSHOT");
//! let request = ArtifactRequest::new(artifact)
//!     .with_repository(RemoteRepository::new("central", "https://repo.example.org"));
//! assert_eq!(request.repositories.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod event;
pub mod observability;
pub mod repository;
pub mod resolution;
pub mod session;
pub mod transfer;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use quarry_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::artifact::{Artifact, properties};
    pub use crate::config::{ConfigMap, keys};
    pub use crate::error::{ResolutionFailure, ResolveError};
    pub use crate::event::{EventDispatcher, EventKind, NoopEventDispatcher, RepositoryEvent};
    pub use crate::repository::{
        ArtifactRepository, ChecksumPolicy, LocalRepository, RemoteRepository, RepositoryPolicy,
        UpdatePolicy, WorkspaceRepository,
    };
    pub use crate::resolution::{
        ArtifactRequest, ArtifactResult, LocalArtifactResult, RequestTrace,
    };
    pub use crate::session::{ErrorCachePolicy, Session};
    pub use crate::transfer::TransferListener;
}

// Re-export key types at crate root for ergonomics
pub use artifact::Artifact;
pub use config::ConfigMap;
pub use error::{ResolutionFailure, ResolveError};
pub use event::{EventDispatcher, EventKind, NoopEventDispatcher, RepositoryEvent};
pub use observability::{LogFormat, init_logging};
pub use repository::{
    ArtifactRepository, ChecksumPolicy, LocalRepository, RemoteRepository, RepositoryPolicy,
    UpdatePolicy, WorkspaceRepository,
};
pub use resolution::{ArtifactRequest, ArtifactResult, LocalArtifactResult, RequestTrace};
pub use session::{ErrorCachePolicy, Session};
pub use transfer::TransferListener;
