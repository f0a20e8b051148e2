//! # quarry-resolver
//!
//! The artifact resolution orchestrator of the quarry library.
//!
//! Given a batch of artifact requests, the resolver decides per request
//! where the artifact lives — an in-process workspace, the local on-disk
//! cache, or a remote repository — coordinates concurrent resolvers
//! through a shared/exclusive sync context, batches remote downloads by
//! compatible repository, applies update, error-cache, and snapshot
//! policies, emits lifecycle events, and aggregates results and failures.
//!
//! External collaborators (version resolution, cache layout, transports,
//! policies) are consumed through the traits in [`spi`]; the resolver
//! itself owns only orchestration.
//!
//! ## Example
//!
//! ```rust,ignore
//! use quarry_core::prelude::*;
//! use quarry_resolver::ArtifactResolver;
//!
//! let resolver = ArtifactResolver::builder(versions, lrm, connectors)
//!     .with_event_dispatcher(events)
//!     .build();
//!
//! let request = ArtifactRequest::new(artifact).with_repository(central);
//! let result = resolver.resolve_artifact(&session, request).await?;
//! assert!(result.is_resolved());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod resolver;
pub mod spi;
pub mod sync;

mod download;
mod events;
mod gate;
mod group;
mod lookup;
mod snapshot;

pub use error::ResolverError;
pub use resolver::{ArtifactResolver, ArtifactResolverBuilder};
pub use sync::{AccessMode, SyncContext, SyncContextFactory, SyncError};
