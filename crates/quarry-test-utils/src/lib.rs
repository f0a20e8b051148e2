//! Shared test utilities for quarry integration tests.
//!
//! This crate provides:
//! - In-memory implementations of every resolver collaborator:
//!   [`StubVersionResolver`], [`MemoryLocalRepositoryManager`],
//!   [`StaticWorkspaceReader`], [`ScriptedConnectorProvider`],
//!   [`MemoryUpdateCheckManager`], [`StaticFilterManager`]
//! - [`RecordingEventDispatcher`] for event-order assertions
//! - [`OperationJournal`] for cross-collaborator ordering assertions
//! - Factory functions for artifacts and repositories
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry_test_utils::{artifact, remote_repo, temp_lrm};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let (_guard, lrm) = temp_lrm();
//!     let widget = artifact("widget", "1.0");
//!     // ... run test ...
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
// Test utilities use expect/unwrap for cleaner test code - panics are acceptable in tests
#![allow(clippy::missing_panics_doc)]

pub mod collaborators;
pub mod fixtures;

pub use collaborators::*;
pub use fixtures::*;

/// Initialize test logging (call once per test module).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("quarry=debug".parse().expect("valid directive")),
        )
        .with_test_writer()
        .try_init();
}
