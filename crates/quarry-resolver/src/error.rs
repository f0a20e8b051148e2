//! Resolver-level errors.
//!
//! Distinguishes the expected failure mode — some artifacts stayed
//! unresolved, with every per-request outcome carried along — from
//! infrastructure faults that abort a resolve call outright.

use quarry_core::error::ResolutionFailure;
use quarry_core::resolution::ArtifactResult;

use crate::spi::post_process::PostProcessError;
use crate::sync::SyncError;

/// Why a resolve call failed.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// At least one request ended without a resolved file. Carries the
    /// complete result list, successes included.
    #[error(transparent)]
    Unresolved(#[from] ResolutionFailure),

    /// The sync context could not be acquired.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A post-processor failed.
    #[error("post-processor {name} failed: {source}")]
    PostProcess {
        /// The registry name of the failing post-processor.
        name: String,
        /// The post-processor's error.
        #[source]
        source: PostProcessError,
    },
}

impl ResolverError {
    /// Returns the per-request outcomes, when this is an unresolved-batch
    /// failure.
    #[must_use]
    pub fn results(&self) -> Option<&[ArtifactResult]> {
        match self {
            Self::Unresolved(failure) => Some(failure.results()),
            _ => None,
        }
    }
}
