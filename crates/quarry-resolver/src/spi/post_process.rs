//! Result post-processing SPI.
//!
//! Post-processors run once per resolve call, after downloads and before
//! failure aggregation, over the full mutable result list. The resolver
//! keeps its registry ordered by name so runs are deterministic.

use async_trait::async_trait;

use quarry_core::resolution::ArtifactResult;
use quarry_core::session::Session;

/// Raised by a post-processor; aborts the resolve call.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct PostProcessError {
    /// Description of the failure.
    pub message: String,
}

impl PostProcessError {
    /// Creates a post-process error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Hook over the complete result list of a resolve call.
#[async_trait]
pub trait ResolverPostProcessor: Send + Sync {
    /// Post-processes the results, mutating them in place.
    ///
    /// # Errors
    ///
    /// A post-processor error is an infrastructure fault: it propagates
    /// out of the resolve call instead of being accumulated per result.
    async fn post_process(
        &self,
        session: &Session,
        results: &mut [ArtifactResult],
    ) -> Result<(), PostProcessError>;
}
