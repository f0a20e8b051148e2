//! Repository connector SPI.
//!
//! A connector is the wire-level downloader for one remote repository.
//! The resolver batches every pending download for a compatible repository
//! group into a single `get` call; transport parallelism inside that call
//! is the connector's business. Connectors report outcomes by mutating the
//! error slot of each [`ArtifactDownload`] rather than by failing the
//! batch. A connector is scoped to the call that acquired it and releases
//! its resources on drop.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use quarry_core::artifact::Artifact;
use quarry_core::error::ResolveError;
use quarry_core::repository::{ChecksumPolicy, RemoteRepository};
use quarry_core::resolution::RequestTrace;
use quarry_core::session::Session;
use quarry_core::transfer::TransferListener;

/// One artifact transfer for a connector to perform.
pub struct ArtifactDownload {
    /// The artifact to download.
    pub artifact: Artifact,
    /// The destination file.
    pub file: PathBuf,
    /// When true, the destination already holds a cached copy and the
    /// transport may short-circuit if the server reports it unchanged.
    pub existence_check: bool,
    /// Tag describing the context this download originates from.
    pub request_context: String,
    /// Optional observability trace.
    pub trace: Option<Arc<RequestTrace>>,
    /// Checksum mismatch handling for this transfer.
    pub checksum_policy: ChecksumPolicy,
    /// The repositories eligible to serve the download (the mirrored
    /// repositories of the group's repository, when it is a mirror).
    pub repositories: Vec<RemoteRepository>,
    /// Transfer progress observer.
    pub listener: Option<Arc<dyn TransferListener>>,
    /// Request contexts the downloaded artifact may be registered for;
    /// filled in by the connector.
    pub supported_contexts: Vec<String>,
    /// The transfer outcome; `None` means success.
    pub error: Option<ResolveError>,
}

impl ArtifactDownload {
    /// Creates a download descriptor targeting the given file.
    #[must_use]
    pub fn new(
        artifact: Artifact,
        file: impl Into<PathBuf>,
        request_context: impl Into<String>,
    ) -> Self {
        Self {
            artifact,
            file: file.into(),
            existence_check: false,
            request_context: request_context.into(),
            trace: None,
            checksum_policy: ChecksumPolicy::default(),
            repositories: Vec::new(),
            listener: None,
            supported_contexts: Vec::new(),
            error: None,
        }
    }
}

impl fmt::Debug for ArtifactDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactDownload")
            .field("artifact", &self.artifact)
            .field("file", &self.file)
            .field("existence_check", &self.existence_check)
            .field("request_context", &self.request_context)
            .field("checksum_policy", &self.checksum_policy)
            .field("repositories", &self.repositories)
            .field("listener", &self.listener.is_some())
            .field("supported_contexts", &self.supported_contexts)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Raised by a provider that cannot produce a connector for a repository.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no connector available for {} ({})", .repository.id(), .repository.url())]
pub struct NoConnector {
    /// The repository no connector could be built for.
    pub repository: RemoteRepository,
}

/// Wire-level downloader for one remote repository.
#[async_trait]
pub trait RepositoryConnector: Send + Sync {
    /// Performs the given downloads as one batch.
    ///
    /// Outcomes are reported per download via its error slot; the batch
    /// call itself does not fail.
    async fn get(&self, downloads: &mut [ArtifactDownload]);
}

/// Produces wire-level downloaders.
#[async_trait]
pub trait RepositoryConnectorProvider: Send + Sync {
    /// Builds a connector for the given repository.
    ///
    /// # Errors
    ///
    /// Returns [`NoConnector`] when no transport supports the repository;
    /// the resolver then fails every download of the group with a
    /// transfer error.
    async fn new_connector(
        &self,
        session: &Session,
        repository: &RemoteRepository,
    ) -> Result<Box<dyn RepositoryConnector>, NoConnector>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_defaults() {
        let artifact = Artifact::new("org.example", "widget", "jar", "1.0");
        let download = ArtifactDownload::new(artifact, "/tmp/widget.jar", "project");
        assert!(!download.existence_check);
        assert!(download.error.is_none());
        assert!(download.repositories.is_empty());
    }

    #[test]
    fn no_connector_message_cites_repository() {
        let error = NoConnector {
            repository: RemoteRepository::new("central", "https://repo.example.org"),
        };
        let message = error.to_string();
        assert!(message.contains("central"));
        assert!(message.contains("https://repo.example.org"));
    }
}
