//! Transfer progress notifications.
//!
//! A [`TransferListener`] observes the downloads a connector performs on the
//! resolver's behalf. Listeners are attached to the session and handed to
//! connectors on each download descriptor; every callback has an empty
//! default body, so implementations override only what they care about.
//! Listener calls are observability only and must not influence transfer
//! outcomes.

use crate::artifact::Artifact;
use crate::error::ResolveError;
use crate::repository::RemoteRepository;

/// Observer for connector transfers.
pub trait TransferListener: Send + Sync {
    /// A transfer has started.
    fn transfer_started(&self, _artifact: &Artifact, _repository: &RemoteRepository) {}

    /// A transfer completed and the destination file is in place.
    fn transfer_succeeded(&self, _artifact: &Artifact, _repository: &RemoteRepository) {}

    /// A transfer failed.
    fn transfer_failed(
        &self,
        _artifact: &Artifact,
        _repository: &RemoteRepository,
        _error: &ResolveError,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl TransferListener for Silent {}

    #[test]
    fn default_callbacks_are_noops() {
        let listener = Silent;
        let artifact = Artifact::new("org.example", "widget", "jar", "1.0");
        let repository = RemoteRepository::new("central", "https://repo.example.org");
        listener.transfer_started(&artifact, &repository);
        listener.transfer_succeeded(&artifact, &repository);
    }
}
