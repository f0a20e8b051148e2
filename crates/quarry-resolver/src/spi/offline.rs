//! Offline gating SPI.
//!
//! Decides per repository whether remote access is permitted. The default
//! controller keys off the session's offline flag; embedders can allow
//! selected repositories (e.g. file-backed ones) even offline.

use quarry_core::repository::RemoteRepository;
use quarry_core::session::Session;

/// Whether a repository may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineDecision {
    /// Remote access is permitted.
    Allowed,
    /// The repository may not be accessed in the current session.
    Offline,
}

/// Gates remote repository access.
pub trait OfflineController: Send + Sync {
    /// Decides whether the repository may be accessed.
    fn check_offline(&self, session: &Session, repository: &RemoteRepository) -> OfflineDecision;
}

/// Controller that forbids all remote access while the session is
/// offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOfflineController;

impl OfflineController for SessionOfflineController {
    fn check_offline(&self, session: &Session, _repository: &RemoteRepository) -> OfflineDecision {
        if session.is_offline() {
            OfflineDecision::Offline
        } else {
            OfflineDecision::Allowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_flag_drives_decision() {
        let repository = RemoteRepository::new("central", "https://repo.example.org");
        let controller = SessionOfflineController;

        assert_eq!(
            controller.check_offline(&Session::new(), &repository),
            OfflineDecision::Allowed
        );
        assert_eq!(
            controller.check_offline(&Session::new().with_offline(true), &repository),
            OfflineDecision::Offline
        );
    }
}
