//! The locally-installed decision.
//!
//! After the cache lookup, the resolver has to decide whether what the
//! local repository holds counts as "found" or whether remote downloads
//! are still required. The rule differs with and without an active
//! remote-repository filter:
//!
//! - With a filter, only tracked availability counts. A file of unknown
//!   origin must not satisfy the request, because the filter is
//!   authoritative over which repository each artifact may come from.
//! - Without a filter, presence drives the logic: a physically cached
//!   file is accepted when the version resolver pinned a local origin, or
//!   when it pinned nothing and there are no candidate repositories left
//!   (the version-range and sibling-install cases).

use quarry_core::repository::RemoteRepository;
use quarry_core::resolution::LocalArtifactResult;

use crate::spi::version::VersionResult;

/// Decides whether the cache lookup satisfies the request.
///
/// `candidates` is the post-filter, post-version-pin repository list the
/// lookup was performed against.
pub(crate) fn is_locally_installed(
    filter_active: bool,
    local: &LocalArtifactResult,
    version: &VersionResult,
    candidates: &[RemoteRepository],
) -> bool {
    if filter_active {
        return local.available;
    }
    if local.available {
        return true;
    }
    if local.file.is_some() {
        match &version.repository {
            Some(repository) if repository.is_local() => return true,
            None if candidates.is_empty() => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use quarry_core::repository::{ArtifactRepository, LocalRepository};

    fn cached_file() -> LocalArtifactResult {
        LocalArtifactResult {
            file: Some(PathBuf::from("/repo/widget-1.0.jar")),
            available: false,
            repository: None,
        }
    }

    fn remote() -> RemoteRepository {
        RemoteRepository::new("central", "https://repo.example.org")
    }

    #[test]
    fn availability_always_counts() {
        let local = LocalArtifactResult {
            available: true,
            ..cached_file()
        };
        let version = VersionResult::new("1.0");
        assert!(is_locally_installed(true, &local, &version, &[remote()]));
        assert!(is_locally_installed(false, &local, &version, &[remote()]));
    }

    #[test]
    fn with_filter_presence_alone_is_insufficient() {
        let version = VersionResult::new("1.0");
        assert!(!is_locally_installed(true, &cached_file(), &version, &[]));
    }

    #[test]
    fn local_version_pin_accepts_cached_file() {
        let version = VersionResult::new("1.0-SNAPSHOT")
            .with_repository(ArtifactRepository::Local(LocalRepository::new("/repo")));
        assert!(is_locally_installed(false, &cached_file(), &version, &[remote()]));
    }

    #[test]
    fn unpinned_version_with_no_candidates_accepts_cached_file() {
        let version = VersionResult::new("1.0");
        assert!(is_locally_installed(false, &cached_file(), &version, &[]));
        assert!(!is_locally_installed(false, &cached_file(), &version, &[remote()]));
    }

    #[test]
    fn remote_pin_does_not_accept_cached_file() {
        let version =
            VersionResult::new("1.0").with_repository(ArtifactRepository::Remote(remote()));
        assert!(!is_locally_installed(false, &cached_file(), &version, &[]));
    }

    #[test]
    fn missing_file_is_never_found() {
        let local = LocalArtifactResult::not_found();
        let version = VersionResult::new("1.0");
        assert!(!is_locally_installed(false, &local, &version, &[]));
    }
}
