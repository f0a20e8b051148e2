//! Remote repository policy SPI.
//!
//! Computes the effective [`RepositoryPolicy`] for a repository and
//! artifact kind. The default implementation reads the repository's own
//! policies and merges them when a caller asks for both kinds at once.

use quarry_core::repository::{RemoteRepository, RepositoryPolicy, UpdatePolicy};
use quarry_core::session::Session;

/// Computes effective repository policies.
pub trait RemoteRepositoryManager: Send + Sync {
    /// Returns the policy applying to the given artifact kinds.
    ///
    /// Exactly one of `releases`/`snapshots` is set for artifact
    /// downloads; both may be set for mixed metadata traffic.
    fn policy(
        &self,
        session: &Session,
        repository: &RemoteRepository,
        releases: bool,
        snapshots: bool,
    ) -> RepositoryPolicy;
}

/// Policy manager that honors each repository's declared policies.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRemoteRepositoryManager;

impl RemoteRepositoryManager for DefaultRemoteRepositoryManager {
    fn policy(
        &self,
        _session: &Session,
        repository: &RemoteRepository,
        releases: bool,
        snapshots: bool,
    ) -> RepositoryPolicy {
        match (releases, snapshots) {
            (true, true) => merge(*repository.policy(false), *repository.policy(true)),
            (_, true) => *repository.policy(true),
            _ => *repository.policy(false),
        }
    }
}

/// Merges two policies into the more permissive, more eager one.
fn merge(releases: RepositoryPolicy, snapshots: RepositoryPolicy) -> RepositoryPolicy {
    RepositoryPolicy {
        enabled: releases.enabled || snapshots.enabled,
        update_policy: if eagerness(releases.update_policy) >= eagerness(snapshots.update_policy) {
            releases.update_policy
        } else {
            snapshots.update_policy
        },
        checksum_policy: releases.checksum_policy,
    }
}

fn eagerness(policy: UpdatePolicy) -> u64 {
    match policy {
        UpdatePolicy::Always => u64::MAX,
        UpdatePolicy::Interval(minutes) => u64::MAX - u64::from(minutes),
        UpdatePolicy::Daily => u64::MAX - 24 * 60,
        UpdatePolicy::Never => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::repository::ChecksumPolicy;

    #[test]
    fn single_kind_uses_matching_policy() {
        let repository = RemoteRepository::new("central", "https://repo.example.org")
            .with_snapshot_policy(RepositoryPolicy::disabled());
        let manager = DefaultRemoteRepositoryManager;
        let session = Session::new();

        assert!(manager.policy(&session, &repository, true, false).enabled);
        assert!(!manager.policy(&session, &repository, false, true).enabled);
    }

    #[test]
    fn merged_policy_is_permissive_and_eager() {
        let repository = RemoteRepository::new("central", "https://repo.example.org")
            .with_release_policy(RepositoryPolicy::disabled())
            .with_snapshot_policy(RepositoryPolicy::new(
                UpdatePolicy::Always,
                ChecksumPolicy::Warn,
            ));
        let merged =
            DefaultRemoteRepositoryManager.policy(&Session::new(), &repository, true, true);

        assert!(merged.enabled);
        assert_eq!(merged.update_policy, UpdatePolicy::Always);
    }

    #[test]
    fn interval_eagerness_orders_sensibly() {
        assert!(eagerness(UpdatePolicy::Always) > eagerness(UpdatePolicy::Interval(5)));
        assert!(eagerness(UpdatePolicy::Interval(5)) > eagerness(UpdatePolicy::Interval(60)));
        assert!(eagerness(UpdatePolicy::Interval(60)) > eagerness(UpdatePolicy::Daily));
        assert!(eagerness(UpdatePolicy::Daily) > eagerness(UpdatePolicy::Never));
    }
}
