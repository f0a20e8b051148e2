//! Repository descriptions: remote, local, and workspace tiers.
//!
//! A [`RemoteRepository`] describes a downloadable artifact source together
//! with its release and snapshot [`RepositoryPolicy`]. The local repository
//! is the on-disk cache owned by the local repository manager, and the
//! workspace is the in-process provider of artifacts built by sibling
//! modules. [`ArtifactRepository`] unifies the three tiers wherever a
//! result or event needs to say where an artifact came from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How often a cached artifact or cached failure should be re-checked
/// against its remote repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdatePolicy {
    /// Never re-check; the cache is authoritative.
    Never,
    /// Re-check on every resolution.
    Always,
    /// Re-check once a day.
    #[default]
    Daily,
    /// Re-check after the given number of minutes.
    Interval(u32),
}

/// What to do when a downloaded file's checksum does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChecksumPolicy {
    /// Fail the download.
    Fail,
    /// Log and continue.
    #[default]
    Warn,
    /// Skip checksum validation entirely.
    Ignore,
}

/// Per-kind (release or snapshot) access policy of a remote repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPolicy {
    /// Whether this artifact kind may be served by the repository at all.
    pub enabled: bool,
    /// Re-check cadence for cached entries.
    pub update_policy: UpdatePolicy,
    /// Checksum mismatch handling.
    pub checksum_policy: ChecksumPolicy,
}

impl RepositoryPolicy {
    /// Creates an enabled policy with the given cadences.
    #[must_use]
    pub const fn new(update_policy: UpdatePolicy, checksum_policy: ChecksumPolicy) -> Self {
        Self {
            enabled: true,
            update_policy,
            checksum_policy,
        }
    }

    /// Creates a disabled policy.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            update_policy: UpdatePolicy::Never,
            checksum_policy: ChecksumPolicy::Warn,
        }
    }
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self::new(UpdatePolicy::default(), ChecksumPolicy::default())
    }
}

/// A downloadable artifact source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRepository {
    id: String,
    url: String,
    content_type: String,
    repository_manager: bool,
    release_policy: RepositoryPolicy,
    snapshot_policy: RepositoryPolicy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    mirrored: Vec<RemoteRepository>,
}

impl RemoteRepository {
    /// Creates a repository with default policies and content type.
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            content_type: "default".to_string(),
            repository_manager: false,
            release_policy: RepositoryPolicy::default(),
            snapshot_policy: RepositoryPolicy::default(),
            mirrored: Vec::new(),
        }
    }

    /// Returns the repository id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the repository url.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the layout content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns whether the repository fronts other repositories
    /// (a repository manager instance).
    #[must_use]
    pub const fn is_repository_manager(&self) -> bool {
        self.repository_manager
    }

    /// Returns the policy applying to the given artifact kind.
    #[must_use]
    pub const fn policy(&self, snapshot: bool) -> &RepositoryPolicy {
        if snapshot {
            &self.snapshot_policy
        } else {
            &self.release_policy
        }
    }

    /// Returns the repositories this repository mirrors.
    #[must_use]
    pub fn mirrored(&self) -> &[RemoteRepository] {
        &self.mirrored
    }

    /// Sets the layout content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Marks the repository as a repository manager.
    #[must_use]
    pub const fn with_repository_manager(mut self, repository_manager: bool) -> Self {
        self.repository_manager = repository_manager;
        self
    }

    /// Sets the release policy.
    #[must_use]
    pub const fn with_release_policy(mut self, policy: RepositoryPolicy) -> Self {
        self.release_policy = policy;
        self
    }

    /// Sets the snapshot policy.
    #[must_use]
    pub const fn with_snapshot_policy(mut self, policy: RepositoryPolicy) -> Self {
        self.snapshot_policy = policy;
        self
    }

    /// Sets the repositories this repository mirrors.
    #[must_use]
    pub fn with_mirrored(mut self, mirrored: Vec<RemoteRepository>) -> Self {
        self.mirrored = mirrored;
        self
    }
}

/// The on-disk artifact cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRepository {
    base_dir: PathBuf,
    content_type: String,
}

impl LocalRepository {
    /// Creates a local repository rooted at the given directory.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            content_type: "default".to_string(),
        }
    }

    /// Returns the repository id; the local cache is always `local`.
    #[must_use]
    pub fn id(&self) -> &'static str {
        "local"
    }

    /// Returns the cache base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the layout content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// The in-process provider of artifacts built by sibling modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRepository {
    id: String,
}

impl WorkspaceRepository {
    /// Creates a workspace repository with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Returns the workspace id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for WorkspaceRepository {
    fn default() -> Self {
        Self::new("workspace")
    }
}

/// Any of the three tiers an artifact can be attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ArtifactRepository {
    /// A downloadable remote source.
    Remote(RemoteRepository),
    /// The on-disk cache.
    Local(LocalRepository),
    /// The in-process workspace.
    Workspace(WorkspaceRepository),
}

impl ArtifactRepository {
    /// Returns the repository id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Remote(repository) => repository.id(),
            Self::Local(repository) => repository.id(),
            Self::Workspace(repository) => repository.id(),
        }
    }

    /// Returns the remote repository, if this is the remote tier.
    #[must_use]
    pub const fn as_remote(&self) -> Option<&RemoteRepository> {
        match self {
            Self::Remote(repository) => Some(repository),
            _ => None,
        }
    }

    /// Returns whether this is the local cache tier.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_selection_by_kind() {
        let repository = RemoteRepository::new("central", "https://repo.example.org/releases")
            .with_snapshot_policy(RepositoryPolicy::disabled());

        assert!(repository.policy(false).enabled);
        assert!(!repository.policy(true).enabled);
    }

    #[test]
    fn builder_defaults() {
        let repository = RemoteRepository::new("central", "https://repo.example.org/releases");
        assert_eq!(repository.content_type(), "default");
        assert!(!repository.is_repository_manager());
        assert!(repository.mirrored().is_empty());
    }

    #[test]
    fn artifact_repository_ids() {
        let remote = ArtifactRepository::Remote(RemoteRepository::new("central", "https://x"));
        let local = ArtifactRepository::Local(LocalRepository::new("/tmp/repo"));
        let workspace = ArtifactRepository::Workspace(WorkspaceRepository::default());

        assert_eq!(remote.id(), "central");
        assert_eq!(local.id(), "local");
        assert_eq!(workspace.id(), "workspace");
        assert!(local.is_local());
        assert!(remote.as_remote().is_some());
    }

    #[test]
    fn serde_roundtrip() {
        let repository = RemoteRepository::new("central", "https://repo.example.org/releases")
            .with_repository_manager(true)
            .with_mirrored(vec![RemoteRepository::new("mirror", "https://mirror.example.org")]);
        let json = serde_json::to_string(&repository).unwrap();
        let parsed: RemoteRepository = serde_json::from_str(&json).unwrap();
        assert_eq!(repository, parsed);
    }
}
