//! Artifact coordinates and the immutable artifact value.
//!
//! An [`Artifact`] identifies a uniquely-coordinated binary file by group,
//! id, classifier, extension, and version. Artifacts are values: the update
//! methods (`with_version`, `with_file`, ...) return a new artifact and the
//! original stays untouched, so a request's input coordinates survive the
//! rewrites that happen during resolution.
//!
//! Snapshot handling follows repository conventions: a version ending in
//! `-SNAPSHOT` denotes a mutable development line, and remote repositories
//! serve it under a timestamped version such as `1.0-20240101.120000-3`.
//! [`Artifact::base_version`] maps a timestamped version back to its
//! `-SNAPSHOT` form; the two spellings share one logical identity.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Well-known artifact property keys.
pub mod properties {
    /// Marks a pre-hosted artifact.
    ///
    /// When set, the caller supplies the file at the given path and the
    /// resolver performs no repository activity for the artifact: no version
    /// resolution, no cache lookup, no download, no cache registration.
    pub const LOCAL_PATH: &str = "localPath";
}

const SNAPSHOT: &str = "SNAPSHOT";

/// A uniquely-coordinated binary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    group_id: String,
    artifact_id: String,
    classifier: String,
    extension: String,
    version: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    properties: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<PathBuf>,
}

impl Artifact {
    /// Creates an artifact without a classifier.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        extension: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: String::new(),
            extension: extension.into(),
            version: version.into(),
            properties: HashMap::new(),
            file: None,
        }
    }

    /// Returns the group id.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Returns the artifact id.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Returns the classifier, empty if none.
    #[must_use]
    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    /// Returns the file extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the base version.
    ///
    /// For a timestamped snapshot version this is the `-SNAPSHOT` form the
    /// artifact is logically addressed by; for every other version it equals
    /// [`Artifact::version`].
    #[must_use]
    pub fn base_version(&self) -> String {
        match timestamped_start(&self.version) {
            Some(start) => format!("{}{SNAPSHOT}", &self.version[..start]),
            None => self.version.clone(),
        }
    }

    /// Returns whether the version denotes a mutable development line.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT) || timestamped_start(&self.version).is_some()
    }

    /// Returns the resolved file, if resolution has produced one.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Returns the value of the given property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns the key under which sync contexts lock this artifact.
    ///
    /// The key uses the base version so a timestamped snapshot and its
    /// `-SNAPSHOT` spelling contend on the same lock.
    #[must_use]
    pub fn lock_key(&self) -> String {
        format!(
            "artifact:{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.base_version()
        )
    }

    /// Returns a copy with the given classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    /// Returns a copy with the given version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Returns a copy with the given resolved file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Returns a copy with the given property set.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

/// Returns the byte offset of the `YYYYMMDD.HHMMSS-N` span in a timestamped
/// snapshot version, or `None` if the version is not timestamped.
fn timestamped_start(version: &str) -> Option<usize> {
    if !version.is_ascii() {
        return None;
    }
    let (head, build) = version.rsplit_once('-')?;
    if build.is_empty() || !build.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // head must end in an 8-digit date, a dot, and a 6-digit time
    if head.len() < 15 {
        return None;
    }
    let start = head.len() - 15;
    let stamp = head.as_bytes();
    let date_ok = stamp[start..start + 8].iter().all(u8::is_ascii_digit);
    let time_ok = stamp[start + 9..head.len()].iter().all(u8::is_ascii_digit);
    if !(date_ok && stamp[start + 8] == b'.' && time_ok) {
        return None;
    }
    // the stamp stands alone or follows a separator
    if start == 0 || stamp[start - 1] == b'-' {
        Some(start)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_version_is_its_own_base() {
        let artifact = Artifact::new("org.example", "widget", "jar", "1.0");
        assert!(!artifact.is_snapshot());
        assert_eq!(artifact.base_version(), "1.0");
    }

    #[test]
    fn snapshot_suffix_detected() {
        let artifact = Artifact::new("org.example", "widget", "jar", "1.0-SNAPSHOT");
        assert!(artifact.is_snapshot());
        assert_eq!(artifact.base_version(), "1.0-SNAPSHOT");
    }

    #[test]
    fn timestamped_version_maps_to_base() {
        let artifact = Artifact::new("org.example", "widget", "jar", "1.0-20240101.120000-3");
        assert!(artifact.is_snapshot());
        assert_eq!(artifact.base_version(), "1.0-SNAPSHOT");
    }

    #[test]
    fn bare_timestamp_version_maps_to_base() {
        let artifact = Artifact::new("org.example", "widget", "jar", "20240101.120000-3");
        assert!(artifact.is_snapshot());
        assert_eq!(artifact.base_version(), "SNAPSHOT");
    }

    #[test]
    fn near_miss_timestamps_are_releases() {
        for version in ["1.0-2024010.120000-3", "1.0-20240101.120000-", "1.0-20240101x120000-3"] {
            let artifact = Artifact::new("org.example", "widget", "jar", version);
            assert_eq!(artifact.base_version(), version, "{version}");
        }
    }

    #[test]
    fn lock_key_uses_base_version() {
        let timestamped = Artifact::new("org.example", "widget", "jar", "1.0-20240101.120000-3");
        let logical = Artifact::new("org.example", "widget", "jar", "1.0-SNAPSHOT");
        assert_eq!(timestamped.lock_key(), logical.lock_key());
    }

    #[test]
    fn display_includes_classifier_when_present() {
        let artifact = Artifact::new("org.example", "widget", "jar", "1.0");
        assert_eq!(artifact.to_string(), "org.example:widget:jar:1.0");

        let with_classifier = artifact.with_classifier("sources");
        assert_eq!(with_classifier.to_string(), "org.example:widget:jar:sources:1.0");
    }

    #[test]
    fn updates_return_new_values() {
        let artifact = Artifact::new("org.example", "widget", "jar", "1.0-SNAPSHOT");
        let rewritten = artifact.clone().with_version("1.0-20240101.120000-3");
        assert_eq!(artifact.version(), "1.0-SNAPSHOT");
        assert_eq!(rewritten.version(), "1.0-20240101.120000-3");
    }

    #[test]
    fn properties_roundtrip() {
        let artifact = Artifact::new("org.example", "widget", "jar", "1.0")
            .with_property(properties::LOCAL_PATH, "/tmp/widget.jar");
        assert_eq!(artifact.property(properties::LOCAL_PATH), Some("/tmp/widget.jar"));
        assert_eq!(artifact.property("missing"), None);
    }

    #[test]
    fn serde_roundtrip() {
        let artifact = Artifact::new("org.example", "widget", "jar", "1.0")
            .with_classifier("sources")
            .with_property("k", "v");
        let json = serde_json::to_string(&artifact).unwrap();
        let parsed: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(artifact, parsed);
    }
}
