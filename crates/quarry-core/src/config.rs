//! String-keyed session configuration.
//!
//! Resolution behavior is tuned through recognized string keys on the
//! session, so embedders can thread options through without depending on
//! resolver internals. Typed accessors parse on read and fall back to the
//! caller's default on missing or malformed values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Recognized configuration keys.
pub mod keys {
    /// Rename timestamped snapshot downloads back to their base version.
    /// Boolean, default `true`.
    pub const SNAPSHOT_NORMALIZATION: &str = "artifactResolver.snapshotNormalization";

    /// Register cache hits that the tracking metadata does not know about,
    /// for interoperability with simple local-repository layouts. Boolean,
    /// default `false`. Ignored while a remote-repository filter is active.
    pub const SIMPLE_LRM_INTEROP: &str = "artifactResolver.simpleLrmInterop";
}

/// A string-keyed configuration map with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigMap {
    entries: HashMap<String, String>,
}

impl ConfigMap {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a key to the given value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns a key parsed as a boolean, or `default` when the key is
    /// absent or does not parse.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|value| value.to_ascii_lowercase().parse().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_parsing_and_defaults() {
        let mut config = ConfigMap::new();
        config.set(keys::SNAPSHOT_NORMALIZATION, "false");
        config.set("broken", "not-a-bool");
        config.set("shouty", "TRUE");

        assert!(!config.get_bool(keys::SNAPSHOT_NORMALIZATION, true));
        assert!(config.get_bool("broken", true));
        assert!(config.get_bool("shouty", false));
        assert!(config.get_bool("absent", true));
        assert!(!config.get_bool("absent", false));
    }

    #[test]
    fn raw_access() {
        let mut config = ConfigMap::new();
        config.set("k", "v");
        assert_eq!(config.get("k"), Some("v"));
        assert_eq!(config.get("missing"), None);
    }
}
