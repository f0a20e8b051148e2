//! Snapshot normalization.
//!
//! Downstream tooling addresses snapshots by base version; the timestamped
//! file name is a wire concern. When enabled (the default), a resolved
//! timestamped snapshot is exposed through a sibling file named with the
//! base version. Equal size and mtime are the idempotence key: the copy is
//! skipped when the destination already mirrors the source, and after a
//! copy the destination's mtime is set to the source's so the next
//! resolution sees the pair as in sync.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use quarry_core::artifact::Artifact;
use quarry_core::config::keys;
use quarry_core::error::ResolveError;
use quarry_core::session::Session;

/// Returns the file to expose to the caller for a resolved artifact.
///
/// Non-snapshots, snapshots already addressed by base version, and
/// sessions with normalization disabled get the source file unchanged.
pub(crate) async fn normalized_file(
    session: &Session,
    artifact: &Artifact,
    file: &Path,
) -> Result<PathBuf, ResolveError> {
    let normalize = artifact.is_snapshot()
        && artifact.version() != artifact.base_version()
        && session.config().get_bool(keys::SNAPSHOT_NORMALIZATION, true);
    if !normalize {
        return Ok(file.to_path_buf());
    }

    let Some(name) = file
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.replace(artifact.version(), &artifact.base_version()))
    else {
        return Ok(file.to_path_buf());
    };
    let destination = file.with_file_name(name);

    let source_meta = tokio::fs::metadata(file)
        .await
        .map_err(|error| transfer_error(artifact, file, &error))?;
    let source_mtime = source_meta
        .modified()
        .map_err(|error| transfer_error(artifact, file, &error))?;

    if in_sync(&destination, source_meta.len(), source_mtime).await {
        return Ok(destination);
    }

    tokio::fs::copy(file, &destination)
        .await
        .map_err(|error| transfer_error(artifact, &destination, &error))?;
    set_mtime(&destination, source_mtime)
        .map_err(|error| transfer_error(artifact, &destination, &error))?;

    Ok(destination)
}

async fn in_sync(destination: &Path, source_len: u64, source_mtime: SystemTime) -> bool {
    match tokio::fs::metadata(destination).await {
        Ok(meta) => meta.len() == source_len && meta.modified().is_ok_and(|m| m == source_mtime),
        Err(_) => false,
    }
}

fn set_mtime(path: &Path, mtime: SystemTime) -> std::io::Result<()> {
    std::fs::OpenOptions::new()
        .write(true)
        .open(path)?
        .set_modified(mtime)
}

fn transfer_error(artifact: &Artifact, path: &Path, error: &std::io::Error) -> ResolveError {
    ResolveError::Transfer {
        artifact: artifact.clone(),
        repository: None,
        message: format!("snapshot normalization of {} failed: {error}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn timestamped() -> Artifact {
        Artifact::new("org.example", "widget", "jar", "1.0-20240101.120000-3")
    }

    #[tokio::test]
    async fn release_files_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("widget-1.0.jar");
        fs::write(&source, b"release").unwrap();

        let artifact = Artifact::new("org.example", "widget", "jar", "1.0");
        let exposed = normalized_file(&Session::new(), &artifact, &source)
            .await
            .unwrap();
        assert_eq!(exposed, source);
    }

    #[tokio::test]
    async fn timestamped_snapshot_is_renamed_to_base() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("widget-1.0-20240101.120000-3.jar");
        fs::write(&source, b"snapshot bytes").unwrap();

        let exposed = normalized_file(&Session::new(), &timestamped(), &source)
            .await
            .unwrap();
        assert_eq!(exposed, dir.path().join("widget-1.0-SNAPSHOT.jar"));
        assert_eq!(fs::read(&exposed).unwrap(), b"snapshot bytes");

        let source_mtime = fs::metadata(&source).unwrap().modified().unwrap();
        let exposed_mtime = fs::metadata(&exposed).unwrap().modified().unwrap();
        assert_eq!(source_mtime, exposed_mtime);
    }

    #[tokio::test]
    async fn second_normalization_skips_the_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("widget-1.0-20240101.120000-3.jar");
        fs::write(&source, b"snapshot bytes").unwrap();

        let session = Session::new();
        let exposed = normalized_file(&session, &timestamped(), &source)
            .await
            .unwrap();

        // Plant different content of equal size behind the same mtime; a
        // second normalization must leave it alone.
        fs::write(&exposed, b"PLANTED  bytes").unwrap();
        let source_mtime = fs::metadata(&source).unwrap().modified().unwrap();
        set_mtime(&exposed, source_mtime).unwrap();

        let again = normalized_file(&session, &timestamped(), &source)
            .await
            .unwrap();
        assert_eq!(again, exposed);
        assert_eq!(fs::read(&again).unwrap(), b"PLANTED  bytes");
    }

    #[tokio::test]
    async fn stale_destination_is_refreshed() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("widget-1.0-20240101.120000-3.jar");
        fs::write(&source, b"new snapshot").unwrap();

        let destination = dir.path().join("widget-1.0-SNAPSHOT.jar");
        fs::write(&destination, b"older, longer snapshot bytes").unwrap();

        let exposed = normalized_file(&Session::new(), &timestamped(), &source)
            .await
            .unwrap();
        assert_eq!(fs::read(&exposed).unwrap(), b"new snapshot");
    }

    #[tokio::test]
    async fn disabled_normalization_exposes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("widget-1.0-20240101.120000-3.jar");
        fs::write(&source, b"snapshot bytes").unwrap();

        let session = Session::new().with_config(keys::SNAPSHOT_NORMALIZATION, "false");
        let exposed = normalized_file(&session, &timestamped(), &source)
            .await
            .unwrap();
        assert_eq!(exposed, source);
        assert!(!dir.path().join("widget-1.0-SNAPSHOT.jar").exists());
    }

    #[tokio::test]
    async fn missing_source_is_a_transfer_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("widget-1.0-20240101.120000-3.jar");

        let error = normalized_file(&Session::new(), &timestamped(), &source)
            .await
            .unwrap_err();
        assert!(error.is_transfer());
    }
}
