//! Session files awaiting delivery and the record of what was already sent.
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::lib::{errors::PackagerError, fs as package_fs};

/// Manifest listing session files already delivered.
pub const SENT_MANIFEST: &str = ".sent.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SentManifest {
    #[serde(default)]
    sent: BTreeSet<String>,
}

/// Session directory for one product/application.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Session files that are not listed in the sent manifest.
    pub fn new_sessions(&self) -> Result<Vec<PathBuf>, PackagerError> {
        let manifest = self.read_manifest()?;
        let sessions = package_fs::list_session_files(&self.dir)?
            .into_iter()
            .filter(|path| !manifest.sent.contains(&file_name(path)))
            .collect::<Vec<_>>();
        debug!(
            target: "diag_packager::sessions",
            dir = %self.dir.display(),
            count = sessions.len(),
            "Collected unsent sessions"
        );
        Ok(sessions)
    }

    /// Record `sessions` as delivered.
    pub fn mark_sent(&self, sessions: &[PathBuf]) -> Result<(), PackagerError> {
        if sessions.is_empty() {
            return Ok(());
        }
        let mut manifest = self.read_manifest()?;
        manifest.sent.extend(sessions.iter().map(|path| file_name(path)));
        self.write_manifest(&manifest)
    }

    /// Delete delivered sessions and drop them from the manifest.
    pub fn purge(&self, sessions: &[PathBuf]) -> Result<(), PackagerError> {
        let mut manifest = self.read_manifest()?;
        for path in sessions {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    warn!(
                        target: "diag_packager::sessions",
                        path = %path.display(),
                        "Session vanished before it could be purged"
                    );
                }
                Err(source) => {
                    return Err(PackagerError::Io {
                        path: path.clone(),
                        source,
                    })
                }
            }
            manifest.sent.remove(&file_name(path));
        }
        self.write_manifest(&manifest)
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join(SENT_MANIFEST)
    }

    fn read_manifest(&self) -> Result<SentManifest, PackagerError> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(SentManifest::default());
        }
        let raw = fs::read(&path).map_err(|source| PackagerError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| PackagerError::Manifest { path, source })
    }

    fn write_manifest(&self, manifest: &SentManifest) -> Result<(), PackagerError> {
        let path = self.manifest_path();
        if !self.dir.exists() {
            return Ok(());
        }
        let raw = serde_json::to_vec_pretty(manifest).map_err(|source| {
            PackagerError::Manifest {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, raw).map_err(|source| PackagerError::Io { path, source })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn sent_sessions_are_not_offered_again() {
        let temp = tempdir().expect("can create temp directory");
        fs::write(temp.path().join("one.log"), "1").expect("write one");
        fs::write(temp.path().join("two.log"), "2").expect("write two");
        let store = SessionStore::new(temp.path());

        let first = store.new_sessions().expect("list sessions");
        assert_eq!(first.len(), 2);
        store.mark_sent(&first[..1]).expect("mark sent");

        let second = store.new_sessions().expect("list sessions");
        assert_eq!(second, vec![temp.path().join("two.log")]);
    }

    #[test]
    fn purge_deletes_files_and_forgets_them() {
        let temp = tempdir().expect("can create temp directory");
        let session = temp.path().join("one.log");
        fs::write(&session, "1").expect("write one");
        let store = SessionStore::new(temp.path());
        store.mark_sent(&[session.clone()]).expect("mark sent");

        store.purge(&[session.clone()]).expect("purge");

        assert!(!session.exists());
        let manifest = fs::read_to_string(temp.path().join(SENT_MANIFEST)).expect("manifest");
        assert!(!manifest.contains("one.log"));
    }

    #[test]
    fn corrupt_manifest_is_reported() {
        let temp = tempdir().expect("can create temp directory");
        fs::write(temp.path().join(SENT_MANIFEST), "not json").expect("write manifest");
        let store = SessionStore::new(temp.path());

        let err = store.new_sessions().expect_err("corrupt manifest fails");
        assert!(matches!(err, PackagerError::Manifest { .. }));
    }

    #[test]
    fn missing_directory_has_no_sessions() {
        let temp = tempdir().expect("can create temp directory");
        let store = SessionStore::new(temp.path().join("absent"));
        assert!(store.new_sessions().expect("list sessions").is_empty());
        store.mark_sent(&[]).expect("nothing to mark");
    }
}
