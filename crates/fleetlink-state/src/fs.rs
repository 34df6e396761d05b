//! Filesystem-backed state store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::schema::InstanceStateRecord;
use crate::storage::StateStore;

/// Filesystem-backed store: one JSON document per identity.
///
/// Layout: `<root>/state/<identity>.json`
pub struct FsStateStore {
    state_dir: PathBuf,
}

impl FsStateStore {
    /// Create a new `FsStateStore` rooted at `root`. Creates `root/state/` if needed.
    pub fn new(root: impl AsRef<Path>) -> StateResult<Self> {
        let state_dir = root.as_ref().join("state");
        fs::create_dir_all(&state_dir)?;
        Ok(Self { state_dir })
    }

    fn record_path(&self, identity: &str) -> PathBuf {
        // Identities become file names; anything that is not a plain token
        // character is flattened so they cannot escape the state dir.
        let file: String = identity
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.state_dir.join(format!("{file}.json"))
    }
}

impl StateStore for FsStateStore {
    fn load(&self, identity: &str) -> StateResult<Option<InstanceStateRecord>> {
        let path = self.record_path(identity);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::Io(e)),
        };
        let record: InstanceStateRecord = serde_json::from_slice(&bytes)?;
        if record.identity != identity {
            return Err(StateError::Corrupt {
                identity: identity.to_string(),
                reason: format!("file contains record for '{}'", record.identity),
            });
        }
        Ok(Some(record))
    }

    fn save(&self, record: &InstanceStateRecord) -> StateResult<()> {
        let path = self.record_path(&record.identity);
        let bytes = serde_json::to_vec_pretty(record)?;

        // Atomic write: write to temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.state_dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&path).map_err(|e| StateError::Io(e.error))?;

        debug!(identity = %record.identity, state = %record.state, "state record saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LifecycleState;

    fn make_store() -> (tempfile::TempDir, FsStateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStateStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn record_roundtrip() {
        let (_dir, store) = make_store();
        let mut record = InstanceStateRecord::fresh("i-100");
        record.state = LifecycleState::Operational;
        record.script_history.push("install::base".to_string());

        store.save(&record).unwrap();
        let loaded = store.load("i-100").unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn load_unknown_identity_returns_none() {
        let (_dir, store) = make_store();
        assert!(store.load("never-seen").unwrap().is_none());
    }

    #[test]
    fn save_replaces_previous_record() {
        let (_dir, store) = make_store();
        let mut record = InstanceStateRecord::fresh("i-7");
        store.save(&record).unwrap();

        record.state = LifecycleState::Decommissioning;
        store.save(&record).unwrap();

        let loaded = store.load("i-7").unwrap().unwrap();
        assert_eq!(loaded.state, LifecycleState::Decommissioning);
    }

    #[test]
    fn unparseable_file_surfaces_error() {
        let (dir, store) = make_store();
        fs::write(dir.path().join("state").join("i-9.json"), b"not json").unwrap();
        assert!(matches!(
            store.load("i-9"),
            Err(StateError::Serialization(_))
        ));
    }

    #[test]
    fn mismatched_identity_is_corrupt() {
        let (dir, store) = make_store();
        let record = InstanceStateRecord::fresh("i-other");
        let bytes = serde_json::to_vec(&record).unwrap();
        fs::write(dir.path().join("state").join("i-5.json"), bytes).unwrap();

        assert!(matches!(store.load("i-5"), Err(StateError::Corrupt { .. })));
    }

    #[test]
    fn exotic_identity_characters_are_flattened() {
        let (_dir, store) = make_store();
        let record = InstanceStateRecord::fresh("rs/instance:42");
        store.save(&record).unwrap();
        let loaded = store.load("rs/instance:42").unwrap().unwrap();
        assert_eq!(loaded.identity, "rs/instance:42");
    }
}
