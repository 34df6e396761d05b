//! In-memory fakes for the state store (testing only)
//!
//! Provides `MemoryStateStore`, which satisfies the `StateStore` contract
//! without touching the filesystem, plus an injectable save-failure switch
//! for exercising the fatal-persistence path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::{StateError, StateResult};
use crate::schema::InstanceStateRecord;
use crate::storage::StateStore;

/// In-memory state store backed by a `HashMap<identity, record>`.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    records: Mutex<HashMap<String, InstanceStateRecord>>,
    fail_saves: AtomicBool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail with an I/O error. Used by tests
    /// that assert persistence failures propagate to the caller.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, identity: &str) -> StateResult<Option<InstanceStateRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(identity).cloned())
    }

    fn save(&self, record: &InstanceStateRecord) -> StateResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StateError::Io(std::io::Error::other(
                "injected save failure",
            )));
        }
        let mut records = self.records.lock().unwrap();
        records.insert(record.identity.clone(), record.clone());
        Ok(())
    }
}
