//! Storage contract for instance-state records.

use crate::error::StateResult;
use crate::schema::InstanceStateRecord;

/// Durable store for instance-state records, keyed by agent identity.
///
/// Guarantees:
/// - `save` is durable before it returns; an `Ok` means the record survives
///   a process restart.
/// - `load` returns exactly what the last successful `save` wrote, or `None`
///   for an identity that was never saved.
/// - One writer per identity; concurrent writers are undefined.
///
/// Operations are synchronous: lifecycle transitions must be on disk before
/// the caller proceeds. The in-memory fake lives in [`crate::fakes`].
pub trait StateStore: Send + Sync {
    /// Load the record for `identity`, if one was ever saved.
    fn load(&self, identity: &str) -> StateResult<Option<InstanceStateRecord>>;

    /// Durably write `record`, replacing any previous record for its identity.
    fn save(&self, record: &InstanceStateRecord) -> StateResult<()>;
}
