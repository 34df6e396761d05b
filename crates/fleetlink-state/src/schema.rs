//! Persisted record types for instance lifecycle state.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Symbolic lifecycle state of an instance.
///
/// The set is open: the coordinator may introduce states this agent version
/// has never heard of, so unrecognised tags round-trip through [`Other`]
/// instead of being rejected.
///
/// [`Other`]: LifecycleState::Other
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Initial state of a freshly initialised instance
    Booting,
    /// Boot sequence finished, instance is serving
    Operational,
    /// Decommission scripts are running, instance is going away
    Decommissioning,
    /// Any state tag not known to this agent version
    Other(String),
}

impl LifecycleState {
    /// The symbolic tag as transmitted to the coordinator and persisted.
    pub fn as_str(&self) -> &str {
        match self {
            LifecycleState::Booting => "booting",
            LifecycleState::Operational => "operational",
            LifecycleState::Decommissioning => "decommissioning",
            LifecycleState::Other(tag) => tag,
        }
    }
}

impl From<&str> for LifecycleState {
    fn from(tag: &str) -> Self {
        match tag {
            "booting" => LifecycleState::Booting,
            "operational" => LifecycleState::Operational,
            "decommissioning" => LifecycleState::Decommissioning,
            other => LifecycleState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Persisted and transmitted as the bare tag, not an enum wrapper.
impl Serialize for LifecycleState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LifecycleState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(LifecycleState::from(tag.as_str()))
    }
}

/// The durable lifecycle record of one instance.
///
/// `script_history` is append-only: entries are never removed or reordered,
/// duplicates are allowed, and insertion order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceStateRecord {
    /// Agent identity this record belongs to
    pub identity: String,
    /// Current lifecycle state
    pub state: LifecycleState,
    /// Identifiers of every script executed on this instance, in order
    pub script_history: Vec<String>,
}

impl InstanceStateRecord {
    /// A fresh record for a previously unseen identity.
    pub fn fresh(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            state: LifecycleState::Booting,
            script_history: Vec::new(),
        }
    }
}
