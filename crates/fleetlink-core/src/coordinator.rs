//! Contract with the remote fleet coordinator.
//!
//! The coordinator receives two kinds of traffic from an agent: audit
//! content (output, errors, status lines, section markers) and lifecycle
//! state updates. The transport behind the trait lives elsewhere:
//! implementations push asynchronously and this layer never retries; a
//! failed delivery is logged or handed to the caller's continuation and
//! otherwise forgotten. In-memory fakes live in [`crate::fakes`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use fleetlink_state::LifecycleState;

/// Identifier binding a stream of audit events to one logical execution.
///
/// Every adapter/forwarder pair is created with exactly one `AuditId` and
/// never changes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditId(pub String);

impl AuditId {
    /// Generate a new random AuditId
    pub fn new() -> Self {
        AuditId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for AuditId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a pushed piece of audit content is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Script/recipe output; the only kind subject to batching
    Output,
    /// An error line; delivered immediately
    Error,
    /// A status update replacing the audit's current status
    Status,
    /// A section boundary in the audit stream
    Section,
    /// An informational note; delivered immediately
    Info,
}

/// Category tag attached to notable audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Notification,
    Security,
    Error,
}

/// One unit of audit content handed to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPush {
    pub audit_id: AuditId,
    pub kind: ContentKind,
    pub text: String,
    pub category: Option<EventCategory>,
}

/// Errors surfaced by a coordinator implementation.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("coordinator unreachable: {0}")]
    Unreachable(String),

    #[error("coordinator rejected the request: {0}")]
    Rejected(String),

    #[error("coordinator request timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = std::result::Result<T, CoordinatorError>;

/// Remote fleet coordinator.
///
/// Both calls are fire-and-forget from the agent's perspective: the agent's
/// control flow never blocks on them and never aborts because one failed.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Deliver one unit of audit content.
    async fn push_audit(&self, push: AuditPush) -> CoordinatorResult<()>;

    /// Record a lifecycle state transition for `identity`.
    async fn record_state(
        &self,
        identity: &str,
        state: &LifecycleState,
    ) -> CoordinatorResult<()>;
}
