//! In-memory fakes for the coordinator and alert sink (testing only)
//!
//! `MemoryCoordinator` records every push and state notification it
//! receives and can be switched into a failing mode to exercise the
//! remote-delivery-failure paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use fleetlink_state::LifecycleState;

use crate::coordinator::{
    AuditPush, Coordinator, CoordinatorError, CoordinatorResult,
};
use crate::guarded::AlertSink;

/// In-memory coordinator recording everything the agent sends.
#[derive(Debug, Default)]
pub struct MemoryCoordinator {
    pushes: Mutex<Vec<AuditPush>>,
    states: Mutex<Vec<(String, LifecycleState)>>,
    fail_pushes: AtomicBool,
    fail_state_records: AtomicBool,
}

impl MemoryCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every audit push received so far, in delivery order.
    pub fn pushes(&self) -> Vec<AuditPush> {
        self.pushes.lock().unwrap().clone()
    }

    /// Every `(identity, state)` notification received so far.
    pub fn recorded_states(&self) -> Vec<(String, LifecycleState)> {
        self.states.lock().unwrap().clone()
    }

    /// Make subsequent audit pushes fail as unreachable.
    pub fn set_fail_pushes(&self, fail: bool) {
        self.fail_pushes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent state notifications fail as unreachable.
    pub fn set_fail_state_records(&self, fail: bool) {
        self.fail_state_records.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Coordinator for MemoryCoordinator {
    async fn push_audit(&self, push: AuditPush) -> CoordinatorResult<()> {
        if self.fail_pushes.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Unreachable(
                "injected push failure".to_string(),
            ));
        }
        self.pushes.lock().unwrap().push(push);
        Ok(())
    }

    async fn record_state(
        &self,
        identity: &str,
        state: &LifecycleState,
    ) -> CoordinatorResult<()> {
        if self.fail_state_records.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Unreachable(
                "injected state failure".to_string(),
            ));
        }
        self.states
            .lock()
            .unwrap()
            .push((identity.to_string(), state.clone()));
        Ok(())
    }
}

/// In-memory alert sink recording every notification.
#[derive(Debug, Default)]
pub struct MemoryAlertSink {
    notices: Mutex<Vec<(String, String)>>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(description, detail)` notice received so far.
    pub fn notices(&self) -> Vec<(String, String)> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for MemoryAlertSink {
    async fn notify(&self, description: &str, detail: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((description.to_string(), detail.to_string()));
    }
}
