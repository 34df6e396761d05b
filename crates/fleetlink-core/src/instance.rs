//! Instance lifecycle state machine.
//!
//! Wraps the persisted [`InstanceStateRecord`] with the transition rules of
//! the agent: every change is made durable locally before the coordinator
//! hears about it, and the local record is the source of truth for "what
//! state am I in". The coordinator's copy is a best-effort mirror pushed by
//! a detached task.

use std::sync::Arc;

use tracing::{debug, warn};

use fleetlink_state::{InstanceStateRecord, LifecycleState, StateResult, StateStore};

use crate::coordinator::{Coordinator, CoordinatorResult};

type StateCallback = Box<dyn FnOnce(CoordinatorResult<()>) + Send>;

/// The lifecycle record of this agent process.
///
/// One `InstanceState` is current per process. Persistence failures
/// propagate to the caller (lifecycle history is a correctness
/// requirement), while remote-notification failures only reach the
/// optional completion callback or the warn log.
pub struct InstanceState {
    record: InstanceStateRecord,
    store: Arc<dyn StateStore>,
    coordinator: Arc<dyn Coordinator>,
}

impl InstanceState {
    /// Load the persisted record for `identity`, or initialise a fresh one
    /// in the `booting` state.
    ///
    /// A fresh record is persisted immediately and its initial state pushed
    /// to the coordinator, so a restart between init and the first
    /// transition still finds a durable record. Must be called inside a
    /// tokio runtime.
    pub fn init(
        identity: &str,
        store: Arc<dyn StateStore>,
        coordinator: Arc<dyn Coordinator>,
    ) -> StateResult<Self> {
        let (record, fresh) = match store.load(identity)? {
            Some(record) => (record, false),
            None => (InstanceStateRecord::fresh(identity), true),
        };
        let state = Self {
            record,
            store,
            coordinator,
        };
        if fresh {
            state.store.save(&state.record)?;
            state.notify(None);
            debug!(identity, "initialised fresh instance state");
        } else {
            debug!(identity, state = %state.record.state, "reloaded instance state");
        }
        Ok(state)
    }

    /// Identity this record belongs to.
    pub fn identity(&self) -> &str {
        &self.record.identity
    }

    /// Current lifecycle state (in-memory view; authoritative).
    pub fn value(&self) -> &LifecycleState {
        &self.record.state
    }

    /// Identifiers of every script executed on this instance, in insertion
    /// order.
    pub fn past_scripts(&self) -> &[String] {
        &self.record.script_history
    }

    /// Transition to `state`: durably persisted before this returns, then
    /// mirrored to the coordinator by a detached task whose failure is
    /// logged at warn.
    pub fn set_value(&mut self, state: LifecycleState) -> StateResult<()> {
        self.transition(state, None)
    }

    /// Like [`InstanceState::set_value`], delivering the coordinator's
    /// answer to `on_result` instead of the log. The callback runs on the
    /// notify task; the transition itself neither waits for it nor rolls
    /// back on a failed notification.
    pub fn set_value_with<F>(&mut self, state: LifecycleState, on_result: F) -> StateResult<()>
    where
        F: FnOnce(CoordinatorResult<()>) + Send + 'static,
    {
        self.transition(state, Some(Box::new(on_result)))
    }

    /// Append `script_id` to the executed-script history, durably.
    ///
    /// History only grows; duplicates are allowed and order is preserved.
    pub fn record_script_execution(&mut self, script_id: &str) -> StateResult<()> {
        let mut next = self.record.clone();
        next.script_history.push(script_id.to_string());
        self.store.save(&next)?;
        self.record = next;
        Ok(())
    }

    fn transition(
        &mut self,
        state: LifecycleState,
        on_result: Option<StateCallback>,
    ) -> StateResult<()> {
        // Persist a candidate first: a failed write leaves the in-memory
        // state unchanged and surfaces the error.
        let mut next = self.record.clone();
        next.state = state;
        self.store.save(&next)?;
        self.record = next;
        self.notify(on_result);
        Ok(())
    }

    fn notify(&self, on_result: Option<StateCallback>) {
        let coordinator = Arc::clone(&self.coordinator);
        let identity = self.record.identity.clone();
        let state = self.record.state.clone();
        tokio::spawn(async move {
            let result = coordinator.record_state(&identity, &state).await;
            match on_result {
                Some(callback) => callback(result),
                None => {
                    if let Err(e) = result {
                        warn!(error = %e, identity = %identity, "state notification failed");
                    }
                }
            }
        });
    }
}
