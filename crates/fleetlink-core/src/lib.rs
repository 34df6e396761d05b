//! Fleetlink Core Library
//!
//! Audit forwarding and instance-state engine for the Fleetlink host agent:
//! everything the agent produces while running provisioning work is
//! captured, filtered, batched and delivered in order to the fleet
//! coordinator, while the instance's own lifecycle state is kept durable
//! across restarts.
//!
//! Construction is explicit dependency injection throughout: adapters take
//! their forwarder, the state machine takes its store and coordinator;
//! there are no process-wide singletons.

pub mod audit;
pub mod coordinator;
pub mod fakes;
pub mod guarded;
pub mod instance;
pub mod telemetry;

pub use audit::filter::MessageFilter;
pub use audit::format::format_line;
pub use audit::forwarder::{AuditForwarder, MAX_AUDIT_DELAY};
pub use audit::logger::AuditLogger;
pub use audit::severity::Severity;

pub use coordinator::{
    AuditId, AuditPush, ContentKind, Coordinator, CoordinatorError, CoordinatorResult,
    EventCategory,
};

pub use guarded::{AlertSink, Guarded, QueryOptions};
pub use instance::InstanceState;
pub use telemetry::init_logging;

pub use fleetlink_state::{
    FsStateStore, InstanceStateRecord, LifecycleState, StateError, StateResult, StateStore,
};

/// Fleetlink version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
