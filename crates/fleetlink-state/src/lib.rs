//! Fleetlink-State: durable instance-state persistence
//!
//! This crate is the persistence layer for the Fleetlink agent. It owns the
//! on-disk record of an instance's lifecycle (current state plus the ordered
//! history of executed scripts) and keeps all storage I/O behind a small
//! trait so the domain layer never touches the filesystem directly.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: durability and record integrity. A `save` that returns `Ok` is
//! committed; a failed write surfaces to the caller instead of being
//! swallowed, because losing lifecycle history is a correctness bug.
//!
//! ## Key Components
//!
//! - `StateStore`: load/save contract keyed by agent identity
//! - `FsStateStore`: one JSON document per identity, atomic writes
//! - `InstanceStateRecord`: the persisted lifecycle record

pub mod error;
pub mod fakes;
mod fs;
mod schema;
mod storage;

pub use error::{StateError, StateResult};
pub use fs::FsStateStore;
pub use schema::{InstanceStateRecord, LifecycleState};
pub use storage::StateStore;
