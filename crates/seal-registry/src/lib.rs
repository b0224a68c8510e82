//! # seal-registry: Seal Registry and Distribution Engine
//!
//! Everything that reads or writes more than one seal lives here:
//!
//! - **Sequence** (`sequence.rs`): per-prefix contiguity of generated
//!   suffixes and the per-prefix generation lock.
//!
//! - **Planner** (`planner.rs`): manual and equitable automatic allocation
//!   of available stock to sectors. Pure; never touches the store.
//!
//! - **Guard** (`guard.rs`): the all-or-nothing rule for destroying a lot.
//!
//! - **Store** (`store.rs`): the versioned persistence collaborator and its
//!   in-memory implementation with bounded lock waits.
//!
//! - **Directory** (`directory.rs`): read-only sector lookup.
//!
//! - **Registry** (`registry.rs`): `SealRegistry`, which runs every
//!   operation through validate-then-compare-and-swap.
//!
//! ## Crate Policy
//!
//! - Depends on `seal-core` and `seal-state` internally.
//! - Every status change goes through `Seal::transition`.
//! - Operations emit `tracing` events and `metrics` counters; installing a
//!   subscriber or recorder is left to the binary.

pub mod config;
pub mod directory;
pub mod error;
pub mod guard;
pub mod planner;
pub mod registry;
pub mod report;
pub mod sequence;
pub mod store;

pub use config::{ConfigError, RegistryConfig};
pub use directory::{parse_sectors, SectorDirectory, SectorInfo, StaticDirectory};
pub use error::{GuardError, PlanError, RegistryError, SequenceError, SnapshotError, StoreError};
pub use guard::can_destroy_lot;
pub use planner::{plan_auto, plan_manual, Allocation, AssignmentMode, Plan};
pub use registry::{
    DistributionOutcome, Generated, LotSummary, Page, SealFilter, SealRegistry, SealView,
    SectorSeal,
};
pub use report::{BatchFailure, BatchReport};
pub use sequence::{RangePlan, SequenceAllocator};
pub use store::{InMemorySealStore, SealStore, Versioned};
