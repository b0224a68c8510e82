//! # seal-state: Seal Lifecycle State Machine
//!
//! Owns the rules for how a seal's status may change over its life.
//!
//! ## States
//!
//! ```text
//! Available ──▶ Assigned / Reserved ──▶ Linked ──▶ Used (terminal)
//!     │   ▲            │                  │
//!     │   └─ release ──┘                  └──▶ Lost / Damaged
//!     │                                             │
//!     └──▶ Lost / Damaged / Destroyed ◀─────────────┘
//!                                         Destroyed (terminal)
//! ```
//!
//! Available may also go straight to Linked.
//!
//! The authoritative edge list is [`SealStatus::allowed_targets`].
//!
//! ## Modules
//!
//! - **status** (`status.rs`): the `SealStatus` enum and its transition table.
//! - **seal** (`seal.rs`): the `Seal` record, its history, and
//!   `Seal::transition`, the only way a stored status changes.
//! - **view** (`view.rs`): read-side projections (display status, labels,
//!   per-sector availability). Never written back to the record.

pub mod seal;
pub mod status;
pub mod view;

pub use seal::{
    validate_transition, HistoryAction, HistoryEntry, Seal, TransitionContext, TransitionError,
};
pub use status::{CloseOutStatus, ParseStatusError, SealStatus};
pub use view::{display_label, display_status, sector_availability, SectorAvailability};
