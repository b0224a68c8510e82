//! # seal-core: Foundational Types for the Seal Engine
//!
//! Leaf crate of the workspace. Defines the validated identifiers that every
//! other crate passes around, so a lot number can never be handed to an API
//! that expects a sector, and a prefix is always normalized before it reaches
//! the sequence allocator.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Prefix`, `SealCode`,
//!    `LotNumber`, `SectorId`, `ShipmentId` all have validating constructors.
//!    No bare strings for identifiers.
//!
//! 2. **One code format.** `SealCode::compose()` is the only way a code is
//!    built from a prefix and a numeric suffix.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `seal-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{LotNumber, Prefix, SealCode, SectorId, ShipmentId, DEFAULT_CODE_WIDTH};
pub use temporal::Timestamp;
