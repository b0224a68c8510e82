//! # Registry Error Taxonomy
//!
//! One enum per validator, each variant carrying the values needed to say
//! which invariant was violated, plus [`RegistryError`] which aggregates
//! them for the operations of [`crate::SealRegistry`].

use thiserror::Error;

use seal_core::{LotNumber, Prefix, SealCode, SectorId, ValidationError};
use seal_state::{SealStatus, TransitionError};

/// Generation request rejected by the sequence allocator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// `end` precedes `start`.
    #[error("invalid range: end {end} is before start {start}")]
    InvalidRange {
        /// Requested first suffix.
        start: u64,
        /// Requested last suffix.
        end: u64,
    },

    /// The batch does not begin where the prefix's sequence left off.
    #[error("non-contiguous range for prefix {prefix}: expected start = {expected}, got {start}")]
    NonContiguous {
        /// Prefix being generated.
        prefix: Prefix,
        /// `max(existing suffixes) + 1`, or 1.
        expected: u64,
        /// Requested first suffix.
        start: u64,
    },

    /// A code in the range already exists.
    #[error("code collision: {code} already exists")]
    CodeCollision {
        /// The existing code.
        code: SealCode,
    },

    /// The batch is larger than one generation call may create.
    #[error("range of {requested} seals exceeds the per-batch limit of {max}")]
    RangeTooLarge {
        /// Seals requested.
        requested: u64,
        /// Configured maximum.
        max: u64,
    },
}

/// Distribution request rejected by the planner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Quantity was zero or negative.
    #[error("quantity must be positive, got {quantity}")]
    InvalidQuantity {
        /// Requested quantity.
        quantity: i64,
    },

    /// Fewer available seals than requested.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Requested quantity.
        requested: u64,
        /// Seals currently available.
        available: usize,
    },

    /// Automatic distribution needs at least two sectors.
    #[error("automatic distribution needs at least 2 sectors, got {given}")]
    InsufficientSectors {
        /// Sectors supplied.
        given: usize,
    },
}

/// Lot destruction rejected by the guard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// No seal carries this lot number.
    #[error("lot {lot} not found")]
    LotNotFound {
        /// Requested lot.
        lot: LotNumber,
    },

    /// At least one member left stock; the whole lot is blocked.
    #[error(
        "lot {lot} has {distributed} of {total} seals distributed or linked (first: {first}); \
         destruction requires every seal to be available with no sector or shipment"
    )]
    LotHasDistributedSeals {
        /// Requested lot.
        lot: LotNumber,
        /// Members that are not in stock.
        distributed: usize,
        /// All members of the lot.
        total: usize,
        /// Lowest-numbered offending seal.
        first: SealCode,
    },
}

/// Failure reported by the persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store did not answer within the configured bound.
    #[error("store {operation} timed out after {after_ms} ms")]
    Timeout {
        /// Operation that timed out.
        operation: &'static str,
        /// The bound that was exceeded.
        after_ms: u64,
    },

    /// Compare-and-swap lost a race.
    #[error("version conflict on {code}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Record being written.
        code: SealCode,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Insert of a code that already exists.
    #[error("duplicate code {code}")]
    DuplicateCode {
        /// The existing code.
        code: SealCode,
    },

    /// Write to a code that does not exist.
    #[error("no record for {code}")]
    NotFound {
        /// The missing code.
        code: SealCode,
    },
}

/// A persisted snapshot breaks a registry invariant and was not loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Stored versions start at 1.
    #[error("record {code} has version 0")]
    ZeroVersion {
        /// Offending record.
        code: SealCode,
    },

    /// The code is not the prefix followed by the suffix's digits.
    #[error("code {code} does not match prefix {prefix} and suffix {suffix}")]
    CodeMismatch {
        /// Stored code.
        code: SealCode,
        /// Stored prefix.
        prefix: Prefix,
        /// Stored suffix.
        suffix: u64,
    },

    /// Two records share a code.
    #[error("code {code} appears more than once")]
    DuplicateCode {
        /// Repeated code.
        code: SealCode,
    },

    /// A prefix's suffixes are not exactly `1..=n`.
    #[error("suffixes of prefix {prefix} are not contiguous: expected {expected}, found {found}")]
    NonContiguous {
        /// Affected prefix.
        prefix: Prefix,
        /// Next suffix the sequence should hold.
        expected: u64,
        /// Suffix actually found in that position.
        found: u64,
    },

    /// The owner references or reason do not fit the stored status.
    #[error("record {code} in status {status}: {problem}")]
    InconsistentStatus {
        /// Offending record.
        code: SealCode,
        /// Stored status.
        status: SealStatus,
        /// What is missing or left over.
        problem: &'static str,
    },
}

/// Error returned by every [`crate::SealRegistry`] operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Malformed identifier.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Generation rejected.
    #[error("sequence error: {0}")]
    Sequence(#[from] SequenceError),

    /// Status change rejected.
    #[error("transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Distribution rejected.
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    /// Lot destruction rejected.
    #[error("guard error: {0}")]
    Guard(#[from] GuardError),

    /// Persistence failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// No seal with this code.
    #[error("seal {code} not found")]
    SealNotFound {
        /// Requested code.
        code: SealCode,
    },

    /// The directory does not know the sector.
    #[error("unknown sector {sector}")]
    UnknownSector {
        /// Requested sector.
        sector: SectorId,
    },

    /// A sector appears more than once in an automatic distribution.
    #[error("sector {sector} listed more than once")]
    DuplicateSector {
        /// Repeated sector.
        sector: SectorId,
    },

    /// Compare-and-swap kept losing; the caller may retry.
    #[error("concurrent modification of {code}: gave up after {attempts} attempts")]
    ConcurrentModification {
        /// Contended record.
        code: SealCode,
        /// Attempts made.
        attempts: u32,
    },
}

impl RegistryError {
    /// Transient failures the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification { .. } | Self::Store(StoreError::Timeout { .. })
        )
    }

    /// Short machine-readable kind, used in batch reports and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Sequence(SequenceError::InvalidRange { .. }) => "invalid_range",
            Self::Sequence(SequenceError::NonContiguous { .. }) => "non_contiguous",
            Self::Sequence(SequenceError::CodeCollision { .. }) => "code_collision",
            Self::Sequence(SequenceError::RangeTooLarge { .. }) => "range_too_large",
            Self::Transition(TransitionError::IllegalTransition { .. }) => "illegal_transition",
            Self::Transition(TransitionError::MissingReason { .. }) => "missing_reason",
            Self::Transition(TransitionError::MissingSector { .. }) => "missing_sector",
            Self::Transition(TransitionError::MissingShipment) => "missing_shipment",
            Self::Transition(TransitionError::TerminalStateUsed { .. }) => "terminal_state_used",
            Self::Plan(PlanError::InvalidQuantity { .. }) => "invalid_quantity",
            Self::Plan(PlanError::InsufficientStock { .. }) => "insufficient_stock",
            Self::Plan(PlanError::InsufficientSectors { .. }) => "insufficient_sectors",
            Self::Guard(GuardError::LotNotFound { .. }) => "lot_not_found",
            Self::Guard(GuardError::LotHasDistributedSeals { .. }) => "lot_has_distributed_seals",
            Self::Store(StoreError::Timeout { .. }) => "store_timeout",
            Self::Store(_) => "store",
            Self::SealNotFound { .. } => "seal_not_found",
            Self::UnknownSector { .. } => "unknown_sector",
            Self::DuplicateSector { .. } => "duplicate_sector",
            Self::ConcurrentModification { .. } => "concurrent_modification",
        }
    }
}
