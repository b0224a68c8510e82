//! # Seal Record and Transitions
//!
//! A [`Seal`] is created in `available` by generation and afterwards changes
//! only through [`Seal::transition`], which checks the edge against the
//! table in [`crate::status`], checks the context carries what the target
//! status needs, applies the ownership side effects, and appends a history
//! entry. Fields are private so no caller can write a status directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use seal_core::{LotNumber, Prefix, SealCode, SectorId, ShipmentId, Timestamp};

use crate::status::SealStatus;

// ─── Errors ──────────────────────────────────────────────────────────

/// A status change was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// `to` is not in the allowed set for `from`.
    #[error("illegal seal transition {from} -> {to}; allowed from {from}: [{}]", describe_targets(.from))]
    IllegalTransition {
        /// Current status.
        from: SealStatus,
        /// Requested status.
        to: SealStatus,
    },

    /// Entering `to` requires a non-blank reason.
    #[error("a reason is required to move a seal to {to}")]
    MissingReason {
        /// Requested status.
        to: SealStatus,
    },

    /// Entering `to` requires a sector reference.
    #[error("a sector id is required to move a seal to {to}")]
    MissingSector {
        /// Requested status.
        to: SealStatus,
    },

    /// Linking requires a shipment reference.
    #[error("a shipment id is required to move a seal to linked")]
    MissingShipment,

    /// Used seals admit no close-out.
    #[error("seal {code} is used; used seals cannot be closed out")]
    TerminalStateUsed {
        /// The used seal.
        code: SealCode,
    },
}

fn describe_targets(from: &SealStatus) -> String {
    from.allowed_targets()
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ─── History ─────────────────────────────────────────────────────────

/// Kind of event recorded in a seal's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// The seal was generated.
    Created,
    /// The seal's status changed.
    StatusChange,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChange => "status_change",
        }
    }
}

/// One append-only audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the event happened.
    pub timestamp: Timestamp,
    /// What happened.
    pub action: HistoryAction,
    /// Human-readable description.
    pub detail: String,
}

// ─── Transition context ──────────────────────────────────────────────

/// What the caller supplies alongside a requested status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionContext {
    /// Owning sector, for `assigned` / `reserved` (optionally `linked`).
    pub sector_id: Option<SectorId>,
    /// Shipment secured by the seal, for `linked`.
    pub shipment_id: Option<ShipmentId>,
    /// Destruction reason, for `lost` / `damaged` / `destroyed`.
    pub reason: Option<String>,
}

impl TransitionContext {
    /// Context carrying a sector reference.
    pub fn with_sector(sector_id: SectorId) -> Self {
        Self {
            sector_id: Some(sector_id),
            ..Self::default()
        }
    }

    /// Context carrying a shipment reference.
    pub fn with_shipment(shipment_id: ShipmentId) -> Self {
        Self {
            shipment_id: Some(shipment_id),
            ..Self::default()
        }
    }

    /// Context carrying a reason.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// The reason, if present and non-blank after trimming.
    pub fn reason(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Check `from → to` against the table and `ctx` against the target's needs.
///
/// Edge legality is checked first, so an illegal edge is reported as such
/// even when the context is also incomplete.
pub fn validate_transition(
    from: SealStatus,
    to: SealStatus,
    ctx: &TransitionContext,
) -> Result<(), TransitionError> {
    if !from.can_transition_to(to) {
        return Err(TransitionError::IllegalTransition { from, to });
    }
    if to.requires_reason() && ctx.reason().is_none() {
        return Err(TransitionError::MissingReason { to });
    }
    if to.requires_sector() && ctx.sector_id.is_none() {
        return Err(TransitionError::MissingSector { to });
    }
    if to == SealStatus::Linked && ctx.shipment_id.is_none() {
        return Err(TransitionError::MissingShipment);
    }
    Ok(())
}

// ─── Seal ────────────────────────────────────────────────────────────

/// A uniquely numbered tamper-evident seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seal {
    code: SealCode,
    prefix: Prefix,
    suffix: u64,
    lot_number: Option<LotNumber>,
    status: SealStatus,
    sector_id: Option<SectorId>,
    shipment_id: Option<ShipmentId>,
    destruction_reason: Option<String>,
    history: Vec<HistoryEntry>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Seal {
    /// A freshly generated seal in `available`.
    ///
    /// Callers are expected to have validated `suffix` against the prefix's
    /// sequence first.
    pub fn generated(
        prefix: Prefix,
        suffix: u64,
        code_width: usize,
        lot_number: Option<LotNumber>,
        at: Timestamp,
    ) -> Self {
        let code = SealCode::compose(&prefix, suffix, code_width);
        let detail = match &lot_number {
            Some(lot) => format!("generated in lot {lot}"),
            None => "generated without lot".to_string(),
        };
        Self {
            code,
            prefix,
            suffix,
            lot_number,
            status: SealStatus::Available,
            sector_id: None,
            shipment_id: None,
            destruction_reason: None,
            history: vec![HistoryEntry {
                timestamp: at,
                action: HistoryAction::Created,
                detail,
            }],
            created_at: at,
            updated_at: at,
        }
    }

    pub fn code(&self) -> &SealCode {
        &self.code
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn suffix(&self) -> u64 {
        self.suffix
    }

    pub fn lot_number(&self) -> Option<&LotNumber> {
        self.lot_number.as_ref()
    }

    pub fn status(&self) -> SealStatus {
        self.status
    }

    pub fn sector_id(&self) -> Option<&SectorId> {
        self.sector_id.as_ref()
    }

    pub fn shipment_id(&self) -> Option<&ShipmentId> {
        self.shipment_id.as_ref()
    }

    pub fn destruction_reason(&self) -> Option<&str> {
        self.destruction_reason.as_deref()
    }

    /// Ordered audit trail, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Whether the seal is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply `to` and return the updated record; `self` is left untouched.
    pub fn transition(
        &self,
        to: SealStatus,
        ctx: &TransitionContext,
        at: Timestamp,
    ) -> Result<Seal, TransitionError> {
        validate_transition(self.status, to, ctx)?;

        let from = self.status;
        let mut next = self.clone();
        let mut detail = format!("{from} -> {to}");

        match to {
            SealStatus::Assigned | SealStatus::Reserved => {
                next.sector_id = ctx.sector_id.clone();
            }
            SealStatus::Linked => {
                next.shipment_id = ctx.shipment_id.clone();
                if let Some(sector) = &ctx.sector_id {
                    next.sector_id = Some(sector.clone());
                }
            }
            SealStatus::Available => {
                next.sector_id = None;
                next.shipment_id = None;
            }
            SealStatus::Lost | SealStatus::Damaged | SealStatus::Destroyed => {
                next.destruction_reason = ctx.reason().map(str::to_string);
            }
            SealStatus::Used => {}
        }

        if let Some(sector) = &next.sector_id {
            if to.requires_sector() || to == SealStatus::Linked {
                detail.push_str(&format!(" sector={sector}"));
            }
        }
        if let (SealStatus::Linked, Some(shipment)) = (to, &next.shipment_id) {
            detail.push_str(&format!(" shipment={shipment}"));
        }
        if let Some(reason) = ctx.reason().filter(|_| to.requires_reason()) {
            detail.push_str(&format!(" reason: {reason}"));
        }

        next.status = to;
        next.updated_at = at;
        next.history.push(HistoryEntry {
            timestamp: at,
            action: HistoryAction::StatusChange,
            detail,
        });
        Ok(next)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
