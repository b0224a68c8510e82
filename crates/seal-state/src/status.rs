//! # Seal Status and Transition Table
//!
//! ```text
//! available  → {assigned, reserved, linked, damaged, lost, destroyed}
//! reserved   → {linked, available}
//! assigned   → {linked, available}
//! linked     → {used, lost, damaged}
//! used       → {}                      (terminal)
//! lost       → {destroyed}
//! damaged    → {destroyed}
//! destroyed  → {}                      (terminal)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The lifecycle status of a seal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SealStatus {
    /// In stock, owned by nobody.
    Available,
    /// Handed to a sector for use.
    Assigned,
    /// Set aside for a sector.
    Reserved,
    /// Bound to a shipment.
    Linked,
    /// Applied to a shipment and broken on receipt (terminal).
    Used,
    /// Reported missing.
    Lost,
    /// Physically unusable.
    Damaged,
    /// Closed out permanently (terminal).
    Destroyed,
}

impl SealStatus {
    /// Every status, in declaration order.
    pub const ALL: [SealStatus; 8] = [
        Self::Available,
        Self::Assigned,
        Self::Reserved,
        Self::Linked,
        Self::Used,
        Self::Lost,
        Self::Damaged,
        Self::Destroyed,
    ];

    /// Statuses reachable from `self` in one step.
    pub fn allowed_targets(self) -> &'static [SealStatus] {
        use SealStatus::*;
        match self {
            Available => &[Assigned, Reserved, Linked, Damaged, Lost, Destroyed],
            Reserved => &[Linked, Available],
            Assigned => &[Linked, Available],
            Linked => &[Used, Lost, Damaged],
            Used => &[],
            Lost => &[Destroyed],
            Damaged => &[Destroyed],
            Destroyed => &[],
        }
    }

    /// Whether `self → to` is an edge of the table.
    pub fn can_transition_to(self, to: SealStatus) -> bool {
        self.allowed_targets().contains(&to)
    }

    /// No outgoing edges.
    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Entering this status requires a destruction reason.
    pub fn requires_reason(self) -> bool {
        matches!(self, Self::Lost | Self::Damaged | Self::Destroyed)
    }

    /// Entering this status requires a sector reference.
    pub fn requires_sector(self) -> bool {
        matches!(self, Self::Assigned | Self::Reserved)
    }

    /// Wire name (snake_case).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Assigned => "assigned",
            Self::Reserved => "reserved",
            Self::Linked => "linked",
            Self::Used => "used",
            Self::Lost => "lost",
            Self::Damaged => "damaged",
            Self::Destroyed => "destroyed",
        }
    }

    /// Upper-case label shown to operators.
    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Assigned => "ASSIGNED",
            Self::Reserved => "RESERVED",
            Self::Linked => "LINKED",
            Self::Used => "USED",
            Self::Lost => "LOST",
            Self::Damaged => "DAMAGED",
            Self::Destroyed => "DESTROYED",
        }
    }
}

impl std::fmt::Display for SealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized status name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown seal status {0:?}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for SealStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == needle)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Target of an individual close-out: the three statuses that need a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseOutStatus {
    Lost,
    Damaged,
    Destroyed,
}

impl Default for CloseOutStatus {
    fn default() -> Self {
        Self::Destroyed
    }
}

impl From<CloseOutStatus> for SealStatus {
    fn from(value: CloseOutStatus) -> Self {
        match value {
            CloseOutStatus::Lost => SealStatus::Lost,
            CloseOutStatus::Damaged => SealStatus::Damaged,
            CloseOutStatus::Destroyed => SealStatus::Destroyed,
        }
    }
}

impl std::str::FromStr for CloseOutStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<SealStatus>()? {
            SealStatus::Lost => Ok(Self::Lost),
            SealStatus::Damaged => Ok(Self::Damaged),
            SealStatus::Destroyed => Ok(Self::Destroyed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}
