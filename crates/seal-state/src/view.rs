//! # Read-Side Projections
//!
//! Operators see a reserved seal that already belongs to a sector as
//! "assigned". That reclassification lives here and only here: the stored
//! status stays `reserved` and the transition table is unaware of it.

use serde::{Deserialize, Serialize};

use crate::seal::Seal;
use crate::status::SealStatus;

/// Status as presented to external observers.
pub fn display_status(seal: &Seal) -> SealStatus {
    match seal.status() {
        SealStatus::Reserved if seal.sector_id().is_some() => SealStatus::Assigned,
        other => other,
    }
}

/// Upper-case label of [`display_status`].
pub fn display_label(seal: &Seal) -> &'static str {
    display_status(seal).label()
}

/// Whether a seal held by a sector can still be put on a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorAvailability {
    /// Assigned to the sector and not yet linked.
    Usable,
    /// Reserved, linked, used, or closed out.
    Unavailable,
}

impl SectorAvailability {
    /// Label shown next to the seal in the sector's stock list.
    pub fn label(self) -> &'static str {
        match self {
            Self::Usable => "Available",
            Self::Unavailable => "Used / Unavailable",
        }
    }
}

/// Availability of a sector-held seal for new shipments.
pub fn sector_availability(seal: &Seal) -> SectorAvailability {
    if seal.status() == SealStatus::Assigned && seal.shipment_id().is_none() {
        SectorAvailability::Usable
    } else {
        SectorAvailability::Unavailable
    }
}
