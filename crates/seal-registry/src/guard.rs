//! # Lot Destruction Guard
//!
//! A lot may be destroyed only while every member is still in stock:
//! status `available` with no sector and no shipment. One distributed
//! seal blocks the whole lot.

use seal_core::{LotNumber, SealCode};
use seal_state::{Seal, SealStatus};

use crate::error::GuardError;

/// Whether a seal counts as still in stock for lot destruction.
pub fn is_in_stock(seal: &Seal) -> bool {
    seal.status() == SealStatus::Available
        && seal.sector_id().is_none()
        && seal.shipment_id().is_none()
}

/// Codes of the members of `lot`, lowest suffix first, if all are in stock.
pub fn can_destroy_lot(lot: &LotNumber, seals: &[Seal]) -> Result<Vec<SealCode>, GuardError> {
    let mut members: Vec<&Seal> = seals
        .iter()
        .filter(|s| s.lot_number() == Some(lot))
        .collect();
    if members.is_empty() {
        return Err(GuardError::LotNotFound { lot: lot.clone() });
    }
    members.sort_by(|a, b| (a.prefix(), a.suffix()).cmp(&(b.prefix(), b.suffix())));

    let offending: Vec<&&Seal> = members.iter().filter(|s| !is_in_stock(s)).collect();
    if let Some(first) = offending.first() {
        return Err(GuardError::LotHasDistributedSeals {
            lot: lot.clone(),
            distributed: offending.len(),
            total: members.len(),
            first: first.code().clone(),
        });
    }
    Ok(members.into_iter().map(|s| s.code().clone()).collect())
}
