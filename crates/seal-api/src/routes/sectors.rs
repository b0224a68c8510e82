//! Seals held by a sector.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use seal_core::SectorId;
use seal_state::SectorAvailability;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SectorSealResponse {
    pub code: String,
    pub lot_number: Option<String>,
    pub status: String,
    /// True while the seal can still be linked to a shipment.
    pub usable: bool,
    pub label: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/sectors/{sector_id}/seals", get(sector_seals))
}

/// GET /v1/sectors/{sector_id}/seals: Stock held by one sector.
#[utoipa::path(
    get,
    path = "/v1/sectors/{sector_id}/seals",
    params(("sector_id" = String, Path, description = "Sector identifier")),
    responses(
        (status = 200, description = "Seals held by the sector", body = Vec<SectorSealResponse>),
        (status = 404, description = "Unknown sector", body = crate::error::ErrorBody),
    ),
    tag = "sectors"
)]
pub(crate) async fn sector_seals(
    State(state): State<AppState>,
    Path(sector_id): Path<String>,
) -> Result<Json<Vec<SectorSealResponse>>, AppError> {
    let sector = SectorId::new(&sector_id)?;
    let held = state.registry.sector_stock(&sector)?;
    Ok(Json(
        held.into_iter()
            .map(|s| SectorSealResponse {
                code: s.code.to_string(),
                lot_number: s.lot_number.map(|l| l.to_string()),
                status: s.status.as_str().to_string(),
                usable: s.availability == SectorAvailability::Usable,
                label: s.label,
            })
            .collect(),
    ))
}
