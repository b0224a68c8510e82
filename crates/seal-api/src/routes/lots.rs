//! # Lot Routes
//!
//! Lot overview and whole-lot destruction. A lot is destroyed only while
//! every one of its seals is still in stock; otherwise nothing changes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use seal_core::LotNumber;
use seal_registry::LotSummary;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LotSummaryResponse {
    pub lot_number: String,
    pub total: usize,
    /// Seals that have left stock.
    pub distributed: usize,
    pub destroyed: usize,
    pub destroyable: bool,
}

impl From<&LotSummary> for LotSummaryResponse {
    fn from(s: &LotSummary) -> Self {
        Self {
            lot_number: s.lot_number.to_string(),
            total: s.total,
            distributed: s.distributed,
            destroyed: s.destroyed,
            destroyable: s.destroyable,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DestroyLotRequest {
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DestroyLotResponse {
    pub lot_number: String,
    /// Codes destroyed, lowest first.
    pub destroyed: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/lots", get(list_lots))
        .route("/v1/lots/{lot}/destroy", post(destroy_lot))
}

/// GET /v1/lots: Every lot with its destruction eligibility.
#[utoipa::path(
    get,
    path = "/v1/lots",
    responses(
        (status = 200, description = "Lot summaries ordered by lot number", body = Vec<LotSummaryResponse>),
    ),
    tag = "lots"
)]
pub(crate) async fn list_lots(
    State(state): State<AppState>,
) -> Result<Json<Vec<LotSummaryResponse>>, AppError> {
    let lots = state.registry.lot_summaries()?;
    Ok(Json(lots.iter().map(LotSummaryResponse::from).collect()))
}

/// POST /v1/lots/{lot}/destroy: Destroy every seal of a lot.
#[utoipa::path(
    post,
    path = "/v1/lots/{lot}/destroy",
    params(("lot" = String, Path, description = "Lot number")),
    request_body = DestroyLotRequest,
    responses(
        (status = 200, description = "Lot destroyed", body = DestroyLotResponse),
        (status = 404, description = "Lot not found", body = crate::error::ErrorBody),
        (status = 409, description = "Lot has distributed seals", body = crate::error::ErrorBody),
        (status = 422, description = "Missing reason", body = crate::error::ErrorBody),
        (status = 503, description = "Lot changed concurrently, retry", body = crate::error::ErrorBody),
    ),
    tag = "lots"
)]
pub(crate) async fn destroy_lot(
    State(state): State<AppState>,
    Path(lot): Path<String>,
    body: Result<Json<DestroyLotRequest>, JsonRejection>,
) -> Result<Json<DestroyLotResponse>, AppError> {
    let req = extract_json(body)?;
    let lot = LotNumber::new(&lot)?;
    let report = state.registry.destroy_lot(&lot, &req.reason)?;
    Ok(Json(DestroyLotResponse {
        lot_number: lot.to_string(),
        destroyed: report.succeeded.iter().map(|c| c.to_string()).collect(),
    }))
}
