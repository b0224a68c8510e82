//! # Seal Routes
//!
//! Generation, listing, single-seal reads, status transitions, and
//! individual close-out.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use seal_core::{Prefix, SealCode, ShipmentId};
use seal_registry::{Page, SealFilter, SealView};
use seal_state::{CloseOutStatus, SealStatus, TransitionContext};

use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, optional_lot, optional_sector};
use crate::state::AppState;

// ── DTOs ─────────────────────────────────────────────────────────────

/// One entry of a seal's audit trail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub timestamp: String,
    pub action: String,
    pub detail: String,
}

/// A seal as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SealResponse {
    pub code: String,
    pub prefix: String,
    pub suffix: u64,
    pub lot_number: Option<String>,
    /// Stored lifecycle status.
    pub status: String,
    /// Status shown to operators (reserved seals held by a sector read as assigned).
    pub display_status: String,
    pub display_label: String,
    pub sector_id: Option<String>,
    pub sector_name: Option<String>,
    pub shipment_id: Option<String>,
    pub destruction_reason: Option<String>,
    pub history: Vec<HistoryEntryResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl SealResponse {
    pub fn from_view(view: &SealView) -> Self {
        let seal = &view.seal;
        Self {
            code: seal.code().to_string(),
            prefix: seal.prefix().to_string(),
            suffix: seal.suffix(),
            lot_number: seal.lot_number().map(|l| l.to_string()),
            status: seal.status().as_str().to_string(),
            display_status: view.display_status.as_str().to_string(),
            display_label: view.display_label.clone(),
            sector_id: seal.sector_id().map(|s| s.to_string()),
            sector_name: view.sector_name.clone(),
            shipment_id: seal.shipment_id().map(|s| s.to_string()),
            destruction_reason: seal.destruction_reason().map(str::to_string),
            history: seal
                .history()
                .iter()
                .map(|h| HistoryEntryResponse {
                    timestamp: h.timestamp.to_iso8601(),
                    action: h.action.as_str().to_string(),
                    detail: h.detail.clone(),
                })
                .collect(),
            created_at: seal.created_at().to_iso8601(),
            updated_at: seal.updated_at().to_iso8601(),
        }
    }
}

/// Listing filters and pagination.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSealsQuery {
    /// Stored status (available, assigned, reserved, linked, used, lost, damaged, destroyed).
    pub status: Option<String>,
    pub sector_id: Option<String>,
    /// Case-insensitive match on code or lot number.
    pub search: Option<String>,
    pub lot: Option<String>,
    /// 1-based page number (default 1).
    pub page: Option<usize>,
    /// Page size (default 24, max 1000).
    pub limit: Option<usize>,
}

/// One page of seals.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SealPageResponse {
    pub items: Vec<SealResponse>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl SealPageResponse {
    fn from_page(page: &Page<SealView>) -> Self {
        Self {
            items: page.items.iter().map(SealResponse::from_view).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        }
    }
}

/// Request to generate a contiguous batch of seals.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Code prefix; trimmed and upper-cased.
    pub prefix: String,
    /// First suffix; must equal the prefix's next number.
    pub start: u64,
    /// Last suffix, inclusive.
    pub end: u64,
    /// Optional lot number; blank means none.
    pub lot_number: Option<String>,
}

/// Codes created by a generation request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub prefix: String,
    pub lot_number: Option<String>,
    pub created: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextNumberQuery {
    pub prefix: String,
}

/// Where the next generation batch for a prefix must start.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NextNumberResponse {
    pub prefix: String,
    pub next_number: u64,
    /// Code the next seal would receive.
    pub next_code: String,
}

/// Request to move a seal to another status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    pub target_status: String,
    /// Required for assigned and reserved.
    pub sector_id: Option<String>,
    /// Required for linked.
    pub shipment_id: Option<String>,
    /// Required for lost, damaged, and destroyed.
    pub reason: Option<String>,
}

/// Request to close out one seal.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DestroySealRequest {
    pub reason: String,
    /// lost, damaged, or destroyed (default destroyed).
    pub target_status: Option<String>,
}

// ── Router ───────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/seals", get(list_seals))
        .route("/v1/seals/generate", post(generate_seals))
        .route("/v1/seals/next-number", get(next_number))
        .route("/v1/seals/{code}", get(get_seal))
        .route("/v1/seals/{code}/transition", post(transition_seal))
        .route("/v1/seals/{code}/destroy", post(destroy_seal))
}

/// GET /v1/seals: List seals, newest first.
#[utoipa::path(
    get,
    path = "/v1/seals",
    params(ListSealsQuery),
    responses(
        (status = 200, description = "Page of seals", body = SealPageResponse),
        (status = 422, description = "Invalid filter", body = crate::error::ErrorBody),
    ),
    tag = "seals"
)]
pub(crate) async fn list_seals(
    State(state): State<AppState>,
    query: Result<Query<ListSealsQuery>, QueryRejection>,
) -> Result<Json<SealPageResponse>, AppError> {
    let q = extract_query(query)?;
    let status = match q.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<SealStatus>()?),
        None => None,
    };
    let filter = SealFilter {
        status,
        sector_id: optional_sector(q.sector_id.as_deref())?,
        lot: optional_lot(q.lot.as_deref())?,
        search: q.search,
        page: q.page,
        limit: q.limit,
    };
    let page = state.registry.list(&filter)?;
    Ok(Json(SealPageResponse::from_page(&page)))
}

/// GET /v1/seals/{code}: Fetch one seal.
#[utoipa::path(
    get,
    path = "/v1/seals/{code}",
    params(("code" = String, Path, description = "Seal code")),
    responses(
        (status = 200, description = "Seal found", body = SealResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "seals"
)]
pub(crate) async fn get_seal(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SealResponse>, AppError> {
    let code = SealCode::new(&code)?;
    let view = state.registry.get(&code)?;
    Ok(Json(SealResponse::from_view(&view)))
}

/// POST /v1/seals/generate: Create a contiguous batch of seals.
#[utoipa::path(
    post,
    path = "/v1/seals/generate",
    request_body = GenerateRequest,
    responses(
        (status = 201, description = "Seals created", body = GenerateResponse),
        (status = 409, description = "Range does not continue the sequence", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid prefix or range", body = crate::error::ErrorBody),
    ),
    tag = "seals"
)]
pub(crate) async fn generate_seals(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let req = extract_json(body)?;
    let prefix = Prefix::new(&req.prefix)?;
    let lot = optional_lot(req.lot_number.as_deref())?;
    let generated = state.registry.generate(prefix, req.start, req.end, lot)?;
    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            prefix: generated.prefix.to_string(),
            lot_number: generated.lot_number.map(|l| l.to_string()),
            created: generated.created.iter().map(|c| c.to_string()).collect(),
        }),
    ))
}

/// GET /v1/seals/next-number: Next expected suffix for a prefix.
#[utoipa::path(
    get,
    path = "/v1/seals/next-number",
    params(NextNumberQuery),
    responses(
        (status = 200, description = "Next number", body = NextNumberResponse),
        (status = 422, description = "Invalid prefix", body = crate::error::ErrorBody),
    ),
    tag = "seals"
)]
pub(crate) async fn next_number(
    State(state): State<AppState>,
    query: Result<Query<NextNumberQuery>, QueryRejection>,
) -> Result<Json<NextNumberResponse>, AppError> {
    let q = extract_query(query)?;
    let prefix = Prefix::new(&q.prefix)?;
    let next = state.registry.next_number(&prefix)?;
    let next_code = SealCode::compose(&prefix, next, state.registry.config().code_width);
    Ok(Json(NextNumberResponse {
        prefix: prefix.to_string(),
        next_number: next,
        next_code: next_code.to_string(),
    }))
}

/// POST /v1/seals/{code}/transition: Apply a lifecycle transition.
#[utoipa::path(
    post,
    path = "/v1/seals/{code}/transition",
    params(("code" = String, Path, description = "Seal code")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied", body = SealResponse),
        (status = 404, description = "Seal or sector not found", body = crate::error::ErrorBody),
        (status = 409, description = "Transition not allowed from the current status", body = crate::error::ErrorBody),
        (status = 422, description = "Missing sector, shipment, or reason", body = crate::error::ErrorBody),
        (status = 503, description = "Concurrent modification, retry", body = crate::error::ErrorBody),
    ),
    tag = "seals"
)]
pub(crate) async fn transition_seal(
    State(state): State<AppState>,
    Path(code): Path<String>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<SealResponse>, AppError> {
    let req = extract_json(body)?;
    let code = SealCode::new(&code)?;
    let target: SealStatus = req.target_status.parse()?;
    let ctx = TransitionContext {
        sector_id: optional_sector(req.sector_id.as_deref())?,
        shipment_id: match req.shipment_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(ShipmentId::new(raw)?),
            None => None,
        },
        reason: req.reason,
    };
    let seal = state.registry.transition(&code, target, &ctx)?;
    Ok(Json(SealResponse::from_view(&state.registry.view(seal))))
}

/// POST /v1/seals/{code}/destroy: Close out one seal as lost, damaged, or destroyed.
#[utoipa::path(
    post,
    path = "/v1/seals/{code}/destroy",
    params(("code" = String, Path, description = "Seal code")),
    request_body = DestroySealRequest,
    responses(
        (status = 200, description = "Seal closed out", body = SealResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Seal is used or already closed", body = crate::error::ErrorBody),
        (status = 422, description = "Missing reason", body = crate::error::ErrorBody),
    ),
    tag = "seals"
)]
pub(crate) async fn destroy_seal(
    State(state): State<AppState>,
    Path(code): Path<String>,
    body: Result<Json<DestroySealRequest>, JsonRejection>,
) -> Result<Json<SealResponse>, AppError> {
    let req = extract_json(body)?;
    let code = SealCode::new(&code)?;
    let target = match req.target_status.as_deref() {
        Some(raw) => raw.parse::<CloseOutStatus>()?,
        None => CloseOutStatus::default(),
    };
    let seal = state.registry.destroy_single(&code, &req.reason, target)?;
    Ok(Json(SealResponse::from_view(&state.registry.view(seal))))
}
