//! # Distribution Routes
//!
//! Hand available stock to sectors, either a fixed quantity to one sector
//! or an even split across several. Commits are per seal: a response may
//! list seals that were assigned alongside seals that failed.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use seal_core::SectorId;
use seal_registry::{AssignmentMode, DistributionOutcome, Plan};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualDistributionRequest {
    pub sector_id: String,
    /// Must be positive and no larger than the available stock.
    pub quantity: i64,
    /// `assign` (default) or `reserve`.
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AutoDistributionRequest {
    /// Distinct, known sectors; at least two.
    pub sector_ids: Vec<String>,
    /// Cap on the number of seals distributed; defaults to all available.
    pub limit: Option<usize>,
    /// `assign` (default) or `reserve`. Ignored by the preview.
    pub mode: Option<String>,
}

/// One sector's share.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AllocationResponse {
    pub sector_id: String,
    pub quantity: usize,
}

/// A seal the distribution could not commit.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FailedSealResponse {
    pub code: String,
    pub kind: String,
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DistributionResponse {
    pub mode: String,
    pub plan: Vec<AllocationResponse>,
    /// Codes moved out of stock, in commit order.
    pub assigned: Vec<String>,
    pub failed: Vec<FailedSealResponse>,
}

impl DistributionResponse {
    fn from_outcome(outcome: &DistributionOutcome) -> Self {
        Self {
            mode: match outcome.mode {
                AssignmentMode::Assign => "assign".to_string(),
                AssignmentMode::Reserve => "reserve".to_string(),
            },
            plan: allocations(&outcome.plan),
            assigned: outcome.assigned().iter().map(|c| c.to_string()).collect(),
            failed: outcome
                .report
                .failed
                .iter()
                .map(|f| FailedSealResponse {
                    code: f.code.to_string(),
                    kind: f.kind.clone(),
                    message: f.message.clone(),
                    retryable: f.retryable,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub plan: Vec<AllocationResponse>,
    pub total: usize,
}

fn allocations(plan: &Plan) -> Vec<AllocationResponse> {
    plan.allocations
        .iter()
        .map(|a| AllocationResponse {
            sector_id: a.sector_id.to_string(),
            quantity: a.quantity,
        })
        .collect()
}

fn parse_mode(raw: Option<&str>) -> Result<AssignmentMode, AppError> {
    match raw {
        Some(raw) => raw.parse().map_err(AppError::Validation),
        None => Ok(AssignmentMode::default()),
    }
}

fn sector_ids(raw: &[String]) -> Result<Vec<SectorId>, AppError> {
    raw.iter()
        .map(|s| SectorId::new(s).map_err(AppError::from))
        .collect()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/distributions/manual", post(distribute_manual))
        .route("/v1/distributions/auto", post(distribute_auto))
        .route("/v1/distributions/auto/preview", post(preview_auto))
}

/// POST /v1/distributions/manual: Give one sector a fixed number of seals.
#[utoipa::path(
    post,
    path = "/v1/distributions/manual",
    request_body = ManualDistributionRequest,
    responses(
        (status = 200, description = "Distribution committed, possibly partially", body = DistributionResponse),
        (status = 404, description = "Unknown sector", body = crate::error::ErrorBody),
        (status = 409, description = "Not enough stock", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid quantity", body = crate::error::ErrorBody),
    ),
    tag = "distributions"
)]
pub(crate) async fn distribute_manual(
    State(state): State<AppState>,
    body: Result<Json<ManualDistributionRequest>, JsonRejection>,
) -> Result<Json<DistributionResponse>, AppError> {
    let req = extract_json(body)?;
    let sector = SectorId::new(&req.sector_id)?;
    let mode = parse_mode(req.mode.as_deref())?;
    let outcome = state.registry.distribute_manual(sector, req.quantity, mode)?;
    Ok(Json(DistributionResponse::from_outcome(&outcome)))
}

/// POST /v1/distributions/auto: Split stock evenly across sectors.
#[utoipa::path(
    post,
    path = "/v1/distributions/auto",
    request_body = AutoDistributionRequest,
    responses(
        (status = 200, description = "Distribution committed, possibly partially", body = DistributionResponse),
        (status = 404, description = "Unknown sector", body = crate::error::ErrorBody),
        (status = 422, description = "Fewer than two sectors or duplicate sectors", body = crate::error::ErrorBody),
    ),
    tag = "distributions"
)]
pub(crate) async fn distribute_auto(
    State(state): State<AppState>,
    body: Result<Json<AutoDistributionRequest>, JsonRejection>,
) -> Result<Json<DistributionResponse>, AppError> {
    let req = extract_json(body)?;
    let sectors = sector_ids(&req.sector_ids)?;
    let mode = parse_mode(req.mode.as_deref())?;
    let outcome = state.registry.distribute_auto(&sectors, req.limit, mode)?;
    Ok(Json(DistributionResponse::from_outcome(&outcome)))
}

/// POST /v1/distributions/auto/preview: The split an auto distribution would make.
#[utoipa::path(
    post,
    path = "/v1/distributions/auto/preview",
    request_body = AutoDistributionRequest,
    responses(
        (status = 200, description = "Planned split", body = PlanResponse),
        (status = 404, description = "Unknown sector", body = crate::error::ErrorBody),
        (status = 422, description = "Fewer than two sectors or duplicate sectors", body = crate::error::ErrorBody),
    ),
    tag = "distributions"
)]
pub(crate) async fn preview_auto(
    State(state): State<AppState>,
    body: Result<Json<AutoDistributionRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, AppError> {
    let req = extract_json(body)?;
    let sectors = sector_ids(&req.sector_ids)?;
    let plan = state.registry.preview_auto(&sectors, req.limit)?;
    Ok(Json(PlanResponse {
        total: plan.total(),
        plan: allocations(&plan),
    }))
}
