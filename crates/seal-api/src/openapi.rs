//! # OpenAPI Specification Assembly
//!
//! Collects every documented route into one OpenAPI document served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Seal Registry API",
        version = "0.1.0",
        description = "Tamper-seal lifecycle and distribution: sequential generation, sector distribution, status transitions, and lot destruction.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Seals
        crate::routes::seals::list_seals,
        crate::routes::seals::get_seal,
        crate::routes::seals::generate_seals,
        crate::routes::seals::next_number,
        crate::routes::seals::transition_seal,
        crate::routes::seals::destroy_seal,
        // Distributions
        crate::routes::distributions::distribute_manual,
        crate::routes::distributions::distribute_auto,
        crate::routes::distributions::preview_auto,
        // Lots
        crate::routes::lots::list_lots,
        crate::routes::lots::destroy_lot,
        // Sectors
        crate::routes::sectors::sector_seals,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::seals::SealResponse,
        crate::routes::seals::HistoryEntryResponse,
        crate::routes::seals::SealPageResponse,
        crate::routes::seals::GenerateRequest,
        crate::routes::seals::GenerateResponse,
        crate::routes::seals::NextNumberResponse,
        crate::routes::seals::TransitionRequest,
        crate::routes::seals::DestroySealRequest,
        crate::routes::distributions::ManualDistributionRequest,
        crate::routes::distributions::AutoDistributionRequest,
        crate::routes::distributions::AllocationResponse,
        crate::routes::distributions::FailedSealResponse,
        crate::routes::distributions::DistributionResponse,
        crate::routes::distributions::PlanResponse,
        crate::routes::lots::LotSummaryResponse,
        crate::routes::lots::DestroyLotRequest,
        crate::routes::lots::DestroyLotResponse,
        crate::routes::sectors::SectorSealResponse,
    )),
    tags(
        (name = "seals", description = "Generation, lookup, and lifecycle transitions"),
        (name = "distributions", description = "Handing stock to sectors"),
        (name = "lots", description = "Lot overview and destruction"),
        (name = "sectors", description = "Per-sector stock"),
    )
)]
pub struct ApiDoc;

/// Serves the spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
