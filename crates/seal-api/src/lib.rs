//! # seal-api: HTTP Surface for the Seal Registry
//!
//! ## API Surface
//!
//! | Prefix                 | Module                       | Domain                 |
//! |------------------------|------------------------------|------------------------|
//! | `/v1/seals/*`          | [`routes::seals`]            | Generation, transitions |
//! | `/v1/distributions/*`  | [`routes::distributions`]    | Sector distribution    |
//! | `/v1/lots/*`           | [`routes::lots`]             | Lot destruction        |
//! | `/v1/sectors/*`        | [`routes::sectors`]          | Sector stock           |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! Handlers call the registry synchronously. Its locks are bounded by the
//! configured store timeout, so a handler never parks a worker indefinitely.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::seals::router())
        .merge(routes::distributions::router())
        .merge(routes::lots::router())
        .merge(routes::sectors::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http());

    let ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(prometheus_metrics));

    Router::new().merge(ops).merge(api).with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

/// Prometheus text exposition; 404 when no recorder was installed.
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
