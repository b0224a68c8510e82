//! # Extractors
//!
//! Helpers for turning raw request input into validated domain values.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;

use seal_core::{LotNumber, SectorId};

use crate::error::AppError;

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract query parameters, mapping parse errors to [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Blank or absent lot input means "no lot".
pub fn optional_lot(raw: Option<&str>) -> Result<Option<LotNumber>, AppError> {
    match raw {
        Some(raw) => Ok(LotNumber::optional(raw)?),
        None => Ok(None),
    }
}

/// Blank or absent sector input means "no sector".
pub fn optional_sector(raw: Option<&str>) -> Result<Option<SectorId>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Ok(Some(SectorId::new(raw)?)),
        None => Ok(None),
    }
}
