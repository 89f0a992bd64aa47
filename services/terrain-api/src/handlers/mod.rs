//! HTTP request handlers.

pub mod health;
pub mod height;
pub mod intersection;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use std::time::Duration;

use dem_common::DemError;

/// Deadline for one HTTP call, lookup or march included.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON error body: the stable kind plus human-readable detail.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

pub fn error_response(err: &DemError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorBody {
            error: err.kind(),
            detail: err.to_string(),
        }),
    )
        .into_response()
}
