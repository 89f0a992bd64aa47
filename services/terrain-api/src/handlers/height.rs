//! Height lookup handler.

use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use dem_common::DemError;
use dem_store::HeightSample;

use crate::handlers::{error_response, CALL_TIMEOUT};
use crate::service::{pick_height, HeightRequest};
use crate::state::AppState;

/// Query parameters for /height. Malformed numbers are rejected by the
/// extractor with a 400 before the handler body runs.
#[derive(Debug, Deserialize)]
pub struct HeightQuery {
    pub lat: f64,
    pub lon: f64,
    pub z: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TileBody {
    pub z: u32,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Serialize)]
pub struct HeightBody {
    pub lat: f64,
    pub lon: f64,
    pub height: f64,
    pub tile: TileBody,
    pub tile_source: String,
    pub grid_size: usize,
}

impl From<HeightSample> for HeightBody {
    fn from(sample: HeightSample) -> Self {
        HeightBody {
            lat: sample.lat,
            lon: sample.lon,
            height: sample.height,
            tile: TileBody {
                z: sample.meta.z,
                x: sample.meta.x,
                y: sample.meta.y,
            },
            tile_source: sample.meta.source.to_string(),
            grid_size: sample.meta.grid_size,
        }
    }
}

/// GET /height?lat=&lon=&z=
pub async fn height_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HeightQuery>,
) -> Response {
    let request = HeightRequest {
        lat: params.lat,
        lon: params.lon,
        zoom: params.z,
    };

    match tokio::time::timeout(CALL_TIMEOUT, pick_height(&state.store, request)).await {
        Ok(Ok(sample)) => Json(HeightBody::from(sample)).into_response(),
        Ok(Err(err)) => error_response(&err),
        Err(_) => error_response(&DemError::Timeout),
    }
}
