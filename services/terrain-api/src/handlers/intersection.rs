//! Raycast intersection handler.

use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use dem_common::DemError;
use raycast::RayHit;

use crate::handlers::{error_response, CALL_TIMEOUT};
use crate::service::{parse_quat, search_intersection, IntersectionRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IntersectionQuery {
    pub cam_lat: f64,
    pub cam_lon: f64,
    pub cam_alt: f64,
    /// `w,x,y,z`
    pub quat: String,
    pub z: Option<u32>,
    pub step: Option<f64>,
    pub max_dist: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct IntersectionBody {
    pub lat: f64,
    pub lon: f64,
    pub ground: f64,
    pub hit: bool,
}

impl From<RayHit> for IntersectionBody {
    fn from(hit: RayHit) -> Self {
        IntersectionBody {
            lat: hit.lat,
            lon: hit.lon,
            ground: hit.ground,
            hit: hit.hit,
        }
    }
}

/// GET /intersection?cam_lat=&cam_lon=&cam_alt=&quat=w,x,y,z&z=&step=&max_dist=
pub async fn intersection_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<IntersectionQuery>,
) -> Response {
    let quat = match parse_quat(&params.quat) {
        Ok(quat) => quat,
        Err(err) => return error_response(&err),
    };

    let request = IntersectionRequest {
        cam_lat: params.cam_lat,
        cam_lon: params.cam_lon,
        cam_alt: params.cam_alt,
        quat,
        zoom: params.z,
        step_m: params.step,
        max_dist_m: params.max_dist,
    };

    let search = search_intersection(
        Some(state.store.clone()),
        state.geoid.as_deref(),
        request,
    );

    match tokio::time::timeout(CALL_TIMEOUT, search).await {
        Ok(Ok(hit)) => Json(IntersectionBody::from(hit)).into_response(),
        Ok(Err(err)) => error_response(&err),
        Err(_) => error_response(&DemError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_shape_matches_the_contract() {
        let body = IntersectionBody::from(RayHit {
            lat: 25.001,
            lon: 55.729,
            ground: 102.5,
            hit: true,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["lat"], 25.001);
        assert_eq!(json["lon"], 55.729);
        assert_eq!(json["ground"], 102.5);
        assert_eq!(json["hit"], true);
    }
}
