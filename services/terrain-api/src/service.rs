//! Reusable dispatch for the two core operations.
//!
//! Both the CLI and the HTTP handlers funnel through these functions, which
//! own request validation and default backfill. No terrain logic lives here.

use std::sync::Arc;
use std::time::Duration;

use dem_common::{DemError, DemResult};
use dem_store::{HeightSample, TileStore};
use raycast::{Egm96, RayHit, RayParams, DEFAULT_MAX_DIST_M, DEFAULT_STEP_M};

use crate::dem_adapter::StoreElevationSource;

/// Deadline for one elevation sample inside a march.
pub const SAMPLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Parameters for a height lookup.
#[derive(Debug, Clone, Copy)]
pub struct HeightRequest {
    pub lat: f64,
    pub lon: f64,
    pub zoom: Option<u32>,
}

/// Parameters for a raycast intersection search.
#[derive(Debug, Clone, Copy)]
pub struct IntersectionRequest {
    pub cam_lat: f64,
    pub cam_lon: f64,
    /// Ellipsoidal (WGS-84) camera altitude, metres.
    pub cam_alt: f64,
    /// Quaternion `[w, x, y, z]`.
    pub quat: [f64; 4],
    pub zoom: Option<u32>,
    pub step_m: Option<f64>,
    pub max_dist_m: Option<f64>,
}

fn validate_lat_lon(lat: f64, lon: f64, lat_param: &str, lon_param: &str) -> DemResult<()> {
    if !(-90.0..=90.0).contains(&lat) || !lat.is_finite() {
        return Err(DemError::invalid_parameter(
            lat_param,
            format!("latitude {lat} outside [-90, 90]"),
        ));
    }
    if !(-180.0..=180.0).contains(&lon) || !lon.is_finite() {
        return Err(DemError::invalid_parameter(
            lon_param,
            format!("longitude {lon} outside [-180, 180]"),
        ));
    }
    Ok(())
}

/// Ground elevation at a point.
pub async fn pick_height(store: &TileStore, req: HeightRequest) -> DemResult<HeightSample> {
    validate_lat_lon(req.lat, req.lon, "lat", "lon")?;
    store.height(req.lat, req.lon, req.zoom).await
}

/// Raycast from the camera pose to the first terrain crossing.
pub async fn search_intersection(
    store: Option<Arc<TileStore>>,
    geoid: Option<&Egm96>,
    req: IntersectionRequest,
) -> DemResult<RayHit> {
    let store = store.ok_or(DemError::NoDem)?;
    validate_lat_lon(req.cam_lat, req.cam_lon, "cam_lat", "cam_lon")?;

    let zoom = req
        .zoom
        .filter(|z| *z > 0)
        .unwrap_or(store.config().default_zoom);

    let source = StoreElevationSource::new(store, zoom, SAMPLE_TIMEOUT);
    let params = RayParams {
        cam_lat: req.cam_lat,
        cam_lon: req.cam_lon,
        cam_alt: req.cam_alt,
        quat: req.quat,
        step_m: req.step_m.unwrap_or(DEFAULT_STEP_M),
        max_dist_m: req.max_dist_m.unwrap_or(DEFAULT_MAX_DIST_M),
    };

    Ok(raycast::intersect(&source, geoid, params).await)
}

/// Parse the `w,x,y,z` quaternion form used by both surfaces.
pub fn parse_quat(raw: &str) -> DemResult<[f64; 4]> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(str::trim)
        .map(|p| {
            p.parse::<f64>().map_err(|_| {
                DemError::invalid_parameter("quat", format!("'{p}' is not a number"))
            })
        })
        .collect::<DemResult<_>>()?;

    let quat: [f64; 4] = parts.try_into().map_err(|v: Vec<f64>| {
        DemError::invalid_parameter("quat", format!("expected 4 values, got {}", v.len()))
    })?;
    Ok(quat)
}
