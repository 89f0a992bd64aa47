//! CLI subcommand execution.

use std::time::Duration;

use clap::Args;

use dem_common::{DemError, DemResult};

use crate::service::{
    parse_quat, pick_height, search_intersection, HeightRequest, IntersectionRequest,
};
use crate::state::AppState;

/// Deadline for a one-shot CLI invocation, generous enough for cold
/// downloads.
const CLI_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Args)]
pub struct HeightArgs {
    /// Latitude
    #[arg(long)]
    pub lat: f64,

    /// Longitude
    #[arg(long)]
    pub lon: f64,
}

#[derive(Debug, Args)]
pub struct IntersectionArgs {
    /// Camera latitude
    #[arg(long)]
    pub cam_lat: f64,

    /// Camera longitude
    #[arg(long)]
    pub cam_lon: f64,

    /// Camera altitude, ellipsoidal metres
    #[arg(long)]
    pub cam_alt: f64,

    /// Orientation quaternion as 'w,x,y,z'
    #[arg(long)]
    pub quat: String,

    /// March step in metres
    #[arg(long)]
    pub step: Option<f64>,

    /// Maximum search distance in metres
    #[arg(long)]
    pub max_dist: Option<f64>,
}

pub async fn run_height(state: &AppState, args: &HeightArgs, zoom: u32) -> DemResult<()> {
    let request = HeightRequest {
        lat: args.lat,
        lon: args.lon,
        zoom: Some(zoom),
    };

    let sample = tokio::time::timeout(CLI_TIMEOUT, pick_height(&state.store, request))
        .await
        .map_err(|_| DemError::Timeout)??;

    println!("Location: {:.6}, {:.6}", sample.lat, sample.lon);
    println!("Elevation: {:.2} meters", sample.height);
    println!(
        "Tile: z={} x={} y={}",
        sample.meta.z, sample.meta.x, sample.meta.y
    );
    println!("Source: {}", sample.meta.source);
    println!("Grid Size: {}", sample.meta.grid_size);
    Ok(())
}

pub async fn run_intersection(
    state: &AppState,
    args: &IntersectionArgs,
    zoom: u32,
) -> DemResult<()> {
    let quat = parse_quat(&args.quat)?;

    let request = IntersectionRequest {
        cam_lat: args.cam_lat,
        cam_lon: args.cam_lon,
        cam_alt: args.cam_alt,
        quat,
        zoom: Some(zoom),
        step_m: args.step,
        max_dist_m: args.max_dist,
    };

    let search = search_intersection(Some(state.store.clone()), state.geoid.as_deref(), request);
    let hit = tokio::time::timeout(CLI_TIMEOUT, search)
        .await
        .map_err(|_| DemError::Timeout)??;

    println!("Intersection: {:.6}, {:.6}", hit.lat, hit.lon);
    println!("Ground: {:.2} meters", hit.ground);
    println!("Hit: {}", hit.hit);
    Ok(())
}
