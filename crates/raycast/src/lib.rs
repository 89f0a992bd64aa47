//! Ray marching from a camera pose to the terrain.
//!
//! Converts a body-frame orientation quaternion into a world-frame (NED)
//! direction, reconciles the camera's ellipsoidal altitude to MSL, then
//! marches along the ray until it crosses ground, refining the crossing by
//! bisection. The terrain itself is abstract: anything implementing
//! [`ElevationSource`] can answer the marcher.

pub mod direction;
pub mod geoid;
pub mod marcher;

pub use direction::forward_from_quat;
pub use geoid::Egm96;
pub use marcher::{
    intersect, ElevationSource, RayHit, RayParams, DEFAULT_MAX_DIST_M, DEFAULT_STEP_M,
    EARTH_RADIUS_M,
};
