//! Marching a viewing ray to its first terrain crossing.

use async_trait::async_trait;
use tracing::debug;

use crate::direction::forward_from_quat;
use crate::geoid::Egm96;

/// WGS-84 equatorial radius, metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Step length used when the request does not specify one.
pub const DEFAULT_STEP_M: f64 = 1.0;

/// Search range used when the request does not specify one.
pub const DEFAULT_MAX_DIST_M: f64 = 5_000.0;

const BISECTION_ITERATIONS: usize = 20;

/// Capability the marcher needs from terrain: a ground height in MSL metres,
/// or `None` where no measurement exists. Unknown ground is skipped over and
/// is never reported as an intersection.
#[async_trait]
pub trait ElevationSource: Send + Sync {
    async fn height(&self, lat: f64, lon: f64) -> Option<f64>;
}

/// Camera pose and march parameters.
#[derive(Debug, Clone, Copy)]
pub struct RayParams {
    pub cam_lat: f64,
    pub cam_lon: f64,
    /// Ellipsoidal (WGS-84) camera altitude, metres.
    pub cam_alt: f64,
    /// Body-to-NED rotation quaternion `[w, x, y, z]`.
    pub quat: [f64; 4],
    /// March step, metres. Non-positive falls back to [`DEFAULT_STEP_M`].
    pub step_m: f64,
    /// Search range, metres. Non-positive falls back to [`DEFAULT_MAX_DIST_M`].
    pub max_dist_m: f64,
}

/// Where the ray met the ground. On a miss, the last inspected point with
/// the marching altitude in `ground` for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub lat: f64,
    pub lon: f64,
    pub ground: f64,
    pub hit: bool,
}

/// A point along the ray: (lat, lon, altitude MSL).
type RayPoint = (f64, f64, f64);

/// March from the camera along the quaternion's forward direction until the
/// ray crosses ground, then refine the crossing by bisection.
///
/// The camera altitude is converted to MSL through `geoid` when one is
/// available; otherwise it is taken as MSL already (surfaced at debug level;
/// the caller is expected to have warned once at startup).
pub async fn intersect<S: ElevationSource + ?Sized>(
    source: &S,
    geoid: Option<&Egm96>,
    params: RayParams,
) -> RayHit {
    let step = if params.step_m > 0.0 {
        params.step_m
    } else {
        DEFAULT_STEP_M
    };
    let max_dist = if params.max_dist_m > 0.0 {
        params.max_dist_m
    } else {
        DEFAULT_MAX_DIST_M
    };

    let [d_n, d_e, d_d] = forward_from_quat(params.quat);

    let mut lat = params.cam_lat;
    let mut lon = params.cam_lon;
    let mut alt = match geoid {
        Some(g) => {
            let n = g.undulation(lat, lon);
            debug!(undulation_m = n, "camera altitude converted to MSL via EGM-96");
            params.cam_alt - n
        }
        None => {
            debug!("no geoid model loaded; treating camera altitude as MSL");
            params.cam_alt
        }
    };

    let mut prev: RayPoint = (lat, lon, alt);
    let mut dist = 0.0;

    while dist <= max_dist && (-85.0..=85.0).contains(&lat) {
        if let Some(ground) = source.height(lat, lon).await {
            if alt <= ground {
                return refine(source, prev, (lat, lon, alt), ground).await;
            }
        }

        prev = (lat, lon, alt);
        dist += step;
        // NED down is positive, altitude increases upward.
        alt += -d_d * step;
        lat += (d_n * step / EARTH_RADIUS_M).to_degrees();
        // Uses the already-updated latitude.
        lon += (d_e * step / (EARTH_RADIUS_M * lat.to_radians().cos())).to_degrees();
        if lon > 180.0 {
            lon -= 360.0;
        } else if lon <= -180.0 {
            lon += 360.0;
        }
    }

    RayHit {
        lat,
        lon,
        ground: alt,
        hit: false,
    }
}

/// Midpoint bisection between the last point above ground and the first at or
/// below it. Unknown ground at a midpoint keeps the upper half, so the
/// bracket never collapses onto unmeasured cells.
async fn refine<S: ElevationSource + ?Sized>(
    source: &S,
    mut above: RayPoint,
    mut below: RayPoint,
    coarse_ground: f64,
) -> RayHit {
    for _ in 0..BISECTION_ITERATIONS {
        let mid = (
            0.5 * (above.0 + below.0),
            0.5 * (above.1 + below.1),
            0.5 * (above.2 + below.2),
        );
        match source.height(mid.0, mid.1).await {
            Some(ground) if mid.2 <= ground => below = mid,
            _ => above = mid,
        }
    }

    let ground = source.height(below.0, below.1).await.unwrap_or(coarse_ground);
    RayHit {
        lat: below.0,
        lon: below.1,
        ground,
        hit: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    /// Constant-height terrain everywhere.
    struct FlatGround(f64);

    #[async_trait]
    impl ElevationSource for FlatGround {
        async fn height(&self, _lat: f64, _lon: f64) -> Option<f64> {
            Some(self.0)
        }
    }

    /// Terrain with no measurements anywhere.
    struct NoGround;

    #[async_trait]
    impl ElevationSource for NoGround {
        async fn height(&self, _lat: f64, _lon: f64) -> Option<f64> {
            None
        }
    }

    /// Ground rising northward at a constant grade from a base latitude.
    struct SlopedGround {
        base_lat: f64,
        base_height: f64,
        grade: f64,
    }

    #[async_trait]
    impl ElevationSource for SlopedGround {
        async fn height(&self, lat: f64, _lon: f64) -> Option<f64> {
            let north_m = (lat - self.base_lat).to_radians() * EARTH_RADIUS_M;
            Some(self.base_height + self.grade * north_m)
        }
    }

    /// Flat terrain with an unmeasured band south of a latitude threshold.
    struct HoleyGround {
        height: f64,
        known_south_of: f64,
    }

    #[async_trait]
    impl ElevationSource for HoleyGround {
        async fn height(&self, lat: f64, _lon: f64) -> Option<f64> {
            (lat <= self.known_south_of).then_some(self.height)
        }
    }

    fn straight_down() -> [f64; 4] {
        // -90 degree rotation about E: +N maps to +D.
        let h = std::f64::consts::FRAC_1_SQRT_2;
        [h, 0.0, -h, 0.0]
    }

    fn straight_up() -> [f64; 4] {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        [h, 0.0, h, 0.0]
    }

    fn params(quat: [f64; 4]) -> RayParams {
        RayParams {
            cam_lat: 25.0,
            cam_lon: 55.0,
            cam_alt: 500.0,
            quat,
            step_m: 1.0,
            max_dist_m: 5_000.0,
        }
    }

    #[tokio::test]
    async fn straight_down_hits_directly_below() {
        let hit = intersect(&FlatGround(100.0), None, params(straight_down())).await;
        assert!(hit.hit);
        assert_approx_eq!(hit.lat, 25.0, 1e-9);
        assert_approx_eq!(hit.lon, 55.0, 1e-9);
        assert_eq!(hit.ground, 100.0);
    }

    #[tokio::test]
    async fn looking_up_never_hits() {
        let hit = intersect(&FlatGround(100.0), None, params(straight_up())).await;
        assert!(!hit.hit);
        // The miss reports the last inspected point; looking straight up the
        // camera never moves horizontally.
        assert_approx_eq!(hit.lat, 25.0, 1e-9);
        assert_approx_eq!(hit.lon, 55.0, 1e-9);
        assert!(hit.ground > 500.0);
    }

    #[tokio::test]
    async fn doubling_range_does_not_move_an_existing_hit() {
        let near = intersect(&FlatGround(100.0), None, params(straight_down())).await;
        let far = intersect(
            &FlatGround(100.0),
            None,
            RayParams {
                max_dist_m: 10_000.0,
                ..params(straight_down())
            },
        )
        .await;
        assert_eq!(near, far);
    }

    #[tokio::test]
    async fn slanted_ray_converges_to_the_crossing() {
        // 45 degrees down toward north: equal parts +N and +D.
        let theta = std::f64::consts::FRAC_PI_8;
        let quat = [theta.cos(), 0.0, -theta.sin(), 0.0];

        let hit = intersect(&FlatGround(100.0), None, params(quat)).await;
        assert!(hit.hit);
        assert_eq!(hit.ground, 100.0);

        // The ray loses 400 m of altitude over 400 m northward.
        let expected_lat = 25.0 + (400.0 / EARTH_RADIUS_M).to_degrees();
        assert_approx_eq!(hit.lat, expected_lat, 1e-7);
        assert_approx_eq!(hit.lon, 55.0, 1e-9);
    }

    #[tokio::test]
    async fn bisection_converges_within_the_step_bound() {
        // 45 degrees down toward north over ground rising at a 20% grade, so
        // the crossing falls strictly between two coarse steps. After 20
        // bisections the returned point's ray altitude is within
        // step * 2^-20 of the re-sampled ground there.
        let source = SlopedGround {
            base_lat: 25.0,
            base_height: 100.0,
            grade: 0.2,
        };
        let theta = std::f64::consts::FRAC_PI_8;
        let quat = [theta.cos(), 0.0, -theta.sin(), 0.0];
        let step = 16.0;

        let hit = intersect(
            &source,
            None,
            RayParams {
                step_m: step,
                ..params(quat)
            },
        )
        .await;
        assert!(hit.hit);

        // Along this ray the altitude drops one metre per metre northward.
        let north_m = (hit.lat - 25.0).to_radians() * EARTH_RADIUS_M;
        let ray_alt = 500.0 - north_m;
        let residual = (ray_alt - hit.ground).abs();
        assert!(
            residual <= step * 2f64.powi(-20),
            "residual {residual} exceeds the bisection bound"
        );
    }

    #[tokio::test]
    async fn unknown_ground_everywhere_is_a_miss() {
        let hit = intersect(&NoGround, None, params(straight_down())).await;
        assert!(!hit.hit);
    }

    #[tokio::test]
    async fn unknown_band_is_skipped_not_hit() {
        // Ground is only measured south of the camera; the ray flies north
        // over the unmeasured band, descending, and must keep going without
        // reporting a hit inside it.
        let source = HoleyGround {
            height: 490.0,
            known_south_of: 25.0,
        };
        let quat = {
            // Mostly north, slightly down.
            let theta: f64 = -0.05;
            [
                (theta / 2.0).cos(),
                0.0,
                (theta / 2.0).sin(),
                0.0,
            ]
        };
        let hit = intersect(&source, None, params(quat)).await;
        assert!(!hit.hit);
    }

    #[tokio::test]
    async fn degenerate_quaternion_uses_fallback_direction() {
        // Fallback direction climbs, so flat ground below is never hit.
        let hit = intersect(&FlatGround(100.0), None, params([0.0; 4])).await;
        assert!(!hit.hit);
    }

    #[tokio::test]
    async fn non_positive_step_and_range_use_defaults() {
        let hit = intersect(
            &FlatGround(100.0),
            None,
            RayParams {
                step_m: 0.0,
                max_dist_m: -1.0,
                ..params(straight_down())
            },
        )
        .await;
        assert!(hit.hit);
        assert_eq!(hit.ground, 100.0);
    }

    #[tokio::test]
    async fn geoid_offset_shifts_the_camera_datum() {
        // Constant undulation of +50 m: an ellipsoidal 500 m is only 450 m
        // MSL, so ground at 460 m is hit immediately at the camera point.
        let mut raw = Vec::new();
        for _ in 0..721 * 1440 {
            raw.extend_from_slice(&5000i16.to_be_bytes());
        }
        let geoid = Egm96::from_dac_bytes(&raw).unwrap();

        let hit = intersect(&FlatGround(460.0), Some(&geoid), params(straight_down())).await;
        assert!(hit.hit);
        assert_approx_eq!(hit.lat, 25.0, 1e-9);
        assert_eq!(hit.ground, 460.0);

        // Without the geoid the camera is treated as 500 m MSL and marches
        // 40 m down before the crossing.
        let hit = intersect(&FlatGround(460.0), None, params(straight_down())).await;
        assert!(hit.hit);
        assert_eq!(hit.ground, 460.0);
    }
}
