//! Web-mercator tile addressing.
//!
//! Standard XYZ scheme: `x` grows eastward, `y` grows southward, both in
//! `[0, 2^z)`. Latitude is clamped to the mercator usable range before any
//! index math.

use serde::{Deserialize, Serialize};

/// Maximum latitude representable in spherical mercator.
pub const MAX_MERCATOR_LAT: f64 = 85.05112878;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Cache key string. The `z/y/x` component order is part of the on-disk
    /// cache contract and must not be normalised.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.z, self.y, self.x)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "z={} x={} y={}", self.z, self.x, self.y)
    }
}

/// Continuous world coordinates at a zoom level: the un-floored tile indices.
fn mercator_world(lat: f64, lon: f64, z: u32) -> (f64, f64) {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let n = 2f64.powi(z as i32);
    let lat_rad = lat.to_radians();
    let wx = (lon + 180.0) / 360.0 * n;
    let wy = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0 * n;
    (wx, wy)
}

/// Convert lat/lon to the containing tile at zoom `z`.
///
/// Longitude 180 is the same meridian as -180 and wraps to x = 0, so both
/// forms resolve to one tile. The y index is clamped at the mercator poles.
pub fn tile_xyz(lat: f64, lon: f64, z: u32) -> TileCoord {
    let n = 2f64.powi(z as i32);
    let (wx, wy) = mercator_world(lat, lon, z);
    let x = wx.floor().rem_euclid(n) as u32;
    let y = (wy.floor().max(0.0)).min(n - 1.0) as u32;
    TileCoord { z, x, y }
}

/// Fractional offset of lat/lon inside tile `coord`, each in `[0, 1)`.
///
/// `fx` increases eastward, `fy` southward. The world x is wrapped the same
/// way as in [`tile_xyz`] so the 180/-180 meridian stays consistent, and the
/// south mercator-clamp latitude lands just inside the bottom tile row
/// rather than on the next one.
pub fn tile_frac(lat: f64, lon: f64, coord: TileCoord) -> (f64, f64) {
    // Largest representable value below 1.0, keeping the range half-open.
    const MAX_FRAC: f64 = 1.0 - f64::EPSILON;
    let n = 2f64.powi(coord.z as i32);
    let (wx, wy) = mercator_world(lat, lon, coord.z);
    let fx = (wx.rem_euclid(n) - coord.x as f64).clamp(0.0, MAX_FRAC);
    let fy = (wy - coord.y as f64).clamp(0.0, MAX_FRAC);
    (fx, fy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_zero_is_single_tile() {
        assert_eq!(tile_xyz(0.0, 0.0, 0), TileCoord::new(0, 0, 0));
        assert_eq!(tile_xyz(84.0, 179.9, 0), TileCoord::new(0, 0, 0));
    }

    #[test]
    fn known_city_tile() {
        // NYC at zoom 10 lands around x=301 y=384
        let coord = tile_xyz(40.7128, -74.0060, 10);
        assert_eq!(coord.z, 10);
        assert!(coord.x > 290 && coord.x < 310);
        assert!(coord.y > 370 && coord.y < 400);
    }

    #[test]
    fn frac_stays_in_unit_square() {
        for &(lat, lon) in &[
            (0.01, 0.01),
            (25.197525, 55.274288),
            (-33.9, 151.2),
            (64.1, -21.9),
            (-85.05112878, 0.0),
            (85.05112878, -179.999),
        ] {
            for z in 1..=16 {
                let coord = tile_xyz(lat, lon, z);
                let n = 2u32.pow(z);
                assert!(coord.x < n && coord.y < n, "index oob at z={z}");
                let (fx, fy) = tile_frac(lat, lon, coord);
                assert!((0.0..1.0).contains(&fx), "fx={fx} at z={z}");
                assert!((0.0..1.0).contains(&fy), "fy={fy} at z={z}");
            }
        }
    }

    #[test]
    fn antimeridian_wraps_to_same_tile() {
        let east = tile_xyz(10.0, 180.0, 8);
        let west = tile_xyz(10.0, -180.0, 8);
        assert_eq!(east, west);
        assert_eq!(east.x, 0);
    }

    #[test]
    fn polar_clamp_yields_valid_index() {
        for z in 0..=14 {
            let n = 2u32.pow(z);
            let north = tile_xyz(MAX_MERCATOR_LAT, 12.3, z);
            let south = tile_xyz(-MAX_MERCATOR_LAT, 12.3, z);
            assert_eq!(north.y, 0);
            assert_eq!(south.y, n - 1);
        }
    }

    #[test]
    fn cache_key_is_z_y_x() {
        assert_eq!(TileCoord::new(14, 7, 9).cache_key(), "14/9/7");
    }
}
