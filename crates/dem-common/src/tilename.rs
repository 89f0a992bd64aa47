//! Geographic (1°x1°) tile names in the canonical SRTM form.
//!
//! These names are diagnostic metadata only; tiles are always fetched and
//! cached by their mercator `(z, x, y)` address.

/// A 1-degree geographic tile name, e.g. `N37E015` or `S04W063`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoTileName {
    /// Degrees of latitude of the tile's south edge (absolute value).
    pub lat_deg: u8,
    /// Degrees of longitude of the tile's west edge (absolute value).
    pub lon_deg: u8,
    /// 'N' or 'S'
    pub ns: char,
    /// 'E' or 'W'
    pub ew: char,
}

impl GeoTileName {
    /// Name of the 1x1 degree tile containing the given point.
    ///
    /// The tile is identified by `floor(lat)`/`floor(lon)`:
    /// `lat = 37.4` gives `N37`, `lat = -3.2` gives `S04`.
    pub fn for_point(lat: f64, lon: f64) -> Self {
        let base_lat = lat.floor() as i32;
        let base_lon = lon.floor() as i32;
        GeoTileName {
            lat_deg: base_lat.unsigned_abs() as u8,
            lon_deg: base_lon.unsigned_abs().min(180) as u8,
            ns: if base_lat < 0 { 'S' } else { 'N' },
            ew: if base_lon < 0 { 'W' } else { 'E' },
        }
    }

    /// Canonical SRTM file stem: hemisphere + 2-digit lat + hemisphere +
    /// 3-digit lon.
    pub fn file_stem(&self) -> String {
        format!(
            "{}{:02}{}{:03}",
            self.ns, self.lat_deg, self.ew, self.lon_deg
        )
    }
}

impl std::fmt::Display for GeoTileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_stem())
    }
}
