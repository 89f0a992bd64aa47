//! EGM-96 geoid undulation lookup.
//!
//! Camera altitudes arrive ellipsoidal (WGS-84, as GPS reports); DEM heights
//! are orthometric (MSL). The difference is the geoid undulation N, with
//! `h_msl = h_ell - N`.
//!
//! The lookup is backed by the standard WW15MGH.DAC grid: 721 rows from 90N
//! to 90S and 1440 columns from 0E eastward, 15 arc-minutes apart, each cell
//! a big-endian signed 16-bit undulation in centimetres.

use std::path::Path;

use dem_common::{DemError, DemResult};

const ROWS: usize = 721;
const COLS: usize = 1440;
const CELLS_PER_DEGREE: f64 = 4.0;

/// In-memory EGM-96 undulation grid.
#[derive(Debug)]
pub struct Egm96 {
    // centimetres, row-major from the north pole
    values: Vec<i16>,
}

impl Egm96 {
    /// Load a WW15MGH.DAC grid file.
    pub fn load(path: &Path) -> DemResult<Self> {
        let raw = std::fs::read(path)?;
        Self::from_dac_bytes(&raw)
    }

    /// Decode the raw WW15MGH.DAC payload.
    pub fn from_dac_bytes(raw: &[u8]) -> DemResult<Self> {
        let expected = ROWS * COLS * 2;
        if raw.len() != expected {
            return Err(DemError::invalid_parameter(
                "geoid-grid",
                format!("expected {expected} bytes of WW15MGH.DAC data, got {}", raw.len()),
            ));
        }

        let values = raw
            .chunks_exact(2)
            .map(|c| i16::from_be_bytes([c[0], c[1]]))
            .collect();

        Ok(Self { values })
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        f64::from(self.values[row * COLS + col]) / 100.0
    }

    /// Geoid undulation N in metres at a point, by bilinear interpolation.
    pub fn undulation(&self, lat: f64, lon: f64) -> f64 {
        let lat = lat.clamp(-90.0, 90.0);
        let lon = lon.rem_euclid(360.0);

        let row = (90.0 - lat) * CELLS_PER_DEGREE;
        let col = lon * CELLS_PER_DEGREE;

        let r0 = (row.floor() as usize).min(ROWS - 2);
        let c0 = (col.floor() as usize).min(COLS - 1);
        let c1 = (c0 + 1) % COLS; // longitude wraps at 360
        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let top = self.at(r0, c0) * (1.0 - fc) + self.at(r0, c1) * fc;
        let bottom = self.at(r0 + 1, c0) * (1.0 - fc) + self.at(r0 + 1, c1) * fc;
        top * (1.0 - fr) + bottom * fr
    }

    /// Convert an ellipsoidal height at a point to MSL.
    pub fn to_msl(&self, lat: f64, lon: f64, h_ellipsoidal: f64) -> f64 {
        h_ellipsoidal - self.undulation(lat, lon)
    }
}
