//! DDM tile payload codec and height sampling.
//!
//! A DDM payload is a headerless square grid of little-endian `f32` samples,
//! row-major, row 0 at the tile's north edge, column 0 at the west edge.

use crate::error::{DemError, DemResult};
use crate::tile::TileCoord;

/// A decoded elevation tile.
#[derive(Debug, Clone)]
pub struct TileGrid {
    /// Tile address this grid was decoded for.
    pub coord: TileCoord,
    /// Side length in samples (square).
    pub grid_size: usize,
    /// `grid_size * grid_size` heights, already multiplied by `factor`.
    pub values: Vec<f32>,
    /// Sentinel values (post-factor) meaning "no measurement".
    pub no_data: Vec<f32>,
    /// Multiplier that was applied to `values`, kept for audit.
    pub factor: f32,
}

impl TileGrid {
    /// Decode a raw DDM payload.
    ///
    /// The grid side is recovered from the payload size; nothing assumes a
    /// fixed grid dimension. Sentinels are scaled by the same factor as the
    /// data so equality comparisons stay exact.
    pub fn parse(
        raw: &[u8],
        coord: TileCoord,
        factor: f32,
        no_data: &[f32],
    ) -> DemResult<TileGrid> {
        if raw.len() % 4 != 0 {
            return Err(DemError::PayloadNotMultipleOf4(raw.len()));
        }
        let samples = raw.len() / 4;
        let grid_size = (samples as f64).sqrt().round() as usize;
        if grid_size < 2 || grid_size * grid_size != samples {
            return Err(DemError::NonSquareGrid(samples));
        }

        let mut values = Vec::with_capacity(samples);
        for chunk in raw.chunks_exact(4) {
            let v = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            values.push(v * factor);
        }

        Ok(TileGrid {
            coord,
            grid_size,
            values,
            no_data: no_data.iter().map(|v| v * factor).collect(),
            factor,
        })
    }

    /// Re-encode the payload (inverse of [`TileGrid::parse`] at factor 1.0).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.values.len() * 4);
        for v in &self.values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    fn at(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.grid_size + col]
    }

    fn is_no_data(&self, v: f32) -> bool {
        self.no_data.iter().any(|s| *s == v)
    }

    /// Sample the grid at a fractional tile offset by bilinear interpolation.
    ///
    /// When some of the four surrounding corners are sentinels the result is
    /// the unweighted mean of the valid ones; when all four are sentinels the
    /// lookup fails with [`DemError::NoDataHere`].
    pub fn sample(&self, fx: f64, fy: f64) -> DemResult<f64> {
        let gs = self.grid_size;
        let px = fx * (gs - 1) as f64;
        let py = fy * (gs - 1) as f64;

        let col = (px.floor().max(0.0) as usize).min(gs - 2);
        let row = (py.floor().max(0.0) as usize).min(gs - 2);
        let alpha = px - col as f64;
        let beta = py - row as f64;

        let p00 = self.at(row, col);
        let p10 = self.at(row, col + 1);
        let p01 = self.at(row + 1, col);
        let p11 = self.at(row + 1, col + 1);

        let corners = [p00, p10, p01, p11];
        let valid: Vec<f64> = corners
            .iter()
            .filter(|v| !self.is_no_data(**v))
            .map(|v| *v as f64)
            .collect();

        match valid.len() {
            0 => Err(DemError::NoDataHere),
            4 => {
                let a = (1.0 - alpha) * p00 as f64 + alpha * p10 as f64;
                let b = (1.0 - alpha) * p01 as f64 + alpha * p11 as f64;
                Ok((1.0 - beta) * a + beta * b)
            }
            n => Ok(valid.iter().sum::<f64>() / n as f64),
        }
    }
}
