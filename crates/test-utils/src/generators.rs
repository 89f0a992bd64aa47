//! Synthetic DDM payload generators.
//!
//! DDM payloads are headerless little-endian `f32` square grids, row-major,
//! north row first. The generators here build payloads whose decoded values
//! are easy to predict in assertions.

/// Encode a slice of samples as a raw DDM payload.
pub fn encode_ddm(values: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// A `gs x gs` payload where every sample is `value`.
pub fn constant_ddm(gs: usize, value: f32) -> Vec<u8> {
    encode_ddm(&vec![value; gs * gs])
}

/// A `gs x gs` payload where every sample in row `i` equals `i`.
///
/// Linear in the row index, so bilinear interpolation over it is exact:
/// sampling at fractional row `py` yields exactly `py`.
pub fn ramp_ddm(gs: usize) -> Vec<u8> {
    let mut values = Vec::with_capacity(gs * gs);
    for row in 0..gs {
        for _col in 0..gs {
            values.push(row as f32);
        }
    }
    encode_ddm(&values)
}
