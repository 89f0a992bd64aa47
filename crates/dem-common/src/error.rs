//! Error types shared across the terrain elevation services.

use thiserror::Error;

use crate::tile::TileCoord;

/// Result type alias using DemError.
pub type DemResult<T> = Result<T, DemError>;

/// Primary error type for DEM operations.
#[derive(Debug, Error)]
pub enum DemError {
    // === Input errors (rejected at the service boundary) ===
    #[error("invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Tile-format errors ===
    #[error("payload length {0} is not a multiple of 4")]
    PayloadNotMultipleOf4(usize),

    #[error("payload of {0} samples is not a square grid of side >= 2")]
    NonSquareGrid(usize),

    // === Tile-miss errors ===
    #[error("tile {0} not found and downloads are disabled")]
    NotFoundAndDownloadDisabled(TileCoord),

    #[error("origin returned http {status} for {url}")]
    OriginHttp { status: u16, url: String },

    #[error("origin transport error: {0}")]
    OriginTransport(String),

    #[error("disk cache error: {0}")]
    Disk(String),

    // === Lookup errors ===
    #[error("no data around sample point")]
    NoDataHere,

    // === Marcher errors ===
    #[error("no elevation source configured")]
    NoDem,

    // === Cancellation ===
    #[error("deadline exceeded")]
    Timeout,
}

impl DemError {
    /// Stable textual kind, used by the CLI (`kind: detail`) and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DemError::InvalidParameter { .. } => "invalid-parameter",
            DemError::PayloadNotMultipleOf4(_) => "payload-not-multiple-of-4",
            DemError::NonSquareGrid(_) => "non-square-grid",
            DemError::NotFoundAndDownloadDisabled(_) => "not-found-and-download-disabled",
            DemError::OriginHttp { .. } => "origin-http-error",
            DemError::OriginTransport(_) => "origin-transport-error",
            DemError::Disk(_) => "disk-error",
            DemError::NoDataHere => "no-data-here",
            DemError::NoDem => "no-dem",
            DemError::Timeout => "timeout",
        }
    }

    /// HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            DemError::InvalidParameter { .. } => 400,
            DemError::Timeout => 504,
            _ => 500,
        }
    }

    /// Convenience constructor for boundary validation failures.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        DemError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for DemError {
    fn from(err: std::io::Error) -> Self {
        DemError::Disk(err.to_string())
    }
}
