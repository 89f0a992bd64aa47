//! Common types shared across the terrain elevation services.

pub mod error;
pub mod grid;
pub mod tile;
pub mod tilename;

pub use error::{DemError, DemResult};
pub use grid::TileGrid;
pub use tile::{tile_frac, tile_xyz, TileCoord, MAX_MERCATOR_LAT};
pub use tilename::GeoTileName;
