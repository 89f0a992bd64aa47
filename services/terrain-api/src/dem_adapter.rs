//! Adapter presenting the tile store to the ray marcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use dem_store::TileStore;
use raycast::ElevationSource;

/// Wraps a [`TileStore`] as an [`ElevationSource`], closing over the zoom
/// level and a per-sample deadline.
///
/// Any lookup failure (missing tile, no-data cell, timeout) becomes `None`:
/// the marcher skips the sample and keeps going.
pub struct StoreElevationSource {
    store: Arc<TileStore>,
    zoom: u32,
    timeout: Duration,
}

impl StoreElevationSource {
    pub fn new(store: Arc<TileStore>, zoom: u32, timeout: Duration) -> Self {
        Self {
            store,
            zoom,
            timeout,
        }
    }
}

#[async_trait]
impl ElevationSource for StoreElevationSource {
    async fn height(&self, lat: f64, lon: f64) -> Option<f64> {
        match tokio::time::timeout(self.timeout, self.store.height(lat, lon, Some(self.zoom))).await
        {
            Ok(Ok(sample)) => Some(sample.height),
            Ok(Err(err)) => {
                debug!(lat, lon, error = %err, "elevation sample unavailable");
                None
            }
            Err(_) => {
                debug!(lat, lon, "elevation sample timed out");
                None
            }
        }
    }
}
