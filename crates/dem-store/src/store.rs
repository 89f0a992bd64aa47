//! Three-tier tile resolution and height lookup.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use dem_common::{tile_frac, tile_xyz, DemError, DemResult, GeoTileName, TileCoord, TileGrid};

use crate::config::StoreConfig;
use crate::memory::TileMemoryCache;

/// Which tier produced the tile on a given call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileSource {
    MemCache,
    DiskCache,
    Download,
}

impl std::fmt::Display for TileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TileSource::MemCache => "mem-cache",
            TileSource::DiskCache => "disk-cache",
            TileSource::Download => "download",
        })
    }
}

/// Metadata about the tile a height was sampled from.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TileMeta {
    pub z: u32,
    pub x: u32,
    pub y: u32,
    pub source: TileSource,
    pub grid_size: usize,
}

/// A height lookup result.
#[derive(Debug, Clone, Copy)]
pub struct HeightSample {
    pub lat: f64,
    pub lon: f64,
    pub height: f64,
    pub meta: TileMeta,
}

/// Tile store over a DDM pyramid.
///
/// Cheap to share behind an `Arc`; all interior state is synchronised. The
/// LRU lock is never held across I/O.
#[derive(Debug)]
pub struct TileStore {
    cfg: StoreConfig,
    client: reqwest::Client,
    mem: TileMemoryCache,
    sub_ix: AtomicUsize,
}

impl TileStore {
    /// Create a store, creating the cache directory if absent and binding the
    /// HTTP client.
    pub fn new(cfg: StoreConfig) -> DemResult<Self> {
        if cfg.cache_dir.as_os_str().is_empty() {
            return Err(DemError::invalid_parameter("cache-dir", "must not be empty"));
        }
        std::fs::create_dir_all(&cfg.cache_dir)?;

        let client = reqwest::Client::builder()
            .timeout(cfg.http_timeout)
            .build()
            .map_err(|e| DemError::OriginTransport(e.to_string()))?;

        let capacity = if cfg.max_mem_tiles == 0 {
            64
        } else {
            cfg.max_mem_tiles
        };

        Ok(Self {
            cfg,
            client,
            mem: TileMemoryCache::new(capacity),
            sub_ix: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    /// Ground height at a point, by bilinear interpolation inside the tile
    /// containing it. `zoom` of `None` (or 0) falls back to the configured
    /// default.
    pub async fn height(
        &self,
        lat: f64,
        lon: f64,
        zoom: Option<u32>,
    ) -> DemResult<HeightSample> {
        let z = zoom.filter(|z| *z > 0).unwrap_or(self.cfg.default_zoom);
        let coord = tile_xyz(lat, lon, z);

        let (grid, source) = self.resolve(coord).await?;

        debug!(
            tile = %coord,
            geo_tile = %GeoTileName::for_point(lat, lon),
            source = %source,
            "resolved elevation tile"
        );

        let (fx, fy) = tile_frac(lat, lon, coord);
        let height = grid.sample(fx, fy)?;

        Ok(HeightSample {
            lat,
            lon,
            height,
            meta: TileMeta {
                z: coord.z,
                x: coord.x,
                y: coord.y,
                source,
                grid_size: grid.grid_size,
            },
        })
    }

    /// Resolve a tile through memory, disk, then origin. The first tier that
    /// produces the tile tags the provenance.
    async fn resolve(&self, coord: TileCoord) -> DemResult<(Arc<TileGrid>, TileSource)> {
        if let Some(grid) = self.mem.get(&coord) {
            return Ok((grid, TileSource::MemCache));
        }

        match self.load_from_disk(coord).await {
            Ok(grid) => {
                let grid = Arc::new(grid);
                self.mem.put(coord, grid.clone());
                return Ok((grid, TileSource::DiskCache));
            }
            Err(err) => {
                // A missing file is the normal miss path; anything else is
                // worth a warning before falling through to the origin.
                if !matches!(&err, DemError::Disk(_)) {
                    warn!(tile = %coord, error = %err, "disk cache entry unreadable");
                }
            }
        }

        if !self.cfg.permit_download {
            return Err(DemError::NotFoundAndDownloadDisabled(coord));
        }

        let grid = Arc::new(self.download_tile(coord).await?);
        self.mem.put(coord, grid.clone());
        Ok((grid, TileSource::Download))
    }

    fn cache_path(&self, coord: TileCoord) -> PathBuf {
        // cache_key yields the contractual z/y/x component order.
        self.cfg.cache_dir.join(format!("{}.ddm", coord.cache_key()))
    }

    async fn load_from_disk(&self, coord: TileCoord) -> DemResult<TileGrid> {
        let raw = tokio::fs::read(self.cache_path(coord)).await?;
        TileGrid::parse(&raw, coord, self.cfg.height_factor, &self.cfg.no_data_values)
    }

    /// Expand the origin URL template, advancing the subdomain rotation.
    /// The rotation counter is a relaxed atomic: skew under concurrency is
    /// tolerated, it only spreads load.
    fn expand_url(&self, coord: TileCoord) -> String {
        let mut url = self.cfg.url_template.clone();
        if !self.cfg.subdomains.is_empty() {
            let ix = (self.sub_ix.fetch_add(1, Ordering::Relaxed) + 1) % self.cfg.subdomains.len();
            url = url.replace("{s}", &self.cfg.subdomains[ix]);
        }
        url.replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }

    async fn download_tile(&self, coord: TileCoord) -> DemResult<TileGrid> {
        let url = self.expand_url(coord);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DemError::OriginTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DemError::OriginHttp {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DemError::OriginTransport(e.to_string()))?;

        debug!(tile = %coord, bytes = body.len(), url = %url, "downloaded tile");

        // Write through a partial file and rename, so an interrupted download
        // never leaves a corrupt entry at the final path.
        let path = self.cache_path(coord);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let partial = path.with_extension("ddm.partial");
        tokio::fs::write(&partial, &body).await?;
        tokio::fs::rename(&partial, &path).await?;

        TileGrid::parse(&body, coord, self.cfg.height_factor, &self.cfg.no_data_values)
    }

    /// Number of tiles currently held in memory.
    pub fn cached_tiles(&self) -> usize {
        self.mem.len()
    }

    /// Whether a tile is in the memory tier (does not touch recency).
    pub fn is_cached(&self, coord: TileCoord) -> bool {
        self.mem.contains(&coord)
    }

    /// In-memory capacity in tiles.
    pub fn mem_capacity(&self) -> usize {
        self.mem.capacity()
    }
}
