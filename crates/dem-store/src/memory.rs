//! Bounded in-memory tile cache.
//!
//! Strict LRU keyed by tile address. The mutex is held only across lookup
//! and insertion, never across disk or network I/O, so concurrent misses for
//! the same key may both fetch; the later insert wins.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use dem_common::{TileCoord, TileGrid};

#[derive(Debug)]
pub(crate) struct TileMemoryCache {
    inner: Mutex<LruCache<TileCoord, Arc<TileGrid>>>,
    capacity: usize,
}

impl TileMemoryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).expect("capacity is at least 1"),
            )),
            capacity,
        }
    }

    /// Look up a tile, marking it most recently used on a hit.
    pub fn get(&self, coord: &TileCoord) -> Option<Arc<TileGrid>> {
        self.inner.lock().expect("tile cache poisoned").get(coord).cloned()
    }

    /// Insert a tile, evicting the least recently used entry at capacity.
    pub fn put(&self, coord: TileCoord, grid: Arc<TileGrid>) {
        self.inner.lock().expect("tile cache poisoned").put(coord, grid);
    }

    /// Number of cached tiles.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("tile cache poisoned").len()
    }

    /// Whether a tile is cached, without touching its recency.
    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.inner.lock().expect("tile cache poisoned").peek(coord).is_some()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
