//! Shared application state.

use std::sync::Arc;

use dem_common::DemResult;
use dem_store::TileStore;
use raycast::Egm96;

use crate::config::CommonOpts;

/// Everything a request handler needs: the tile store and, when configured,
/// the geoid model.
pub struct AppState {
    pub store: Arc<TileStore>,
    pub geoid: Option<Arc<Egm96>>,
}

impl AppState {
    pub fn from_opts(opts: &CommonOpts) -> DemResult<Self> {
        let store = Arc::new(TileStore::new(opts.store_config())?);
        let geoid = opts.load_geoid().map(Arc::new);
        Ok(Self { store, geoid })
    }
}
