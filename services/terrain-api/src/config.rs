//! Configuration shared by all subcommands.
//!
//! Every option takes a flag and an environment variable; the flag wins
//! (clap's built-in precedence: explicit flag, then env, then default).

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tracing::{info, warn};

use dem_store::{parse_no_data_csv, StoreConfig};
use raycast::Egm96;

/// Built-in SRTM origin. Note the `{z}/{y}/{x}` path order: it mirrors the
/// on-disk layout and is preserved as-is for cache compatibility.
pub const DEFAULT_URL_TEMPLATE: &str = "https://{s}.geodata.microavia.com/srtm/{z}/{y}/{x}.ddm";

/// Timeout for one origin tile fetch.
pub const HTTP_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Args)]
pub struct CommonOpts {
    /// Cache directory for DEM tiles
    #[arg(short = 'c', long, global = true, default_value = "./cache", env = "DDM_CACHE_DIR")]
    pub cache_dir: PathBuf,

    /// URL template for downloading tiles; an empty value disables downloads
    #[arg(long, global = true, default_value = DEFAULT_URL_TEMPLATE, env = "DDM_URL_TEMPLATE")]
    pub url_template: String,

    /// Comma-separated list of subdomains rotated into {s}
    #[arg(long, global = true, default_value = "a,b,c", env = "DDM_SUBDOMAINS")]
    pub subdomains: String,

    /// Default zoom level
    #[arg(short = 'z', long, global = true, default_value_t = 14, env = "DDM_DEFAULT_Z")]
    pub zoom: u32,

    /// Maximum native zoom level
    #[arg(long, global = true, default_value_t = 14, env = "DDM_MAX_NATIVE_Z")]
    pub max_native_zoom: u32,

    /// Height multiplication factor applied at parse time
    #[arg(long, global = true, default_value_t = 1.0, env = "DDM_HEIGHT_FACTOR")]
    pub height_factor: f32,

    /// Comma-separated no-data values (e.g. '-32768,3.4028235e+38')
    #[arg(long, global = true, default_value = "", env = "DDM_NODATA_CSV", allow_hyphen_values = true)]
    pub nodata_values: String,

    /// In-memory tile cache capacity
    #[arg(long, global = true, default_value_t = 64, env = "DDM_MEM_TILES")]
    pub mem_tiles: usize,

    /// Path to an EGM-96 WW15MGH.DAC geoid grid; when omitted, camera
    /// altitudes are treated as MSL already
    #[arg(long, global = true, env = "DDM_GEOID_PATH")]
    pub geoid_path: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

impl CommonOpts {
    /// Assemble the tile store configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            cache_dir: self.cache_dir.clone(),
            url_template: self.url_template.clone(),
            subdomains: self
                .subdomains
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            permit_download: !self.url_template.is_empty(),
            http_timeout: HTTP_FETCH_TIMEOUT,
            default_zoom: self.zoom,
            max_native_zoom: self.max_native_zoom,
            height_factor: self.height_factor,
            no_data_values: parse_no_data_csv(&self.nodata_values),
            max_mem_tiles: self.mem_tiles,
        }
    }

    /// Load the geoid grid if one is configured. Announces the active
    /// altitude-datum mode either way, so a silent MSL bias cannot happen.
    pub fn load_geoid(&self) -> Option<Egm96> {
        match &self.geoid_path {
            Some(path) => match Egm96::load(path) {
                Ok(geoid) => {
                    info!(path = %path.display(), "EGM-96 geoid loaded; camera altitudes converted to MSL");
                    Some(geoid)
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err,
                        "failed to load geoid grid; treating camera altitudes as MSL");
                    None
                }
            },
            None => {
                warn!("no geoid grid configured; treating camera altitudes as MSL");
                None
            }
        }
    }
}
