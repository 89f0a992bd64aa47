//! Store configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`crate::TileStore`].
///
/// Constructed once; the store never mutates it. There is no process-wide
/// configuration: everything the store needs travels in this value.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root of the on-disk tile cache (`<cache_dir>/z/y/x.ddm`).
    pub cache_dir: PathBuf,

    /// Origin URL template with `{s}`, `{z}`, `{x}`, `{y}` tokens.
    /// Tokens absent from the template are simply not substituted.
    pub url_template: String,

    /// Subdomains rotated into `{s}`.
    pub subdomains: Vec<String>,

    /// Whether the origin tier may be used at all.
    pub permit_download: bool,

    /// Timeout for a single origin fetch.
    pub http_timeout: Duration,

    /// Zoom used when a request does not specify one.
    pub default_zoom: u32,

    /// Highest zoom with native data in the pyramid.
    pub max_native_zoom: u32,

    /// Multiplier applied to every decoded sample (and sentinel) at parse.
    pub height_factor: f32,

    /// No-data sentinel values, pre-factor.
    pub no_data_values: Vec<f32>,

    /// In-memory LRU capacity in tiles. 0 means the default of 64.
    pub max_mem_tiles: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache"),
            url_template: String::new(),
            subdomains: Vec::new(),
            permit_download: false,
            http_timeout: Duration::from_secs(15),
            default_zoom: 14,
            max_native_zoom: 14,
            height_factor: 1.0,
            no_data_values: Vec::new(),
            max_mem_tiles: 64,
        }
    }
}

/// Parse the `DDM_NODATA_CSV` form: comma-separated floats, blanks skipped,
/// unparsable entries ignored.
pub fn parse_no_data_csv(csv: &str) -> Vec<f32> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f32>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sentinel_csv() {
        assert_eq!(
            parse_no_data_csv("-32768, 3.4028235e+38"),
            vec![-32768.0, 3.4028235e+38]
        );
    }

    #[test]
    fn blank_and_garbage_entries_are_skipped() {
        assert_eq!(parse_no_data_csv(""), Vec::<f32>::new());
        assert_eq!(parse_no_data_csv(" ,abc,-1,"), vec![-1.0]);
    }
}
