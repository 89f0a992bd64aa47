//! Origin-tier tests against a local HTTP server. No external network.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tempfile::TempDir;

use dem_common::tile_xyz;
use dem_store::{StoreConfig, TileSource, TileStore};
use test_utils::constant_ddm;

/// Serve `payload` for GET /tiles/:z/:y/:x on an ephemeral port.
async fn spawn_origin(payload: Vec<u8>) -> SocketAddr {
    let app = Router::new().route(
        "/tiles/:z/:y/:x",
        get({
            let payload = payload.clone();
            move || {
                let payload = payload.clone();
                async move { payload }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn downloading_store(dir: &TempDir, addr: SocketAddr, path: &str) -> TileStore {
    TileStore::new(StoreConfig {
        cache_dir: dir.path().to_path_buf(),
        url_template: format!("http://{addr}/{path}/{{z}}/{{y}}/{{x}}.ddm"),
        subdomains: Vec::new(),
        permit_download: true,
        ..StoreConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn download_parses_caches_and_persists() {
    let addr = spawn_origin(constant_ddm(8, 42.0)).await;
    let dir = TempDir::new().unwrap();
    let store = downloading_store(&dir, addr, "tiles");

    let coord = tile_xyz(0.01, 0.01, 14);

    let first = store.height(0.01, 0.01, Some(14)).await.unwrap();
    assert_eq!(first.height, 42.0);
    assert_eq!(first.meta.source, TileSource::Download);
    assert_eq!(first.meta.grid_size, 8);

    // The body landed on disk at z/y/x.ddm, with no partial left behind.
    let tile_path = dir
        .path()
        .join(coord.z.to_string())
        .join(coord.y.to_string())
        .join(format!("{}.ddm", coord.x));
    assert!(tile_path.exists());
    assert!(!tile_path.with_extension("ddm.partial").exists());

    // Warm in memory now.
    let second = store.height(0.01, 0.01, Some(14)).await.unwrap();
    assert_eq!(second.meta.source, TileSource::MemCache);

    // A fresh store over the same cache dir resolves from disk.
    let fresh = downloading_store(&dir, addr, "tiles");
    let third = fresh.height(0.01, 0.01, Some(14)).await.unwrap();
    assert_eq!(third.meta.source, TileSource::DiskCache);
}

#[tokio::test]
async fn origin_404_is_surfaced_with_status() {
    let addr = spawn_origin(constant_ddm(4, 1.0)).await;
    let dir = TempDir::new().unwrap();
    let store = downloading_store(&dir, addr, "wrong-prefix");

    let err = store.height(0.01, 0.01, Some(14)).await.unwrap_err();
    assert_eq!(err.kind(), "origin-http-error");
    assert!(err.to_string().contains("404"), "got: {err}");
}

#[tokio::test]
async fn origin_transport_error_is_surfaced() {
    // Bind then drop to get a port nobody is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let store = downloading_store(&dir, addr, "tiles");

    let err = store.height(0.01, 0.01, Some(14)).await.unwrap_err();
    assert_eq!(err.kind(), "origin-transport-error");
}

#[tokio::test]
async fn mis_sized_origin_payload_is_a_format_error() {
    // 10 bytes: not a multiple of 4.
    let addr = spawn_origin(vec![0u8; 10]).await;
    let dir = TempDir::new().unwrap();
    let store = downloading_store(&dir, addr, "tiles");

    let err = store.height(0.01, 0.01, Some(14)).await.unwrap_err();
    assert_eq!(err.kind(), "payload-not-multiple-of-4");
}
