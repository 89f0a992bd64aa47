//! Terrain elevation and raycast intersection service.
//!
//! Thin surface over the core crates: the CLI and the HTTP handlers share
//! the dispatch functions in [`service`], which own validation and default
//! backfill; everything below that line lives in `dem-store` and `raycast`.

pub mod cli;
pub mod config;
pub mod dem_adapter;
pub mod handlers;
pub mod server;
pub mod service;
pub mod state;
