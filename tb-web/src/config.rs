//! Configuration for tb-web.

use std::net::SocketAddr;
use std::path::PathBuf;

use tb_engine::StoreConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the web server.
    pub address: SocketAddr,
    /// File the engine's snapshot is persisted to between runs.
    pub snapshot_path: PathBuf,
    /// Table capacities for the embedded engine.
    pub store: StoreConfig,
}
