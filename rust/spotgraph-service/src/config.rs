use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Holds `notation.json`.
    pub data_dir: PathBuf,
    /// Holds `start2.json` and the per-area map documents.
    pub maps_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = get("SPOTGRAPH_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = get("SPOTGRAPH_PORT").and_then(|s| s.parse::<u16>().ok()).unwrap_or(8080);
        let data_dir = get("SPOTGRAPH_DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data"));
        let maps_dir = get("SPOTGRAPH_MAPS_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("maps"));
        Self { host, port, data_dir, maps_dir }
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
