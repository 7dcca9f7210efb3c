use std::sync::Arc;

use spotgraph_core::{BuildOptions, FsSource, GraphError};

pub mod config;
pub mod errors;
pub mod routes;
pub mod store;

pub use config::Config;
pub use errors::AppError;
pub use routes::build_router;
pub use store::NotationStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<NotationStore>,
    pub source: Arc<FsSource>,
    pub secret_threshold: u32,
}

impl AppState {
    pub fn new(store: NotationStore, source: FsSource, secret_threshold: u32) -> Self {
        Self { store: Arc::new(store), source: Arc::new(source), secret_threshold }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, GraphError> {
        let store = NotationStore::open(&cfg.data_dir)?;
        let options = BuildOptions::from_env();
        Ok(Self::new(store, FsSource::new(&cfg.maps_dir), options.secret_threshold))
    }
}
