use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use spotgraph_service::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cfg = Config::from_env();
    let state = AppState::from_config(&cfg).context("loading notation corpus")?;
    let app = build_router(state);
    let addr = cfg.addr()?;
    tracing::info!(core_version = %spotgraph_core::version(), addr = %addr, maps_dir = %cfg.maps_dir.display(), "starting spotgraph-service");
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
