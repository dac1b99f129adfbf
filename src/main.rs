use std::net::SocketAddr;

use legacy_frames::config::AppConfig;
use legacy_frames::routes::{AppState, create_router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config);

    let app = create_router(state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Legacy Frames API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
