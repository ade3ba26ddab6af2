mod app_state;
mod config;
mod database;
mod external;
mod lookup;
mod models;
mod routes;
#[cfg(test)]
mod testing;
pub use app_state::AppState;
pub use config::Config;

use crate::routes::make_app;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::init()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    let port = config.port;
    let app = make_app(config).await?;
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Could not bind port {port}"))?;
    info!("🚀 Server started successfully, listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
