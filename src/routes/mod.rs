mod coin;
mod health;
mod middlewares;
mod session;
mod swagger;
mod user;
use crate::database;
use crate::external::{CoinSource, External};
use crate::lookup::{Catalog, SessionStore};
use anyhow::Context;
use health::health_checker_handler;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{AppState, Config};

use axum::{routing::get, Router};
use std::sync::Arc;

/// Connects to the database, loads the coin catalog and assembles the application.
pub async fn make_app(config: Config) -> anyhow::Result<Router> {
    info!("Connecting to PostgreSQL...");
    let sqlx_db_connection = database::connect_sqlx(&config.db_url)
        .await
        .context("Could not connect to the database")?;
    info!("Connected to PostgreSQL!");

    let db = database::PostgreDatabase::new(sqlx_db_connection);
    db.ensure_schema()
        .await
        .context("Could not prepare the database schema")?;

    let ext: Arc<dyn CoinSource> =
        Arc::new(External::from_config(&config).context("Could not build the HTTP client")?);
    let catalog = Catalog::load(ext.as_ref()).await;

    let sessions = SessionStore::from_config(&config);
    let state = Arc::new(AppState {
        db,
        config,
        ext,
        catalog,
        sessions,
    });
    Ok(router(state))
}

/// Builds every route over an existing state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api", get(health_checker_handler))
        .route("/api/health", get(health_checker_handler))
        .nest("/api/coins", coin::coin_routes())
        .nest("/api/sessions", session::session_routes())
        .nest("/api/users", user::user_routes(state.clone()))
        .merge(swagger::build_documentation())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
