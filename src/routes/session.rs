use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::info;
use utoipa::OpenApi;

use crate::{
    lookup::LookupSession,
    models::{
        dto::{FigureInput, SearchInput, SelectInput, SessionView},
        Error,
    },
    AppState,
};

/// Defines the OpenAPI spec for lookup session endpoints
#[derive(OpenApi)]
#[openapi(paths(
    create_session_handler,
    get_session_handler,
    delete_session_handler,
    search_handler,
    select_handler,
    multiplier_handler,
    target_price_handler
))]
pub struct SessionsApi;

/// Used to group session endpoints together in the OpenAPI documentation
pub const SESSION_API_GROUP: &str = "SESSION";

const SESSION_NOT_FOUND: &str = "Session not found";

/// Builds a router for lookup session routes
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_session_handler))
        .route("/:id", get(get_session_handler).delete(delete_session_handler))
        .route("/:id/search", put(search_handler))
        .route("/:id/select", post(select_handler))
        .route("/:id/multiplier", put(multiplier_handler))
        .route("/:id/price", put(target_price_handler))
}

async fn view_of(state: &AppState, id: u64) -> Result<SessionView, Error> {
    let surface = state.config.surface_fetch_errors;
    state
        .sessions
        .read(id, |session| session.view(id, surface))
        .await
        .ok_or_else(|| Error::new(StatusCode::NOT_FOUND, SESSION_NOT_FOUND))
}

/// Start a lookup session
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = SESSION_API_GROUP,
    responses(
        (status = 201, description = "Session created", body = SessionView),
        (status = 503, description = "Too many open sessions"),
    )
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionView>), Error> {
    let id = state
        .sessions
        .insert(LookupSession::new(&state.catalog))
        .await
        .ok_or((StatusCode::SERVICE_UNAVAILABLE, "Too many open sessions"))?;
    info!(session_id = id, "lookup session created");
    Ok((StatusCode::CREATED, Json(view_of(&state, id).await?)))
}

/// Get the current state of a lookup session
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    tag = SESSION_API_GROUP,
    params(
        ("id" = u64, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session found", body = SessionView),
        (status = 404, description = "Session not found"),
    )
)]
pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SessionView>, Error> {
    Ok(Json(view_of(&state, id).await?))
}

/// End a lookup session
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    tag = SESSION_API_GROUP,
    params(
        ("id" = u64, Path, description = "Session ID")
    ),
    responses(
        (status = 204, description = "Session removed"),
        (status = 404, description = "Session not found"),
    )
)]
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, Error> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::new(StatusCode::NOT_FOUND, SESSION_NOT_FOUND))
    }
}

/// Update the search term
#[utoipa::path(
    put,
    path = "/api/sessions/{id}/search",
    tag = SESSION_API_GROUP,
    request_body = SearchInput,
    params(
        ("id" = u64, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Search results refreshed", body = SessionView),
        (status = 404, description = "Session not found"),
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<SearchInput>,
) -> Result<Json<SessionView>, Error> {
    let surface = state.config.surface_fetch_errors;
    let view = state
        .sessions
        .update(id, |session| {
            session.set_search_term(&body.term, &state.catalog);
            session.view(id, surface)
        })
        .await
        .ok_or_else(|| Error::new(StatusCode::NOT_FOUND, SESSION_NOT_FOUND))?;
    Ok(Json(view))
}

/// Select a coin and load its market detail
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/select",
    tag = SESSION_API_GROUP,
    request_body = SelectInput,
    params(
        ("id" = u64, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Coin selected; detail loaded unless the fetch failed", body = SessionView),
        (status = 404, description = "Session or coin not found"),
    )
)]
pub async fn select_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<SelectInput>,
) -> Result<Json<SessionView>, Error> {
    let coin = state
        .catalog
        .get(&body.coin_id)
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, "Coin not found"))?;

    let ticket = state
        .sessions
        .update(id, |session| session.select(coin))
        .await
        .ok_or_else(|| Error::new(StatusCode::NOT_FOUND, SESSION_NOT_FOUND))?;

    // No lock is held while the fetch is in flight; the ticket decides whether it still applies.
    let result = state.ext.fetch_coin_detail(ticket.coin_id()).await;

    let applied = state
        .sessions
        .update(id, |session| session.apply_detail(&ticket, result))
        .await
        .ok_or_else(|| Error::new(StatusCode::NOT_FOUND, SESSION_NOT_FOUND))?;
    if !applied {
        info!(session_id = id, coin_id = ticket.coin_id(), "selection superseded");
    }

    Ok(Json(view_of(&state, id).await?))
}

/// Enter a price multiplier
#[utoipa::path(
    put,
    path = "/api/sessions/{id}/multiplier",
    tag = SESSION_API_GROUP,
    request_body = FigureInput,
    params(
        ("id" = u64, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Derived price and market cap updated", body = SessionView),
        (status = 404, description = "Session not found"),
    )
)]
pub async fn multiplier_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<FigureInput>,
) -> Result<Json<SessionView>, Error> {
    let surface = state.config.surface_fetch_errors;
    let view = state
        .sessions
        .update(id, |session| {
            session.set_multiplier(&body.value);
            session.view(id, surface)
        })
        .await
        .ok_or_else(|| Error::new(StatusCode::NOT_FOUND, SESSION_NOT_FOUND))?;
    Ok(Json(view))
}

/// Enter a target price
#[utoipa::path(
    put,
    path = "/api/sessions/{id}/price",
    tag = SESSION_API_GROUP,
    request_body = FigureInput,
    params(
        ("id" = u64, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Derived market cap updated", body = SessionView),
        (status = 404, description = "Session not found"),
    )
)]
pub async fn target_price_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<FigureInput>,
) -> Result<Json<SessionView>, Error> {
    let surface = state.config.surface_fetch_errors;
    let view = state
        .sessions
        .update(id, |session| {
            session.set_target_price(&body.value);
            session.view(id, surface)
        })
        .await
        .ok_or_else(|| Error::new(StatusCode::NOT_FOUND, SESSION_NOT_FOUND))?;
    Ok(Json(view))
}
