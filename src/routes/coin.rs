use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    lookup::{
        derive::{by_multiplier, market_cap_at_price, parse_operand},
        DerivedFigures,
    },
    models::{
        dto::{DeriveQuery, SearchQuery},
        CoinDetail, CoinSummary, Error,
    },
    AppState,
};

/// Defines the OpenAPI spec for coin endpoints
#[derive(OpenApi)]
#[openapi(paths(search_coins_handler, get_coin_handler, derive_coin_handler))]
pub struct CoinsApi;

/// Used to group coin endpoints together in the OpenAPI documentation
pub const COIN_API_GROUP: &str = "COIN";

/// Builds a router for coin routes
pub fn coin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(search_coins_handler))
        .route("/:id", get(get_coin_handler))
        .route("/:id/derive", get(derive_coin_handler))
}

/// Search the coin catalog by name or symbol
#[utoipa::path(
    get,
    path = "/api/coins",
    tag = COIN_API_GROUP,
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive name or symbol fragment")
    ),
    responses(
        (status = 200, description = "At most 50 matching coins, in catalog order", body = [CoinSummary]),
    )
)]
pub async fn search_coins_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<CoinSummary>> {
    Json(state.catalog.search(&query.search))
}

/// Get market detail for one coin
#[utoipa::path(
    get,
    path = "/api/coins/{id}",
    tag = COIN_API_GROUP,
    params(
        ("id" = String, Path, description = "Coin ID")
    ),
    responses(
        (status = 200, description = "Coin found", body = CoinDetail),
        (status = 404, description = "Coin not found"),
        (status = 502, description = "Upstream API failed"),
    )
)]
pub async fn get_coin_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CoinDetail>, Error> {
    let detail = state.ext.fetch_coin_detail(&id).await?;
    Ok(Json(detail))
}

/// Compute hypothetical price and market cap for one coin
#[utoipa::path(
    get,
    path = "/api/coins/{id}/derive",
    tag = COIN_API_GROUP,
    params(
        ("id" = String, Path, description = "Coin ID"),
        ("multiplier" = Option<String>, Query, description = "Factor applied to the current price"),
        ("target_price" = Option<String>, Query, description = "Price to value the supply at; overrides the multiplier market cap")
    ),
    responses(
        (status = 200, description = "Derived figures; unusable input yields nulls", body = DerivedFigures),
        (status = 404, description = "Coin not found"),
    )
)]
pub async fn derive_coin_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DeriveQuery>,
) -> Result<Json<DerivedFigures>, Error> {
    let detail = state.ext.fetch_coin_detail(&id).await?;
    let market = &detail.market_data;

    let mut figures = query
        .multiplier
        .as_deref()
        .and_then(parse_operand)
        .map(|multiplier| by_multiplier(market, multiplier))
        .unwrap_or_default();

    if let Some(target) = query.target_price.as_deref() {
        figures.calculated_market_cap =
            parse_operand(target).and_then(|price| market_cap_at_price(market, price));
    }

    Ok(Json(figures))
}
