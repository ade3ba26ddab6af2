use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    models::{Error, TokenClaim, User},
    AppState,
};

/// Rejects requests without a valid bearer token and exposes the caller as `Extension<User>`.
pub async fn auth_guard(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or((StatusCode::UNAUTHORIZED, "Missing bearer token"))?;

    let claims = decode::<TokenClaim>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_ref()),
        &Validation::default(),
    )?
    .claims;

    let user: User = state
        .db
        .get_user_by_id(user_id(&claims)?)
        .await?
        .ok_or((StatusCode::UNAUTHORIZED, "User no longer exists"))?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// The account a token was issued for.
pub fn user_id(claims: &TokenClaim) -> Result<i32, Error> {
    claims
        .sub
        .parse()
        .map_err(|_| Error::new(StatusCode::UNAUTHORIZED, "Invalid token"))
}
