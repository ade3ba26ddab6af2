use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

use crate::{
    models::{
        dto::{LoginInfo, Profile, RegisterInfo, TokenResponse, UpdateUser},
        Error, TokenClaim, User,
    },
    AppState, Config,
};

use super::middlewares::auth_guard;

#[derive(OpenApi)]
#[openapi(paths(
    register_user_handler,
    login_handler,
    list_users_handler,
    get_user_handler,
    get_profile_handler,
    update_user_handler,
    delete_user_handler
))]
/// Defines the OpenAPI spec for user endpoints
pub struct UsersApi;

/// Used to group user endpoints together in the OpenAPI documentation
pub const USER_API_GROUP: &str = "USER";

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Builds a router for all the user routes
pub fn user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(register_user_handler).get(list_users_handler))
        .route("/login", post(login_handler))
        .route(
            "/profile",
            get(get_profile_handler)
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard)),
        )
        .route(
            "/:id",
            get(get_user_handler).merge(
                put(update_user_handler)
                    .delete(delete_user_handler)
                    .route_layer(middleware::from_fn_with_state(state, auth_guard)),
            ),
        )
}

fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hashed_password: &str) -> bool {
    PasswordHash::new(hashed_password)
        .and_then(|hash| Argon2::default().verify_password(password.as_bytes(), &hash))
        .is_ok()
}

fn issue_token(user_id: i32, config: &Config) -> Result<String, Error> {
    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::days(config.jwt_maxage_days)).timestamp() as usize;

    let claims = TokenClaim {
        sub: user_id.to_string(),
        exp,
        iat,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )?)
}

fn require_self(caller: &User, id: i32) -> Result<(), Error> {
    if caller.id == id {
        Ok(())
    } else {
        Err(Error::new(
            StatusCode::FORBIDDEN,
            "Users may only modify their own account",
        ))
    }
}

// Register user handler function
#[utoipa::path(
    post,
    path = "/api/users",
    tag = USER_API_GROUP,
    request_body = RegisterInfo,
    responses(
        (status = 201, description = "User successfully created", body = Profile),
        (status = 400, description = "A required field is blank"),
        (status = 409, description = "Email already exists"),
    )
)]
pub async fn register_user_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterInfo>,
) -> Result<impl IntoResponse, Error> {
    if let Some(message) = body.validation_error() {
        return Err(Error::new(StatusCode::BAD_REQUEST, message));
    }
    let email = body.email.trim().to_ascii_lowercase();
    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(Error::new(StatusCode::CONFLICT, "Email already exists"));
    }

    let data = User {
        name: body.name.trim().to_owned(),
        email,
        hashed_password: hash_password(&body.password)?,
        ..Default::default()
    };

    let user: User = state.db.create_user(&data).await?;
    info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(Profile::from(user))))
}

// Login handler function
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = USER_API_GROUP,
    request_body = LoginInfo,
    responses(
        (status = 200, description = "Bearer token issued", body = TokenResponse),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginInfo>,
) -> Result<impl IntoResponse, Error> {
    let email = body.email.trim().to_ascii_lowercase();
    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or((StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS))?;

    if !verify_password(&body.password, &user.hashed_password) {
        return Err(Error::new(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS));
    }

    let token = issue_token(user.id, &state.config)?;
    Ok(Json(TokenResponse { token }))
}

// List users handler function
#[utoipa::path(
    get,
    path = "/api/users",
    tag = USER_API_GROUP,
    responses(
        (status = 200, description = "All users", body = [Profile]),
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Profile>>, Error> {
    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(Profile::from).collect()))
}

// Get user handler function
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = USER_API_GROUP,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = Profile),
        (status = 404, description = "User not found"),
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Profile>, Error> {
    let user = state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or((StatusCode::NOT_FOUND, "User not found"))?;
    Ok(Json(Profile::from(user)))
}

// Get profile handler function
#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = USER_API_GROUP,
    responses(
        (status = 200, description = "User profile successfully retrieved", body = Profile),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_profile_handler(Extension(user): Extension<User>) -> impl IntoResponse {
    Json(Profile::from(user))
}

// Update user handler function
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = USER_API_GROUP,
    request_body = UpdateUser,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    security(
        ("bearerAuth" = [])
    ),
    responses(
        (status = 200, description = "User successfully updated", body = Profile),
        (status = 400, description = "A provided field is blank"),
        (status = 403, description = "Not the caller's account"),
        (status = 409, description = "Email already exists"),
    )
)]
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<User>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUser>,
) -> Result<Json<Profile>, Error> {
    require_self(&caller, id)?;
    let mut user = caller;

    if let Some(name) = body.name {
        if name.trim().is_empty() {
            return Err(Error::new(StatusCode::BAD_REQUEST, "Please add a name"));
        }
        user.name = name.trim().to_owned();
    }
    if let Some(email) = body.email {
        if email.trim().is_empty() {
            return Err(Error::new(StatusCode::BAD_REQUEST, "Please add an email"));
        }
        user.email = email.trim().to_ascii_lowercase();
    }
    if let Some(password) = body.password {
        if password.is_empty() {
            return Err(Error::new(StatusCode::BAD_REQUEST, "Please add a password"));
        }
        user.hashed_password = hash_password(&password)?;
    }

    let updated = state.db.update_user(&user).await?;
    Ok(Json(Profile::from(updated)))
}

// Delete user handler function
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = USER_API_GROUP,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    security(
        ("bearerAuth" = [])
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Not the caller's account"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<User>,
    Path(id): Path<i32>,
) -> Result<StatusCode, Error> {
    require_self(&caller, id)?;
    if state.db.delete_user(id).await? {
        info!(user_id = id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::new(StatusCode::NOT_FOUND, "User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::middlewares::user_id;
    use crate::testing::{send, send_with_headers, test_config, test_state, FakeSource, TEST_JWT_SECRET};
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use serde_json::json;

    #[test]
    fn hashed_passwords_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[test]
    fn issued_tokens_carry_the_user_id() {
        let token = issue_token(42, &test_config(false)).unwrap();
        let claims = decode::<TokenClaim>(
            &token,
            &DecodingKey::from_secret(TEST_JWT_SECRET.as_ref()),
            &Validation::default(),
        )
        .unwrap()
        .claims;
        assert_eq!(claims.sub, "42");
        assert_eq!(user_id(&claims).unwrap(), 42);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn tokens_without_a_numeric_subject_are_rejected() {
        let app = crate::routes::router(test_state(FakeSource::default(), false).await);
        let now = Utc::now().timestamp() as usize;
        let claims = TokenClaim {
            sub: "satoshi@example.com".into(),
            iat: now,
            exp: now + 3600,
        };
        assert_eq!(user_id(&claims).unwrap_err().code, StatusCode::UNAUTHORIZED);

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_ref()),
        )
        .unwrap();
        let bearer = format!("Bearer {token}");
        let (status, body) = send_with_headers(
            &app,
            "DELETE",
            "/api/users/1",
            None,
            &[("authorization", bearer.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");
    }

    #[test]
    fn only_the_owner_may_modify() {
        let caller = User {
            id: 7,
            ..Default::default()
        };
        assert!(require_self(&caller, 7).is_ok());
        assert_eq!(require_self(&caller, 8).unwrap_err().code, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn blank_registration_fields_are_rejected() {
        let app = crate::routes::router(test_state(FakeSource::default(), false).await);
        let (status, body) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "name": "Hal", "email": "  ", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Please add an email");
    }

    #[tokio::test]
    async fn mutations_require_a_token() {
        let app = crate::routes::router(test_state(FakeSource::default(), false).await);

        let (status, _) = send(&app, "PUT", "/api/users/1", Some(json!({ "name": "x" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "DELETE", "/api/users/1", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/api/users/profile", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send_with_headers(
            &app,
            "DELETE",
            "/api/users/1",
            None,
            &[("authorization", "Bearer garbage")],
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
