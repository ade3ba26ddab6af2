use core::fmt;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;

use super::dto::Message;

/// Postgres error code for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug)]
pub struct Error {
    pub code: StatusCode,
    pub body: Json<Message>,
}

impl Error {
    pub fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            body: Json(Message::new(message)),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.code, self.body).into_response()
    }
}

impl From<(StatusCode, &str)> for Error {
    fn from((code, msg): (StatusCode, &str)) -> Self {
        Self::new(code, msg)
    }
}

impl From<sqlx::error::Error> for Error {
    fn from(error: sqlx::error::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => Self::new(StatusCode::NOT_FOUND, "Record not found"),
            sqlx::Error::Database(db_error)
                if db_error.code().as_deref() == Some(PG_UNIQUE_VIOLATION) =>
            {
                Self::new(StatusCode::CONFLICT, "Email already exists")
            }
            _ => {
                tracing::error!(%error, "database error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, &error.to_string())
    }
}

impl From<argon2::password_hash::errors::Error> for Error {
    fn from(error: argon2::password_hash::errors::Error) -> Self {
        Self::new(StatusCode::BAD_REQUEST, &error.to_string())
    }
}

/// Failure while talking to the upstream coin API.
#[derive(Debug)]
pub enum FetchError {
    Request(reqwest::Error),
    Status(StatusCode),
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Request(e) => write!(f, "Request error: {}", e),
            FetchError::Status(code) => write!(f, "Upstream returned {}", code),
            FetchError::Decode(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return FetchError::Decode(error.to_string());
        }
        match error.status() {
            Some(status) => FetchError::Status(status),
            None => FetchError::Request(error),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::Decode(error.to_string())
    }
}

impl From<FetchError> for Error {
    fn from(error: FetchError) -> Self {
        let status_code = match &error {
            FetchError::Status(StatusCode::NOT_FOUND) => StatusCode::NOT_FOUND,
            FetchError::Status(StatusCode::TOO_MANY_REQUESTS) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self::new(status_code, &error.to_string())
    }
}
