use crate::models::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at.to_string(),
            updated_at: user.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginInfo {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterInfo {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterInfo {
    /// Message for the first blank field, if any.
    pub fn validation_error(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("Please add a name")
        } else if self.email.trim().is_empty() {
            Some("Please add an email")
        } else if self.password.is_empty() {
            Some("Please add a password")
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
