use std::time::Duration;

use crate::models::User;
use sqlx::{postgres::PgPoolOptions, PgPool, Result};

const USER_COLUMNS: &str = "id, name, email, hashed_password, created_at, updated_at";

/// Connects to a PostgreSQL database with the given `db_url`, returning a connection pool for accessing it
pub async fn connect_sqlx(db_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .idle_timeout(Duration::from_secs(30))
        .max_connections(32)
        .min_connections(4)
        .connect(db_url)
        .await
}

pub struct PostgreDatabase {
    sqlx_db: PgPool,
}

impl PostgreDatabase {
    pub fn new(sqlx_db: PgPool) -> Self {
        PostgreDatabase { sqlx_db }
    }

    /// Creates the `app_user` table if it is missing. E-mail uniqueness is enforced here.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS app_user (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                hashed_password TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.sqlx_db)
        .await?;
        Ok(())
    }

    /// Create a new user using a reference to a `User` struct
    pub async fn create_user(&self, user: &User) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO app_user (name, email, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .fetch_one(&self.sqlx_db)
        .await
    }

    /// List all users, oldest first
    pub async fn list_users(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user ORDER BY id"
        ))
        .fetch_all(&self.sqlx_db)
        .await
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, user_id: i32) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.sqlx_db)
        .await
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.sqlx_db)
        .await
    }

    pub async fn update_user(&self, user: &User) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE app_user
            SET name = $1,
                email = $2,
                hashed_password = $3,
                updated_at = now()
            WHERE id = $4
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.id)
        .fetch_one(&self.sqlx_db)
        .await
    }

    /// Returns whether a row was deleted
    pub async fn delete_user(&self, user_id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM app_user WHERE id = $1")
            .bind(user_id)
            .execute(&self.sqlx_db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
