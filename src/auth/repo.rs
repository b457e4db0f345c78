use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::{ApiError, ValidationError};

/// User record in the database. The hash and timestamps never leave the
/// server; there is no way to read a plaintext password back out.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Insert a new user. Uniqueness is enforced by the store at commit
    /// time: `ON CONFLICT DO NOTHING` makes the duplicate check and the
    /// write a single atomic operation, so no row is written on failure.
    pub async fn create(
        db: &PgPool,
        username: &str,
        password_hash: &str,
        bio: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<User, ApiError> {
        if username.is_empty() {
            return Err(ValidationError::UsernameMissing.into());
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, bio, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash, bio, image_url, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(bio)
        .bind(image_url)
        .fetch_optional(db)
        .await?;

        user.ok_or_else(|| ValidationError::UsernameTaken.into())
    }

    /// Exact, case-sensitive lookup.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, bio, image_url, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, bio, image_url, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
