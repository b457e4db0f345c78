use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::recipes::dto::validate_new_recipe;

/// Recipe record in the database. `user_id` always comes from the
/// authenticated session, never from client input.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: i64,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub updated_at: OffsetDateTime,
}

/// One row of the recipe listing, joined with its owner's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeWithOwner {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: i64,
    pub username: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl Recipe {
    /// Validate then insert. A violated rule means no row is written.
    pub async fn create(
        db: &PgPool,
        title: &str,
        instructions: &str,
        minutes_to_complete: Option<i32>,
        user_id: i64,
    ) -> Result<Recipe, ApiError> {
        validate_new_recipe(title, instructions)?;

        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (title, instructions, minutes_to_complete, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, instructions, minutes_to_complete, user_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(instructions)
        .bind(minutes_to_complete)
        .bind(user_id)
        .fetch_one(db)
        .await?;

        Ok(recipe)
    }

    /// Every recipe with its owner, in insertion order.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<RecipeWithOwner>> {
        let rows = sqlx::query_as::<_, RecipeWithOwner>(
            r#"
            SELECT r.id, r.title, r.instructions, r.minutes_to_complete,
                   r.user_id, u.username, u.bio, u.image_url
            FROM recipes r
            JOIN users u ON u.id = r.user_id
            ORDER BY r.id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn recipe_row_never_serializes_timestamps() {
        let recipe = Recipe {
            id: 1,
            title: "Soup".into(),
            instructions: "Simmer the stock gently for an hour, season, then strain.".into(),
            minutes_to_complete: Some(10),
            user_id: 42,
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00 UTC),
        };
        let json = serde_json::to_value(&recipe).unwrap();
        assert!(json.get("created_at").is_none());
        assert!(json.get("updated_at").is_none());
        assert_eq!(json["title"], "Soup");
    }
}
