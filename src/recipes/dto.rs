use serde::{Deserialize, Serialize};

use crate::auth::PublicUser;
use crate::error::ValidationError;
use crate::recipes::repo::{Recipe, RecipeWithOwner};

/// Request body for recipe creation. All fields required;
/// `minutes_to_complete` must deserialize as an integer.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i32,
}

/// Field rules checked before any row is constructed. Returns the first
/// rule that fails.
pub fn validate_new_recipe(title: &str, instructions: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::TitleMissing);
    }
    if instructions.chars().count() <= 50 {
        return Err(ValidationError::InstructionsTooShort);
    }
    Ok(())
}

/// Recipe as served to clients: no timestamps, owner nested without its
/// own recipe list.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: i64,
    pub user: PublicUser,
}

impl RecipeResponse {
    pub fn from_parts(recipe: Recipe, user: PublicUser) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            instructions: recipe.instructions,
            minutes_to_complete: recipe.minutes_to_complete,
            user_id: recipe.user_id,
            user,
        }
    }
}

impl From<RecipeWithOwner> for RecipeResponse {
    fn from(row: RecipeWithOwner) -> Self {
        Self {
            id: row.id,
            title: row.title,
            instructions: row.instructions,
            minutes_to_complete: row.minutes_to_complete,
            user_id: row.user_id,
            user: PublicUser {
                id: row.user_id,
                username: row.username,
                bio: row.bio,
                image_url: row.image_url,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_at_exactly_50_chars_fail() {
        let instructions = "a".repeat(50);
        assert_eq!(
            validate_new_recipe("Soup", &instructions),
            Err(ValidationError::InstructionsTooShort)
        );
    }

    #[test]
    fn instructions_at_51_chars_pass() {
        let instructions = "a".repeat(51);
        assert_eq!(validate_new_recipe("Soup", &instructions), Ok(()));
    }

    #[test]
    fn empty_title_fails_with_title_rule() {
        let instructions = "a".repeat(60);
        assert_eq!(
            validate_new_recipe("", &instructions),
            Err(ValidationError::TitleMissing)
        );
    }

    #[test]
    fn minutes_must_be_an_integer() {
        let body = serde_json::json!({
            "title": "Soup",
            "instructions": "long enough",
            "minutes_to_complete": "ten"
        });
        assert!(serde_json::from_value::<CreateRecipeRequest>(body).is_err());
    }

    #[test]
    fn response_nests_owner_without_recipe_list() {
        let row = RecipeWithOwner {
            id: 1,
            title: "Soup".into(),
            instructions: "Simmer the stock gently for an hour, season well, then strain.".into(),
            minutes_to_complete: Some(10),
            user_id: 42,
            username: "ana".into(),
            bio: Some("x".into()),
            image_url: Some("y".into()),
        };
        let json = serde_json::to_value(RecipeResponse::from(row)).unwrap();
        assert_eq!(json["user"]["username"], "ana");
        assert!(json["user"].get("recipes").is_none());
        assert!(json["user"].get("password_hash").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn response_carries_owner_id_at_top_level() {
        let row = RecipeWithOwner {
            id: 1,
            title: "Soup".into(),
            instructions: "Simmer the stock gently for an hour, season well, then strain.".into(),
            minutes_to_complete: Some(10),
            user_id: 42,
            username: "ana".into(),
            bio: None,
            image_url: None,
        };
        let json = serde_json::to_value(RecipeResponse::from(row)).unwrap();
        assert_eq!(json["user_id"], 42);
        assert_eq!(json["user"]["id"], 42);

        let recipe = Recipe {
            id: 2,
            title: "Stew".into(),
            instructions: "Brown the meat, add vegetables, and simmer until tender.".into(),
            minutes_to_complete: None,
            user_id: 42,
            created_at: time::macros::datetime!(2024-01-01 00:00 UTC),
            updated_at: time::macros::datetime!(2024-01-01 00:00 UTC),
        };
        let owner = PublicUser {
            id: 42,
            username: "ana".into(),
            bio: None,
            image_url: None,
        };
        let json = serde_json::to_value(RecipeResponse::from_parts(recipe, owner)).unwrap();
        assert_eq!(json["user_id"], 42);
    }
}
