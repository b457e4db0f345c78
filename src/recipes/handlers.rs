use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{repo::User, session::SessionUser},
    error::ApiError,
    recipes::{
        dto::{CreateRecipeRequest, RecipeResponse},
        repo::Recipe,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/recipes", get(index).post(create))
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    SessionUser(_user_id): SessionUser,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    let rows = Recipe::list_all(&state.db).await?;
    let recipes = rows.into_iter().map(RecipeResponse::from).collect();
    Ok(Json(recipes))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    // The owner comes from the session. A session whose user has since
    // been deleted cannot create rows.
    let owner = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User is not logged in"))?;

    let recipe = Recipe::create(
        &state.db,
        &payload.title,
        &payload.instructions,
        Some(payload.minutes_to_complete),
        owner.id,
    )
    .await
    .map_err(|e| {
        warn!(user_id, error = %e, "recipe rejected");
        e
    })?;

    info!(recipe_id = recipe.id, user_id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(RecipeResponse::from_parts(recipe, owner.into())),
    ))
}
