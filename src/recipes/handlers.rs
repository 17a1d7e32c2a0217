use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    recipes::dto::{CreateRecipeRequest, RecipeResponse},
    recipes::{NewRecipe, Recipe},
    state::AppState,
    users::User,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(list_recipes).post(create_recipe))
}

/// GET /recipes: the caller's recipes.
#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    if User::find_by_id(&state.db, user_id).await?.is_none() {
        warn!(%user_id, "recipe list for a missing user");
        return Err(ApiError::NotFound("User not found"));
    }

    let recipes = Recipe::list_by_user(&state.db, user_id).await?;
    let views = recipes.into_iter().map(RecipeResponse::from).collect();
    Ok(Json(views))
}

/// POST /recipes: create a recipe owned by the caller.
#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let new_recipe = NewRecipe::new(
        &payload.title,
        &payload.instructions,
        payload.minutes_to_complete,
        user_id,
    )?;

    let recipe = Recipe::create(&state.db, &new_recipe).await?;

    info!(recipe_id = %recipe.id, %user_id, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe.into())))
}
