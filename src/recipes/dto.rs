use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recipes::Recipe;

/// Request body for creating a recipe. There is deliberately no `user_id`
/// field: the owner always comes from the resolved session identity, and a
/// client-supplied value has nowhere to land.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
}

/// Public view of a recipe. Flat on purpose: no nested owner, so the
/// user → recipes → user cycle cannot reach the serializer.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i32,
    pub user_id: Uuid,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            instructions: recipe.instructions,
            minutes_to_complete: recipe.minutes_to_complete,
            user_id: recipe.user_id,
        }
    }
}
