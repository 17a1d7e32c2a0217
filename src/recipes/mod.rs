mod dto;
pub mod handlers;
mod repo;
mod repo_types;

pub use repo::NewRecipe;
pub use repo_types::Recipe;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::recipe_routes()
}
