use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::recipes::repo_types::Recipe;

/// A recipe that passed field validation. Rules run in order (title,
/// instructions, minutes) and the first failure is the reported error.
/// Private fields keep unvalidated recipes out of the store.
#[derive(Debug)]
pub struct NewRecipe {
    title: String,
    instructions: String,
    minutes_to_complete: i32,
    user_id: Uuid,
}

impl NewRecipe {
    pub fn new(
        title: &str,
        instructions: &str,
        minutes_to_complete: Option<i32>,
        user_id: Uuid,
    ) -> Result<Self, ApiError> {
        if title.trim().is_empty() {
            return Err(ApiError::validation("Title must be present"));
        }

        let trimmed = instructions.trim();
        if trimmed.is_empty() {
            return Err(ApiError::validation("Instructions must be present"));
        }
        if trimmed.chars().count() < 50 {
            return Err(ApiError::validation(
                "Instructions must be at least 50 characters long",
            ));
        }

        let minutes_to_complete = match minutes_to_complete {
            Some(minutes) if minutes >= 1 => minutes,
            _ => {
                return Err(ApiError::validation(
                    "Minutes to complete must be a positive integer",
                ))
            }
        };

        Ok(Self {
            title: title.to_string(),
            instructions: instructions.to_string(),
            minutes_to_complete,
            user_id,
        })
    }
}

impl Recipe {
    /// Persist a validated recipe. The owner comes from the session, but it
    /// can still vanish before the insert lands; the foreign key catches
    /// that and it reads as a validation failure, not a server fault.
    pub async fn create(db: &PgPool, new_recipe: &NewRecipe) -> Result<Recipe, ApiError> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (user_id, title, instructions, minutes_to_complete)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, instructions, minutes_to_complete, created_at
            "#,
        )
        .bind(new_recipe.user_id)
        .bind(&new_recipe.title)
        .bind(&new_recipe.instructions)
        .bind(new_recipe.minutes_to_complete)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                warn!(user_id = %new_recipe.user_id, "recipe owner no longer exists");
                ApiError::validation("Recipe must be associated with a user")
            } else {
                e.into()
            }
        })?;
        Ok(recipe)
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Recipe>, ApiError> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, user_id, title, instructions, minutes_to_complete, created_at
            FROM recipes
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
