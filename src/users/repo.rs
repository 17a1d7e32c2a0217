use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::users::repo_types::{User, DEFAULT_IMAGE_URL};

/// A user that passed field validation and is ready to persist. The fields
/// are private: the only way to get one is through `new`, so an invalid
/// user cannot reach the store.
#[derive(Debug)]
pub struct NewUser {
    username: String,
    password_hash: String,
    bio: Option<String>,
    image_url: String,
}

impl NewUser {
    pub fn new(
        username: &str,
        password: &str,
        bio: Option<String>,
        image_url: Option<String>,
    ) -> Result<Self, ApiError> {
        let mut errors = Vec::new();
        if username.trim().is_empty() {
            errors.push("Username must be present".to_string());
        }
        if password.is_empty() {
            errors.push("Password must be present".to_string());
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let password_hash = hash_password(password)?;
        Ok(Self {
            username: username.to_string(),
            password_hash,
            bio,
            image_url: image_url.unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl User {
    /// Persist a validated user. The username check here is advisory; the
    /// UNIQUE constraint is the source of truth, so a concurrent signup
    /// losing the race surfaces as the same conflict error.
    pub async fn create(db: &PgPool, new_user: &NewUser) -> Result<User, ApiError> {
        if Self::find_by_username(db, &new_user.username).await?.is_some() {
            return Err(ApiError::Conflict("Username already exists"));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, bio, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, bio, image_url, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.bio)
        .bind(&new_user.image_url)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(username = %new_user.username, "username lost a uniqueness race");
                ApiError::Conflict("Username already exists")
            } else {
                e.into()
            }
        })?;
        Ok(user)
    }

    /// Find a user by exact, case-sensitive username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, bio, image_url, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, bio, image_url, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Look up by username and verify the password against the stored hash.
    /// A missing user, an unset hash, and a wrong password all return `None`.
    pub async fn authenticate(
        db: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, ApiError> {
        let Some(user) = Self::find_by_username(db, username).await? else {
            return Ok(None);
        };
        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Delete a user and everything they own: recipes first, then the row,
    /// in one transaction so a failure leaves both tables untouched.
    pub async fn delete_with_recipes(db: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM recipes WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
