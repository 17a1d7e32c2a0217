use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::User;

/// Request body for signup. Credential fields default to empty so absent
/// and blank values flow through the same validation path.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of a user. Credential material never appears here.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub image_url: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            bio: user.bio,
            image_url: user.image_url,
        }
    }
}
