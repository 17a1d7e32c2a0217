use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::dto::{LoginRequest, SignupRequest, UserResponse},
    auth::extractors::{AuthSession, AuthUser},
    config::SessionConfig,
    error::ApiError,
    state::AppState,
    users::{NewUser, User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", delete(logout))
        .route("/check_session", get(check_session))
}

fn session_cookie(config: &SessionConfig, token: &str) -> Result<HeaderMap, ApiError> {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        config.cookie_name, token
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        cookie.parse().map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?,
    );
    Ok(headers)
}

fn clear_session_cookie(config: &SessionConfig) -> Result<HeaderMap, ApiError> {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        cookie.parse().map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?,
    );
    Ok(headers)
}

/// POST /signup: create the user, then auto-login.
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<UserResponse>), ApiError> {
    let new_user = NewUser::new(
        &payload.username,
        &payload.password,
        payload.bio,
        payload.image_url,
    )?;

    let user = User::create(&state.db, &new_user).await?;

    let token = state.sessions.issue(user.id);
    let headers = session_cookie(&state.config.session, &token)?;

    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok((StatusCode::CREATED, headers, Json(user.into())))
}

/// POST /login: verify credentials and open a session.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, HeaderMap, Json<UserResponse>), ApiError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        warn!("login missing credentials");
        return Err(ApiError::validation("Username and password required"));
    }

    let user = User::authenticate(&state.db, &payload.username, &payload.password)
        .await?
        .ok_or_else(|| {
            warn!(username = %payload.username, "login invalid credentials");
            ApiError::Unauthorized("Invalid username or password")
        })?;

    let token = state.sessions.issue(user.id);
    let headers = session_cookie(&state.config.session, &token)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok((StatusCode::OK, headers, Json(user.into())))
}

/// DELETE /logout: revoke the presented token and expire the cookie.
#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    state.sessions.revoke(&session.token);
    let headers = clear_session_cookie(&state.config.session)?;

    info!(user_id = %session.user_id, "user logged out");
    Ok((StatusCode::NO_CONTENT, headers))
}

/// GET /check_session: the current identity, re-read from the store so a
/// deleted user with a live token is still rejected.
#[instrument(skip(state))]
pub async fn check_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| {
            warn!(%user_id, "session references a missing user");
            ApiError::Unauthorized("Unauthorized")
        })?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod cookie_tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            cookie_name: "recipebox_session".into(),
            ttl_minutes: 5,
        }
    }

    #[test]
    fn session_cookie_is_http_only_and_scoped_to_root() {
        let headers = session_cookie(&config(), "tok-123").unwrap();
        let value = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert_eq!(
            value,
            "recipebox_session=tok-123; Path=/; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let headers = clear_session_cookie(&config()).unwrap();
        let value = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.starts_with("recipebox_session=;"));
        assert!(value.contains("Max-Age=0"));
    }
}
