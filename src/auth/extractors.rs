use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller's live session: the opaque token plus the user id it resolves
/// to. Rejects with 401 when no live session is presented.
pub struct AuthSession {
    pub token: String,
    pub user_id: Uuid,
}

/// Identity-only variant for handlers that never touch the token itself.
pub struct AuthUser(pub Uuid);

pub(crate) fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    for cookie in raw.split(';') {
        let mut parts = cookie.trim().splitn(2, '=');
        if parts.next() == Some(cookie_name) {
            return parts.next().map(|v| v.to_string());
        }
    }
    None
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.config.session.cookie_name)
            .ok_or(ApiError::Unauthorized("Unauthorized"))?;

        let user_id = state
            .sessions
            .resolve(&token)
            .ok_or(ApiError::Unauthorized("Unauthorized"))?;

        Ok(AuthSession { token, user_id })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        Ok(AuthUser(session.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = Request::builder()
            .uri("/check_session")
            .header(COOKIE, cookie)
            .body(())
            .expect("request builds");
        request.into_parts().0
    }

    #[test]
    fn session_token_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "recipebox_session=abc123".parse().unwrap());
        assert_eq!(
            session_token(&headers, "recipebox_session"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn session_token_skips_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "theme=dark; recipebox_session=tok; lang=en".parse().unwrap(),
        );
        assert_eq!(
            session_token(&headers, "recipebox_session"),
            Some("tok".to_string())
        );
    }

    #[test]
    fn session_token_is_none_without_cookie_header() {
        let headers = HeaderMap::new();
        assert_eq!(session_token(&headers, "recipebox_session"), None);
    }

    #[test]
    fn session_token_is_none_for_other_names_only() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "theme=dark".parse().unwrap());
        assert_eq!(session_token(&headers, "recipebox_session"), None);
    }

    #[tokio::test]
    async fn extractor_rejects_missing_cookie() {
        let state = AppState::fake();
        let request = Request::builder().uri("/recipes").body(()).unwrap();
        let mut parts = request.into_parts().0;
        let result = AuthUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn extractor_rejects_unknown_token() {
        let state = AppState::fake();
        let mut parts = parts_with_cookie("recipebox_session=bogus");
        let result = AuthUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn extractor_resolves_issued_token() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = state.sessions.issue(user_id);
        let mut parts = parts_with_cookie(&format!("recipebox_session={token}"));

        let AuthSession {
            token: seen,
            user_id: resolved,
        } = AuthSession::from_request_parts(&mut parts, &state)
            .await
            .expect("session should resolve");
        assert_eq!(seen, token);
        assert_eq!(resolved, user_id);
    }

    #[tokio::test]
    async fn extractor_rejects_revoked_token() {
        let state = AppState::fake();
        let token = state.sessions.issue(Uuid::new_v4());
        state.sessions.revoke(&token);
        let mut parts = parts_with_cookie(&format!("recipebox_session={token}"));
        let result = AuthUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
