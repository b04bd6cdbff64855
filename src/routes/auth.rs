//! Auth routes: email/password registration and login, session cookie, `me`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::error::ApiError;
use crate::services::auth::{self as auth_svc, AuthServiceError, UserSummary};
use crate::services::session;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::MissingCredentials => Self::Validation(err.to_string()),
            AuthServiceError::EmailTaken => Self::Conflict(err.to_string()),
            AuthServiceError::InvalidCredentials => Self::Auth(err.to_string()),
            AuthServiceError::Hash(detail) => {
                tracing::error!(error = %detail, "password hashing failed");
                Self::Internal("Internal server error".into())
            }
            AuthServiceError::Db(e) => Self::database(&e),
        }
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user from the session cookie or a bearer token.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

/// Cookie first, then `Authorization: Bearer <token>`.
pub(crate) fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(COOKIE_NAME).filter(|c| !c.value().is_empty()) {
        return Some(cookie.value().to_owned());
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(|| ApiError::Auth("Authentication required".into()))?;

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, &app_state.secret_key, &token)
            .await?
            .ok_or_else(|| ApiError::Auth("Invalid or expired session".into()))?;

        Ok(Self { user, token })
    }
}

impl AuthUser {
    /// Require the path user id to be the session's own.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] on mismatch.
    pub fn ensure_owner(&self, user_id: i64) -> Result<(), ApiError> {
        if self.user.id == user_id {
            Ok(())
        } else {
            tracing::warn!(session_user = self.user.id, path_user = user_id, "cross-user access denied");
            Err(ApiError::Forbidden("Not allowed to access another user's data".into()))
        }
    }
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(7))
        .build()
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Login and register body. Older clients send `email`; `username` wins when
/// both are present.
#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl CredentialsBody {
    fn username(&self) -> Option<&str> {
        self.username.as_deref().or(self.email.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    success: bool,
    user: UserSummary,
    token: String,
}

async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: UserSummary,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let token = session::create_session(&state.pool, &state.secret_key, user.id).await?;
    let jar = jar.add(session_cookie(token.clone(), state.config.cookie_secure));
    Ok((jar, Json(AuthResponse { success: true, user, token })))
}

/// `POST /api/users/register`: create a user and start a session.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let Json(body) = body?;
    let credentials = auth_svc::validate_credentials(body.username(), body.password.as_deref())?;
    let user = auth_svc::register(&state.pool, credentials).await?;
    start_session(&state, jar, user).await
}

/// `POST /api/users/login`: check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let Json(body) = body?;
    let credentials = auth_svc::validate_credentials(body.username(), body.password.as_deref())?;
    let user = auth_svc::login(&state.pool, credentials).await.inspect_err(|e| {
        if matches!(e, AuthServiceError::InvalidCredentials) {
            tracing::info!("login rejected");
        }
    })?;
    tracing::info!(user_id = user.id, "user logged in");
    start_session(&state, jar, user).await
}

/// `GET /api/users/me`: return the current user.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/users/logout`: delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &state.secret_key, &auth.token).await {
        tracing::warn!(error = %e, user_id = auth.user.id, "session delete failed");
    }

    let cookie = Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(Duration::ZERO);

    let jar = CookieJar::new().add(cookie);
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
