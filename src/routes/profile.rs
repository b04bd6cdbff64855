//! Blob style-profile routes on the auth service.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::services::profile::{self as profile_svc, ProfileError, StyleProfile};
use crate::services::styles::StylePreference;
use crate::state::AppState;

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::MissingFields | ProfileError::InvalidStyle(_) | ProfileError::InvalidColor(_) => {
                Self::Validation(err.to_string())
            }
            ProfileError::NotFound(_) => Self::NotFound(err.to_string()),
            ProfileError::Db(e) => Self::database(&e),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
    style_preferences: Option<Vec<StylePreference>>,
    color_preferences: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    success: bool,
    profile: StyleProfile,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    success: bool,
}

/// `GET /api/style-profile/{user_id}`
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ProfileResponse>, ApiError> {
    auth.ensure_owner(user_id)?;
    let profile = profile_svc::get_profile(&state.pool, user_id).await?;
    Ok(Json(ProfileResponse { success: true, profile }))
}

/// `POST /api/style-profile/{user_id}`
pub async fn set_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    body: Result<Json<ProfileBody>, JsonRejection>,
) -> Result<Json<SavedResponse>, ApiError> {
    auth.ensure_owner(user_id)?;
    let Json(body) = body?;
    let profile = StyleProfile::from_parts(body.style_preferences, body.color_preferences)?;
    profile_svc::set_profile(&state.pool, user_id, &profile).await?;
    Ok(Json(SavedResponse { success: true }))
}
