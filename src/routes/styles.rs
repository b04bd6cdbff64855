//! Slot style-profile routes on the style service.
//!
//! All `/api/users/{user_id}/styles*` routes need a session whose user id
//! matches the path. The listing and debug routes exist only when
//! `DEBUG_ROUTES` is on.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use super::auth::AuthUser;
use crate::db::{self, ColumnInfo};
use crate::error::ApiError;
use crate::services::styles::{self as styles_svc, SlotRow, StyleError, StylePreference};
use crate::state::AppState;

impl From<StyleError> for ApiError {
    fn from(err: StyleError) -> Self {
        match err {
            StyleError::TooMany(_)
            | StyleError::EmptyName
            | StyleError::NameTooLong(_)
            | StyleError::DuplicateName(_)
            | StyleError::PercentageOutOfRange { .. } => Self::Validation(err.to_string()),
            StyleError::ProfileNotFound(_) | StyleError::StyleNotFound { .. } => Self::NotFound(err.to_string()),
            StyleError::Db(e) => Self::database(&e),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Banner {
    service: &'static str,
    status: &'static str,
}

/// `GET /`
pub async fn banner() -> Json<Banner> {
    Json(Banner { service: "Style Profile Service", status: "running" })
}

// =============================================================================
// PER-USER
// =============================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    success: bool,
    message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStyleBody {
    percentage: i32,
}

/// `GET /api/users/{user_id}/styles`: a bare array, highest percentage first.
pub async fn get_styles(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<StylePreference>>, ApiError> {
    auth.ensure_owner(user_id)?;
    let styles = styles_svc::get_styles(&state.pool, user_id).await?;
    Ok(Json(styles))
}

/// `POST /api/users/{user_id}/styles`: replace the whole profile. The body is
/// a bare array of preferences.
pub async fn set_styles(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    body: Result<Json<Vec<StylePreference>>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth.ensure_owner(user_id)?;
    let Json(preferences) = body?;
    styles_svc::set_styles(&state.pool, user_id, &preferences).await?;
    Ok(Json(MessageResponse { success: true, message: "Style preferences updated successfully" }))
}

/// `PATCH /api/users/{user_id}/styles/{style_name}`
pub async fn update_style(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, style_name)): Path<(i64, String)>,
    body: Result<Json<UpdateStyleBody>, JsonRejection>,
) -> Result<Json<Vec<StylePreference>>, ApiError> {
    auth.ensure_owner(user_id)?;
    let Json(body) = body?;
    let styles = styles_svc::update_one_style(&state.pool, user_id, &style_name, body.percentage).await?;
    Ok(Json(styles))
}

// =============================================================================
// DEBUG
// =============================================================================

#[derive(Debug, Serialize)]
pub struct RawProfileResponse {
    success: bool,
    profile: Option<SlotRow>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionInfo {
    connected: bool,
    host: String,
    port: u16,
    user: String,
    database: Option<String>,
}

/// `GET /api/styles/all`: user id to decoded styles.
pub async fn list_all(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<BTreeMap<i64, Vec<StylePreference>>>, ApiError> {
    let profiles = styles_svc::list_all_styles(&state.pool).await?;
    Ok(Json(profiles))
}

/// `GET /api/debug/raw-profile/{user_id}`
pub async fn raw_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<RawProfileResponse>, ApiError> {
    let profile = styles_svc::raw_profile(&state.pool, user_id).await?;
    Ok(Json(RawProfileResponse { success: true, profile }))
}

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    tables: Vec<String>,
    structure: BTreeMap<String, Vec<ColumnInfo>>,
}

/// `GET /api/debug/tables`: every table in the current schema with its columns.
pub async fn tables(State(state): State<AppState>) -> Result<Json<TablesResponse>, ApiError> {
    let structure = db::describe_tables(&state.pool).await?;
    let tables = structure.keys().cloned().collect();
    Ok(Json(TablesResponse { tables, structure }))
}

/// `GET /api/debug/connection`: target and reachability. Never includes the
/// password.
pub async fn connection(State(state): State<AppState>) -> Result<Json<ConnectionInfo>, ApiError> {
    let options = state.db.connect_options()?;
    let connected = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "debug connection probe failed");
            false
        }
    };

    Ok(Json(ConnectionInfo {
        connected,
        host: options.get_host().to_owned(),
        port: options.get_port(),
        user: options.get_username().to_owned(),
        database: options.get_database().map(str::to_owned),
    }))
}
