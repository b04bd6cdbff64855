//! Blob-per-user style profile kept by the auth service.
//!
//! The record is replaced wholesale on every write. Its shape is fixed by
//! [`StyleProfile`] and checked before it reaches the database.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::info;

use super::styles::{MAX_PERCENTAGE, MAX_STYLE_NAME_LEN, StylePreference};

pub const MAX_STYLE_ENTRIES: usize = 32;
pub const MAX_COLOR_ENTRIES: usize = 32;
/// Long enough for named colors and `rgba(...)` strings.
pub const MAX_COLOR_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Style preferences and color preferences are required")]
    MissingFields,
    #[error("Invalid style preference: {0}")]
    InvalidStyle(String),
    #[error("Invalid color preference: {0}")]
    InvalidColor(String),
    #[error("Profile not found")]
    NotFound(i64),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// A user's stored preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub style_preferences: Vec<StylePreference>,
    /// Color labels or hex codes, in the client's order.
    pub color_preferences: Vec<String>,
}

impl StyleProfile {
    /// Build from optional request fields; both must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::MissingFields`] if either is absent, or the
    /// first shape violation found by [`StyleProfile::validate`].
    pub fn from_parts(
        style_preferences: Option<Vec<StylePreference>>,
        color_preferences: Option<Vec<String>>,
    ) -> Result<Self, ProfileError> {
        let (Some(style_preferences), Some(color_preferences)) = (style_preferences, color_preferences) else {
            return Err(ProfileError::MissingFields);
        };
        let profile = Self { style_preferences, color_preferences };
        profile.validate()?;
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns the first shape violation.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.style_preferences.len() > MAX_STYLE_ENTRIES {
            return Err(ProfileError::InvalidStyle(format!("at most {MAX_STYLE_ENTRIES} entries")));
        }
        for pref in &self.style_preferences {
            let name = pref.style_name.trim();
            if name.is_empty() || name.chars().count() > MAX_STYLE_NAME_LEN {
                return Err(ProfileError::InvalidStyle(format!("bad style name '{}'", pref.style_name)));
            }
            if !(0..=MAX_PERCENTAGE).contains(&pref.percentage) {
                return Err(ProfileError::InvalidStyle(format!(
                    "percentage {} for '{}' is outside 0..={MAX_PERCENTAGE}",
                    pref.percentage, pref.style_name
                )));
            }
        }

        if self.color_preferences.len() > MAX_COLOR_ENTRIES {
            return Err(ProfileError::InvalidColor(format!("at most {MAX_COLOR_ENTRIES} entries")));
        }
        if let Some(bad) = self
            .color_preferences
            .iter()
            .find(|c| c.trim().is_empty() || c.chars().count() > MAX_COLOR_LEN)
        {
            return Err(ProfileError::InvalidColor(format!("bad color '{bad}'")));
        }
        Ok(())
    }
}

/// Stored profile for a user, or [`ProfileError::NotFound`].
///
/// # Errors
///
/// Returns `NotFound` when no row exists, or a database error.
pub async fn get_profile(pool: &PgPool, user_id: i64) -> Result<StyleProfile, ProfileError> {
    let row = sqlx::query("SELECT style_preferences, color_preferences FROM style_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ProfileError::NotFound(user_id))?;

    let Json(style_preferences): Json<Vec<StylePreference>> = row.try_get("style_preferences")?;
    let Json(color_preferences): Json<Vec<String>> = row.try_get("color_preferences")?;
    Ok(StyleProfile { style_preferences, color_preferences })
}

/// Insert or overwrite the user's profile.
///
/// # Errors
///
/// Returns a database error.
pub async fn set_profile(pool: &PgPool, user_id: i64, profile: &StyleProfile) -> Result<(), ProfileError> {
    sqlx::query(
        r"INSERT INTO style_profiles (user_id, style_preferences, color_preferences)
          VALUES ($1, $2, $3)
          ON CONFLICT (user_id) DO UPDATE
          SET style_preferences = EXCLUDED.style_preferences,
              color_preferences = EXCLUDED.color_preferences,
              updated_at = now()",
    )
    .bind(user_id)
    .bind(Json(&profile.style_preferences))
    .bind(Json(&profile.color_preferences))
    .execute(pool)
    .await?;

    info!(user_id, styles = profile.style_preferences.len(), colors = profile.color_preferences.len(), "profile saved");
    Ok(())
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
