//! Four-slot style profile store.
//!
//! DESIGN
//! ======
//! Each user has at most one row in `style_slot_profiles` holding up to four
//! `(style_N, style_N_percentage)` pairs. Writes pack the submitted
//! preferences into those slots in order; reads decode the non-empty slots
//! and sort them by percentage, highest first. A user without a row sees a
//! built-in default list.
//!
//! CONSTRAINTS
//! ===========
//! - At most [`SLOT_COUNT`] preferences per user.
//! - Names are non-empty, unique per user and at most [`MAX_STYLE_NAME_LEN`]
//!   characters.
//! - Percentages are in `0..=100`. They are not required to sum to 100.
//! - A slot with percentage 0 is stored but not returned by reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::{debug, info};

pub const SLOT_COUNT: usize = 4;
pub const MAX_STYLE_NAME_LEN: usize = 100;
pub const MAX_PERCENTAGE: i32 = 100;

// =============================================================================
// TYPES
// =============================================================================

/// One weighted style label, e.g. `Casual` at 40%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreference {
    pub style_name: String,
    pub percentage: i32,
}

impl StylePreference {
    #[must_use]
    pub fn new(style_name: impl Into<String>, percentage: i32) -> Self {
        Self { style_name: style_name.into(), percentage }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("At most {max} style preferences are allowed, got {0}", max = SLOT_COUNT)]
    TooMany(usize),
    #[error("Style name must not be empty")]
    EmptyName,
    #[error("Style name '{0}' is longer than {max} characters", max = MAX_STYLE_NAME_LEN)]
    NameTooLong(String),
    #[error("Style '{0}' appears more than once")]
    DuplicateName(String),
    #[error("Percentage for '{style_name}' must be between 0 and {max}, got {percentage}", max = MAX_PERCENTAGE)]
    PercentageOutOfRange { style_name: String, percentage: i32 },
    #[error("User profile not found")]
    ProfileNotFound(i64),
    #[error("Style '{style_name}' not found for user {user_id}")]
    StyleNotFound { user_id: i64, style_name: String },
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// One of the four fixed column pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    One,
    Two,
    Three,
    Four,
}

impl Slot {
    pub const ALL: [Slot; SLOT_COUNT] = [Slot::One, Slot::Two, Slot::Three, Slot::Four];

    #[must_use]
    pub fn percentage_column(self) -> &'static str {
        match self {
            Self::One => "style_1_percentage",
            Self::Two => "style_2_percentage",
            Self::Three => "style_3_percentage",
            Self::Four => "style_4_percentage",
        }
    }

    /// Targeted write for this slot's percentage. The column comes from this
    /// closed set; only values are bound.
    fn update_percentage_sql(self) -> &'static str {
        match self {
            Self::One => "UPDATE style_slot_profiles SET style_1_percentage = $1 WHERE user_id = $2",
            Self::Two => "UPDATE style_slot_profiles SET style_2_percentage = $1 WHERE user_id = $2",
            Self::Three => "UPDATE style_slot_profiles SET style_3_percentage = $1 WHERE user_id = $2",
            Self::Four => "UPDATE style_slot_profiles SET style_4_percentage = $1 WHERE user_id = $2",
        }
    }
}

/// A `style_slot_profiles` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SlotRow {
    pub user_id: i64,
    pub style_1: Option<String>,
    pub style_1_percentage: Option<i32>,
    pub style_2: Option<String>,
    pub style_2_percentage: Option<i32>,
    pub style_3: Option<String>,
    pub style_3_percentage: Option<i32>,
    pub style_4: Option<String>,
    pub style_4_percentage: Option<i32>,
}

impl SlotRow {
    /// Pack preferences into slots in submission order. Callers validate
    /// first; anything past the fourth entry is ignored.
    #[must_use]
    pub fn pack(user_id: i64, preferences: &[StylePreference]) -> Self {
        let mut row = Self { user_id, ..Self::default() };
        for (slot, pref) in Slot::ALL.into_iter().zip(preferences) {
            let (name, percentage) = row.slot_mut(slot);
            *name = Some(pref.style_name.clone());
            *percentage = Some(pref.percentage);
        }
        row
    }

    #[must_use]
    pub fn slot(&self, slot: Slot) -> (Option<&str>, Option<i32>) {
        match slot {
            Slot::One => (self.style_1.as_deref(), self.style_1_percentage),
            Slot::Two => (self.style_2.as_deref(), self.style_2_percentage),
            Slot::Three => (self.style_3.as_deref(), self.style_3_percentage),
            Slot::Four => (self.style_4.as_deref(), self.style_4_percentage),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> (&mut Option<String>, &mut Option<i32>) {
        match slot {
            Slot::One => (&mut self.style_1, &mut self.style_1_percentage),
            Slot::Two => (&mut self.style_2, &mut self.style_2_percentage),
            Slot::Three => (&mut self.style_3, &mut self.style_3_percentage),
            Slot::Four => (&mut self.style_4, &mut self.style_4_percentage),
        }
    }

    /// Emit the populated slots sorted by percentage, highest first.
    #[must_use]
    pub fn decode(&self) -> Vec<StylePreference> {
        let mut styles = Slot::ALL
            .into_iter()
            .filter_map(|slot| match self.slot(slot) {
                (Some(name), Some(percentage)) if !name.is_empty() && percentage != 0 => {
                    Some(StylePreference::new(name, percentage))
                }
                _ => None,
            })
            .collect::<Vec<_>>();
        sort_by_percentage_desc(&mut styles);
        styles
    }

    /// First slot whose name matches exactly.
    #[must_use]
    pub fn find_slot(&self, style_name: &str) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|&slot| self.slot(slot).0 == Some(style_name))
    }
}

/// Stable sort, so equal percentages keep their slot order.
pub fn sort_by_percentage_desc(styles: &mut [StylePreference]) {
    styles.sort_by(|a, b| b.percentage.cmp(&a.percentage));
}

// =============================================================================
// DEFAULTS
// =============================================================================

static DEMO_PROFILES: [(i64, [(&str, i32); SLOT_COUNT]); 3] = [
    (1, [("Casual", 40), ("Contemporary", 30), ("Minimalist", 20), ("Streetwear", 10)]),
    (2, [("Professional", 45), ("Classic", 25), ("Formal", 20), ("Business Casual", 10)]),
    (3, [("Streetwear", 35), ("Urban", 30), ("Athleisure", 20), ("Vintage", 15)]),
];

static FALLBACK_PROFILE: [(&str, i32); SLOT_COUNT] =
    [("Casual", 35), ("Minimalist", 25), ("Classic", 25), ("Trendy", 15)];

fn to_preferences(entries: &[(&str, i32)]) -> Vec<StylePreference> {
    entries
        .iter()
        .map(|&(name, percentage)| StylePreference::new(name, percentage))
        .collect()
}

/// The list served to a user without a stored row: a demo set for user ids
/// 1 to 3, the generic fallback for everyone else. Sorted like stored data.
#[must_use]
pub fn default_styles(user_id: i64) -> Vec<StylePreference> {
    let entries = DEMO_PROFILES
        .iter()
        .find(|(id, _)| *id == user_id)
        .map_or(&FALLBACK_PROFILE, |(_, entries)| entries);
    let mut styles = to_preferences(entries);
    sort_by_percentage_desc(&mut styles);
    styles
}

// =============================================================================
// VALIDATION
// =============================================================================

fn validate_percentage(style_name: &str, percentage: i32) -> Result<(), StyleError> {
    if (0..=MAX_PERCENTAGE).contains(&percentage) {
        Ok(())
    } else {
        Err(StyleError::PercentageOutOfRange { style_name: style_name.to_owned(), percentage })
    }
}

/// Enforce the slot constraints listed in the module docs.
///
/// # Errors
///
/// Returns the first violated constraint.
pub fn validate_preferences(preferences: &[StylePreference]) -> Result<(), StyleError> {
    if preferences.len() > SLOT_COUNT {
        return Err(StyleError::TooMany(preferences.len()));
    }
    for (i, pref) in preferences.iter().enumerate() {
        if pref.style_name.trim().is_empty() {
            return Err(StyleError::EmptyName);
        }
        if pref.style_name.chars().count() > MAX_STYLE_NAME_LEN {
            return Err(StyleError::NameTooLong(pref.style_name.clone()));
        }
        if preferences[..i]
            .iter()
            .any(|earlier| earlier.style_name == pref.style_name)
        {
            return Err(StyleError::DuplicateName(pref.style_name.clone()));
        }
        validate_percentage(&pref.style_name, pref.percentage)?;
    }
    Ok(())
}

// =============================================================================
// OPERATIONS
// =============================================================================

const SELECT_ROW: &str = r"SELECT user_id,
           style_1, style_1_percentage,
           style_2, style_2_percentage,
           style_3, style_3_percentage,
           style_4, style_4_percentage
    FROM style_slot_profiles";

/// Write a packed row, overwriting every slot of an existing row. Unused
/// slots become NULL.
async fn upsert_row<'e, E>(executor: E, row: &SlotRow) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r"INSERT INTO style_slot_profiles
              (user_id, style_1, style_1_percentage, style_2, style_2_percentage,
               style_3, style_3_percentage, style_4, style_4_percentage)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
          ON CONFLICT (user_id) DO UPDATE
          SET style_1 = EXCLUDED.style_1,
              style_1_percentage = EXCLUDED.style_1_percentage,
              style_2 = EXCLUDED.style_2,
              style_2_percentage = EXCLUDED.style_2_percentage,
              style_3 = EXCLUDED.style_3,
              style_3_percentage = EXCLUDED.style_3_percentage,
              style_4 = EXCLUDED.style_4,
              style_4_percentage = EXCLUDED.style_4_percentage",
    )
    .bind(row.user_id)
    .bind(&row.style_1)
    .bind(row.style_1_percentage)
    .bind(&row.style_2)
    .bind(row.style_2_percentage)
    .bind(&row.style_3)
    .bind(row.style_3_percentage)
    .bind(&row.style_4)
    .bind(row.style_4_percentage)
    .execute(executor)
    .await?;
    Ok(())
}

/// Load the stored row for a user, if any.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn raw_profile(pool: &PgPool, user_id: i64) -> Result<Option<SlotRow>, StyleError> {
    let row = sqlx::query_as::<_, SlotRow>(&format!("{SELECT_ROW} WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The user's styles, highest percentage first, or the default list when
/// nothing is stored.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn get_styles(pool: &PgPool, user_id: i64) -> Result<Vec<StylePreference>, StyleError> {
    match raw_profile(pool, user_id).await? {
        Some(row) => Ok(row.decode()),
        None => {
            debug!(user_id, "no stored style profile; serving defaults");
            Ok(default_styles(user_id))
        }
    }
}

/// Replace the user's profile with `preferences`, packed into one row. An
/// empty list removes the row. Concurrent writers for the same user resolve
/// to whichever commits last.
///
/// # Errors
///
/// Returns a validation error before touching the database, or a database
/// error.
pub async fn set_styles(pool: &PgPool, user_id: i64, preferences: &[StylePreference]) -> Result<(), StyleError> {
    validate_preferences(preferences)?;

    if preferences.is_empty() {
        sqlx::query("DELETE FROM style_slot_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        info!(user_id, "style profile cleared");
        return Ok(());
    }

    upsert_row(pool, &SlotRow::pack(user_id, preferences)).await?;
    info!(user_id, count = preferences.len(), "style profile replaced");
    Ok(())
}

/// Change the percentage of one existing style and return the updated list.
///
/// # Errors
///
/// Returns [`StyleError::ProfileNotFound`] or [`StyleError::StyleNotFound`]
/// without modifying anything, a range error, or a database error.
pub async fn update_one_style(
    pool: &PgPool,
    user_id: i64,
    style_name: &str,
    percentage: i32,
) -> Result<Vec<StylePreference>, StyleError> {
    validate_percentage(style_name, percentage)?;

    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, SlotRow>(&format!("{SELECT_ROW} WHERE user_id = $1 FOR UPDATE"))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StyleError::ProfileNotFound(user_id))?;

    let slot = row
        .find_slot(style_name)
        .ok_or_else(|| StyleError::StyleNotFound { user_id, style_name: style_name.to_owned() })?;

    sqlx::query(slot.update_percentage_sql())
        .bind(percentage)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(user_id, column = slot.percentage_column(), percentage, "style percentage updated");

    let mut updated = row;
    *updated.slot_mut(slot).1 = Some(percentage);
    Ok(updated.decode())
}

/// Every stored profile, decoded, keyed by user id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_all_styles(pool: &PgPool) -> Result<BTreeMap<i64, Vec<StylePreference>>, StyleError> {
    let rows = sqlx::query_as::<_, SlotRow>(&format!("{SELECT_ROW} ORDER BY user_id"))
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.user_id, row.decode()))
        .collect())
}

/// Insert the demo profiles when the table is empty. Returns the number of
/// rows written.
///
/// # Errors
///
/// Returns an error if a query fails.
pub async fn seed_demo_profiles(pool: &PgPool) -> Result<usize, StyleError> {
    let mut tx = pool.begin().await?;
    let count = seed_into(&mut tx).await?;
    tx.commit().await?;
    if count > 0 {
        info!(count, "seeded demo style profiles");
    }
    Ok(count)
}

async fn seed_into(conn: &mut PgConnection) -> Result<usize, StyleError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM style_slot_profiles")
        .fetch_one(&mut *conn)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    for (user_id, entries) in &DEMO_PROFILES {
        upsert_row(&mut *conn, &SlotRow::pack(*user_id, &to_preferences(entries))).await?;
    }
    Ok(DEMO_PROFILES.len())
}

#[cfg(test)]
#[path = "styles_test.rs"]
mod tests;
