//! Email/password registration and login.
//!
//! Passwords are stored as argon2 PHC strings. Hashing and verification are
//! CPU-bound, so they run on the blocking pool.

use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Serialize;
use sqlx::{PgPool, Row};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Email and password required")]
    MissingCredentials,
    #[error("Email already exists")]
    EmailTaken,
    /// Deliberately identical for unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Public view of a user. The password hash never leaves this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
}

/// Validated login/registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Require both fields to be present and non-blank. The email is trimmed; the
/// password is kept byte-for-byte. No format or strength checks.
///
/// # Errors
///
/// Returns [`AuthServiceError::MissingCredentials`] if either field is absent.
pub fn validate_credentials(email: Option<&str>, password: Option<&str>) -> Result<Credentials, AuthServiceError> {
    let email = email.map(str::trim).filter(|e| !e.is_empty());
    let password = password.filter(|p| !p.is_empty());
    match (email, password) {
        (Some(email), Some(password)) => Ok(Credentials { email: email.to_owned(), password: password.to_owned() }),
        _ => Err(AuthServiceError::MissingCredentials),
    }
}

// =============================================================================
// HASHING
// =============================================================================

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns [`AuthServiceError::Hash`] if argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthServiceError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC string. A malformed stored hash
/// verifies as `false`.
#[must_use]
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash used to spend the same verification time when the email is unknown.
fn dummy_hash() -> Option<&'static str> {
    static HASH: OnceLock<Option<String>> = OnceLock::new();
    HASH.get_or_init(|| hash_password("wardrobe-dummy-password").ok())
        .as_deref()
}

async fn run_blocking<T, F>(f: F) -> Result<T, AuthServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthServiceError::Hash(e.to_string()))
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Create a user with a salted hash of `password`.
///
/// # Errors
///
/// Returns [`AuthServiceError::EmailTaken`] if the email exists, or a
/// hashing/database error.
pub async fn register(pool: &PgPool, credentials: Credentials) -> Result<UserSummary, AuthServiceError> {
    let Credentials { email, password } = credentials;
    let password_hash = run_blocking(move || hash_password(&password)).await??;

    let row = sqlx::query("INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id, email")
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthServiceError::EmailTaken,
            other => AuthServiceError::Db(other),
        })?;

    let user = UserSummary { id: row.get("id"), email: row.get("email") };
    info!(user_id = user.id, "user registered");
    Ok(user)
}

/// Check credentials and return the matching user.
///
/// # Errors
///
/// Returns [`AuthServiceError::InvalidCredentials`] for an unknown email or a
/// wrong password, or a database error.
pub async fn login(pool: &PgPool, credentials: Credentials) -> Result<UserSummary, AuthServiceError> {
    let Credentials { email, password } = credentials;

    let row = sqlx::query("SELECT id, email, password_hash FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        run_blocking(move || {
            if let Some(hash) = dummy_hash() {
                let _ = verify_password(hash, &password);
            }
        })
        .await?;
        return Err(AuthServiceError::InvalidCredentials);
    };

    let stored_hash: String = row.get("password_hash");
    let verified = run_blocking(move || verify_password(&stored_hash, &password)).await?;
    if !verified {
        return Err(AuthServiceError::InvalidCredentials);
    }

    Ok(UserSummary { id: row.get("id"), email: row.get("email") })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
