//! Process configuration read from the environment at startup.
//!
//! Every service reads its configuration once, before binding a socket, and
//! fails fast on anything required that is missing. Parsing goes through a
//! lookup closure so tests can supply variables without touching the real
//! process environment.

use axum::http::HeaderValue;
use sqlx::postgres::PgConnectOptions;

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_PASSWORD: &str = "postgres";
pub const DEFAULT_DB_NAME: &str = "fashion_ai";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

const POSTGRES_SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Parse a boolean-ish env value. Unknown spellings yield `None`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn lookup_parse<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}

fn lookup_bool<F>(lookup: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

// =============================================================================
// DATABASE
// =============================================================================

/// Database connection settings.
///
/// `DATABASE_URL` wins when set; otherwise the connection is assembled from
/// `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl DbConfig {
    /// # Errors
    ///
    /// Returns an error if `DB_PORT` or `DB_MAX_CONNECTIONS` do not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    /// # Errors
    ///
    /// Returns an error if `DB_PORT` or `DB_MAX_CONNECTIONS` do not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            host: lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.into()),
            port: lookup_parse(&lookup, "DB_PORT", DEFAULT_DB_PORT)?,
            user: lookup("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.into()),
            password: lookup("DB_PASSWORD").unwrap_or_else(|| DEFAULT_DB_PASSWORD.into()),
            name: lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.into()),
            max_connections: lookup_parse(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
        })
    }

    /// Build connect options. Component settings go through the typed builder
    /// so passwords never need URL escaping.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is set but is not a valid Postgres URL.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            // sqlx parses the remainder of any scheme as Postgres; catch a
            // `mysql://` left over from an older deployment here.
            if !POSTGRES_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
                let scheme = url.split_once("://").map_or("", |(s, _)| s);
                return Err(sqlx::Error::Configuration(
                    format!("DATABASE_URL must use postgres:// or postgresql://, got scheme '{scheme}'").into(),
                ));
            }
            return url.parse::<PgConnectOptions>();
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

// =============================================================================
// SERVER
// =============================================================================

/// Per-service HTTP settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// The single browser origin allowed by CORS (credentials enabled).
    pub cors_origin: HeaderValue,
    /// Key mixed into stored session token hashes. Required by the services
    /// that read or write sessions.
    pub secret_key: Option<String>,
    /// Mount `/api/debug/*` and `/api/styles/all`.
    pub debug_routes: bool,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: bool,
    /// Insert the demo slot profiles when the slot table is empty.
    pub seed_demo_profiles: bool,
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns an error if any present variable fails to parse.
    pub fn from_env(default_port: u16) -> Result<Self, ConfigError> {
        Self::from_lookup(process_env, default_port)
    }

    /// # Errors
    ///
    /// Returns an error if any present variable fails to parse.
    pub fn from_lookup<F>(lookup: F, default_port: u16) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = lookup("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into());
        let cors_origin = HeaderValue::from_str(origin.trim_end_matches('/'))
            .map_err(|_| ConfigError::Invalid { var: "CORS_ORIGIN", value: origin.clone() })?;

        Ok(Self {
            port: lookup_parse(&lookup, "PORT", default_port)?,
            cors_origin,
            secret_key: lookup("SECRET_KEY").filter(|v| !v.is_empty()),
            debug_routes: lookup_bool(&lookup, "DEBUG_ROUTES", false)?,
            cookie_secure: lookup_bool(&lookup, "COOKIE_SECURE", false)?,
            seed_demo_profiles: lookup_bool(&lookup, "SEED_DEMO_PROFILES", false)?,
        })
    }

    /// Return the secret key or fail; used at startup by services that
    /// validate sessions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `SECRET_KEY` is unset or empty.
    pub fn require_secret_key(&self) -> Result<&str, ConfigError> {
        self.secret_key
            .as_deref()
            .ok_or(ConfigError::Missing("SECRET_KEY"))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
