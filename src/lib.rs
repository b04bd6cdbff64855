//! Wardrobe: HTTP services behind the fashion-recommendation web app.
//!
//! ARCHITECTURE
//! ============
//! Three independently running binaries share this library:
//!
//! - `auth-service`: registration, login, sessions, blob-style profiles.
//! - `style-service`: the four-slot style profile store with default fallback.
//! - `chat-service`: a relay from user text to a hosted language model.
//!
//! Route modules translate HTTP into calls on service modules; service
//! modules own SQL and upstream calls. No service calls another; the auth and
//! style services share one Postgres database and its `sessions` table.

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
