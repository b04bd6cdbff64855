//! Auth/profile service: registration, login, sessions and blob profiles.

use wardrobe::config::{DbConfig, ServerConfig};
use wardrobe::server::{self, StartupError};
use wardrobe::state::AppState;
use wardrobe::{db, routes};

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() {
    server::init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "auth service failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env(DEFAULT_PORT)?;
    let db_config = DbConfig::from_env()?;
    let secret_key = config.require_secret_key()?.to_owned();

    let pool = db::init_pool(&db_config).await?;
    tracing::info!(host = %db_config.host, database = %db_config.name, "database ready");

    let port = config.port;
    let state = AppState::new(pool, &secret_key, config, db_config);
    server::serve(routes::auth_app(state), port, "auth-service").await
}
