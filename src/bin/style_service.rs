//! Style-profile service: four-slot preferences with a default fallback.

use wardrobe::config::{DbConfig, ServerConfig};
use wardrobe::server::{self, StartupError};
use wardrobe::services::styles;
use wardrobe::state::AppState;
use wardrobe::{db, routes};

const DEFAULT_PORT: u16 = 5001;

#[tokio::main]
async fn main() {
    server::init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "style service failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env(DEFAULT_PORT)?;
    let db_config = DbConfig::from_env()?;
    let secret_key = config.require_secret_key()?.to_owned();

    let pool = db::init_pool(&db_config).await?;
    tracing::info!(host = %db_config.host, database = %db_config.name, "database ready");

    // Seeding is best-effort; the service still starts without demo rows.
    if config.seed_demo_profiles {
        match styles::seed_demo_profiles(&pool).await {
            Ok(0) => tracing::debug!("style profiles already present; skipping seed"),
            Ok(count) => tracing::info!(count, "demo style profiles seeded"),
            Err(e) => tracing::warn!(error = %e, "demo style profile seeding failed"),
        }
    }

    let port = config.port;
    let state = AppState::new(pool, &secret_key, config, db_config);
    server::serve(routes::style_app(state), port, "style-service").await
}
