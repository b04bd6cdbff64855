//! Chat relay service: forwards user text to the configured model.

use std::sync::Arc;

use wardrobe::config::ServerConfig;
use wardrobe::llm::LlmClient;
use wardrobe::llm::config::LlmConfig;
use wardrobe::routes;
use wardrobe::server::{self, StartupError};
use wardrobe::state::ChatState;

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() {
    server::init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "chat service failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env(DEFAULT_PORT)?;
    let llm_config = LlmConfig::from_env()?;
    let client = LlmClient::from_config(&llm_config)?;
    tracing::info!(model = client.model(), provider = ?llm_config.provider, "LLM client initialized");

    let state = ChatState::new(Arc::new(client), llm_config.max_tokens, llm_config.timeouts.total());

    server::serve(routes::chat_app(state, config.cors_origin), config.port, "chat-service").await
}
