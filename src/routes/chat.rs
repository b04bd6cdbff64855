//! Chat relay routes.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::chat::{self as chat_svc, ChatError};
use crate::state::ChatState;

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => Self::Validation(err.to_string()),
            ChatError::Timeout(_) | ChatError::Llm(_) | ChatError::EmptyResponse => {
                tracing::error!(error = %err, "chat relay failed");
                Self::Upstream("Failed to get a response from the fashion assistant".into())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    response: String,
}

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
}

/// `POST /chat`
pub async fn chat(
    State(state): State<ChatState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(body) = body?;
    let response = chat_svc::relay(state.llm.as_ref(), &body.message, state.max_tokens, state.timeout).await?;
    Ok(Json(ChatReply { response }))
}

/// `GET /health`
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}
