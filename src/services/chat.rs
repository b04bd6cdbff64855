//! Chat relay: wrap user text in the fashion-assistant template, forward it
//! to the configured model, hand back the reply text.
//!
//! Stateless. Each request is one model call with no history and no retries.

use std::time::Duration;

use tracing::{info, warn};

use crate::llm::types::{LlmChat, LlmError, Message};

pub const SYSTEM_PROMPT: &str = "You are a friendly fashion AI assistant for a personal wardrobe app. \
Give concise, specific styling advice. Mention current trends where they are relevant. \
If a question is not about clothing, style, or appearance, steer the user back to fashion.";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is required")]
    EmptyMessage,
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("model returned no text")]
    EmptyResponse,
}

/// User turn sent to the model for `message`.
#[must_use]
pub fn build_prompt(message: &str) -> String {
    format!(
        "As a fashion AI assistant, please help with: {message}. \
         Focus on providing specific, actionable fashion advice and current trends."
    )
}

/// Forward one message and return the model's reply text verbatim.
///
/// # Errors
///
/// Returns [`ChatError::EmptyMessage`] for blank input, and a timeout, model
/// or empty-response error when the upstream call does not produce text.
pub async fn relay(llm: &dyn LlmChat, message: &str, max_tokens: u32, timeout: Duration) -> Result<String, ChatError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let messages = [Message::user(build_prompt(message))];
    let response = tokio::time::timeout(timeout, llm.chat(max_tokens, SYSTEM_PROMPT, &messages))
        .await
        .map_err(|_| {
            warn!(?timeout, "chat: model call timed out");
            ChatError::Timeout(timeout)
        })??;

    if response.text.trim().is_empty() {
        warn!(model = %response.model, stop_reason = ?response.stop_reason, "chat: empty model reply");
        return Err(ChatError::EmptyResponse);
    }

    info!(
        model = %response.model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "chat: reply relayed"
    );
    Ok(response.text)
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
