//! Conversational helper backed by a hosted LLM.

pub mod gemini;
pub mod prompt;

pub use gemini::*;
pub use prompt::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Chat assistant is not configured (missing API key)")]
    NotConfigured,

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("LLM service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Unexpected LLM response: {0}")]
    Parse(String),
}

/// Text-in, text-out access to a language model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub heart_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Answer one chat message. Callers validate that the message is non-blank.
pub async fn reply(
    client: &dyn LlmClient,
    request: &ChatRequest,
) -> Result<ChatResponse, AssistantError> {
    let prompt = build_chat_prompt(&request.user_message, request.heart_rate);
    let reply = client.generate(&prompt).await?;
    tracing::debug!(reply_len = reply.len(), "Chat reply generated");
    Ok(ChatResponse {
        reply: reply.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reply_wraps_model_output() {
        let client = MockLlmClient::new("  Light jogging is fine.\n");
        let response = reply(
            &client,
            &ChatRequest {
                user_message: "Can I jog?".into(),
                heart_rate: Some(70.0),
            },
        )
        .await
        .unwrap();
        assert_eq!(response.reply, "Light jogging is fine.");
        let prompt = client.last_prompt().unwrap();
        assert!(prompt.contains("User: Can I jog?"));
        assert!(prompt.contains("70 bpm"));
    }

    #[tokio::test]
    async fn client_errors_propagate() {
        let client = MockLlmClient::failing(503, "overloaded");
        let err = reply(&client, &ChatRequest { user_message: "hi".into(), heart_rate: None })
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Upstream { status: 503, .. }));
    }

    #[test]
    fn chat_request_uses_camel_case() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"userMessage":"hello","heartRate":81}"#).unwrap();
        assert_eq!(request.user_message, "hello");
        assert_eq!(request.heart_rate, Some(81.0));
    }
}
