//! OpenAI-compatible API provider.
//!
//! Works with OpenAI's API and any compatible endpoint.
//! Exports `pub(crate)` types reused by the OpenRouter provider.

use async_trait::async_trait;
use pomni_core::{
    context::{ApiMessage, Context},
    error::PomniError,
    message::{MessageMetadata, OutgoingMessage},
    traits::Provider,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// Create from config values.
    pub fn from_config(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

/// Build OpenAI-format messages from context (system as a message role).
pub(crate) fn build_openai_messages(system: &str, api_messages: &[ApiMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(api_messages.len() + 1);
    if !system.is_empty() {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: Some(system.to_string()),
        });
    }
    for m in api_messages {
        messages.push(ChatMessage {
            role: m.role.clone(),
            content: Some(m.content.clone()),
        });
    }
    messages
}

#[derive(Serialize, Deserialize, Clone)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Option<Vec<ChatChoice>>,
    pub model: Option<String>,
    pub usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Option<ChatMessage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatUsage {
    pub total_tokens: Option<u64>,
}

impl ChatCompletionResponse {
    /// Text of the first choice. Missing or blank content is a malformed response.
    pub(crate) fn first_text(&self, provider: &str) -> Result<String, PomniError> {
        self.choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| PomniError::Generation(format!("{provider}: response has no content")))
    }
}

/// POST a chat completion and turn the reply into an `OutgoingMessage`.
pub(crate) async fn chat_complete(
    request: reqwest::RequestBuilder,
    body: &ChatCompletionRequest,
    provider: &str,
) -> Result<OutgoingMessage, PomniError> {
    let start = Instant::now();

    let resp = request
        .json(body)
        .send()
        .await
        .map_err(|e| PomniError::Generation(format!("{provider} request failed: {e}")))?;

    let status = resp.status();
    debug!("{provider}: status {status}");
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(PomniError::Generation(format!(
            "{provider} returned {status}: {text}"
        )));
    }

    let parsed: ChatCompletionResponse = resp.json().await.map_err(|e| {
        PomniError::Generation(format!("{provider}: failed to parse response: {e}"))
    })?;

    let text = parsed.first_text(provider)?;
    let tokens = parsed.usage.as_ref().and_then(|u| u.total_tokens);

    Ok(OutgoingMessage {
        text,
        metadata: MessageMetadata {
            provider_used: provider.to_string(),
            tokens_used: tokens,
            processing_time_ms: start.elapsed().as_millis() as u64,
            model: parsed.model,
        },
        reply_target: None,
    })
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, PomniError> {
        let (system, api_messages) = context.to_api_messages();
        let effective_model = context.model.as_deref().unwrap_or(&self.model);

        let body = ChatCompletionRequest {
            model: effective_model.to_string(),
            messages: build_openai_messages(&system, &api_messages),
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("openai: POST {url} model={effective_model}");

        let request = self.client.post(&url).bearer_auth(&self.api_key);
        chat_complete(request, &body, "openai").await
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("openai: no API key configured");
            return false;
        }
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("openai not available: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_name() {
        let p = OpenAiProvider::from_config(
            "https://api.openai.com/v1".into(),
            "sk-test".into(),
            "gpt-4o-mini".into(),
        );
        assert_eq!(p.name(), "openai");
        assert!(p.requires_api_key());
    }

    #[test]
    fn test_build_openai_messages() {
        let api_msgs = vec![ApiMessage {
            role: "user".into(),
            content: "Привет".into(),
        }];
        let messages = build_openai_messages("Be helpful.", &api_msgs);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content.as_deref(), Some("Be helpful."));
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn test_build_openai_messages_empty_system() {
        let api_msgs = vec![ApiMessage {
            role: "user".into(),
            content: "Hi".into(),
        }];
        let messages = build_openai_messages("", &api_msgs);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_response_first_text() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"},"finish_reason":"stop"}],"model":"gpt-4o","usage":{"total_tokens":42}}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.first_text("openai").unwrap(), "Hello!");
        assert_eq!(resp.usage.as_ref().and_then(|u| u.total_tokens), Some(42));
    }

    #[test]
    fn test_response_without_choices_is_generation_error() {
        let resp: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[],"model":"x"}"#).unwrap();
        assert!(matches!(
            resp.first_text("openai"),
            Err(PomniError::Generation(_))
        ));
    }

    #[test]
    fn test_response_with_null_content_is_generation_error() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let err = resp.first_text("openrouter").unwrap_err();
        assert!(err.to_string().contains("openrouter"));
    }
}
