//! OpenRouter proxy provider.
//!
//! Reuses OpenAI's request/response types. Only the base URL,
//! attribution headers, and provider name differ.

use async_trait::async_trait;
use pomni_core::{context::Context, error::PomniError, message::OutgoingMessage, traits::Provider};
use tracing::{debug, warn};

use crate::openai::{build_openai_messages, chat_complete, ChatCompletionRequest};

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Sent as `X-Title` so requests are attributed on the OpenRouter dashboard.
const APP_TITLE: &str = "Pomni Telegram Assistant";

/// OpenRouter provider. Routes requests to many models via the OpenAI-compatible API.
pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenRouterProvider {
    /// Create from config values.
    pub fn from_config(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, PomniError> {
        let (system, api_messages) = context.to_api_messages();
        let effective_model = context.model.as_deref().unwrap_or(&self.model);
        let url = format!("{OPENROUTER_BASE_URL}/chat/completions");

        let body = ChatCompletionRequest {
            model: effective_model.to_string(),
            messages: build_openai_messages(&system, &api_messages),
        };

        debug!("openrouter: POST {url} model={effective_model}");

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Title", APP_TITLE);
        chat_complete(request, &body, "openrouter").await
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("openrouter: no API key configured");
            return false;
        }
        let url = format!("{OPENROUTER_BASE_URL}/models");
        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("openrouter not available: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openrouter_provider_name() {
        let p = OpenRouterProvider::from_config("sk-or-test".into(), "qwen/qwen-2.5-72b-instruct".into());
        assert_eq!(p.name(), "openrouter");
        assert!(p.requires_api_key());
    }

    #[test]
    fn test_openrouter_base_url() {
        assert_eq!(OPENROUTER_BASE_URL, "https://openrouter.ai/api/v1");
    }

    #[tokio::test]
    async fn test_unavailable_without_key() {
        let p = OpenRouterProvider::from_config(String::new(), "any".into());
        assert!(!p.is_available().await);
    }
}
