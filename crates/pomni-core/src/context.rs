use serde::{Deserialize, Serialize};

/// A single chat message in the provider's wire order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

/// Prompt passed to an answer engine. Stateless: no conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// System prompt prepended to every request.
    pub system_prompt: String,
    /// The current user message.
    pub current_message: String,
    /// Override the provider's default model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Context {
    /// Create a context with only the user message.
    pub fn new(message: &str) -> Self {
        Self {
            system_prompt: String::new(),
            current_message: message.to_string(),
            model: None,
        }
    }

    /// Create a context with a system prompt.
    pub fn with_system(system_prompt: &str, message: &str) -> Self {
        Self {
            system_prompt: system_prompt.to_string(),
            current_message: message.to_string(),
            model: None,
        }
    }

    /// Split into (system, messages) for chat-completion style APIs.
    pub fn to_api_messages(&self) -> (String, Vec<ApiMessage>) {
        let messages = vec![ApiMessage {
            role: "user".to_string(),
            content: self.current_message.clone(),
        }];
        (self.system_prompt.clone(), messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_api_messages() {
        let ctx = Context::with_system("Be brief.", "What time is it?");
        let (system, messages) = ctx.to_api_messages();
        assert_eq!(system, "Be brief.");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "What time is it?");
    }

    #[test]
    fn test_new_has_empty_system() {
        let ctx = Context::new("hi");
        assert!(ctx.system_prompt.is_empty());
        assert!(ctx.model.is_none());
    }
}
