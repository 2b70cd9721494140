use crate::{
    context::Context,
    error::PomniError,
    message::{IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;

/// Answer engine: given a prompt, returns generated text.
///
/// Failures come back as `PomniError::Generation` so callers decide how to
/// surface them; nothing is thrown across this boundary.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider requires an API key to function.
    fn requires_api_key(&self) -> bool;

    /// Send a prompt to the provider and get a response.
    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, PomniError>;

    /// Check if the provider is available and ready.
    async fn is_available(&self) -> bool;
}

/// Messaging transport: receives user messages and delivers replies.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, PomniError>;

    /// Send a text message to `message.reply_target`.
    async fn send(&self, message: OutgoingMessage) -> Result<(), PomniError>;

    /// Send a file with the given name and contents.
    async fn send_document(
        &self,
        target: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<(), PomniError>;

    /// Send a typing indicator to show the bot is processing.
    async fn send_typing(&self, _target: &str) -> Result<(), PomniError> {
        Ok(())
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), PomniError>;
}
