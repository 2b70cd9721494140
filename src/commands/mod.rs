//! Built-in bot commands, answered without a provider call.

mod tasks;


use crate::i18n;
use pomni_memory::Store;

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub store: &'a Store,
    pub sender_id: &'a str,
    pub text: &'a str,
    pub lang: &'a str,
}

/// Known bot commands.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Tasks,
    Done,
    Cancel,
}

impl Command {
    /// Parse a command from message text. Returns `None` for unknown `/` prefixes,
    /// which are then classified like any other text.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        // Strip @botname suffix (e.g. "/help@pomni_bot" → "/help").
        let cmd = first.split('@').next().unwrap_or(first);
        match cmd {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/tasks" => Some(Self::Tasks),
            "/done" => Some(Self::Done),
            "/cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Handle a command and return the response text.
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> String {
    match cmd {
        Command::Start => i18n::t("welcome", ctx.lang).to_string(),
        Command::Help => i18n::t("help", ctx.lang).to_string(),
        Command::Tasks => tasks::handle_tasks(ctx.store, ctx.sender_id, ctx.lang).await,
        Command::Done => tasks::handle_done(ctx.store, ctx.sender_id, ctx.text, ctx.lang).await,
        Command::Cancel => {
            tasks::handle_cancel(ctx.store, ctx.sender_id, ctx.text, ctx.lang).await
        }
    }
}
