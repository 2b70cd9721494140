//! Message processing pipeline: classify, then store or answer, then reply.

use super::intent::{classify, Intent};
use super::{deliver_document, Gateway};
use crate::commands::{self, Command, CommandContext};
use crate::i18n;
use chrono::{DateTime, TimeDelta, Utc};
use pomni_core::{context::Context, error::PomniError, message::IncomingMessage};
use pomni_memory::{Task, TaskOwner};
use tracing::{error, info, warn};

/// Where a message ended up after routing.
#[derive(Debug)]
pub enum Outcome {
    /// Handled as a bot command.
    Command,
    /// Persisted as a task.
    Stored(Task),
    /// Answered by the provider, inline or as a document.
    Answered(Intent),
    /// Storage, generation, or delivery failed.
    Failed(Intent),
}

impl Gateway {
    /// Process a single incoming message through the full pipeline.
    pub(super) async fn handle_message(&self, incoming: IncomingMessage) -> Outcome {
        let preview = if incoming.text.chars().count() > 60 {
            let truncated: String = incoming.text.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            incoming.text.clone()
        };
        info!(
            "[{}] {} says ({:?}): {}",
            incoming.channel,
            incoming.sender_name.as_deref().unwrap_or("unknown"),
            incoming.kind,
            preview
        );

        if let Some(cmd) = Command::parse(&incoming.text) {
            let ctx = CommandContext {
                store: &self.memory,
                sender_id: &incoming.sender_id,
                text: &incoming.text,
                lang: &self.language,
            };
            let response = commands::handle(cmd, &ctx).await;
            self.send_text(&incoming, &response).await;
            return Outcome::Command;
        }

        let intent = classify(&incoming.text);
        info!("[{}] intent: {intent:?}", incoming.sender_id);

        match intent {
            Intent::Reminder | Intent::RecurringTask => self.store_task(&incoming, intent).await,
            Intent::DocumentRequest => self.answer_as_document(&incoming).await,
            Intent::FreeQuery => self.answer_inline(&incoming).await,
        }
    }

    /// Persist a reminder or recurring task and acknowledge it.
    async fn store_task(&self, incoming: &IncomingMessage, intent: Intent) -> Outcome {
        let owner = TaskOwner {
            channel: &incoming.channel,
            owner_id: &incoming.sender_id,
            reply_target: incoming.target(),
        };

        let (result, ack_key) = if intent == Intent::Reminder {
            let offset = self.router_config.reminder_offset_minutes;
            let Some(remind_at) = reminder_time(Utc::now(), offset) else {
                error!("invalid reminder offset {offset} min, reminder not stored");
                self.send_text(incoming, i18n::t("storage_error", &self.language))
                    .await;
                return Outcome::Failed(intent);
            };
            (
                self.memory
                    .create_reminder(owner, &incoming.text, remind_at)
                    .await,
                "reminder_added",
            )
        } else {
            (
                self.memory
                    .create_recurring_task(owner, &incoming.text)
                    .await,
                "recurring_saved",
            )
        };

        match result {
            Ok(task) => {
                self.send_text(incoming, i18n::t(ack_key, &self.language))
                    .await;
                Outcome::Stored(task)
            }
            Err(e) => {
                error!("failed to store task for {}: {e}", incoming.sender_id);
                self.send_text(incoming, i18n::t("storage_error", &self.language))
                    .await;
                Outcome::Failed(intent)
            }
        }
    }

    /// Ask the provider and reply with the text.
    async fn answer_inline(&self, incoming: &IncomingMessage) -> Outcome {
        self.typing(incoming).await;
        match self.generate(&incoming.text).await {
            Ok(answer) => {
                if self.send_text(incoming, &answer).await {
                    Outcome::Answered(Intent::FreeQuery)
                } else {
                    Outcome::Failed(Intent::FreeQuery)
                }
            }
            Err(e) => {
                error!("provider error for {}: {e}", incoming.sender_id);
                self.send_text(incoming, i18n::t("provider_error", &self.language))
                    .await;
                Outcome::Failed(Intent::FreeQuery)
            }
        }
    }

    /// Ask the provider and send the answer as a file attachment.
    async fn answer_as_document(&self, incoming: &IncomingMessage) -> Outcome {
        self.typing(incoming).await;
        let answer = match self.generate(&incoming.text).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("document generation failed for {}: {e}", incoming.sender_id);
                self.send_text(incoming, i18n::t("document_error", &self.language))
                    .await;
                return Outcome::Failed(Intent::DocumentRequest);
            }
        };

        match deliver_document(
            &self.channels,
            &incoming.channel,
            incoming.target(),
            &self.router_config.document_filename,
            answer.as_bytes(),
            self.send_timeout,
        )
        .await
        {
            Ok(()) => Outcome::Answered(Intent::DocumentRequest),
            Err(e) => {
                error!("failed to send document to {}: {e}", incoming.sender_id);
                self.send_text(incoming, i18n::t("document_error", &self.language))
                    .await;
                Outcome::Failed(Intent::DocumentRequest)
            }
        }
    }

    /// Call the provider with the system prompt, bounded by the provider timeout.
    pub(super) async fn generate(&self, prompt: &str) -> Result<String, PomniError> {
        let context = Context::with_system(&self.router_config.system_prompt, prompt);
        super::complete_within(self.provider.as_ref(), &context, self.provider_timeout).await
    }

    async fn typing(&self, incoming: &IncomingMessage) {
        if let Some(channel) = self.channels.get(&incoming.channel) {
            match tokio::time::timeout(self.send_timeout, channel.send_typing(incoming.target()))
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("typing indicator failed: {e}"),
                Err(_) => warn!("typing indicator timed out"),
            }
        }
    }
}

/// `now` plus a strictly positive offset in minutes, or `None` if the offset
/// is not positive or the result is out of range.
fn reminder_time(now: DateTime<Utc>, offset_minutes: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_minutes(offset_minutes)
        .filter(|delta| *delta > TimeDelta::zero())
        .and_then(|delta| now.checked_add_signed(delta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminder_time_is_after_now() {
        let now = Utc::now();
        assert_eq!(reminder_time(now, 60), Some(now + TimeDelta::hours(1)));
    }

    #[test]
    fn test_reminder_time_rejects_bad_offsets() {
        let now = Utc::now();
        assert_eq!(reminder_time(now, 0), None);
        assert_eq!(reminder_time(now, -30), None);
        assert_eq!(reminder_time(now, i64::MAX / 2), None);
        assert_eq!(reminder_time(now, i64::MAX), None);
    }
}
