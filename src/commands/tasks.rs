//! Task command handlers: /tasks, /done, /cancel.

use crate::i18n;
use pomni_core::error::PomniError;
use pomni_memory::{PrefixMatch, Store};
use tracing::error;

/// Length of the ID prefix shown in listings.
const SHORT_ID_LEN: usize = 8;

pub(super) async fn handle_tasks(store: &Store, sender_id: &str, lang: &str) -> String {
    match store.get_tasks_for_owner(sender_id).await {
        Ok(tasks) if tasks.is_empty() => i18n::t("no_pending_tasks", lang).to_string(),
        Ok(tasks) => {
            let mut out = format!("{}\n", i18n::t("tasks_header", lang));
            for task in &tasks {
                let short_id = &task.id[..SHORT_ID_LEN.min(task.id.len())];
                let when = match task.remind_at {
                    Some(at) if !task.is_recurring => format!(
                        "{} {}",
                        i18n::t("due", lang),
                        at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
                    ),
                    _ => i18n::t("daily", lang).to_string(),
                };
                out.push_str(&format!("\n[{short_id}] {}\n  {when}", task.content));
            }
            out
        }
        Err(e) => storage_failure("/tasks", sender_id, &e, lang),
    }
}

/// Log a storage failure and return the localized "try later" notice.
fn storage_failure(command: &str, sender_id: &str, e: &PomniError, lang: &str) -> String {
    error!("{command} failed for {sender_id}: {e}");
    i18n::t("storage_error", lang).to_string()
}

fn prefix_reply(result: PrefixMatch, applied_key: &str, lang: &str) -> String {
    let key = match result {
        PrefixMatch::Applied => applied_key,
        PrefixMatch::NotFound => "no_matching_task",
        PrefixMatch::Ambiguous => "ambiguous_task",
    };
    i18n::t(key, lang).to_string()
}

/// First argument after the command word, e.g. the ID in "/done 1a2b".
fn id_argument(text: &str) -> &str {
    text.split_whitespace().nth(1).unwrap_or("").trim()
}

pub(super) async fn handle_done(store: &Store, sender_id: &str, text: &str, lang: &str) -> String {
    let id_prefix = id_argument(text);
    if id_prefix.is_empty() {
        return i18n::t("done_usage", lang).to_string();
    }
    match store.complete_task(id_prefix, sender_id).await {
        Ok(result) => prefix_reply(result, "task_done", lang),
        Err(e) => storage_failure("/done", sender_id, &e, lang),
    }
}

pub(super) async fn handle_cancel(
    store: &Store,
    sender_id: &str,
    text: &str,
    lang: &str,
) -> String {
    let id_prefix = id_argument(text);
    if id_prefix.is_empty() {
        return i18n::t("cancel_usage", lang).to_string();
    }
    match store.delete_task(id_prefix, sender_id).await {
        Ok(result) => prefix_reply(result, "task_deleted", lang),
        Err(e) => storage_failure("/cancel", sender_id, &e, lang),
    }
}
