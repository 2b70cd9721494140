//! Localized strings for bot replies.
//!
//! Uses a simple `t(key, lang)` function for static strings and
//! helpers in `format` for strings with interpolation.
//! Supported languages: Russian, English (fallback).

mod format;


pub use format::*;

/// Return a localized static string for `key` in the given `lang`.
/// Falls back to English for unsupported languages.
pub fn t(key: &str, lang: &str) -> &'static str {
    let found = match lang {
        "Russian" => russian(key).or_else(|| english(key)),
        _ => english(key),
    };
    found.unwrap_or("???")
}

fn russian(key: &str) -> Option<&'static str> {
    Some(match key {
        "welcome" => {
            "\u{1f44b} Привет! Я твой персональный ассистент. Просто пиши:\n\
             — вопросы\n\
             — задачи\n\
             — мысли\n\
             Я всё запомню и помогу!"
        }
        "help" => {
            "Что я умею:\n\
             • «напомни …» — напоминание через час\n\
             • «каждый день …» — ежедневная задача, напомню утром\n\
             • «документ …» — пришлю ответ файлом\n\
             • любой другой текст — просто отвечу\n\n\
             /tasks — список задач\n\
             /done <id> — отметить выполненной\n\
             /cancel <id> — удалить"
        }
        "reminder_added" => "\u{1f552} Напоминание добавлено!",
        "recurring_saved" => "\u{1f4c6} Ежедневная задача сохранена!",
        "provider_error" => "\u{26a0}\u{fe0f} Ошибка при обращении к ИИ. Попробуйте позже.",
        "document_error" => "\u{26a0}\u{fe0f} Не удалось подготовить документ. Попробуйте позже.",
        "storage_error" => "\u{26a0}\u{fe0f} Не удалось сохранить задачу. Попробуйте позже.",
        "no_pending_tasks" => "Задач нет.",
        "tasks_header" => "Ваши задачи:",
        "daily" => "ежедневно",
        "due" => "срок:",
        "task_done" => "\u{2705} Задача выполнена.",
        "task_deleted" => "\u{1f5d1} Задача удалена.",
        "no_matching_task" => "Задача с таким ID не найдена.",
        "ambiguous_task" => "Под этот ID подходит несколько задач. Укажите больше символов.",
        "done_usage" => "Использование: /done <id>",
        "cancel_usage" => "Использование: /cancel <id>",
        _ => return None,
    })
}

fn english(key: &str) -> Option<&'static str> {
    Some(match key {
        "welcome" => {
            "\u{1f44b} Hi! I'm your personal assistant. Just write:\n\
             — questions\n\
             — tasks\n\
             — thoughts\n\
             I'll remember everything and help!"
        }
        "help" => {
            "What I can do:\n\
             • \"remind me …\" — a reminder in one hour\n\
             • \"every day …\" — a daily task, announced in the morning\n\
             • \"document …\" — the answer as a file\n\
             • anything else — I just answer\n\n\
             /tasks — list tasks\n\
             /done <id> — mark done\n\
             /cancel <id> — delete"
        }
        "reminder_added" => "\u{1f552} Reminder added!",
        "recurring_saved" => "\u{1f4c6} Daily task saved!",
        "provider_error" => "\u{26a0}\u{fe0f} The AI service is unavailable. Please try later.",
        "document_error" => "\u{26a0}\u{fe0f} Could not prepare the document. Please try later.",
        "storage_error" => "\u{26a0}\u{fe0f} Could not save the task. Please try later.",
        "no_pending_tasks" => "No pending tasks.",
        "tasks_header" => "Your tasks:",
        "daily" => "daily",
        "due" => "due:",
        "task_done" => "\u{2705} Task marked done.",
        "task_deleted" => "\u{1f5d1} Task deleted.",
        "no_matching_task" => "No task found with that ID.",
        "ambiguous_task" => "Several tasks match that ID. Type more characters.",
        "done_usage" => "Usage: /done <id>",
        "cancel_usage" => "Usage: /cancel <id>",
        _ => return None,
    })
}
