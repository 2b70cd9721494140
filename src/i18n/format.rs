//! Format helpers for strings with interpolation.

/// Morning announcement of a recurring task.
pub fn daily_announcement(lang: &str, content: &str) -> String {
    match lang {
        "Russian" => format!("\u{1f44b} Утро! Сегодня запланировано: {content}"),
        _ => format!("\u{1f44b} Good morning! Planned for today: {content}"),
    }
}

/// Delivery of a one-shot reminder.
pub fn reminder_due(lang: &str, content: &str) -> String {
    match lang {
        "Russian" => format!("\u{23f0} Напоминание: {content}"),
        _ => format!("\u{23f0} Reminder: {content}"),
    }
}
