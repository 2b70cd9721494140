//! Keyword intent classification for incoming text.
//!
//! Matching is a case-insensitive substring search. The check order is fixed:
//! a message with several keywords takes the first intent that matches.

/// What the sender wants done with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// One-shot reminder.
    Reminder,
    /// Task announced every morning.
    RecurringTask,
    /// Answer delivered as a file.
    DocumentRequest,
    /// Anything else, answered inline.
    FreeQuery,
}

const REMINDER_KW: &[&str] = &["напомни", "remind me"];
const RECURRING_KW: &[&str] = &["каждый день", "every day"];
const DOCUMENT_KW: &[&str] = &["документ", "document"];

fn kw_match(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| lower.contains(kw))
}

/// Classify `text` into an [`Intent`].
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    if kw_match(&lower, REMINDER_KW) {
        Intent::Reminder
    } else if kw_match(&lower, RECURRING_KW) {
        Intent::RecurringTask
    } else if kw_match(&lower, DOCUMENT_KW) {
        Intent::DocumentRequest
    } else {
        Intent::FreeQuery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_keywords() {
        assert_eq!(classify("напомни купить молоко"), Intent::Reminder);
        assert_eq!(classify("каждый день зарядка"), Intent::RecurringTask);
        assert_eq!(classify("составь документ о погоде"), Intent::DocumentRequest);
        assert_eq!(classify("какая столица Франции?"), Intent::FreeQuery);
    }

    #[test]
    fn test_english_keywords() {
        assert_eq!(classify("Remind me to call mom"), Intent::Reminder);
        assert_eq!(classify("stretch every day"), Intent::RecurringTask);
        assert_eq!(classify("write a document about cats"), Intent::DocumentRequest);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("НАПОМНИ позвонить"), Intent::Reminder);
        assert_eq!(classify("Каждый День бег"), Intent::RecurringTask);
        assert_eq!(classify("ДОКУМЕНТ"), Intent::DocumentRequest);
    }

    #[test]
    fn test_reminder_wins_over_everything() {
        assert_eq!(
            classify("напомни каждый день про документ"),
            Intent::Reminder
        );
        assert_eq!(classify("документ, напомни"), Intent::Reminder);
    }

    #[test]
    fn test_recurring_wins_over_document() {
        assert_eq!(
            classify("каждый день присылай документ"),
            Intent::RecurringTask
        );
    }

    #[test]
    fn test_substring_matches_inside_words() {
        // "документы" contains "документ".
        assert_eq!(classify("где мои документы?"), Intent::DocumentRequest);
    }

    #[test]
    fn test_empty_is_free_query() {
        assert_eq!(classify(""), Intent::FreeQuery);
        assert_eq!(classify("   "), Intent::FreeQuery);
    }
}
