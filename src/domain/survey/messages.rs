//! Outbound chat message texts.

/// Text of the initial survey broadcast.
pub fn broadcast_text(question: &str, expected_count: u32) -> String {
    format!(
        "📊 New Survey!\n\nQuestion: {}\n\nPlease reply with your answer. Survey completes after {} responses.",
        question, expected_count
    )
}

/// Text of a reminder nudge.
pub fn reminder_text(question: &str, remaining: u32) -> String {
    let plural = if remaining == 1 { "" } else { "s" };
    format!(
        "⏰ Survey Reminder\n\nWe're still waiting for {} more response{}.\n\nQuestion: {}\n\nPlease reply with your answer if you haven't yet!",
        remaining, plural, question
    )
}
