//! Markdown rendering and case-insensitive transcript search.

use std::fmt::Write as _;

use crate::chat::core::conversation::Conversation;
use crate::chat::core::role::Role;

/// Render a conversation as Markdown: title header, date line, one block per message.
#[must_use]
pub fn render_markdown(conversation: &Conversation) -> String {
    let mut md = String::new();
    let _ = write!(md, "# {}\n\n", conversation.display_title());

    if conversation.created_at.timestamp_millis() > 0 {
        let _ = write!(
            md,
            "**Date**: {}\n\n",
            conversation.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    for msg in &conversation.messages {
        let label = match msg.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "system",
        };
        let _ = write!(md, "**{label}**: {}\n\n", msg.content);
    }

    md
}

/// Whether the title or rendered transcript contains `query`, ignoring case.
///
/// A blank query matches everything.
#[must_use]
pub fn matches_query(conversation: &Conversation, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    conversation.display_title().to_lowercase().contains(&needle)
        || render_markdown(conversation).to_lowercase().contains(&needle)
}

impl Conversation {
    /// Markdown transcript; see [`render_markdown`].
    #[must_use]
    pub fn to_markdown(&self) -> String {
        render_markdown(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::core::conversation::Message;

    fn sample() -> Conversation {
        Conversation::new(
            "c1",
            "Pagination bug",
            vec![
                Message::new("1", Role::User, "Why does page 2 repeat rows?", 1_700_000_000_000),
                Message::new("2", Role::Assistant, "The OFFSET is computed twice.", 1_700_000_001_000),
                Message::new("3", Role::System, "context trimmed", 1_700_000_002_000),
            ],
            0,
        )
    }

    #[test]
    fn markdown_has_header_date_and_blocks() {
        let md = sample().to_markdown();
        assert_eq!(
            md,
            "# Pagination bug\n\n\
             **Date**: 2023-11-14 22:13:20\n\n\
             **User**: Why does page 2 repeat rows?\n\n\
             **Assistant**: The OFFSET is computed twice.\n\n\
             **system**: context trimmed\n\n"
        );
    }

    #[test]
    fn undated_conversation_skips_date_line() {
        let chat = Conversation::new("c", "", Vec::new(), 0);
        assert_eq!(render_markdown(&chat), "# Untitled Chat\n\n");
    }

    #[test]
    fn query_matches_title_or_body_ignoring_case() {
        let chat = sample();
        assert!(matches_query(&chat, "PAGINATION"));
        assert!(matches_query(&chat, "offset is"));
        assert!(matches_query(&chat, "  "));
        assert!(!matches_query(&chat, "kubernetes"));
    }
}
