//! Title resolution.
//!
//! Rules are tried in a fixed order and the first one that yields a title wins:
//! 1. hint keyed by the conversation id, else the only hint
//! 2. the conversation's own title unless it is a placeholder
//! 3. first sentence of the first user message
//! 4. most mentioned catalogue concept, as `<Concept> Discussion`
//! 5. `Development Session <date>` for dated conversations with messages
//! 6. `Untitled Chat`

use crate::chat::core::config::HeuristicsConfig;
use crate::chat::core::conversation::{Conversation, UNTITLED, instant_from_millis};
use crate::chat::core::hints::TitleHints;
use crate::chat::ingest::composer::COMPOSER_TITLE;
use crate::chat::ingest::schema::PLACEHOLDER_TITLE;
use crate::chat::retrieval::concepts::ConceptCatalog;

/// Titles that carry no information about the conversation.
const PLACEHOLDER_TITLES: [&str; 3] = [PLACEHOLDER_TITLE, UNTITLED, COMPOSER_TITLE];

/// Whether `title` is empty or one of the generic placeholders.
#[must_use]
pub fn is_placeholder(title: &str) -> bool {
    let title = title.trim();
    title.is_empty() || PLACEHOLDER_TITLES.contains(&title)
}

/// Resolves display titles.
pub struct TitleResolver {
    catalog: ConceptCatalog,
    max_chars: usize,
}

impl TitleResolver {
    /// Create a resolver with the built-in concept catalogue.
    ///
    /// # Errors
    /// Returns an error if a catalogue pattern is invalid.
    pub fn new(config: &HeuristicsConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            catalog: ConceptCatalog::new()?,
            max_chars: config.title_max_chars,
        })
    }

    /// The concept catalogue used by the concept rule.
    #[must_use]
    pub const fn catalog(&self) -> &ConceptCatalog {
        &self.catalog
    }

    /// Pick a non-empty title for `conversation`.
    #[must_use]
    pub fn resolve(&self, conversation: &Conversation, hints: &TitleHints) -> String {
        if let Some(hint) = hints.for_key(&conversation.id).or_else(|| hints.unique()) {
            return hint.to_string();
        }
        if !is_placeholder(&conversation.title) {
            return conversation.title.trim().to_string();
        }
        if let Some(sentence) = conversation
            .first_user_message()
            .and_then(|msg| first_sentence(&msg.content))
        {
            return truncate_title(sentence, self.max_chars);
        }
        if let Some(concept) = self.catalog.most_frequent(&transcript_text(conversation)) {
            return format!("{concept} Discussion");
        }
        if !conversation.messages.is_empty() && conversation.timestamp_ms > 0 {
            let day = instant_from_millis(conversation.timestamp_ms).format("%Y-%m-%d");
            return format!("Development Session {day}");
        }
        UNTITLED.to_string()
    }

    /// Resolve and store the title in place.
    pub fn apply(&self, conversation: &mut Conversation, hints: &TitleHints) {
        conversation.title = self.resolve(conversation, hints);
    }
}

fn transcript_text(conversation: &Conversation) -> String {
    conversation
        .messages
        .iter()
        .map(|msg| msg.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn first_sentence(text: &str) -> Option<&str> {
    split_sentences(text)
        .into_iter()
        .map(str::trim)
        .find(|part| !part.is_empty())
}

/// Cut to `max_chars`, ending with `...` when anything was dropped.
fn truncate_title(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if matches!(ch, '.' | '!' | '?' | '\n') {
            if start < idx {
                parts.push(&text[start..idx]);
            }
            start = idx + ch.len_utf8();
        }
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::core::conversation::Message;
    use crate::chat::core::role::Role;

    fn resolver() -> TitleResolver {
        TitleResolver::new(&HeuristicsConfig::default()).unwrap()
    }

    fn chat(id: &str, title: &str, messages: Vec<Message>) -> Conversation {
        Conversation::new(id, title, messages, 1_700_000_000_000)
    }

    #[test]
    fn no_hints_no_messages_is_untitled() {
        let title = resolver().resolve(&chat("c", PLACEHOLDER_TITLE, Vec::new()), &TitleHints::new());
        assert_eq!(title, UNTITLED);
        let title = resolver().resolve(&chat("c", "", Vec::new()), &TitleHints::new());
        assert_eq!(title, UNTITLED);
    }

    #[test]
    fn unique_hint_replaces_placeholder() {
        let hints: TitleHints = [("id1", "My Title")].into_iter().collect();
        let title = resolver().resolve(&chat("other", PLACEHOLDER_TITLE, Vec::new()), &hints);
        assert_eq!(title, "My Title");
    }

    #[test]
    fn keyed_hint_beats_unique_rule_and_own_title() {
        let hints: TitleHints = [("a", "Alpha"), ("b", "Beta")].into_iter().collect();
        assert_eq!(resolver().resolve(&chat("b", "Stored", Vec::new()), &hints), "Beta");
        // Several hints and no key match: no hint applies.
        assert_eq!(resolver().resolve(&chat("z", "Stored", Vec::new()), &hints), "Stored");
    }

    #[test]
    fn first_user_sentence_is_used_and_truncated() {
        let messages = vec![
            Message::new("0", Role::Assistant, "Welcome back.", 1),
            Message::new("1", Role::User, "Fix the login redirect. It loops forever", 2),
        ];
        let title = resolver().resolve(&chat("c", "Composer Chat", messages), &TitleHints::new());
        assert_eq!(title, "Fix the login redirect");

        let long = "x".repeat(80);
        let messages = vec![Message::new("1", Role::User, long, 2)];
        let title = resolver().resolve(&chat("c", "", messages), &TitleHints::new());
        assert_eq!(title.chars().count(), 60);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn concept_rule_applies_without_user_messages() {
        let messages = vec![
            Message::new("0", Role::Assistant, "Docker builds the image; Rust and Docker both need caching.", 1),
        ];
        let title = resolver().resolve(&chat("c", "", messages), &TitleHints::new());
        assert_eq!(title, "Docker Discussion");
    }

    #[test]
    fn dated_fallback_needs_messages() {
        let messages = vec![Message::new("0", Role::Assistant, "all done", 1_700_000_000_000)];
        let title = resolver().resolve(&chat("c", "", messages), &TitleHints::new());
        assert_eq!(title, "Development Session 2023-11-14");
    }

    #[test]
    fn sentences_split_on_terminators() {
        assert_eq!(split_sentences("a. b! c?\nd"), ["a", " b", " c", "d"]);
        assert_eq!(first_sentence("...  \n  real one. next"), Some("real one"));
        assert!(is_placeholder("  Untitled Chat "));
        assert!(!is_placeholder("Release plan"));
    }
}
