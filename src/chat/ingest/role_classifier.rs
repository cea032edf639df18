//! Heuristic role classification for messages without a usable explicit role.
//!
//! Precedence is fixed: explicit role, assistant markers, user markers, then
//! the fallback. Marker hits beat the fallback because short assistant
//! replies and long user pastes both occur in the wild.

use regex::Regex;

use crate::chat::core::config::HeuristicsConfig;
use crate::chat::core::role::Role;

/// What to do when no marker matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoleFallback {
    /// Long content is `assistant`, anything else `user`.
    Length,
    /// Even positions are `user`, odd positions `assistant`.
    Alternate,
}

/// A pattern rule mapping a regex to a role.
struct MarkerRule {
    pattern: Regex,
    role: Role,
    priority: u8, // Higher = checked first
}

/// Content-based role classifier.
pub struct RoleClassifier {
    long_message_chars: usize,
    rules: Vec<MarkerRule>,
}

impl RoleClassifier {
    /// Create a classifier with the built-in marker catalogue.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new(config: &HeuristicsConfig) -> Result<Self, regex::Error> {
        let mut rules = Vec::new();

        // === ASSISTANT markers (priority 100) ===
        // Explanatory openers
        rules.push(MarkerRule {
            pattern: Regex::new(r"(?i)\b(i'll|let me|here's|here are|this will|to do this)\b")?,
            role: Role::Assistant,
            priority: 100,
        });
        rules.push(MarkerRule {
            pattern: Regex::new(r"(?i)\b(i|you) can\s")?,
            role: Role::Assistant,
            priority: 100,
        });
        // Step sequencing
        rules.push(MarkerRule {
            pattern: Regex::new(r"(?i)\b(first|next|finally),")?,
            role: Role::Assistant,
            priority: 100,
        });
        // Code fences
        rules.push(MarkerRule {
            pattern: Regex::new(r"```")?,
            role: Role::Assistant,
            priority: 100,
        });
        // Markdown headers
        rules.push(MarkerRule {
            pattern: Regex::new(r"(?m)^\s{0,3}#{1,6}\s+\S")?,
            role: Role::Assistant,
            priority: 100,
        });
        // Bold, task lists, numbered and bulleted items
        rules.push(MarkerRule {
            pattern: Regex::new(r"\*\*\S")?,
            role: Role::Assistant,
            priority: 100,
        });
        rules.push(MarkerRule {
            pattern: Regex::new(r"- \[[ xX]?\]")?,
            role: Role::Assistant,
            priority: 100,
        });
        rules.push(MarkerRule {
            pattern: Regex::new(r"(?m)(^|\s)\d{1,2}\.\s+\S")?,
            role: Role::Assistant,
            priority: 100,
        });
        rules.push(MarkerRule {
            pattern: Regex::new(r"(?m)^\s*[-*+]\s+\S")?,
            role: Role::Assistant,
            priority: 100,
        });

        // === USER markers (priority 50) ===
        rules.push(MarkerRule {
            pattern: Regex::new(r"\?")?,
            role: Role::User,
            priority: 50,
        });
        // @-mentions of files, symbols or docs
        rules.push(MarkerRule {
            pattern: Regex::new(r"(^|\s)@\w")?,
            role: Role::User,
            priority: 50,
        });
        // Request-style openers
        rules.push(MarkerRule {
            pattern: Regex::new(
                r"(?i)\b(can you|could you|would you|how do i|what is|please|i want|i need|let's|show me|help me|i'm trying)\b",
            )?,
            role: Role::User,
            priority: 50,
        });

        // Sort by priority descending
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        Ok(Self {
            long_message_chars: config.long_message_chars,
            rules,
        })
    }

    /// Role implied by content markers alone, if any marker matches.
    #[must_use]
    pub fn marker_role(&self, content: &str) -> Option<Role> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(content))
            .map(|rule| rule.role)
    }

    /// Classify a message.
    ///
    /// `explicit` wins when it names a known role; `position` is only used by
    /// [`RoleFallback::Alternate`].
    #[must_use]
    pub fn classify(
        &self,
        content: &str,
        explicit: Option<&str>,
        position: usize,
        fallback: RoleFallback,
    ) -> Role {
        if let Some(role) = explicit.and_then(Role::from_explicit) {
            return role;
        }
        if let Some(role) = self.marker_role(content) {
            return role;
        }
        match fallback {
            RoleFallback::Length if content.chars().count() > self.long_message_chars => {
                Role::Assistant
            }
            RoleFallback::Length => Role::User,
            RoleFallback::Alternate if position % 2 == 0 => Role::User,
            RoleFallback::Alternate => Role::Assistant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RoleClassifier {
        RoleClassifier::new(&HeuristicsConfig::default()).unwrap()
    }

    #[test]
    fn explicit_role_wins() {
        let c = classifier();
        assert_eq!(
            c.classify("Let me explain", Some("user"), 1, RoleFallback::Length),
            Role::User
        );
        assert_eq!(
            c.classify("why?", Some("assistant"), 0, RoleFallback::Alternate),
            Role::Assistant
        );
    }

    #[test]
    fn unknown_explicit_role_is_ignored() {
        let c = classifier();
        assert_eq!(
            c.classify("Here's the fix", Some("narrator"), 0, RoleFallback::Length),
            Role::Assistant
        );
    }

    #[test]
    fn assistant_markers_beat_user_markers() {
        let c = classifier();
        // Both a question mark and an explanatory opener.
        let text = "Let me explain: why does this fail?";
        assert_eq!(c.marker_role(text), Some(Role::Assistant));
    }

    #[test]
    fn detects_structural_assistant_markers() {
        let c = classifier();
        assert_eq!(c.marker_role("```rust\nfn main() {}\n```"), Some(Role::Assistant));
        assert_eq!(c.marker_role("## Summary\nDone"), Some(Role::Assistant));
        assert_eq!(c.marker_role("Steps:\n1. build\n2. run"), Some(Role::Assistant));
        assert_eq!(c.marker_role("Options:\n- fast\n- slow"), Some(Role::Assistant));
        assert_eq!(c.marker_role("This is **important**"), Some(Role::Assistant));
    }

    #[test]
    fn detects_user_markers() {
        let c = classifier();
        assert_eq!(c.marker_role("short question?"), Some(Role::User));
        assert_eq!(c.marker_role("look at @main.rs"), Some(Role::User));
        assert_eq!(c.marker_role("Can you refactor this"), Some(Role::User));
        assert_eq!(c.marker_role("I can't get it to build"), None);
        assert_eq!(c.marker_role("mail me at dev@example.com"), None);
    }

    #[test]
    fn length_fallback() {
        let c = classifier();
        let long = "word ".repeat(60);
        assert_eq!(c.classify(&long, None, 0, RoleFallback::Length), Role::Assistant);
        assert_eq!(c.classify("ok thanks", None, 1, RoleFallback::Length), Role::User);
    }

    #[test]
    fn alternate_fallback_uses_position() {
        let c = classifier();
        let long = "word ".repeat(60);
        assert_eq!(c.classify(&long, None, 0, RoleFallback::Alternate), Role::User);
        assert_eq!(c.classify("ok thanks", None, 3, RoleFallback::Alternate), Role::Assistant);
    }
}
