//! Side-channel titles extracted from composer metadata.

use serde::{Deserialize, Serialize};

/// A user-authored title attached to a conversation key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TitleHint {
    /// Conversation (composer) id the title belongs to.
    pub conversation_key: String,
    /// Title text.
    pub title: String,
}

/// Ordered set of title hints for one workspace lookup.
///
/// Keeps store order; the first hint wins when keys repeat.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TitleHints {
    hints: Vec<TitleHint>,
}

impl TitleHints {
    /// Empty hint set.
    #[must_use]
    pub const fn new() -> Self {
        Self { hints: Vec::new() }
    }

    /// Add a hint; blank titles and repeated keys are ignored.
    pub fn push(&mut self, conversation_key: impl Into<String>, title: impl Into<String>) {
        let conversation_key = conversation_key.into();
        let title = title.into();
        if title.trim().is_empty() || self.for_key(&conversation_key).is_some() {
            return;
        }
        self.hints.push(TitleHint {
            conversation_key,
            title,
        });
    }

    /// Number of hints.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec accessors are const only from Rust 1.87
    pub fn len(&self) -> usize {
        self.hints.len()
    }

    /// Whether no hints were found.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec accessors are const only from Rust 1.87
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// Title recorded for `key`, if any.
    #[must_use]
    pub fn for_key(&self, key: &str) -> Option<&str> {
        self.hints
            .iter()
            .find(|hint| hint.conversation_key == key)
            .map(|hint| hint.title.as_str())
    }

    /// The only title when exactly one hint exists.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec accessors are const only from Rust 1.87
    pub fn unique(&self) -> Option<&str> {
        match self.hints.as_slice() {
            [only] => Some(only.title.as_str()),
            _ => None,
        }
    }

    /// First title in store order.
    ///
    /// No ranking happens among several real titles; callers should only
    /// reach for this when nothing better is known.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.hints.first().map(|hint| hint.title.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for TitleHints
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut hints = Self::new();
        for (key, title) in iter {
            hints.push(key, title);
        }
        hints
    }
}
