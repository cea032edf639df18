//! Conversation model rebuilt from workspace stores.

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::core::role::Role;

/// Title used when nothing better can be derived.
pub const UNTITLED: &str = "Untitled Chat";

/// One key/value record read from a workspace store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawRow {
    /// Store key.
    pub key: String,
    /// Opaque JSON document whose shape depends on `key`.
    pub value: String,
}

/// A single chat message.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message id, unique within its conversation.
    pub id: String,
    /// Author role.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Unix milliseconds; `0` when the host did not record one.
    pub timestamp_ms: i64,
}

impl Message {
    /// Build a message.
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>, timestamp_ms: i64) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            timestamp_ms,
        }
    }
}

/// One reconstructed chat tab.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation id.
    pub id: String,
    /// Display title (never empty once resolved).
    pub title: String,
    /// Messages, ascending by timestamp.
    pub messages: Vec<Message>,
    /// Last message timestamp, or the stored timestamp without messages.
    pub timestamp_ms: i64,
    /// First message (or stored) instant.
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Build a conversation, sealing message timestamps.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        messages: Vec<Message>,
        stored_timestamp_ms: i64,
    ) -> Self {
        Self::assemble(id, title, messages, stored_timestamp_ms, stored_timestamp_ms)
    }

    /// Build a conversation, using `clock_ms` for messages when neither they
    /// nor the stored timestamp carry time.
    ///
    /// Missing message timestamps inherit the previous one (leading gaps take
    /// the first known value), then messages are stably sorted so array order
    /// survives ties.
    #[must_use]
    pub fn assemble(
        id: impl Into<String>,
        title: impl Into<String>,
        mut messages: Vec<Message>,
        stored_timestamp_ms: i64,
        clock_ms: i64,
    ) -> Self {
        let fallback = if stored_timestamp_ms > 0 {
            stored_timestamp_ms
        } else {
            clock_ms
        };
        let first_known = messages
            .iter()
            .map(|msg| msg.timestamp_ms)
            .find(|ts| *ts > 0)
            .unwrap_or(fallback);

        let mut previous = first_known;
        for msg in &mut messages {
            if msg.timestamp_ms > 0 {
                previous = msg.timestamp_ms;
            } else {
                msg.timestamp_ms = previous;
            }
        }
        messages.sort_by_key(|msg| msg.timestamp_ms);

        let timestamp_ms = messages
            .last()
            .map_or(stored_timestamp_ms, |msg| msg.timestamp_ms);
        let created_ms = messages
            .first()
            .map_or(stored_timestamp_ms, |msg| msg.timestamp_ms);

        Self {
            id: id.into(),
            title: title.into(),
            messages,
            timestamp_ms,
            created_at: instant_from_millis(created_ms),
        }
    }

    /// Title, or the untitled fallback if it was never resolved.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// First message authored by the user with non-blank content.
    #[must_use]
    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .find(|msg| msg.role == Role::User && !msg.content.trim().is_empty())
    }

    /// `User:` / `Assistant:` lines, cut to `max_chars` with a trailing `...`.
    #[must_use]
    pub fn content_preview(&self, max_chars: usize) -> String {
        let mut preview = String::new();
        for msg in &self.messages {
            let label = match msg.role {
                Role::User => "User",
                Role::Assistant | Role::System => "Assistant",
            };
            preview.push_str(label);
            preview.push_str(": ");
            preview.push_str(&msg.content);
            preview.push('\n');

            if preview.chars().count() > max_chars {
                let keep = max_chars.saturating_sub(3);
                let mut cut: String = preview.chars().take(keep).collect();
                cut.push_str("...");
                return cut;
            }
        }
        preview
    }

    /// Stored timestamp as an instant.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        instant_from_millis(self.timestamp_ms)
    }
}

/// A conversation tagged with the workspace it came from.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConversationWithWorkspace {
    /// The conversation.
    #[serde(flatten)]
    pub conversation: Conversation,
    /// Store file the conversation was read from.
    pub workspace_path: PathBuf,
    /// Workspace directory name.
    pub workspace_name: String,
}

impl ConversationWithWorkspace {
    /// Tag `conversation` with its store path; the name is the store's parent directory.
    #[must_use]
    pub fn new(conversation: Conversation, workspace_path: PathBuf) -> Self {
        let workspace_name = workspace_path
            .parent()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            conversation,
            workspace_path,
            workspace_name,
        }
    }
}

/// Convert Unix milliseconds, clamping unrepresentable values to the epoch.
#[must_use]
pub fn instant_from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}
