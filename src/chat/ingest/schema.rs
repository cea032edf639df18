//! Shared parser capability and lenient decoding helpers for host payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::chat::core::conversation::{Conversation, Message};
use crate::chat::core::errors::ReaderResult;
use crate::chat::core::hints::TitleHints;
use crate::chat::ingest::role_classifier::{RoleClassifier, RoleFallback};

/// Newest host schema, carries first-class titles.
pub const CHAT_DATA_KEY: &str = "workbench.panel.aichat.view.aichat.chatdata";
/// Legacy flat prompt list.
pub const PROMPTS_KEY: &str = "aiService.prompts";
/// Append-only generation log.
pub const GENERATIONS_KEY: &str = "aiService.generations";
/// Composer session metadata, sometimes with authoritative titles.
pub const COMPOSER_KEY: &str = "composer.composerData";

/// Every key the reader looks up, in precedence order.
pub const KNOWN_KEYS: [&str; 4] = [CHAT_DATA_KEY, PROMPTS_KEY, GENERATIONS_KEY, COMPOSER_KEY];

/// Title given to conversations whose schema carries no title.
pub const PLACEHOLDER_TITLE: &str = "AI Service Chat";

/// Inputs shared by every parser during one workspace read.
#[derive(Clone, Copy)]
pub struct ParseContext<'a> {
    /// Titles extracted from composer metadata.
    pub hints: &'a TitleHints,
    /// Role classifier for messages without explicit authorship.
    pub classifier: &'a RoleClassifier,
    /// Read clock (Unix ms) for records without any timestamp.
    pub clock_ms: i64,
}

/// One host schema: turns the value stored under [`SchemaParser::key`] into conversations.
pub trait SchemaParser: Send + Sync {
    /// Store key this parser understands.
    fn key(&self) -> &'static str;

    /// Whether composer title hints may retitle this schema's conversations.
    fn uses_title_hints(&self) -> bool {
        false
    }

    /// Parse a raw value.
    ///
    /// # Errors
    /// Returns [`crate::chat::ReaderError::Parse`] when the value matches none
    /// of the accepted shapes.
    fn parse(&self, value: &str, ctx: &ParseContext<'_>) -> ReaderResult<Vec<Conversation>>;
}

/// The built-in parsers in key precedence order.
#[must_use]
pub fn default_parsers() -> Vec<Box<dyn SchemaParser>> {
    vec![
        Box::new(super::chat_data::ChatDataParser),
        Box::new(super::prompts::PromptsParser),
        Box::new(super::generations::GenerationsParser),
        Box::new(super::composer::ComposerParser),
    ]
}

/// A message as the host writes it, across schema versions.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawMessage {
    id: Option<Value>,
    bubble_id: Option<Value>,
    role: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<Value>,
    sender: Option<Value>,
    content: Option<Value>,
    text: Option<Value>,
    raw_text: Option<Value>,
    #[serde(deserialize_with = "lenient_millis")]
    timestamp: i64,
    #[serde(deserialize_with = "lenient_millis")]
    created_at: i64,
}

impl RawMessage {
    /// Explicit author, if the host recorded one.
    fn explicit_role(&self) -> Option<String> {
        [&self.role, &self.kind, &self.sender]
            .into_iter()
            .flatten()
            .find_map(|value| match value {
                Value::String(role) if !role.trim().is_empty() => Some(role.clone()),
                // Numeric bubble types: 1 = user, 2 = ai.
                Value::Number(n) => match n.as_i64() {
                    Some(1) => Some("user".to_string()),
                    Some(2) => Some("assistant".to_string()),
                    _ => None,
                },
                _ => None,
            })
    }

    /// Convert into a message; `None` when the body is blank.
    pub(crate) fn into_message(
        self,
        position: usize,
        id_prefix: &str,
        ctx: &ParseContext<'_>,
        fallback: RoleFallback,
    ) -> Option<Message> {
        let content = [&self.content, &self.text, &self.raw_text]
            .into_iter()
            .flatten()
            .map(value_text)
            .find(|body| !body.trim().is_empty())?;
        let explicit = self.explicit_role();
        let role = ctx
            .classifier
            .classify(&content, explicit.as_deref(), position, fallback);
        let id = [&self.id, &self.bubble_id]
            .into_iter()
            .flatten()
            .find_map(value_id)
            .unwrap_or_else(|| format!("{id_prefix}-{position}"));
        let timestamp_ms = if self.timestamp > 0 {
            self.timestamp
        } else {
            self.created_at
        };

        Some(Message {
            id,
            role,
            content,
            timestamp_ms,
        })
    }
}

/// Deserialize a timestamp given as integer, float, numeric string or RFC 3339.
///
/// Anything else, `null` included, becomes `0` (unknown).
pub(crate) fn lenient_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0, value_millis))
}

#[allow(clippy::cast_possible_truncation)]
fn value_millis(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|ms| ms as i64))
            .unwrap_or(0),
        Value::String(raw) => {
            let raw = raw.trim();
            raw.parse::<i64>()
                .ok()
                .or_else(|| {
                    chrono::DateTime::parse_from_rfc3339(raw)
                        .ok()
                        .map(|dt| dt.timestamp_millis())
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Decode one element of a host array; `None` (logged) when it does not fit `T`.
pub(crate) fn decode_record<T: DeserializeOwned>(index: usize, value: Value) -> Option<T> {
    serde_json::from_value(value)
        .map_err(|err| {
            debug!(
                record = std::any::type_name::<T>(),
                index,
                error = %err,
                "Skipping unreadable record"
            );
        })
        .ok()
}

/// Deserialize an array element by element.
///
/// `null` or a missing field is empty and unreadable elements are dropped;
/// a value that is not an array at all is still an error.
pub(crate) fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| decode_record(index, value))
        .collect())
}

/// Id fragment for records the host stored without one.
///
/// First 8 bytes of the SHA-256 of the lowercased, whitespace-collapsed
/// text, as 16 hex digits. Identical on every build and platform, so
/// derived ids stay valid for `get_chat_by_id` across releases.
pub(crate) fn content_fingerprint(text: &str) -> String {
    let normalized = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    let prefix = u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ]);
    format!("{prefix:016x}")
}

/// Text of a string, a `{text|content|value}` object, or an array of parts.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(obj) => ["text", "content", "message", "value"]
            .iter()
            .find_map(|field| obj.get(*field).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string(),
        Value::Array(parts) => parts
            .iter()
            .map(value_text)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Non-empty id from a string or number.
pub(crate) fn value_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-blank string field.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
