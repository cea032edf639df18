//! Parser for the legacy flat prompt list.

use serde::Deserialize;
use serde_json::Value;

use crate::chat::core::conversation::{Conversation, Message};
use crate::chat::core::errors::{ReaderError, ReaderResult};
use crate::chat::ingest::role_classifier::RoleFallback;
use crate::chat::ingest::schema::{
    PLACEHOLDER_TITLE, PROMPTS_KEY, ParseContext, SchemaParser, content_fingerprint,
    decode_record, lenient_millis, value_id, value_text,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Prompt {
    text: Option<Value>,
    role: Option<String>,
    id: Option<Value>,
    #[serde(deserialize_with = "lenient_millis")]
    timestamp: i64,
    #[serde(deserialize_with = "lenient_millis")]
    created_at: i64,
}

/// A prompt is either a bare string or an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PromptEntry {
    Text(String),
    Full(Prompt),
}

impl From<PromptEntry> for Prompt {
    fn from(entry: PromptEntry) -> Self {
        match entry {
            PromptEntry::Text(text) => Self {
                text: Some(Value::String(text)),
                ..Self::default()
            },
            PromptEntry::Full(prompt) => prompt,
        }
    }
}

/// Parses `aiService.prompts` into at most one conversation.
#[derive(Clone, Copy, Debug, Default)]
pub struct PromptsParser;

impl PromptsParser {
    /// Array of prompts first, then a single prompt.
    ///
    /// Array slots stay in place (`None` for unreadable entries) so positions
    /// match the host list.
    fn decode(value: &str) -> ReaderResult<Vec<Option<Prompt>>> {
        let parsed: Value =
            serde_json::from_str(value).map_err(|err| ReaderError::parse(PROMPTS_KEY, &err))?;
        match parsed {
            Value::Array(entries) => Ok(entries
                .into_iter()
                .enumerate()
                .map(|(index, entry)| decode_record::<PromptEntry>(index, entry).map(Prompt::from))
                .collect()),
            single => serde_json::from_value::<PromptEntry>(single)
                .map(|entry| vec![Some(Prompt::from(entry))])
                .map_err(|err| ReaderError::parse(PROMPTS_KEY, &err)),
        }
    }
}

impl SchemaParser for PromptsParser {
    fn key(&self) -> &'static str {
        PROMPTS_KEY
    }

    fn uses_title_hints(&self) -> bool {
        true
    }

    fn parse(&self, value: &str, ctx: &ParseContext<'_>) -> ReaderResult<Vec<Conversation>> {
        let prompts = Self::decode(value)?;

        // Position keeps counting over blank and unreadable prompts so alternation follows the host list.
        let mut messages = Vec::with_capacity(prompts.len());
        for (position, prompt) in prompts.into_iter().enumerate() {
            let Some(prompt) = prompt else {
                continue;
            };
            let content = prompt.text.as_ref().map(value_text).unwrap_or_default();
            if content.trim().is_empty() {
                continue;
            }
            let role = ctx.classifier.classify(
                &content,
                prompt.role.as_deref(),
                position,
                RoleFallback::Alternate,
            );
            let timestamp_ms = if prompt.timestamp > 0 {
                prompt.timestamp
            } else {
                prompt.created_at
            };
            let id = prompt
                .id
                .as_ref()
                .and_then(value_id)
                .unwrap_or_else(|| format!("prompt-{position}"));
            messages.push(Message {
                id,
                role,
                content,
                timestamp_ms,
            });
        }

        let Some(first) = messages.first() else {
            return Ok(Vec::new());
        };
        let id = format!("prompts-{}", content_fingerprint(&first.content));

        let title = ctx
            .hints
            .unique()
            .or_else(|| ctx.hints.first())
            .unwrap_or(PLACEHOLDER_TITLE)
            .to_string();

        Ok(vec![Conversation::assemble(
            id,
            title,
            messages,
            0,
            ctx.clock_ms,
        )])
    }
}
