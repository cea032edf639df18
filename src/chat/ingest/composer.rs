//! Parser for composer session metadata.
//!
//! Composer entries are used twice: as conversations of their own (head
//! entries only) and as the source of title hints for schemas without titles.

use serde::Deserialize;

use crate::chat::core::conversation::{Conversation, Message, instant_from_millis};
use crate::chat::core::errors::{ReaderError, ReaderResult};
use crate::chat::core::hints::TitleHints;
use crate::chat::core::role::Role;
use crate::chat::ingest::role_classifier::RoleFallback;
use crate::chat::ingest::schema::{
    COMPOSER_KEY, ParseContext, RawMessage, SchemaParser, lenient_millis, lenient_records,
    non_blank,
};

/// Title used when a composer has neither a name nor a mode.
pub const COMPOSER_TITLE: &str = "Composer Chat";

const HEAD_TYPE: &str = "head";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComposerData {
    #[serde(deserialize_with = "lenient_records")]
    all_composers: Vec<ComposerEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComposerEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    composer_id: Option<String>,
    name: Option<String>,
    #[serde(deserialize_with = "lenient_millis")]
    created_at: i64,
    #[serde(deserialize_with = "lenient_millis")]
    last_updated_at: i64,
    unified_mode: Option<String>,
    force_mode: Option<String>,
    #[serde(deserialize_with = "lenient_records")]
    messages: Vec<RawMessage>,
}

impl ComposerEntry {
    fn is_head(&self) -> bool {
        self.kind.as_deref() == Some(HEAD_TYPE)
    }

    fn mode(&self) -> Option<&str> {
        non_blank(self.unified_mode.as_deref()).or_else(|| non_blank(self.force_mode.as_deref()))
    }

    fn title(&self) -> String {
        if let Some(name) = non_blank(self.name.as_deref()) {
            return name.to_string();
        }
        self.mode()
            .map_or_else(|| COMPOSER_TITLE.to_string(), |mode| format!("{} Chat", title_case(mode)))
    }
}

fn decode(value: &str) -> ReaderResult<ComposerData> {
    serde_json::from_str(value).map_err(|err| ReaderError::parse(COMPOSER_KEY, &err))
}

/// Uppercase the first letter of each space-separated word, keep the rest.
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title hints from every composer entry with a name and an id, any type.
///
/// # Errors
/// Returns [`ReaderError::Parse`] when the value is not composer metadata.
pub fn extract_title_hints(value: &str) -> ReaderResult<TitleHints> {
    let data = decode(value)?;
    Ok(data
        .all_composers
        .iter()
        .filter_map(|entry| {
            let key = non_blank(entry.composer_id.as_deref())?;
            let title = non_blank(entry.name.as_deref())?;
            Some((key, title))
        })
        .collect())
}

/// Parses `composer.composerData` head entries into conversations.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComposerParser;

impl SchemaParser for ComposerParser {
    fn key(&self) -> &'static str {
        COMPOSER_KEY
    }

    fn parse(&self, value: &str, ctx: &ParseContext<'_>) -> ReaderResult<Vec<Conversation>> {
        let data = decode(value)?;

        let mut conversations = Vec::new();
        for (index, entry) in data.all_composers.into_iter().enumerate() {
            if !entry.is_head() {
                continue;
            }
            let id = non_blank(entry.composer_id.as_deref())
                .map_or_else(|| format!("composer-{index}"), str::to_string);
            let title = entry.title();
            let stored = entry.last_updated_at.max(entry.created_at);
            let mode = entry.mode().unwrap_or("unknown").to_string();

            let mut messages: Vec<Message> = entry
                .messages
                .into_iter()
                .enumerate()
                .filter_map(|(position, raw)| {
                    raw.into_message(position, &id, ctx, RoleFallback::Length)
                })
                .collect();

            if messages.is_empty() {
                let created_ms = if entry.created_at > 0 { entry.created_at } else { stored };
                let created = instant_from_millis(created_ms).format("%Y-%m-%d %H:%M:%S");
                messages.push(Message::new(
                    "composer-info",
                    Role::System,
                    format!("Composer session: {mode} mode, created at {created}"),
                    stored,
                ));
            }

            conversations.push(Conversation::assemble(
                id,
                title,
                messages,
                stored,
                ctx.clock_ms,
            ));
        }

        Ok(conversations)
    }
}
