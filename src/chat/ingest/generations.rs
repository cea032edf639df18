//! Parser for the append-only AI generation log.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::chat::core::conversation::{Conversation, Message};
use crate::chat::core::errors::{ReaderError, ReaderResult};
use crate::chat::ingest::role_classifier::RoleFallback;
use crate::chat::ingest::schema::{
    GENERATIONS_KEY, PLACEHOLDER_TITLE, ParseContext, SchemaParser, decode_record,
    lenient_millis, non_blank,
};

/// Generation type recorded for AI-pane interactions.
const CHAT_GENERATION_TYPE: &str = "composer";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Generation {
    #[serde(deserialize_with = "lenient_millis")]
    unix_ms: i64,
    #[serde(rename = "generationUUID")]
    generation_uuid: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    text_description: Option<String>,
    conversation_id: Option<String>,
    role: Option<String>,
}

impl Generation {
    fn is_chat(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| kind == CHAT_GENERATION_TYPE)
    }
}

/// Parses `aiService.generations`, one conversation per grouping key.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenerationsParser;

impl SchemaParser for GenerationsParser {
    fn key(&self) -> &'static str {
        GENERATIONS_KEY
    }

    fn uses_title_hints(&self) -> bool {
        true
    }

    fn parse(&self, value: &str, ctx: &ParseContext<'_>) -> ReaderResult<Vec<Conversation>> {
        let records: Vec<Value> = serde_json::from_str(value)
            .map_err(|err| ReaderError::parse(GENERATIONS_KEY, &err))?;

        // Groups keep first-seen order so output is deterministic.
        let mut groups: Vec<(String, Vec<Generation>)> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        for (index, record) in records.into_iter().enumerate() {
            let Some(generation) = decode_record::<Generation>(index, record) else {
                continue;
            };
            if !generation.is_chat() {
                continue;
            }
            let key = non_blank(generation.conversation_id.as_deref())
                .or_else(|| non_blank(generation.generation_uuid.as_deref()))
                .map_or_else(|| format!("generation-{index}"), str::to_string);
            let slot = *slots.entry(key.clone()).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(generation);
        }

        let mut conversations = Vec::with_capacity(groups.len());
        for (key, mut records) in groups {
            records.sort_by_key(|record| record.unix_ms);

            let messages: Vec<Message> = records
                .into_iter()
                .enumerate()
                .filter_map(|(position, record)| {
                    let content = record.text_description.filter(|t| !t.trim().is_empty())?;
                    let role = ctx.classifier.classify(
                        &content,
                        record.role.as_deref(),
                        position,
                        RoleFallback::Length,
                    );
                    let id = non_blank(record.generation_uuid.as_deref())
                        .map_or_else(|| format!("{key}-{position}"), str::to_string);
                    Some(Message {
                        id,
                        role,
                        content,
                        timestamp_ms: record.unix_ms,
                    })
                })
                .collect();

            if messages.is_empty() {
                continue;
            }

            conversations.push(Conversation::assemble(
                key,
                PLACEHOLDER_TITLE,
                messages,
                0,
                ctx.clock_ms,
            ));
        }

        Ok(conversations)
    }
}
