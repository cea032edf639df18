//! Parser for the AI-pane chat data key (tabs with titles and bubbles).

use serde::Deserialize;
use serde_json::Value;

use crate::chat::core::conversation::Conversation;
use crate::chat::core::errors::{ReaderError, ReaderResult};
use crate::chat::ingest::role_classifier::RoleFallback;
use crate::chat::ingest::schema::{
    CHAT_DATA_KEY, ParseContext, RawMessage, SchemaParser, content_fingerprint, lenient_millis,
    lenient_records, non_blank, value_id,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatData {
    #[serde(deserialize_with = "lenient_records")]
    tabs: Vec<ChatTab>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChatTab {
    id: Option<Value>,
    tab_id: Option<Value>,
    title: Option<String>,
    chat_title: Option<String>,
    #[serde(deserialize_with = "lenient_millis")]
    timestamp: i64,
    #[serde(deserialize_with = "lenient_millis")]
    last_send_time: i64,
    #[serde(deserialize_with = "lenient_records")]
    messages: Vec<RawMessage>,
    #[serde(deserialize_with = "lenient_records")]
    bubbles: Vec<RawMessage>,
}

/// Parses `workbench.panel.aichat.view.aichat.chatdata`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChatDataParser;

impl SchemaParser for ChatDataParser {
    fn key(&self) -> &'static str {
        CHAT_DATA_KEY
    }

    fn parse(&self, value: &str, ctx: &ParseContext<'_>) -> ReaderResult<Vec<Conversation>> {
        let data: ChatData =
            serde_json::from_str(value).map_err(|err| ReaderError::parse(CHAT_DATA_KEY, &err))?;

        let mut conversations = Vec::with_capacity(data.tabs.len());
        for (index, tab) in data.tabs.into_iter().enumerate() {
            let title = non_blank(tab.chat_title.as_deref())
                .or_else(|| non_blank(tab.title.as_deref()))
                .unwrap_or_default()
                .to_string();
            let raw_messages = if tab.messages.is_empty() {
                tab.bubbles
            } else {
                tab.messages
            };
            let id = [&tab.tab_id, &tab.id]
                .into_iter()
                .flatten()
                .find_map(value_id)
                .unwrap_or_else(|| {
                    format!("chatdata-{}", content_fingerprint(&format!("{index}:{title}")))
                });

            let messages = raw_messages
                .into_iter()
                .enumerate()
                .filter_map(|(position, raw)| {
                    raw.into_message(position, &id, ctx, RoleFallback::Length)
                })
                .collect();
            let stored = if tab.last_send_time > 0 {
                tab.last_send_time
            } else {
                tab.timestamp
            };

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
