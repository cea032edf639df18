//! Startup helpers for the `cursor-chats` binary.
//!
//! Configuration comes from the environment only:
//! `CURSOR_WORKSPACE_STORAGE`, `CURSOR_WORKSPACE_DB` and `CURSOR_CHAT_QUERY`.

use std::process::ExitCode;

use crate::chat::core::config::ReaderConfig;
use crate::chat::core::conversation::ConversationWithWorkspace;
use crate::chat::engine::ChatReader;
use crate::chat::retrieval::search::matches_query;

/// Environment variable holding an optional search query.
pub const QUERY_ENV_VAR: &str = "CURSOR_CHAT_QUERY";

const PREVIEW_CHARS: usize = 120;

/// Install the `tracing` subscriber (`RUST_LOG`, `info` by default).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// List chats across workspaces and log one line per chat.
///
/// # Returns
/// `ExitCode::SUCCESS` when listing succeeded, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();
    tracing::info!("Starting cursor chat reader v{}", env!("CARGO_PKG_VERSION"));

    let reader = match ChatReader::new(ReaderConfig::from_env()) {
        Ok(reader) => reader,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let mut chats = match rt.block_on(reader.list_all_chats_concurrent()) {
        Ok(chats) => chats,
        Err(e) => {
            tracing::error!("Failed to list chats: {e}");
            return ExitCode::from(1);
        }
    };

    if let Some(query) = std::env::var(QUERY_ENV_VAR).ok().filter(|q| !q.trim().is_empty()) {
        chats.retain(|chat| matches_query(&chat.conversation, &query));
        tracing::info!(query = %query, "Filtering chats");
    }

    for chat in &chats {
        log_chat(&reader, chat);
    }
    tracing::info!(count = chats.len(), "Done");

    ExitCode::SUCCESS
}

fn log_chat(reader: &ChatReader, chat: &ConversationWithWorkspace) {
    let conversation = &chat.conversation;
    let concepts = conversation.technical_concepts(reader.concepts()).join(",");
    tracing::info!(
        id = %conversation.id,
        workspace = %chat.workspace_name,
        messages = conversation.messages.len(),
        updated = %conversation.updated_at().format("%Y-%m-%d %H:%M"),
        concepts = %concepts,
        "{}",
        conversation.display_title()
    );
    tracing::debug!(
        id = %conversation.id,
        "{}",
        conversation.content_preview(PREVIEW_CHARS)
    );
}
