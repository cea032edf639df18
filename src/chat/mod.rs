//! Chat reconstruction subsystem.
//!
//! Cursor keeps AI-pane state as undocumented JSON blobs inside one `SQLite`
//! store per workspace. This module rebuilds ordered, role-tagged
//! conversations from them:
//! - `core`: configuration, errors, roles and the conversation model
//! - `ingest`: schema parsers and the role classifier
//! - `retrieval`: title resolution, concept catalogue, aggregation, search
//! - `storage`: workspace discovery and read-only store access
//! - `engine`: the public reader facade

pub mod core;
pub mod engine;
pub mod ingest;
pub mod retrieval;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use self::core::{
    Conversation, ConversationWithWorkspace, HeuristicsConfig, Message, RawRow, ReaderConfig,
    ReaderError, ReaderResult, Role, TitleHint, TitleHints,
};
pub use engine::ChatReader;
pub use ingest::{
    ChatDataParser, ComposerParser, GenerationsParser, ParseContext, PromptsParser,
    RoleClassifier, RoleFallback, SchemaParser,
};
pub use retrieval::{
    ConceptCatalog, TitleResolver, dedupe_and_sort, matches_query, render_markdown,
};
pub use storage::{StoreReader, WorkspaceLocator};
