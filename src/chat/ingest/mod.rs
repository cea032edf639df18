//! Ingestion: decoding host payloads into conversations.

pub mod chat_data;
pub mod composer;
pub mod generations;
pub mod prompts;
pub mod role_classifier;
pub mod schema;

pub use chat_data::ChatDataParser;
pub use composer::{ComposerParser, extract_title_hints};
pub use generations::GenerationsParser;
pub use prompts::PromptsParser;
pub use role_classifier::{RoleClassifier, RoleFallback};
pub use schema::{
    CHAT_DATA_KEY, COMPOSER_KEY, GENERATIONS_KEY, KNOWN_KEYS, PLACEHOLDER_TITLE, PROMPTS_KEY,
    ParseContext, SchemaParser, default_parsers,
};
