//! Core reader types.

pub mod config;
pub mod conversation;
pub mod errors;
pub mod hints;
pub mod role;

pub use config::{HeuristicsConfig, ReaderConfig, default_workspace_root};
pub use conversation::{
    Conversation, ConversationWithWorkspace, Message, RawRow, UNTITLED, instant_from_millis,
};
pub use errors::{ReaderError, ReaderResult};
pub use hints::{TitleHint, TitleHints};
pub use role::Role;
