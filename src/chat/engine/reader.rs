//! Reader facade: discovery, per-workspace reads and cross-workspace merging.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::chat::core::config::ReaderConfig;
use crate::chat::core::conversation::{Conversation, ConversationWithWorkspace};
use crate::chat::core::errors::{ReaderError, ReaderResult};
use crate::chat::retrieval::concepts::ConceptCatalog;
use crate::chat::retrieval::search::matches_query;
use crate::chat::storage::locator::WorkspaceLocator;
use crate::chat::storage::store_reader::StoreReader;

/// Public entry point for reading chats across workspaces.
///
/// Single-workspace operations fail on a bad store; listing and search skip
/// it and keep going.
pub struct ChatReader {
    config: ReaderConfig,
    locator: WorkspaceLocator,
    store: Arc<StoreReader>,
}

impl ChatReader {
    /// Create a reader.
    ///
    /// # Errors
    /// Returns [`ReaderError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: ReaderConfig) -> ReaderResult<Self> {
        let store = StoreReader::new(&config)?;
        let locator = WorkspaceLocator::new(&config);
        info!(root = %config.workspace_root.display(), "Chat reader ready");
        Ok(Self {
            config,
            locator,
            store: Arc::new(store),
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Concept catalogue, for labelling chats.
    #[must_use]
    pub fn concepts(&self) -> &ConceptCatalog {
        self.store.resolver().catalog()
    }

    /// Workspace store files, newest first.
    ///
    /// # Errors
    /// Returns [`ReaderError::NotFound`] if the root is unreadable.
    pub fn find_workspaces(&self) -> ReaderResult<Vec<PathBuf>> {
        self.locator.find_workspaces()
    }

    /// Most recently modified workspace store.
    ///
    /// # Errors
    /// Returns [`ReaderError::NotFound`] when there is none.
    pub fn latest_workspace(&self) -> ReaderResult<PathBuf> {
        self.locator.latest_workspace()
    }

    /// Conversations of one store, newest first.
    ///
    /// # Errors
    /// Returns an error if the store is missing or unreadable.
    pub fn read_workspace(&self, path: &Path) -> ReaderResult<Vec<Conversation>> {
        self.store.read_workspace(path)
    }

    /// Newest conversation of the most recently modified workspace.
    ///
    /// # Errors
    /// Returns [`ReaderError::NotFound`] when that workspace holds no chats,
    /// or the read error if its store is unreadable.
    pub fn get_latest_chat(&self) -> ReaderResult<Conversation> {
        let path = self.latest_workspace()?;
        self.read_workspace(&path)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ReaderError::NotFound(format!("no chats in workspace {}", path.display()))
            })
    }

    /// Find a conversation by id, scanning workspaces newest first.
    ///
    /// # Errors
    /// Returns [`ReaderError::NotFound`] once every workspace was checked.
    pub fn get_chat_by_id(&self, id: &str) -> ReaderResult<(Conversation, PathBuf)> {
        for path in self.find_workspaces()? {
            let conversations = match self.read_workspace(&path) {
                Ok(conversations) => conversations,
                Err(err) => {
                    warn!(workspace = %path.display(), error = %err, "Skipping unreadable workspace");
                    continue;
                }
            };
            if let Some(found) = conversations.into_iter().find(|c| c.id == id) {
                debug!(id, workspace = %path.display(), "Found chat");
                return Ok((found, path));
            }
        }
        Err(ReaderError::NotFound(format!("chat {id}")))
    }

    /// Every conversation of every workspace, newest first.
    ///
    /// Unreadable workspaces are logged and skipped.
    ///
    /// # Errors
    /// Returns [`ReaderError::NotFound`] only if the root itself is unreadable.
    pub fn list_all_chats(&self) -> ReaderResult<Vec<ConversationWithWorkspace>> {
        let workspaces = self.find_workspaces()?;
        let per_workspace = workspaces
            .into_iter()
            .map(|path| {
                let result = self.read_workspace(&path);
                (path, result)
            })
            .collect();
        Ok(merge_workspaces(per_workspace))
    }

    /// [`ChatReader::list_all_chats`] filtered by a case-insensitive query
    /// over titles and rendered transcripts.
    ///
    /// # Errors
    /// Same as [`ChatReader::list_all_chats`].
    pub fn search_chats(&self, query: &str) -> ReaderResult<Vec<ConversationWithWorkspace>> {
        let mut chats = self.list_all_chats()?;
        chats.retain(|chat| matches_query(&chat.conversation, query));
        debug!(query, hits = chats.len(), "Searched chats");
        Ok(chats)
    }

    /// Same result as [`ChatReader::list_all_chats`], reading workspaces on the
    /// blocking pool with at most `max_concurrent_reads` stores open at once.
    ///
    /// # Errors
    /// Same as [`ChatReader::list_all_chats`].
    pub async fn list_all_chats_concurrent(&self) -> ReaderResult<Vec<ConversationWithWorkspace>> {
        let workspaces = self.find_workspaces()?;
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_reads));
        let mut tasks = JoinSet::new();

        for (index, path) in workspaces.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let store = Arc::clone(&self.store);
            let path = path.clone();
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => tokio::task::spawn_blocking(move || store.read_workspace(&path))
                        .await
                        .map_err(|err| ReaderError::Task(err.to_string()))
                        .and_then(|result| result),
                    Err(err) => Err(ReaderError::Task(err.to_string())),
                };
                (index, result)
            });
        }

        let mut results: Vec<Option<ReaderResult<Vec<Conversation>>>> =
            workspaces.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(err) => warn!(error = %err, "Workspace task failed"),
            }
        }

        let per_workspace = workspaces
            .into_iter()
            .zip(results)
            .map(|(path, result)| {
                let result = result
                    .unwrap_or_else(|| Err(ReaderError::Task("workspace task aborted".to_string())));
                (path, result)
            })
            .collect();
        Ok(merge_workspaces(per_workspace))
    }
}

/// Tag, skip failures and sort newest first; input order breaks timestamp ties.
fn merge_workspaces(
    per_workspace: Vec<(PathBuf, ReaderResult<Vec<Conversation>>)>,
) -> Vec<ConversationWithWorkspace> {
    let mut all = Vec::new();
    for (path, result) in per_workspace {
        match result {
            Ok(conversations) => {
                all.extend(
                    conversations
                        .into_iter()
                        .map(|c| ConversationWithWorkspace::new(c, path.clone())),
                );
            }
            Err(err) => {
                warn!(workspace = %path.display(), error = %err, "Skipping unreadable workspace");
            }
        }
    }
    all.sort_by(|a, b| b.conversation.timestamp_ms.cmp(&a.conversation.timestamp_ms));
    all
}
