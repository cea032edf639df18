//! Read-only access to one workspace store and per-key parsing.

use std::path::Path;

use chrono::Utc;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use tracing::{debug, warn};

use crate::chat::core::config::ReaderConfig;
use crate::chat::core::conversation::{Conversation, RawRow};
use crate::chat::core::errors::{ReaderError, ReaderResult};
use crate::chat::core::hints::TitleHints;
use crate::chat::ingest::composer::extract_title_hints;
use crate::chat::ingest::role_classifier::RoleClassifier;
use crate::chat::ingest::schema::{COMPOSER_KEY, KNOWN_KEYS, ParseContext, SchemaParser, default_parsers};
use crate::chat::retrieval::aggregator::dedupe_and_sort;
use crate::chat::retrieval::title_resolver::TitleResolver;

/// Reads the known keys of a store and turns them into conversations.
///
/// Every present key contributes; a malformed value only drops that key.
pub struct StoreReader {
    table: String,
    parsers: Vec<Box<dyn SchemaParser>>,
    classifier: RoleClassifier,
    resolver: TitleResolver,
}

impl StoreReader {
    /// Build a reader with the built-in parsers.
    ///
    /// # Errors
    /// Returns [`ReaderError::InvalidConfig`] if the config is invalid or a
    /// heuristic pattern fails to compile.
    pub fn new(config: &ReaderConfig) -> ReaderResult<Self> {
        Self::with_parsers(config, default_parsers())
    }

    /// Build a reader with a custom parser list, tried in the given order.
    ///
    /// # Errors
    /// Same as [`StoreReader::new`].
    pub fn with_parsers(
        config: &ReaderConfig,
        parsers: Vec<Box<dyn SchemaParser>>,
    ) -> ReaderResult<Self> {
        config.validate()?;
        let classifier = RoleClassifier::new(&config.heuristics)
            .map_err(|err| ReaderError::InvalidConfig(format!("role markers: {err}")))?;
        let resolver = TitleResolver::new(&config.heuristics)
            .map_err(|err| ReaderError::InvalidConfig(format!("concept catalogue: {err}")))?;
        Ok(Self {
            table: config.table.clone(),
            parsers,
            classifier,
            resolver,
        })
    }

    /// Title resolver shared with callers that render or label chats.
    #[must_use]
    pub const fn resolver(&self) -> &TitleResolver {
        &self.resolver
    }

    /// Fetch the rows for every known key present in the store.
    ///
    /// # Errors
    /// Returns [`ReaderError::NotFound`] if the file is missing and
    /// [`ReaderError::Sqlite`] if it cannot be opened or queried.
    pub fn read_rows(&self, path: &Path) -> ReaderResult<Vec<RawRow>> {
        if !path.is_file() {
            return Err(ReaderError::NotFound(format!(
                "store file {} does not exist",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let placeholders = vec!["?"; KNOWN_KEYS.len()].join(", ");
        let sql = format!(
            "SELECT key, value FROM {} WHERE key IN ({placeholders})",
            self.table
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(KNOWN_KEYS), |row| {
            let key: String = row.get(0)?;
            let value = match row.get_ref(1)? {
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                    Some(String::from_utf8_lossy(bytes).into_owned())
                }
                _ => None,
            };
            Ok(value.map(|value| RawRow { key, value }))
        })?;

        let mut out = Vec::new();
        for row in rows {
            if let Some(row) = row? {
                out.push(row);
            }
        }
        debug!(workspace = %path.display(), keys = out.len(), "Read store rows");
        Ok(out)
    }

    /// Read and parse one workspace store.
    ///
    /// # Errors
    /// Propagates [`StoreReader::read_rows`] failures; parse failures of
    /// individual keys are logged and skipped.
    pub fn read_workspace(&self, path: &Path) -> ReaderResult<Vec<Conversation>> {
        let rows = self.read_rows(path)?;
        let label = path.display().to_string();
        Ok(self.conversations_from_rows(&label, &rows, Utc::now().timestamp_millis()))
    }

    /// Parse already-fetched rows; `clock_ms` stamps records without any time.
    #[must_use]
    pub fn conversations_from_rows(
        &self,
        workspace: &str,
        rows: &[RawRow],
        clock_ms: i64,
    ) -> Vec<Conversation> {
        let value_for = |key: &str| {
            rows.iter()
                .find(|row| row.key == key)
                .map(|row| row.value.as_str())
        };

        let hints = match value_for(COMPOSER_KEY).map(extract_title_hints) {
            Some(Ok(hints)) => hints,
            Some(Err(err)) => {
                warn!(workspace, key = COMPOSER_KEY, error = %err, "Ignoring unreadable title hints");
                TitleHints::new()
            }
            None => TitleHints::new(),
        };
        let no_hints = TitleHints::new();

        let mut conversations = Vec::new();
        for parser in &self.parsers {
            let Some(value) = value_for(parser.key()) else {
                continue;
            };
            let hints = if parser.uses_title_hints() {
                &hints
            } else {
                &no_hints
            };
            let ctx = ParseContext {
                hints,
                classifier: &self.classifier,
                clock_ms,
            };

            match parser.parse(value, &ctx) {
                Ok(mut parsed) => {
                    for conversation in &mut parsed {
                        self.resolver.apply(conversation, hints);
                    }
                    debug!(workspace, key = parser.key(), count = parsed.len(), "Parsed key");
                    conversations.extend(parsed);
                }
                Err(err) => {
                    warn!(workspace, key = parser.key(), error = %err, "Skipping malformed value");
                }
            }
        }

        dedupe_and_sort(conversations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::core::role::Role;
    use crate::chat::ingest::schema::{CHAT_DATA_KEY, GENERATIONS_KEY, PROMPTS_KEY};
    use crate::chat::testing::{
        TEST_CLOCK_MS, chat_data_json, write_blob_row, write_corrupt_workspace, write_store,
        write_workspace,
    };

    fn reader() -> StoreReader {
        StoreReader::new(&ReaderConfig::new()).unwrap()
    }

    fn row(key: &str, value: &str) -> RawRow {
        RawRow {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    const COMPOSER: &str = r#"{"allComposers": [
        {"type": "head", "composerId": "c1", "name": "Fix pagination",
         "createdAt": 1700000000000, "lastUpdatedAt": 1700000000000}
    ]}"#;

    #[test]
    fn every_present_key_contributes() {
        let rows = [
            row(CHAT_DATA_KEY, &chat_data_json("tab-1", "Auth refactor", 1_700_000_900_000)),
            row(PROMPTS_KEY, r#"[{"text": "hello there"}]"#),
            row(COMPOSER_KEY, COMPOSER),
        ];
        let chats = reader().conversations_from_rows("ws", &rows, TEST_CLOCK_MS);
        assert_eq!(chats.len(), 3);

        let titles: Vec<&str> = chats.iter().map(|c| c.title.as_str()).collect();
        // Prompt chat is stamped with the read clock, the newest of the three.
        assert_eq!(titles, ["Fix pagination", "Auth refactor", "Fix pagination"]);
        assert!(chats[0].id.starts_with("prompts-"));
        assert_eq!(chats[2].id, "c1");
    }

    #[test]
    fn malformed_key_is_skipped_alone() {
        let rows = [
            row(CHAT_DATA_KEY, "{not json"),
            row(GENERATIONS_KEY, r#"[{"unixMs": 5, "generationUUID": "g", "type": "composer", "textDescription": "How do I run tests?"}]"#),
        ];
        let chats = reader().conversations_from_rows("ws", &rows, TEST_CLOCK_MS);
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].id, "g");
        assert_eq!(chats[0].title, "How do I run tests");
    }

    #[test]
    fn generation_log_enriches_composer_session() {
        let rows = [
            row(GENERATIONS_KEY, r#"[
                {"unixMs": 1700000001000, "generationUUID": "g1", "type": "composer", "textDescription": "add paging?", "conversationId": "c1"},
                {"unixMs": 1700000002000, "generationUUID": "g2", "type": "composer", "textDescription": "Here's the diff", "conversationId": "c1"}
            ]"#),
            row(COMPOSER_KEY, COMPOSER),
        ];
        let chats = reader().conversations_from_rows("ws", &rows, TEST_CLOCK_MS);
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].messages.len(), 2);
        assert_eq!(chats[0].title, "Fix pagination");
        assert_eq!(chats[0].messages[1].role, Role::Assistant);
    }

    #[test]
    fn one_bad_record_does_not_drop_its_key() {
        let rows = [
            row(PROMPTS_KEY, r#"[{"text": "how do I page results?"}, {"text": "x", "role": 5}]"#),
            row(GENERATIONS_KEY, r#"[null, {"unixMs": 5, "generationUUID": "g", "type": "composer", "textDescription": "rename the crate"}]"#),
            row(COMPOSER_KEY, r#"{"allComposers": [
                {"type": "head", "composerId": "k", "name": "Keep me", "messages": null, "createdAt": 1700000000000},
                {"type": "head", "composerId": "b", "name": ["not", "a", "title"]}
            ]}"#),
        ];
        let chats = reader().conversations_from_rows("ws", &rows, TEST_CLOCK_MS);
        assert_eq!(chats.len(), 3);
        assert!(chats.iter().any(|c| c.id.starts_with("prompts-")));
        assert!(chats.iter().any(|c| c.id == "g"));
        let kept = chats.iter().find(|c| c.id == "k").unwrap();
        assert_eq!(kept.title, "Keep me");
        // The surviving composer name is still the unique hint for the prompt list.
        let prompts = chats.iter().find(|c| c.id.starts_with("prompts-")).unwrap();
        assert_eq!(prompts.title, "Keep me");
    }

    #[test]
    fn hints_do_not_retitle_authoritative_schemas() {
        let rows = [
            row(CHAT_DATA_KEY, &chat_data_json("tab-1", "Auth refactor", 1_700_000_900_000)),
            row(COMPOSER_KEY, r#"{"allComposers": [{"type": "draft", "composerId": "d", "name": "Only hint"}]}"#),
        ];
        let chats = reader().conversations_from_rows("ws", &rows, TEST_CLOCK_MS);
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].title, "Auth refactor");
    }

    #[test]
    fn reads_text_and_blob_values_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let chat_json = chat_data_json("tab-1", "From text", 1_700_000_000_000);
        let path = write_workspace(
            tmp.path(),
            "ws",
            &[(CHAT_DATA_KEY, chat_json.as_str()), ("unrelated.key", "ignored")],
        );
        write_blob_row(&path, PROMPTS_KEY, r#"[{"text": "from a blob"}]"#);

        let rows = reader().read_rows(&path).unwrap();
        let mut keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, [PROMPTS_KEY, CHAT_DATA_KEY]);

        let chats = reader().read_workspace(&path).unwrap();
        assert_eq!(chats.len(), 2);
        assert!(chats.iter().any(|c| c.title == "From text"));
    }

    #[test]
    fn store_without_known_keys_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state.vscdb");
        write_store(&path, &[("other", "{}")]);
        assert!(reader().read_workspace(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_and_corrupt_stores_fail() {
        let tmp = tempfile::tempdir().unwrap();
        let err = reader().read_workspace(&tmp.path().join("absent.vscdb")).unwrap_err();
        assert!(err.is_not_found());

        let corrupt = write_corrupt_workspace(tmp.path(), "broken");
        let err = reader().read_workspace(&corrupt).unwrap_err();
        assert!(matches!(err, ReaderError::Sqlite(_)));
    }
}
