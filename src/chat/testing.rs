//! Shared test fixtures: parse contexts and on-disk workspace stores.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use rusqlite::{Connection, params};

use crate::chat::core::config::HeuristicsConfig;
use crate::chat::core::hints::TitleHints;
use crate::chat::ingest::role_classifier::RoleClassifier;
use crate::chat::ingest::schema::ParseContext;

/// Fixed read clock for parser tests (2024-01-01T00:00:00Z).
pub const TEST_CLOCK_MS: i64 = 1_704_067_200_000;

/// Run `f` with a default classifier and no title hints.
pub fn with_context<T>(f: impl FnOnce(&ParseContext<'_>) -> T) -> T {
    with_hints(&TitleHints::new(), f)
}

/// Run `f` with a default classifier and the given hints.
pub fn with_hints<T>(hints: &TitleHints, f: impl FnOnce(&ParseContext<'_>) -> T) -> T {
    let classifier = RoleClassifier::new(&HeuristicsConfig::default()).unwrap();
    let ctx = ParseContext {
        hints,
        classifier: &classifier,
        clock_ms: TEST_CLOCK_MS,
    };
    f(&ctx)
}

/// Create `<root>/<name>/state.vscdb` holding `rows` as text values.
pub fn write_workspace(root: &Path, name: &str, rows: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("state.vscdb");
    write_store(&path, rows);
    path
}

/// Create a store file with the host's `ItemTable` layout.
pub fn write_store(path: &Path, rows: &[(&str, &str)]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB)",
    )
    .unwrap();
    for (key, value) in rows {
        conn.execute(
            "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .unwrap();
    }
}

/// Store one value as a BLOB, the way newer host builds write it.
pub fn write_blob_row(path: &Path, key: &str, value: &str) {
    let conn = Connection::open(path).unwrap();
    conn.execute(
        "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
        params![key, value.as_bytes()],
    )
    .unwrap();
}

/// Create `<root>/<name>/state.vscdb` filled with bytes that are not a database.
pub fn write_corrupt_workspace(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("state.vscdb");
    fs::write(&path, "not an sqlite database\n".repeat(256)).unwrap();
    path
}

/// Pin a file's modification time to `secs` after the epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

/// Chat-data payload with one tab and a user/assistant exchange.
pub fn chat_data_json(id: &str, title: &str, last_ms: i64) -> String {
    serde_json::json!({
        "tabs": [{
            "id": id,
            "title": title,
            "timestamp": last_ms,
            "messages": [
                {"id": format!("{id}-q"), "role": "user", "content": "How do I fix the build?", "timestamp": last_ms - 1_000},
                {"id": format!("{id}-a"), "role": "assistant", "content": "Run the migration first.", "timestamp": last_ms}
            ]
        }]
    })
    .to_string()
}
