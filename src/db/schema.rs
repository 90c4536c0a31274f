//! SQL DDL for the persisted corpus.
//!
//! `songs` holds one row per record, keyed by its position in the corpus (which is
//! also its row in the embedding matrix). `index_meta` is a key/value table for the
//! schema version and details of the build that produced the index.

use rusqlite::Connection;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS songs (
    position INTEGER PRIMARY KEY CHECK(position >= 0),
    title TEXT NOT NULL CHECK(length(title) > 0),
    artist TEXT NOT NULL CHECK(length(artist) > 0),
    lyrics TEXT NOT NULL CHECK(length(lyrics) > 0)
);

CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO index_meta (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}
