pub mod schema;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use std::path::Path;

use crate::corpus::{Corpus, SongRecord};
use crate::error::Result;

/// Details of the build that produced a persisted index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexMeta {
    pub model: String,
    pub dimensions: usize,
    pub records: usize,
    /// RFC 3339 timestamp.
    pub built_at: String,
}

/// Open (or create) the corpus database at the given path with schema initialized.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    schema::init_schema(&conn)?;

    tracing::debug!(path = %path.display(), "corpus database opened");
    Ok(conn)
}

/// Open an existing corpus database read-only. Never creates the file.
pub fn open_existing(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(crate::Error::NotFound(path.to_path_buf()));
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

/// Replace the stored corpus and build metadata in a single transaction.
pub fn write_corpus(conn: &mut Connection, corpus: &[SongRecord], meta: &IndexMeta) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM songs", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO songs (position, title, artist, lyrics) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, song) in corpus.iter().enumerate() {
            stmt.execute(params![position as i64, song.title, song.artist, song.lyrics])?;
        }
    }

    let entries = [
        ("embedding_model", meta.model.clone()),
        ("dimensions", meta.dimensions.to_string()),
        ("records", meta.records.to_string()),
        ("built_at", meta.built_at.clone()),
    ];
    for (key, value) in entries {
        tx.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    tx.commit()?;
    Ok(())
}

/// Read every stored record in corpus order.
pub fn read_corpus(conn: &Connection) -> Result<Corpus> {
    let mut stmt = conn.prepare("SELECT title, artist, lyrics FROM songs ORDER BY position")?;
    let corpus = stmt
        .query_map([], |row| {
            Ok(SongRecord {
                title: row.get(0)?,
                artist: row.get(1)?,
                lyrics: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Corpus>>()?;
    Ok(corpus)
}

fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM index_meta WHERE key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

/// Build metadata, or `None` if no build has been recorded in this database.
pub fn read_index_meta(conn: &Connection) -> Result<Option<IndexMeta>> {
    let Some(model) = get_meta(conn, "embedding_model")? else {
        return Ok(None);
    };
    let number = |key: &'static str| -> Result<usize> {
        match get_meta(conn, key)? {
            Some(value) => value
                .parse()
                .map_err(|_| crate::Error::CorruptMeta { key, value }),
            None => Ok(0),
        }
    };
    Ok(Some(IndexMeta {
        model,
        dimensions: number("dimensions")?,
        records: number("records")?,
        built_at: get_meta(conn, "built_at")?.unwrap_or_default(),
    }))
}
