//! Error taxonomy for corpus loading, index building, persistence, and search.

use std::path::PathBuf;

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source dataset (or another required input) does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// One or more of `title`, `artist`, `lyrics` could not be resolved from the header.
    #[error("dataset is missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<&'static str> },

    /// The embedding provider failed. During a build this is recovered per record;
    /// during a query it is surfaced.
    #[error("embedding generation failed: {0:#}")]
    Embedding(#[source] anyhow::Error),

    /// A search was attempted before any index was built or loaded.
    #[error("no index available: build or load an index first")]
    NoIndex,

    /// The query embedding does not match the index's column count.
    #[error("query embedding has {actual} dimensions, index expects {expected} (stale or incompatible index?)")]
    Dimension { expected: usize, actual: usize },

    #[error("top_k must be at least 1")]
    InvalidTopK,

    /// The persisted matrix file could not be decoded.
    #[error("malformed embedding matrix: {0}")]
    MalformedMatrix(String),

    /// Corpus and matrix disagree on the number of rows.
    #[error("corpus has {records} record(s) but matrix has {rows} row(s)")]
    Misaligned { records: usize, rows: usize },

    /// Every record fell back to a zero vector; the index would rank nothing.
    #[error("none of the {records} record(s) could be embedded (check the provider and its configured dimensions)")]
    NoEmbeddings { records: usize },

    /// A stored metadata value could not be parsed.
    #[error("corrupt index metadata: {key} = {value:?}")]
    CorruptMeta { key: &'static str, value: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}
