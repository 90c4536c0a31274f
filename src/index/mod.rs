//! The aligned corpus + embedding matrix pair, its builder, and its persistence.
//!
//! A [`SongIndex`] always has exactly one matrix row per corpus record, in the same
//! order. It is produced by [`build`], written by [`save`], and restored by
//! [`load_existing`]. The two artifacts are a SQLite corpus database and a binary
//! matrix file; both must be present and agree on the record count to load.

pub mod builder;
pub mod matrix;

use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::corpus::{Corpus, SongRecord};
use crate::db::{self, IndexMeta};
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};

pub use builder::{build, build_with_progress, BuildOptions};

/// Corpus records and their embeddings, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct SongIndex {
    corpus: Corpus,
    matrix: Array2<f32>,
    /// Rows that hold a zero vector because embedding failed during the build.
    fallback_rows: Vec<usize>,
}

impl SongIndex {
    /// Pair a corpus with its matrix. Fails with [`Error::Misaligned`] when the
    /// record count differs from the row count.
    pub fn new(corpus: Corpus, matrix: Array2<f32>) -> Result<Self> {
        if corpus.len() != matrix.nrows() {
            return Err(Error::Misaligned {
                records: corpus.len(),
                rows: matrix.nrows(),
            });
        }
        Ok(Self {
            corpus,
            matrix,
            fallback_rows: Vec::new(),
        })
    }

    pub fn corpus(&self) -> &[SongRecord] {
        &self.corpus
    }

    pub fn matrix(&self) -> &Array2<f32> {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// Embedding width (D).
    pub fn dimensions(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn fallback_rows(&self) -> &[usize] {
        &self.fallback_rows
    }

    pub fn into_parts(self) -> (Corpus, Array2<f32>) {
        (self.corpus, self.matrix)
    }
}

/// Locations of the two persisted artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    pub corpus: PathBuf,
    pub matrix: PathBuf,
}

impl IndexPaths {
    /// `true` when both artifact files exist (they may still be inconsistent).
    pub fn exist(&self) -> bool {
        self.corpus.exists() && self.matrix.exists()
    }
}

/// Persist `index` to both artifacts, recording `model` as the embedding model.
///
/// Refuses with [`Error::NoEmbeddings`] when every row is a fallback, leaving any
/// previously saved index untouched.
pub fn save(index: &SongIndex, paths: &IndexPaths, model: &str) -> Result<IndexMeta> {
    if !index.is_empty() && index.fallback_rows().len() == index.len() {
        return Err(Error::NoEmbeddings {
            records: index.len(),
        });
    }

    let meta = IndexMeta {
        model: model.to_string(),
        dimensions: index.dimensions(),
        records: index.len(),
        built_at: chrono::Utc::now().to_rfc3339(),
    };

    let mut conn = db::open_database(&paths.corpus)?;
    db::write_corpus(&mut conn, index.corpus(), &meta)?;
    matrix::write_matrix(&paths.matrix, index.matrix())?;

    tracing::info!(
        corpus = %paths.corpus.display(),
        matrix = %paths.matrix.display(),
        records = meta.records,
        dims = meta.dimensions,
        "index saved"
    );
    Ok(meta)
}

/// Restore a previously saved index.
///
/// Returns `None` unless both artifacts exist, decode cleanly, and agree on the
/// number of records. Never returns a partial index.
pub fn load_existing(paths: &IndexPaths) -> Option<SongIndex> {
    if !paths.exist() {
        tracing::debug!(
            corpus = %paths.corpus.display(),
            matrix = %paths.matrix.display(),
            "no persisted index"
        );
        return None;
    }

    match try_load(paths) {
        Ok(index) => {
            tracing::info!(records = index.len(), dims = index.dimensions(), "index loaded");
            Some(index)
        }
        Err(e) => {
            tracing::warn!(error = %e, "persisted index unusable, ignoring it");
            None
        }
    }
}

fn try_load(paths: &IndexPaths) -> Result<SongIndex> {
    let conn = db::open_existing(&paths.corpus)?;
    let corpus = db::read_corpus(&conn)?;
    let matrix = matrix::read_matrix(&paths.matrix)?;
    SongIndex::new(corpus, matrix)
}

/// Where a session gets its index from.
#[derive(Debug)]
pub enum IndexSource {
    /// The dataset exists and should be (re)built.
    Dataset(PathBuf),
    /// No dataset, but a consistent persisted index was loaded.
    Persisted(SongIndex),
    /// Neither is available.
    Missing,
}

/// Decide where the index comes from. A dataset on disk always wins, even over
/// a persisted index; otherwise the persisted index is loaded if it is usable.
pub fn locate(dataset: &Path, paths: &IndexPaths) -> IndexSource {
    if dataset.exists() {
        return IndexSource::Dataset(dataset.to_path_buf());
    }
    match load_existing(paths) {
        Some(index) => IndexSource::Persisted(index),
        None => IndexSource::Missing,
    }
}

/// Load `dataset`, build its index, and save it to `paths`.
///
/// `on_progress` receives `(done, total)` after each embedded batch, where
/// `total` is the record count after `options.limit` is applied.
pub fn build_from_dataset(
    dataset: &Path,
    paths: &IndexPaths,
    provider: &dyn EmbeddingProvider,
    options: &BuildOptions,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<SongIndex> {
    let corpus = crate::corpus::load(dataset)?;
    let total = options.limit.map_or(corpus.len(), |n| n.min(corpus.len()));
    let index = build_with_progress(corpus, provider, options, |done| on_progress(done, total));
    save(&index, paths, provider.model_name())?;
    Ok(index)
}

/// Build metadata of the persisted index, if its corpus database exists.
pub fn read_meta(paths: &IndexPaths) -> Result<Option<IndexMeta>> {
    if !paths.corpus.exists() {
        return Ok(None);
    }
    let conn = db::open_existing(&paths.corpus)?;
    db::read_index_meta(&conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn misaligned_pair_is_rejected() {
        let corpus = vec![SongRecord::new("Blue", "Art1", "rain").unwrap()];
        let err = SongIndex::new(corpus, Array2::zeros((2, 3))).unwrap_err();
        assert!(matches!(err, Error::Misaligned { records: 1, rows: 2 }));
    }

    #[test]
    fn aligned_pair_reports_shape() {
        let corpus = vec![
            SongRecord::new("Blue", "Art1", "rain").unwrap(),
            SongRecord::new("Sun", "Art2", "shine").unwrap(),
        ];
        let index = SongIndex::new(corpus, array![[1.0f32, 0.0, 0.0], [0.0, 1.0, 0.0]]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimensions(), 3);
        assert!(index.fallback_rows().is_empty());
    }

    #[test]
    fn empty_index_is_allowed() {
        let index = SongIndex::new(Vec::new(), Array2::zeros((0, 0))).unwrap();
        assert!(index.is_empty());
    }
}
