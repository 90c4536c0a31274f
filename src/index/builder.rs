//! Index build: composed prompt → embedding → matrix row.
//!
//! Records are embedded in batches. If a batch fails, its records are retried one
//! at a time, and any record that still fails (or comes back with the wrong width)
//! gets a zero row. A single bad record never aborts the build, and the matrix
//! always has exactly one row per record.

use ndarray::{Array2, ArrayView1};

use super::SongIndex;
use crate::corpus::Corpus;
use crate::embedding::EmbeddingProvider;

/// Knobs for [`build`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Only the first `limit` records are embedded and kept.
    pub limit: Option<usize>,
    /// Lyrics are cut to this many characters in the prompt text.
    pub max_lyrics_chars: usize,
    /// Records per `embed_batch` call.
    pub batch_size: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            limit: None,
            max_lyrics_chars: 1000,
            batch_size: 32,
        }
    }
}

/// Embed every record (up to `limit`) and assemble an aligned index.
pub fn build(corpus: Corpus, provider: &dyn EmbeddingProvider, options: &BuildOptions) -> SongIndex {
    build_with_progress(corpus, provider, options, |_| {})
}

/// Like [`build`], calling `on_progress` with the number of records finished
/// after each batch.
pub fn build_with_progress(
    mut corpus: Corpus,
    provider: &dyn EmbeddingProvider,
    options: &BuildOptions,
    mut on_progress: impl FnMut(usize),
) -> SongIndex {
    if let Some(limit) = options.limit {
        corpus.truncate(limit);
    }

    let dims = provider.dimensions();
    let mut matrix = Array2::<f32>::zeros((corpus.len(), dims));
    let mut fallback_rows = Vec::new();

    tracing::info!(
        records = corpus.len(),
        dims,
        model = provider.model_name(),
        "building index"
    );

    let batch_size = options.batch_size.max(1);
    for (batch_idx, chunk) in corpus.chunks(batch_size).enumerate() {
        let start = batch_idx * batch_size;
        let prompts: Vec<String> = chunk
            .iter()
            .map(|song| song.prompt_text(options.max_lyrics_chars))
            .collect();

        for (offset, embedding) in embed_chunk(provider, &prompts).into_iter().enumerate() {
            let position = start + offset;
            match embedding {
                Ok(v) if v.len() == dims => {
                    matrix.row_mut(position).assign(&ArrayView1::from(&v[..]));
                }
                Ok(v) => {
                    tracing::warn!(
                        position,
                        title = %corpus[position].title,
                        expected = dims,
                        actual = v.len(),
                        "embedding has wrong dimension, using zero vector"
                    );
                    fallback_rows.push(position);
                }
                Err(e) => {
                    tracing::warn!(
                        position,
                        title = %corpus[position].title,
                        error = %format!("{e:#}"),
                        "embedding failed, using zero vector"
                    );
                    fallback_rows.push(position);
                }
            }
        }

        on_progress(start + chunk.len());
    }

    if fallback_rows.is_empty() {
        tracing::info!(records = corpus.len(), "index built");
    } else {
        tracing::warn!(
            records = corpus.len(),
            fallbacks = fallback_rows.len(),
            "index built with zero-vector fallbacks"
        );
    }

    SongIndex {
        corpus,
        matrix,
        fallback_rows,
    }
}

/// One result per prompt, in order. A failed or short batch is retried per item.
fn embed_chunk(provider: &dyn EmbeddingProvider, prompts: &[String]) -> Vec<anyhow::Result<Vec<f32>>> {
    let refs: Vec<&str> = prompts.iter().map(String::as_str).collect();
    match provider.embed_batch(&refs) {
        Ok(batch) if batch.len() == prompts.len() => batch.into_iter().map(Ok).collect(),
        Ok(batch) => {
            tracing::debug!(
                expected = prompts.len(),
                actual = batch.len(),
                "batch size mismatch, retrying per record"
            );
            refs.iter().map(|p| provider.embed(p)).collect()
        }
        Err(e) => {
            tracing::debug!(error = %e, "batch failed, retrying per record");
            refs.iter().map(|p| provider.embed(p)).collect()
        }
    }
}
