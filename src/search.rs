//! Exact brute-force cosine similarity search over a [`SongIndex`].
//!
//! [`SearchEngine::search`] embeds the query, scores it against every matrix row,
//! and yields the `top_k` best records as a lazy [`Ranked`] iterator. Ties keep
//! corpus order.

use ndarray::{ArrayView1, Axis};
use serde::Serialize;

use crate::corpus::SongRecord;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::index::SongIndex;

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub title: String,
    pub artist: String,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f32,
}

/// Cosine similarity of two vectors; 0 when either norm is 0 or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    finite_or_zero(ratio(dot, norm_a, norm_b))
}

fn ratio(dot: f32, norm_a: f32, norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn finite_or_zero(score: f32) -> f32 {
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Read-only query front end over an index and the provider that built it.
pub struct SearchEngine<'a> {
    index: &'a SongIndex,
    provider: &'a dyn EmbeddingProvider,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a SongIndex, provider: &'a dyn EmbeddingProvider) -> Self {
        Self { index, provider }
    }

    /// Embed `query` and rank the corpus against it.
    ///
    /// Fails with [`Error::InvalidTopK`] for `top_k == 0`, [`Error::NoIndex`] for an
    /// empty index, [`Error::Embedding`] if the query cannot be embedded, and
    /// [`Error::Dimension`] if the query vector width differs from the index.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Ranked<'a>> {
        check_searchable(self.index, top_k)?;
        let query_vec = self.provider.embed(query).map_err(Error::Embedding)?;
        tracing::debug!(query, top_k, dims = query_vec.len(), "query embedded");
        rank_by_vector(self.index, &query_vec, top_k)
    }
}

fn check_searchable(index: &SongIndex, top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(Error::InvalidTopK);
    }
    if index.matrix().nrows() == 0 || index.matrix().ncols() == 0 {
        return Err(Error::NoIndex);
    }
    Ok(())
}

/// Rank the index against an already-embedded query vector.
pub fn rank_by_vector<'a>(index: &'a SongIndex, query: &[f32], top_k: usize) -> Result<Ranked<'a>> {
    check_searchable(index, top_k)?;
    let matrix = index.matrix();
    if query.len() != matrix.ncols() {
        return Err(Error::Dimension {
            expected: matrix.ncols(),
            actual: query.len(),
        });
    }

    let q = ArrayView1::from(query);
    let q_norm = q.dot(&q).sqrt();
    let dots = matrix.dot(&q);
    let row_norms = matrix.map_axis(Axis(1), |row| row.dot(&row).sqrt());

    let mut scored: Vec<(usize, f32)> = dots
        .iter()
        .zip(row_norms.iter())
        .map(|(&dot, &norm)| finite_or_zero(ratio(dot, q_norm, norm)))
        .enumerate()
        .collect();

    // Stable: equal scores keep corpus order. Scores are finite, so the order is total.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);

    Ok(Ranked {
        corpus: index.corpus(),
        hits: scored.into_iter(),
        next_rank: 1,
    })
}

/// Lazily materialized ranking. Finite, yields ranks starting at 1.
pub struct Ranked<'a> {
    corpus: &'a [SongRecord],
    hits: std::vec::IntoIter<(usize, f32)>,
    next_rank: usize,
}

impl Iterator for Ranked<'_> {
    type Item = SearchResult;

    fn next(&mut self) -> Option<Self::Item> {
        let (position, score) = self.hits.next()?;
        let song = &self.corpus[position];
        let rank = self.next_rank;
        self.next_rank += 1;
        Some(SearchResult {
            rank,
            title: song.title.clone(),
            artist: song.artist.clone(),
            score,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}

impl ExactSizeIterator for Ranked<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn index(rows: &[(&str, [f32; 3])]) -> SongIndex {
        let corpus = rows
            .iter()
            .map(|(title, _)| SongRecord::new(title, "Artist", "lyrics").unwrap())
            .collect();
        let flat: Vec<f32> = rows.iter().flat_map(|(_, v)| v.iter().copied()).collect();
        let matrix = Array2::from_shape_vec((rows.len(), 3), flat).unwrap();
        SongIndex::new(corpus, matrix).unwrap()
    }

    #[test]
    fn self_similarity_is_one() {
        let v = [0.3f32, -1.2, 4.5, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_exactly_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn length_mismatch_scores_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn ranks_descending_with_one_based_ranks() {
        let idx = index(&[
            ("far", [0.0, 0.0, 1.0]),
            ("near", [1.0, 0.1, 0.0]),
            ("mid", [1.0, 1.0, 0.0]),
        ]);
        let results: Vec<_> = rank_by_vector(&idx, &[1.0, 0.0, 0.0], 3).unwrap().collect();
        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["near", "mid", "far"]);
        assert_eq!(results.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn ties_keep_corpus_order() {
        let idx = index(&[
            ("first", [2.0, 0.0, 0.0]),
            ("other", [0.0, 1.0, 0.0]),
            ("second", [1.0, 0.0, 0.0]),
            ("third", [5.0, 0.0, 0.0]),
        ]);
        let titles: Vec<_> = rank_by_vector(&idx, &[1.0, 0.0, 0.0], 3)
            .unwrap()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn top_k_caps_result_count() {
        let idx = index(&[("a", [1.0, 0.0, 0.0]), ("b", [0.0, 1.0, 0.0])]);
        assert_eq!(rank_by_vector(&idx, &[1.0, 1.0, 0.0], 1).unwrap().len(), 1);
        assert_eq!(rank_by_vector(&idx, &[1.0, 1.0, 0.0], 10).unwrap().len(), 2);
    }

    #[test]
    fn zero_row_ranks_with_score_zero() {
        let idx = index(&[("fallback", [0.0, 0.0, 0.0]), ("real", [0.0, 1.0, 0.0])]);
        let results: Vec<_> = rank_by_vector(&idx, &[0.0, 1.0, 0.0], 2).unwrap().collect();
        assert_eq!(results[0].title, "real");
        assert_eq!(results[1].score, 0.0);
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let idx = index(&[("a", [1.0, 0.0, 0.0])]);
        let err = rank_by_vector(&idx, &[1.0, 0.0], 1).err().unwrap();
        assert!(matches!(err, Error::Dimension { expected: 3, actual: 2 }));
    }

    #[test]
    fn empty_index_is_no_index() {
        let idx = SongIndex::new(Vec::new(), Array2::zeros((0, 3))).unwrap();
        assert!(matches!(rank_by_vector(&idx, &[1.0, 0.0, 0.0], 1), Err(Error::NoIndex)));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let idx = SongIndex::new(
            vec![SongRecord::new("a", "b", "c").unwrap()],
            array![[1.0f32, 0.0, 0.0]],
        )
        .unwrap();
        assert!(matches!(rank_by_vector(&idx, &[1.0, 0.0, 0.0], 0), Err(Error::InvalidTopK)));
    }
}
