#![allow(dead_code)]

use std::path::{Path, PathBuf};

use songvec::corpus::{Corpus, SongRecord};
use songvec::embedding::EmbeddingProvider;

/// Deterministic provider: a text gets the vector of the first key it starts with.
/// Texts starting with a `failing` prefix, or matching no key, fail.
pub struct StubProvider {
    pub dims: usize,
    pub entries: Vec<(&'static str, Vec<f32>)>,
    pub failing: Vec<&'static str>,
}

impl StubProvider {
    pub fn new(dims: usize, entries: Vec<(&'static str, Vec<f32>)>) -> Self {
        Self {
            dims,
            entries,
            failing: Vec::new(),
        }
    }

    pub fn failing_on(mut self, prefix: &'static str) -> Self {
        self.failing.push(prefix);
        self
    }
}

impl EmbeddingProvider for StubProvider {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        if self.failing.iter().any(|p| text.starts_with(p)) {
            anyhow::bail!("stub failure for {text:?}");
        }
        self.entries
            .iter()
            .find(|(key, _)| text.starts_with(key))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| anyhow::anyhow!("no stub embedding for {text:?}"))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// The two-song corpus used by the ranking scenarios.
pub fn blue_and_sun() -> (Corpus, StubProvider) {
    let corpus = vec![
        SongRecord::new("Blue", "Art1", "grey skies, sad rainy days, tears on the glass").unwrap(),
        SongRecord::new("Sun", "Art2", "happy days, dancing in the light").unwrap(),
    ];
    let provider = StubProvider::new(
        3,
        vec![
            ("Blue", vec![1.0, 0.0, 0.0]),
            ("Sun", vec![0.0, 1.0, 0.0]),
            ("rain", vec![0.9, 0.1, 0.0]),
        ],
    );
    (corpus, provider)
}

/// `n` songs titled `Song 0..n`, all embedded by a provider returned alongside.
pub fn numbered_songs(n: usize) -> (Corpus, StubProvider) {
    let corpus = (0..n)
        .map(|i| SongRecord::new(&format!("Song {i}"), "Artist", "la la la").unwrap())
        .collect();
    let provider = StubProvider::new(2, vec![("Song", vec![0.5, 0.5])]);
    (corpus, provider)
}

/// Write a CSV file into `dir` and return its path.
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
