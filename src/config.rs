use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SongvecConfig {
    pub logging: LoggingConfig,
    pub dataset: DatasetConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    /// Raw lyrics CSV. When it exists, `run` rebuilds the index from it.
    pub path: String,
    /// Optional cap on the number of records embedded, for fast iteration.
    pub sample_size: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IndexConfig {
    pub dir: String,
    pub corpus_file: String,
    pub matrix_file: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    /// Output dimension of the provider. Also the width of the zero-vector fallback.
    pub dimensions: usize,
    pub cache_dir: String,
    pub ollama_url: String,
    /// Lyrics are cut to this many characters when composing the prompt text.
    pub max_lyrics_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "SongLyrics.csv".into(),
            sample_size: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        let dir = default_songvec_dir()
            .join("index")
            .to_string_lossy()
            .into_owned();
        Self {
            dir,
            corpus_file: "corpus.db".into(),
            matrix_file: "embeddings.bin".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_songvec_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            dimensions: 384,
            cache_dir,
            ollama_url: "http://localhost:11434".into(),
            max_lyrics_chars: 1000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Returns `~/.songvec/`, or `./.songvec` when no home directory is known.
pub fn default_songvec_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".songvec")
}

/// Returns the default config file path: `~/.songvec/config.toml`
pub fn default_config_path() -> PathBuf {
    default_songvec_dir().join("config.toml")
}

impl SongvecConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            SongvecConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (`SONGVEC_*`).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SONGVEC_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("SONGVEC_DATASET") {
            self.dataset.path = val;
        }
        if let Ok(val) = std::env::var("SONGVEC_INDEX_DIR") {
            self.index.dir = val;
        }
        if let Ok(val) = std::env::var("SONGVEC_EMBEDDING_PROVIDER") {
            self.embedding.provider = val;
        }
        if let Ok(val) = std::env::var("SONGVEC_EMBEDDING_MODEL") {
            self.embedding.model = val;
        }
    }

    pub fn resolved_dataset_path(&self) -> PathBuf {
        expand_tilde(&self.dataset.path)
    }

    /// Resolve both artifact paths of the persisted index.
    pub fn index_paths(&self) -> crate::index::IndexPaths {
        let dir = expand_tilde(&self.index.dir);
        crate::index::IndexPaths {
            corpus: dir.join(&self.index.corpus_file),
            matrix: dir.join(&self.index.matrix_file),
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
