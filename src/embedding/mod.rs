//! Text-to-vector embedding providers.
//!
//! Provides the [`EmbeddingProvider`] trait and two implementations: a local
//! ONNX Runtime model ([`local`]) and an Ollama HTTP client ([`ollama`]). The
//! provider is created via [`create_provider`] from configuration.

pub mod local;
pub mod ollama;

use anyhow::Result;

/// Trait for embedding text into vectors.
///
/// Implementations produce vectors of exactly [`EmbeddingProvider::dimensions`]
/// elements. All methods are synchronous and may block on I/O.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings. Implementations may override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Return the number of dimensions this provider produces.
    fn dimensions(&self) -> usize;

    /// Identifier of the underlying model, recorded alongside a persisted index.
    fn model_name(&self) -> &str;
}

/// Create an embedding provider from config.
///
/// Supported providers are `"local"` (ONNX Runtime + all-MiniLM-L6-v2) and
/// `"ollama"`. Local model files must exist; run `songvec model download` first.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider = local::LocalEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        "ollama" => {
            let provider = ollama::OllamaEmbeddingProvider::connect(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local, ollama"),
    }
}

/// L2-normalize a vector. Returns a zero vector if the input norm is zero.
pub(crate) fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
