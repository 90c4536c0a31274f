//! Ollama embedding provider (`POST /api/embeddings`).

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OllamaEmbeddingProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        let endpoint = format!("{}/api/embeddings", config.ollama_url.trim_end_matches('/'));

        tracing::info!(endpoint = %endpoint, model = %config.model, "using Ollama embeddings");

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Create the provider and learn the model's real output width with one
    /// short request. The configured width is kept if the server cannot be
    /// reached; the build then records every row as a fallback.
    pub fn connect(config: &EmbeddingConfig) -> Result<Self> {
        let mut provider = Self::new(config)?;
        match provider.embed("dimension check") {
            Ok(vector) => provider.adopt_width(vector.len()),
            Err(e) => tracing::warn!(
                error = %format!("{e:#}"),
                dims = provider.dimensions,
                "could not query Ollama for its embedding width, keeping configured value"
            ),
        }
        Ok(provider)
    }

    fn adopt_width(&mut self, actual: usize) {
        if actual != self.dimensions {
            tracing::warn!(
                model = %self.model,
                configured = self.dimensions,
                actual,
                "embedding.dimensions does not match the model, using the model's width"
            );
            self.dimensions = actual;
        }
    }
}

impl EmbeddingProvider for OllamaEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .with_context(|| format!("HTTP request failed for {}", self.endpoint))?;

        anyhow::ensure!(
            response.status().is_success(),
            "Ollama returned HTTP {}",
            response.status()
        );

        let body: EmbeddingResponse = response
            .json()
            .context("failed to decode Ollama embedding response")?;
        anyhow::ensure!(!body.embedding.is_empty(), "Ollama returned an empty embedding");
        Ok(body.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
