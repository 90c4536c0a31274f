pub mod build;
pub mod info;
pub mod run;
pub mod search;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use songvec::config::{EmbeddingConfig, SongvecConfig};
use songvec::embedding::{self, EmbeddingProvider};
use songvec::index::{self, BuildOptions, SongIndex};
use songvec::search::{SearchEngine, SearchResult};

const MODEL_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/onnx/model.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

/// Create the configured embedding provider.
pub fn load_provider(config: &SongvecConfig) -> Result<Box<dyn EmbeddingProvider>> {
    embedding::create_provider(&config.embedding).context("failed to create embedding provider")
}

/// Load the dataset, embed it (with a progress bar), and persist the index.
pub fn build_and_save(
    config: &SongvecConfig,
    provider: &dyn EmbeddingProvider,
    dataset: &Path,
    limit: Option<usize>,
) -> Result<SongIndex> {
    let options = BuildOptions {
        limit,
        max_lyrics_chars: config.embedding.max_lyrics_chars,
        ..BuildOptions::default()
    };
    let paths = config.index_paths();

    println!(
        "Embedding songs from {} with model '{}'...",
        dataset.display(),
        provider.model_name()
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} ({eta})")
            .context("invalid progress template")?
            .progress_chars("##-"),
    );
    let built = index::build_from_dataset(dataset, &paths, provider, &options, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();
    let built = built.with_context(|| format!("failed to build index from {}", dataset.display()))?;

    if !built.fallback_rows().is_empty() {
        println!(
            "  {} song(s) could not be embedded and will never rank above 0%.",
            built.fallback_rows().len()
        );
    }
    println!(
        "Index saved: {} song(s) → {}",
        built.len(),
        paths.matrix.display()
    );
    Ok(built)
}

/// Answer one query. An embedding failure is reported and yields no results;
/// any other error is returned.
pub fn answer(engine: &SearchEngine<'_>, query: &str, top_k: usize) -> Result<()> {
    match engine.search(query, top_k) {
        Ok(ranked) => {
            println!("\n{}\n", heading(query, ranked.len()));
            print_results(ranked);
            Ok(())
        }
        Err(e @ songvec::Error::Embedding(_)) => {
            println!("Could not embed query '{query}': {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Results heading, counting the songs actually shown.
fn heading(query: &str, shown: usize) -> String {
    let noun = if shown == 1 { "song" } else { "songs" };
    format!("Top {shown} {noun} for '{query}':")
}

pub fn print_results(results: impl Iterator<Item = SearchResult>) {
    let mut any = false;
    for r in results {
        any = true;
        println!(
            "  {}. {} - {} ({:.1}%)",
            r.rank,
            r.title,
            r.artist,
            r.score * 100.0
        );
    }
    if !any {
        println!("  No results.");
    }
}

pub fn missing_index_guidance(config: &SongvecConfig) {
    let paths = config.index_paths();
    println!("No usable index at {}.", paths.corpus.display());
    println!(
        "Put a lyrics CSV (title, artist, lyrics columns) at {} or pass --dataset, then run `songvec build`.",
        config.resolved_dataset_path().display()
    );
}

/// Download the ONNX embedding model and tokenizer to the cache directory.
pub async fn model_download(config: &EmbeddingConfig) -> Result<()> {
    let (model_path, tokenizer_path) = embedding::local::model_files(config);
    if let Some(cache_dir) = model_path.parent() {
        std::fs::create_dir_all(cache_dir)
            .with_context(|| format!("failed to create cache dir: {}", cache_dir.display()))?;
    }

    if model_path.exists() {
        println!("Model already exists at {}", model_path.display());
    } else {
        println!("Downloading model.onnx (~90MB)...");
        download_file(MODEL_URL, &model_path).await?;
        println!("Model saved to {}", model_path.display());
    }

    if tokenizer_path.exists() {
        println!("Tokenizer already exists at {}", tokenizer_path.display());
    } else {
        println!("Downloading tokenizer.json...");
        download_file(TOKENIZER_URL, &tokenizer_path).await?;
        println!("Tokenizer saved to {}", tokenizer_path.display());
    }

    println!("Model download complete. Ready for use.");
    Ok(())
}

/// Download a file from a URL with progress bar. Uses atomic write (tmp + rename).
async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("HTTP request failed for {url}"))?;

    anyhow::ensure!(
        response.status().is_success(),
        "download failed with HTTP {}",
        response.status()
    );

    let pb = match response.content_length() {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
                    .context("invalid progress template")?
                    .progress_chars("##-"),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };

    let tmp_path = dest.with_extension("tmp");
    let written = write_body(response, &tmp_path, &pb).await;
    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp_path).await;
    }
    written?;

    tokio::fs::rename(&tmp_path, dest)
        .await
        .context("failed to rename temp file")?;

    pb.finish_and_clear();
    Ok(())
}

/// Stream the response body into `path` chunk by chunk.
async fn write_body(mut response: reqwest::Response, path: &Path, pb: &ProgressBar) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("failed to create temp file: {}", path.display()))?;

    while let Some(chunk) = response.chunk().await.context("error reading response")? {
        file.write_all(&chunk)
            .await
            .context("error writing to file")?;
        pb.inc(chunk.len() as u64);
    }

    file.flush().await?;
    Ok(())
}
