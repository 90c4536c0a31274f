use anyhow::Result;
use std::path::PathBuf;

use songvec::config::SongvecConfig;

/// Build the index from a dataset and persist it, without answering queries.
pub fn build(config: &SongvecConfig, dataset: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let dataset = dataset.unwrap_or_else(|| config.resolved_dataset_path());
    if !dataset.exists() {
        println!("Dataset not found at {}.", dataset.display());
        println!("Download a lyrics CSV with title, artist, and lyrics columns and pass it with --dataset.");
        return Ok(());
    }

    let provider = super::load_provider(config)?;
    super::build_and_save(config, provider.as_ref(), &dataset, limit.or(config.dataset.sample_size))?;
    Ok(())
}
