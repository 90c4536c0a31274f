//! CLI `run` command: get an index (build or load), then answer queries.
//!
//! A dataset on disk always wins and triggers a fresh build; otherwise a
//! persisted index is loaded; otherwise guidance is printed and nothing fails.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use songvec::config::SongvecConfig;
use songvec::index::{self, IndexSource};
use songvec::search::SearchEngine;

pub struct RunOptions {
    pub dataset: Option<PathBuf>,
    pub sample: Option<usize>,
    pub top_k: Option<usize>,
    pub queries: Vec<String>,
}

pub fn run(config: &SongvecConfig, opts: RunOptions) -> Result<()> {
    let dataset = opts
        .dataset
        .unwrap_or_else(|| config.resolved_dataset_path());
    let paths = config.index_paths();
    let top_k = opts.top_k.unwrap_or(config.search.top_k);

    let (song_index, provider) = match index::locate(&dataset, &paths) {
        IndexSource::Dataset(dataset) => {
            let provider = super::load_provider(config)?;
            let limit = opts.sample.or(config.dataset.sample_size);
            let built = super::build_and_save(config, provider.as_ref(), &dataset, limit)?;
            (built, provider)
        }
        IndexSource::Persisted(loaded) => {
            println!("Loaded index with {} song(s).", loaded.len());
            (loaded, super::load_provider(config)?)
        }
        IndexSource::Missing => {
            println!("Dataset not found at {}.", dataset.display());
            super::missing_index_guidance(config);
            return Ok(());
        }
    };

    if song_index.is_empty() {
        println!("The index holds no songs; nothing to search.");
        return Ok(());
    }

    let engine = SearchEngine::new(&song_index, provider.as_ref());

    if !opts.queries.is_empty() {
        for query in &opts.queries {
            super::answer(&engine, query, top_k)?;
        }
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nEnter a feeling, theme, or situation (or 'exit'): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let query = line.trim();
        if is_exit(query) {
            break;
        }
        if query.is_empty() {
            continue;
        }
        super::answer(&engine, query, top_k)?;
    }

    Ok(())
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
