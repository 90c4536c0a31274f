use anyhow::Result;

use songvec::config::SongvecConfig;
use songvec::index;
use songvec::search::SearchEngine;

/// Run a single search from the terminal against the persisted index.
pub fn search(config: &SongvecConfig, query: &str, top_k: Option<usize>) -> Result<()> {
    let paths = config.index_paths();
    let Some(song_index) = index::load_existing(&paths) else {
        super::missing_index_guidance(config);
        return Ok(());
    };

    let provider = super::load_provider(config)?;
    let engine = SearchEngine::new(&song_index, provider.as_ref());
    super::answer(&engine, query, top_k.unwrap_or(config.search.top_k))
}
