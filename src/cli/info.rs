//! CLI `info` command: describe the persisted index and check it loads.

use anyhow::{Context, Result};

use songvec::config::SongvecConfig;
use songvec::index;

pub fn info(config: &SongvecConfig) -> Result<()> {
    let paths = config.index_paths();

    println!("songvec index");
    println!("=============");
    println!();
    println!("Corpus:            {} ({})", paths.corpus.display(), presence(&paths.corpus));
    println!("Matrix:            {} ({})", paths.matrix.display(), presence(&paths.matrix));

    let Some(meta) = index::read_meta(&paths).context("failed to read index metadata")? else {
        println!();
        println!("No index has been built yet. Run `songvec build`.");
        return Ok(());
    };

    println!("Matrix size:       {}", format_bytes(file_size(&paths.matrix)));
    println!("Built at:          {}", meta.built_at);
    println!("Songs:             {}", meta.records);
    println!("Dimensions:        {}", meta.dimensions);
    println!();
    println!("Embedding model:");
    println!("  Stored:          {}", meta.model);
    println!("  Configured:      {}", config.embedding.model);
    if meta.model != config.embedding.model {
        println!("  WARNING: model mismatch! Run `songvec build` to re-embed the dataset.");
    } else if meta.dimensions != config.embedding.dimensions {
        println!(
            "  WARNING: index has {} dimensions, provider is configured for {}.",
            meta.dimensions, config.embedding.dimensions
        );
    } else {
        println!("  Status:          OK (match)");
    }
    println!();

    match index::load_existing(&paths) {
        Some(loaded) => println!("Load check:        PASSED ({} rows aligned)", loaded.len()),
        None => println!("Load check:        FAILED (missing, corrupt, or misaligned artifacts)"),
    }

    Ok(())
}

fn presence(path: &std::path::Path) -> &'static str {
    if path.exists() {
        "present"
    } else {
        "missing"
    }
}

fn file_size(path: &std::path::Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_byte_sizes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
