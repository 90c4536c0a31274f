//! Song records and CSV ingestion.
//!
//! [`load`] reads a lyrics CSV, resolves the `title`, `artist`, and `lyrics` columns
//! (accepting a handful of common alternate spellings), and drops every row where
//! any of the three is missing or blank.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One cleaned row of the dataset. All three fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub title: String,
    pub artist: String,
    pub lyrics: String,
}

impl SongRecord {
    /// Build a record, returning `None` if any field is blank after trimming.
    pub fn new(title: &str, artist: &str, lyrics: &str) -> Option<Self> {
        let (title, artist, lyrics) = (title.trim(), artist.trim(), lyrics.trim());
        if title.is_empty() || artist.is_empty() || lyrics.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            artist: artist.to_string(),
            lyrics: lyrics.to_string(),
        })
    }

    /// Text sent to the embedding provider: `"{title} by {artist}. {lyrics}"`,
    /// with lyrics cut to the first `max_lyrics_chars` characters.
    pub fn prompt_text(&self, max_lyrics_chars: usize) -> String {
        let lyrics = match self.lyrics.char_indices().nth(max_lyrics_chars) {
            Some((byte_idx, _)) => &self.lyrics[..byte_idx],
            None => self.lyrics.as_str(),
        };
        format!("{} by {}. {}", self.title, self.artist, lyrics)
    }
}

/// Ordered collection of songs. Position `i` corresponds to row `i` of the
/// embedding matrix once an index is built.
pub type Corpus = Vec<SongRecord>;

const TITLE_ALIASES: &[&str] = &[
    "song",
    "song_name",
    "song title",
    "name",
    "track",
    "track_name",
];
const ARTIST_ALIASES: &[&str] = &["singer", "band", "artist_name", "artists", "performer"];
const LYRICS_ALIASES: &[&str] = &["lyric", "text", "song_lyrics", "words"];

/// Column positions of the three required fields.
#[derive(Debug, PartialEq, Eq)]
struct Columns {
    title: usize,
    artist: usize,
    lyrics: usize,
}

/// Load and clean a lyrics CSV.
///
/// Fails with [`Error::NotFound`] if `path` does not exist and with [`Error::Schema`]
/// if the header cannot supply all three required fields.
pub fn load(path: impl AsRef<Path>) -> Result<Corpus> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    let columns = resolve_columns(reader.headers()?)?;

    let mut corpus = Corpus::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        let row = row?;
        let field = |i: usize| row.get(i).unwrap_or("");
        match SongRecord::new(field(columns.title), field(columns.artist), field(columns.lyrics)) {
            Some(record) => corpus.push(record),
            None => dropped += 1,
        }
    }

    tracing::info!(
        path = %path.display(),
        records = corpus.len(),
        dropped,
        "dataset loaded"
    );
    Ok(corpus)
}

/// Map header names onto the canonical schema. Exact canonical names take
/// precedence over aliases; matching ignores case and surrounding whitespace.
fn resolve_columns(headers: &csv::StringRecord) -> Result<Columns> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    let find = |canonical: &str, aliases: &[&str]| {
        normalized
            .iter()
            .position(|h| h == canonical)
            .or_else(|| normalized.iter().position(|h| aliases.contains(&h.as_str())))
    };

    let title = find("title", TITLE_ALIASES);
    let artist = find("artist", ARTIST_ALIASES);
    let lyrics = find("lyrics", LYRICS_ALIASES);

    match (title, artist, lyrics) {
        (Some(title), Some(artist), Some(lyrics)) => Ok(Columns {
            title,
            artist,
            lyrics,
        }),
        _ => {
            let missing = [("title", title), ("artist", artist), ("lyrics", lyrics)]
                .into_iter()
                .filter(|(_, col)| col.is_none())
                .map(|(name, _)| name)
                .collect();
            Err(Error::Schema { missing })
        }
    }
}
