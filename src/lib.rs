//! Semantic song-lyrics search.
//!
//! songvec turns a CSV of song lyrics into a matrix of embeddings, persists it, and
//! answers free-text queries (a mood, a theme, a situation) with the top-k most
//! similar songs by exact cosine similarity.
//!
//! # Pipeline
//!
//! CSV → [`corpus::load`] → [`index::build`] → [`index::save`] →
//! [`index::load_existing`] (later runs) → [`search::SearchEngine`] → ranked results.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`corpus`]: Song records and CSV ingestion with column alias resolution
//! - [`db`]: SQLite storage for the persisted corpus and build metadata
//! - [`embedding`]: Text-to-vector providers (local ONNX Runtime, Ollama)
//! - [`index`]: The aligned corpus/matrix pair: build, save, load
//! - [`search`]: Brute-force cosine similarity ranking

pub mod config;
pub mod corpus;
pub mod db;
pub mod embedding;
pub mod error;
pub mod index;
pub mod search;

pub use error::{Error, Result};
