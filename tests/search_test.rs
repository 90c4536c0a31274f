mod helpers;

use helpers::{blue_and_sun, numbered_songs, StubProvider};
use ndarray::Array2;
use songvec::index::{build, BuildOptions, SongIndex};
use songvec::search::SearchEngine;
use songvec::Error;

#[test]
fn rainy_query_finds_the_sad_song() {
    let (corpus, provider) = blue_and_sun();
    let index = build(corpus, &provider, &BuildOptions::default());
    let engine = SearchEngine::new(&index, &provider);

    let top: Vec<_> = engine.search("rain", 1).unwrap().collect();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[0].title, "Blue");
    assert_eq!(top[0].artist, "Art1");

    let both: Vec<_> = engine.search("rain", 2).unwrap().collect();
    assert_eq!(both[1].title, "Sun");
    assert!(both[0].score > both[1].score);
}

#[test]
fn engine_is_reusable_across_queries() {
    let (corpus, provider) = blue_and_sun();
    let index = build(corpus, &provider, &BuildOptions::default());
    let engine = SearchEngine::new(&index, &provider);

    let first: Vec<_> = engine.search("rain", 2).unwrap().collect();
    let second: Vec<_> = engine.search("rain", 2).unwrap().collect();
    assert_eq!(first, second);
    assert_eq!(index.matrix().nrows(), 2);
}

#[test]
fn results_never_exceed_top_k() {
    let (corpus, provider) = numbered_songs(6);
    let index = build(corpus, &provider, &BuildOptions::default());
    let engine = SearchEngine::new(&index, &provider);

    let results: Vec<_> = engine.search("Song query", 4).unwrap().collect();
    assert_eq!(results.len(), 4);
    // identical embeddings tie, so corpus order decides
    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Song 0", "Song 1", "Song 2", "Song 3"]);
}

#[test]
fn fallback_row_scores_zero() {
    let (corpus, provider) = numbered_songs(2);
    let provider = provider.failing_on("Song 0");
    let index = build(corpus, &provider, &BuildOptions::default());

    let query_provider = StubProvider::new(2, vec![("q", vec![1.0, 1.0])]);
    let engine = SearchEngine::new(&index, &query_provider);
    let results: Vec<_> = engine.search("q", 2).unwrap().collect();

    assert_eq!(results[0].title, "Song 1");
    assert!((results[0].score - 1.0).abs() < 1e-6);
    assert_eq!(results[1].title, "Song 0");
    assert_eq!(results[1].score, 0.0);
}

#[test]
fn empty_index_is_no_index() {
    let (_, provider) = blue_and_sun();
    let index = SongIndex::new(Vec::new(), Array2::zeros((0, 3))).unwrap();
    let engine = SearchEngine::new(&index, &provider);

    assert!(matches!(engine.search("rain", 5), Err(Error::NoIndex)));
}

#[test]
fn query_dimension_mismatch_is_fatal() {
    let (corpus, provider) = blue_and_sun();
    let index = build(corpus, &provider, &BuildOptions::default());

    let wide = StubProvider::new(4, vec![("rain", vec![1.0, 0.0, 0.0, 0.0])]);
    let engine = SearchEngine::new(&index, &wide);

    assert!(matches!(
        engine.search("rain", 1),
        Err(Error::Dimension { expected: 3, actual: 4 })
    ));
}

#[test]
fn query_embedding_failure_is_surfaced() {
    let (corpus, provider) = blue_and_sun();
    let index = build(corpus, &provider, &BuildOptions::default());
    let engine = SearchEngine::new(&index, &provider);

    // no stub entry for this text
    assert!(matches!(engine.search("jazz", 1), Err(Error::Embedding(_))));
}
