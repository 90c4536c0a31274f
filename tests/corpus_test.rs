mod helpers;

use helpers::write_csv;
use songvec::corpus;
use songvec::Error;
use tempfile::TempDir;

#[test]
fn missing_dataset_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = corpus::load(tmp.path().join("SongLyrics.csv")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn rows_missing_any_field_are_dropped() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(
        tmp.path(),
        "lyrics.csv",
        "Title,Artist,Lyrics,Year\n\
         Blue,Art1,rain on the window,1999\n\
         ,Art2,no title here,2001\n\
         Sun,,no artist here,2002\n\
         Moon,Art3,,2003\n\
         Star,Art4,\"twinkle, twinkle\",2004\n",
    );

    let songs = corpus::load(&path).unwrap();
    let titles: Vec<_> = songs.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Blue", "Star"]);
    assert_eq!(songs[1].lyrics, "twinkle, twinkle");
}

#[test]
fn alternate_column_names_are_resolved() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(
        tmp.path(),
        "alt.csv",
        "song_name,singer,text\nCanción,Artista,la vida es un carnaval\n",
    );

    let songs = corpus::load(&path).unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].title, "Canción");
    assert_eq!(songs[0].artist, "Artista");
}

#[test]
fn unresolvable_columns_are_a_schema_error() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(tmp.path(), "bad.csv", "Title,Year\nBlue,1999\n");

    match corpus::load(&path).unwrap_err() {
        Error::Schema { missing } => assert_eq!(missing, vec!["artist", "lyrics"]),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn short_rows_are_treated_as_missing_fields() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(
        tmp.path(),
        "short.csv",
        "title,artist,lyrics\nBlue,Art1\nSun,Art2,bright\n",
    );

    let songs = corpus::load(&path).unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].title, "Sun");
}
