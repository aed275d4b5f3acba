use chrono::{NaiveDate, NaiveTime};
use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use splaycli::{
    pipeline::reconcile,
    store,
    types::{AlbumRow, ArtistRow, TableRecord, TrackRow},
};

async fn test_pool(dir: &TempDir) -> SqlitePool {
    let url = format!("sqlite:{}", dir.path().join("test.db").display());
    store::init_db(&url).await.unwrap()
}

fn track_row(track_id: &str, played_at: &str) -> TrackRow {
    TrackRow {
        track_id: track_id.to_string(),
        track_name: format!("track {}", track_id),
        artist_id: "ar1".to_string(),
        artist_name: "artist ar1".to_string(),
        album_id: "al1".to_string(),
        album_name: "album al1".to_string(),
        track_popularity: 60,
        track_duration: 180.0,
        datetime_played: played_at.to_string(),
        explicit: false,
        danceability: 0.5,
        energy: 0.6,
        song_key: 7,
        loudness: -8.0,
        mode: 1,
        speechiness: 0.05,
        acousticness: 0.2,
        liveness: 0.1,
        valence: 0.4,
        tempo: 120.0,
        uri: format!("spotify:track:{}", track_id),
        date_played: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
        time_played: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
    }
}

fn artist_row(artist_id: &str, genre: &str) -> ArtistRow {
    ArtistRow {
        artist_id: artist_id.to_string(),
        artist_name: format!("artist {}", artist_id),
        artist_popularity: 70,
        artist_followers: 1000,
        artist_image: String::new(),
        artist_genre: genre.to_string(),
    }
}

fn album_row(album_id: &str) -> AlbumRow {
    AlbumRow {
        album_id: album_id.to_string(),
        album_name: format!("album {}", album_id),
        album_popularity: 55,
        album_tracks: 12,
        album_image: String::new(),
        album_release_date: "2020-03-06".to_string(),
        album_label: "Some Label".to_string(),
        album_artist_id: "ar1".to_string(),
        album_artist_name: "artist ar1".to_string(),
    }
}

#[tokio::test]
async fn test_init_db_is_reentrant() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("test.db").display());

    let pool = store::init_db(&url).await.unwrap();
    store::append_tracks(&pool, &[track_row("t1", "2021-06-01T15:30:00.000000Z")])
        .await
        .unwrap();
    pool.close().await;

    // a second init against the same file keeps existing data
    let pool = store::init_db(&url).await.unwrap();
    assert_eq!(store::read_tracks(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_append_tracks_round_trips_rows() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;

    let written = track_row("t1", "2021-06-01T15:30:00.000000Z");
    store::append_tracks(&pool, &[written.clone()]).await.unwrap();

    let read = store::read_tracks(&pool).await.unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0], written);
}

#[tokio::test]
async fn test_append_tracks_accumulates_across_runs() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;

    store::append_tracks(
        &pool,
        &[
            track_row("t1", "2021-06-01T15:30:00.000000Z"),
            track_row("t2", "2021-06-01T15:34:00.000000Z"),
        ],
    )
    .await
    .unwrap();
    store::append_tracks(&pool, &[track_row("t3", "2021-06-01T18:05:00.000000Z")])
        .await
        .unwrap();

    assert_eq!(store::read_tracks(&pool).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_replace_artists_discards_previous_snapshot() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;

    store::replace_artists(
        &pool,
        &[artist_row("ar1", "rock"), artist_row("ar1", "indie")],
    )
    .await
    .unwrap();

    store::replace_artists(&pool, &[artist_row("ar2", "Null")])
        .await
        .unwrap();

    let read = store::read_artists(&pool).await.unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].artist_id, "ar2");
}

#[tokio::test]
async fn test_replace_albums_discards_previous_snapshot() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;

    store::replace_albums(&pool, &[album_row("al1"), album_row("al2")])
        .await
        .unwrap();
    store::replace_albums(&pool, &[album_row("al3")]).await.unwrap();

    let read = store::read_albums(&pool).await.unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].album_id, "al3");
}

#[tokio::test]
async fn test_recent_tracks_newest_first_with_limit() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;

    store::append_tracks(
        &pool,
        &[
            track_row("t1", "2021-06-01T15:30:00.000000Z"),
            track_row("t2", "2021-06-01T18:05:00.000000Z"),
            track_row("t3", "2021-06-01T15:34:00.000000Z"),
        ],
    )
    .await
    .unwrap();

    let recent = store::recent_tracks(&pool, 2).await.unwrap();
    let ids: Vec<&str> = recent.iter().map(|r| r.track_id.as_str()).collect();
    assert_eq!(ids, vec!["t2", "t3"]);
}

#[tokio::test]
async fn test_reconciled_append_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir).await;

    // run 1
    let fresh = vec![
        track_row("t1", "2021-06-01T15:30:00.000000Z"),
        track_row("t2", "2021-06-01T15:34:00.000000Z"),
    ];
    let existing = store::read_tracks(&pool).await.unwrap();
    let merged = reconcile::reconcile(&existing, &fresh);
    store::append_tracks(&pool, &merged.new_rows).await.unwrap();
    assert_eq!(store::read_tracks(&pool).await.unwrap().len(), 2);

    // run 2 overlaps run 1: t2 again plus a new listen
    let fresh = vec![
        track_row("t2", "2021-06-01T15:34:00.000000Z"),
        track_row("t3", "2021-06-01T18:05:00.000000Z"),
    ];
    let existing = store::read_tracks(&pool).await.unwrap();
    let merged = reconcile::reconcile(&existing, &fresh);
    assert_eq!(merged.new_rows.len(), 1);
    store::append_tracks(&pool, &merged.new_rows).await.unwrap();
    assert_eq!(store::read_tracks(&pool).await.unwrap().len(), 3);

    // run 3 is a pure replay and writes nothing
    let existing = store::read_tracks(&pool).await.unwrap();
    let merged = reconcile::reconcile(&existing, &fresh);
    assert!(merged.new_rows.is_empty());
}

#[tokio::test]
async fn test_write_entity_csv_header_and_rows() {
    let dir = TempDir::new().unwrap();

    let rows = vec![album_row("al1"), album_row("al2")];
    let path = splaycli::output::write_entity_csv(dir.path(), &rows)
        .await
        .unwrap();

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("albums "));
    assert!(name.ends_with(".csv"));

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], AlbumRow::COLUMNS.join(","));
    assert!(lines[1].starts_with("al1,"));
    assert!(lines[2].starts_with("al2,"));
}

#[tokio::test]
async fn test_write_entity_csv_quotes_embedded_commas() {
    let dir = TempDir::new().unwrap();

    let mut row = album_row("al1");
    row.album_label = "Label, Inc.".to_string();

    let path = splaycli::output::write_entity_csv(dir.path(), &[row])
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("\"Label, Inc.\""));
}
