use chrono::{NaiveDate, NaiveTime};

use splaycli::{
    error::PipelineError,
    pipeline::{assemble, extract, reconcile, transform},
    types::{
        AlbumObject, AlbumRef, ArtistObject, ArtistRecord, ArtistRef, AudioFeaturesObject,
        Followers, Image, PlayHistoryItem, TableRecord, TrackObject,
    },
};

fn play_item(track_id: &str, artist_id: &str, album_id: &str, played_at: &str) -> PlayHistoryItem {
    PlayHistoryItem {
        track: TrackObject {
            id: Some(track_id.to_string()),
            name: format!("track {}", track_id),
            popularity: Some(60),
            duration_ms: 180000,
            explicit: false,
            album: AlbumRef {
                id: Some(album_id.to_string()),
                name: format!("album {}", album_id),
                artists: vec![ArtistRef {
                    id: Some(artist_id.to_string()),
                    name: format!("artist {}", artist_id),
                }],
            },
        },
        played_at: played_at.to_string(),
    }
}

fn feature(id: &str) -> AudioFeaturesObject {
    AudioFeaturesObject {
        id: id.to_string(),
        danceability: 0.5,
        energy: 0.6,
        key: 7,
        loudness: -8.0,
        mode: 1,
        speechiness: 0.05,
        acousticness: 0.2,
        liveness: 0.1,
        valence: 0.4,
        tempo: 120.0,
        uri: format!("spotify:track:{}", id),
    }
}

fn artist_obj(id: &str, genres: &[&str], images: usize) -> ArtistObject {
    ArtistObject {
        id: Some(id.to_string()),
        name: format!("artist {}", id),
        popularity: 70,
        followers: Followers { total: 1000 },
        images: (0..images)
            .map(|i| Image {
                url: format!("https://img/{}/{}", id, i),
            })
            .collect(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

fn album_obj(id: &str, artist_id: &str) -> AlbumObject {
    AlbumObject {
        id: Some(id.to_string()),
        name: format!("album {}", id),
        popularity: 55,
        total_tracks: 12,
        images: vec![
            Image {
                url: format!("https://img/{}/large", id),
            },
            Image {
                url: format!("https://img/{}/medium", id),
            },
        ],
        release_date: "2020-03-06".to_string(),
        label: Some("Some Label".to_string()),
        artists: vec![ArtistRef {
            id: Some(artist_id.to_string()),
            name: format!("artist {}", artist_id),
        }],
    }
}

// --- extraction ---

#[test]
fn test_extract_play_events_flattens_fields() {
    let items = vec![play_item("t1", "ar1", "al1", "2021-06-01T15:30:00.000000Z")];

    let events = extract::extract_play_events(items).unwrap();
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert_eq!(event.track_id, "t1");
    assert_eq!(event.artist_id, "ar1");
    assert_eq!(event.album_id, "al1");
    assert_eq!(event.track_popularity, 60);
    assert_eq!(event.duration_ms, 180000);
    assert_eq!(event.played_at, "2021-06-01T15:30:00.000000Z");
}

#[test]
fn test_extract_play_events_missing_track_id_fails() {
    let mut item = play_item("t1", "ar1", "al1", "2021-06-01T15:30:00.000000Z");
    item.track.id = None;

    let err = extract::extract_play_events(vec![item]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MalformedRecord {
            entity: "play",
            field: "track.id"
        }
    ));
}

#[test]
fn test_extract_play_events_missing_artists_fails() {
    let mut item = play_item("t1", "ar1", "al1", "2021-06-01T15:30:00.000000Z");
    item.track.album.artists.clear();

    let err = extract::extract_play_events(vec![item]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MalformedRecord {
            entity: "play",
            field: "album.artists"
        }
    ));
}

#[test]
fn test_extract_play_events_missing_popularity_defaults_to_zero() {
    let mut item = play_item("t1", "ar1", "al1", "2021-06-01T15:30:00.000000Z");
    item.track.popularity = None;

    let events = extract::extract_play_events(vec![item]).unwrap();
    assert_eq!(events[0].track_popularity, 0);
}

#[test]
fn test_extract_artist_records_uses_second_image() {
    let records = extract::extract_artist_records(vec![artist_obj("ar1", &["rock"], 3)]).unwrap();
    assert_eq!(records[0].artist_image, "https://img/ar1/1");
}

#[test]
fn test_extract_artist_records_missing_image_is_empty() {
    let records = extract::extract_artist_records(vec![artist_obj("ar1", &["rock"], 0)]).unwrap();
    assert_eq!(records[0].artist_image, "");
}

#[test]
fn test_extract_artist_records_missing_id_fails() {
    let mut artist = artist_obj("ar1", &[], 0);
    artist.id = None;

    let err = extract::extract_artist_records(vec![artist]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MalformedRecord {
            entity: "artist",
            field: "id"
        }
    ));
}

#[test]
fn test_extract_album_rows_missing_label_is_empty() {
    let mut album = album_obj("al1", "ar1");
    album.label = None;

    let rows = extract::extract_album_rows(vec![album]).unwrap();
    assert_eq!(rows[0].album_label, "");
    assert_eq!(rows[0].album_image, "https://img/al1/medium");
}

#[test]
fn test_extract_album_rows_missing_artist_id_fails() {
    let mut album = album_obj("al1", "ar1");
    album.artists[0].id = None;

    let err = extract::extract_album_rows(vec![album]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MalformedRecord {
            entity: "album",
            field: "artists[0].id"
        }
    ));
}

#[test]
fn test_extract_audio_features_drops_nulls() {
    let features =
        extract::extract_audio_features(vec![Some(feature("t1")), None, Some(feature("t3"))]);

    let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t3"]);
}

// --- transforms ---

#[test]
fn test_parse_played_at_rejects_malformed_timestamp() {
    let err = transform::parse_played_at("yesterday at noon").unwrap_err();
    assert!(matches!(err, PipelineError::Timestamp { .. }));
}

#[test]
fn test_played_date_is_utc_calendar_date() {
    let played_at = transform::parse_played_at("2021-06-01T15:30:00.000000Z").unwrap();
    assert_eq!(
        transform::played_date(&played_at),
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
    );
}

#[test]
fn test_played_time_converts_to_central_daylight_time() {
    // June: US Central observes DST, UTC-5
    let played_at = transform::parse_played_at("2021-06-01T15:30:00.000000Z").unwrap();
    assert_eq!(
        transform::played_time_local(&played_at),
        NaiveTime::from_hms_opt(10, 30, 0).unwrap()
    );
}

#[test]
fn test_played_time_converts_to_central_standard_time() {
    // January: no DST, UTC-6
    let played_at = transform::parse_played_at("2021-01-15T15:30:00.000000Z").unwrap();
    assert_eq!(
        transform::played_time_local(&played_at),
        NaiveTime::from_hms_opt(9, 30, 0).unwrap()
    );
}

#[test]
fn test_played_date_stays_utc_when_local_day_differs() {
    // 03:30 UTC is 22:30 the previous evening in Chicago; the date column
    // keeps the UTC day while the time column is local.
    let played_at = transform::parse_played_at("2021-06-01T03:30:00.000000Z").unwrap();
    assert_eq!(
        transform::played_date(&played_at),
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
    );
    assert_eq!(
        transform::played_time_local(&played_at),
        NaiveTime::from_hms_opt(22, 30, 0).unwrap()
    );
}

#[test]
fn test_duration_seconds() {
    assert_eq!(transform::duration_seconds(180000), 180.0);
    assert_eq!(transform::duration_seconds(201500), 201.5);
}

#[test]
fn test_explode_genres_one_row_per_genre() {
    let record = ArtistRecord {
        artist_id: "ar1".to_string(),
        artist_name: "artist ar1".to_string(),
        artist_popularity: 70,
        artist_followers: 1000,
        artist_image: "img".to_string(),
        genres: vec!["rock".to_string(), "indie".to_string()],
    };

    let rows = transform::explode_genres(vec![record]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].artist_genre, "rock");
    assert_eq!(rows[1].artist_genre, "indie");
    // non-genre fields repeat on every row
    assert_eq!(rows[0].artist_id, rows[1].artist_id);
    assert_eq!(rows[0].artist_followers, rows[1].artist_followers);
}

#[test]
fn test_explode_genres_empty_list_yields_sentinel_row() {
    let record = ArtistRecord {
        artist_id: "ar1".to_string(),
        artist_name: "artist ar1".to_string(),
        artist_popularity: 70,
        artist_followers: 1000,
        artist_image: String::new(),
        genres: vec![],
    };

    let rows = transform::explode_genres(vec![record]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].artist_genre, transform::GENRE_SENTINEL);
}

#[test]
fn test_remove_duplicate_rows_keeps_first_occurrence() {
    let mut rows = extract::extract_album_rows(vec![
        album_obj("al1", "ar1"),
        album_obj("al2", "ar1"),
        album_obj("al1", "ar1"),
    ])
    .unwrap();

    transform::remove_duplicate_rows(&mut rows);
    let ids: Vec<&str> = rows.iter().map(|r| r.album_id.as_str()).collect();
    assert_eq!(ids, vec!["al1", "al2"]);
}

// --- track assembly ---

#[test]
fn test_assemble_tracks_inner_join_on_track_id() {
    let events = extract::extract_play_events(vec![
        play_item("a", "ar1", "al1", "2021-06-01T15:30:00.000000Z"),
        play_item("b", "ar1", "al1", "2021-06-01T15:34:00.000000Z"),
        play_item("c", "ar2", "al2", "2021-06-01T15:38:00.000000Z"),
    ])
    .unwrap();
    let features = vec![feature("b"), feature("c"), feature("d")];

    let rows = assemble::assemble_tracks(&events, &features).unwrap();

    // only the intersection survives, in play order
    let ids: Vec<&str> = rows.iter().map(|r| r.track_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[test]
fn test_assemble_tracks_join_keyed_by_feature_id_not_position() {
    let events = extract::extract_play_events(vec![
        play_item("a", "ar1", "al1", "2021-06-01T15:30:00.000000Z"),
        play_item("b", "ar1", "al1", "2021-06-01T15:34:00.000000Z"),
    ])
    .unwrap();
    // features arrive in the reverse of play order
    let features = vec![feature("b"), feature("a")];

    let rows = assemble::assemble_tracks(&events, &features).unwrap();
    assert_eq!(rows[0].track_id, "a");
    assert_eq!(rows[0].uri, "spotify:track:a");
    assert_eq!(rows[1].track_id, "b");
    assert_eq!(rows[1].uri, "spotify:track:b");
}

#[test]
fn test_assemble_tracks_derived_columns() {
    let events = extract::extract_play_events(vec![play_item(
        "a",
        "ar1",
        "al1",
        "2021-06-01T15:30:00.000000Z",
    )])
    .unwrap();

    let rows = assemble::assemble_tracks(&events, &[feature("a")]).unwrap();
    let row = &rows[0];

    assert_eq!(row.track_duration, 180.0);
    assert_eq!(row.datetime_played, "2021-06-01T15:30:00.000000Z");
    assert_eq!(row.date_played, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
    assert_eq!(row.time_played, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
}

#[test]
fn test_assemble_tracks_drops_exact_duplicate_plays() {
    // The upstream endpoint occasionally reports the same listen twice
    let events = extract::extract_play_events(vec![
        play_item("a", "ar1", "al1", "2021-06-01T15:30:00.000000Z"),
        play_item("a", "ar1", "al1", "2021-06-01T15:30:00.000000Z"),
        play_item("a", "ar1", "al1", "2021-06-01T16:02:00.000000Z"),
    ])
    .unwrap();

    let rows = assemble::assemble_tracks(&events, &[feature("a")]).unwrap();

    // the re-listen at a different time is a distinct row
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_assemble_tracks_bad_timestamp_fails_batch() {
    let events =
        extract::extract_play_events(vec![play_item("a", "ar1", "al1", "not a timestamp")])
            .unwrap();

    let err = assemble::assemble_tracks(&events, &[feature("a")]).unwrap_err();
    assert!(matches!(err, PipelineError::Timestamp { .. }));
}

// --- reconciliation ---

fn track_rows(specs: &[(&str, &str)]) -> Vec<splaycli::types::TrackRow> {
    let items = specs
        .iter()
        .map(|(id, played_at)| play_item(id, "ar1", "al1", played_at))
        .collect();
    let events = extract::extract_play_events(items).unwrap();
    let features: Vec<AudioFeaturesObject> =
        specs.iter().map(|(id, _)| feature(id)).collect();
    assemble::assemble_tracks(&events, &features).unwrap()
}

#[test]
fn test_reconcile_reports_only_unseen_rows_as_new() {
    let existing = track_rows(&[
        ("a", "2021-06-01T15:30:00.000000Z"),
        ("b", "2021-06-01T15:34:00.000000Z"),
    ]);
    let fresh = track_rows(&[
        ("b", "2021-06-01T15:34:00.000000Z"),
        ("c", "2021-06-01T15:38:00.000000Z"),
    ]);

    let merged = reconcile::reconcile(&existing, &fresh);

    assert_eq!(merged.rows.len(), 3);
    assert_eq!(merged.new_rows.len(), 1);
    assert_eq!(merged.new_rows[0].track_id, "c");
}

#[test]
fn test_reconcile_same_track_new_listen_is_new_row() {
    let existing = track_rows(&[("a", "2021-06-01T15:30:00.000000Z")]);
    let fresh = track_rows(&[("a", "2021-06-01T18:05:00.000000Z")]);

    let merged = reconcile::reconcile(&existing, &fresh);
    assert_eq!(merged.rows.len(), 2);
    assert_eq!(merged.new_rows.len(), 1);
}

#[test]
fn test_reconcile_is_idempotent() {
    let existing = track_rows(&[("a", "2021-06-01T15:30:00.000000Z")]);
    let fresh = track_rows(&[
        ("a", "2021-06-01T15:30:00.000000Z"),
        ("b", "2021-06-01T15:34:00.000000Z"),
    ]);

    let first = reconcile::reconcile(&existing, &fresh);
    assert_eq!(first.new_rows.len(), 1);

    // applying the same fresh batch against the merged result adds nothing
    let second = reconcile::reconcile(&first.rows, &fresh);
    assert!(second.new_rows.is_empty());
    assert_eq!(second.rows.len(), first.rows.len());
}

#[test]
fn test_index_by_key_groups_exploded_rows() {
    let records = extract::extract_artist_records(vec![
        artist_obj("ar1", &["rock", "indie"], 0),
        artist_obj("ar2", &[], 0),
    ])
    .unwrap();
    let rows = transform::explode_genres(records);

    let index = reconcile::index_by_key(&rows);
    assert_eq!(index.len(), 2);
    assert_eq!(index["ar1"].len(), 2);
    assert_eq!(index["ar2"].len(), 1);
}

// --- end to end ---

#[test]
fn test_full_batch_produces_three_entities() {
    // three plays across two artists and two albums
    let events = extract::extract_play_events(vec![
        play_item("t1", "ar1", "al1", "2021-06-01T15:30:00.000000Z"),
        play_item("t2", "ar1", "al1", "2021-06-01T15:34:00.000000Z"),
        play_item("t3", "ar2", "al2", "2021-06-01T15:38:00.000000Z"),
    ])
    .unwrap();

    let tracks =
        assemble::assemble_tracks(&events, &[feature("t1"), feature("t2"), feature("t3")])
            .unwrap();
    assert_eq!(tracks.len(), 3);

    let artist_records =
        extract::extract_artist_records(vec![artist_obj("ar1", &["rock"], 2), artist_obj("ar2", &[], 2)])
            .unwrap();
    let mut artist_rows = transform::explode_genres(artist_records);
    transform::remove_duplicate_rows(&mut artist_rows);
    assert_eq!(reconcile::index_by_key(&artist_rows).len(), 2);

    let mut album_rows =
        extract::extract_album_rows(vec![album_obj("al1", "ar1"), album_obj("al2", "ar2")])
            .unwrap();
    transform::remove_duplicate_rows(&mut album_rows);
    assert_eq!(album_rows.len(), 2);

    // every entity renders the full column set
    assert_eq!(tracks[0].record().len(), splaycli::types::TrackRow::COLUMNS.len());
    assert_eq!(
        artist_rows[0].record().len(),
        splaycli::types::ArtistRow::COLUMNS.len()
    );
    assert_eq!(
        album_rows[0].record().len(),
        splaycli::types::AlbumRow::COLUMNS.len()
    );
}
