//! SQLite table store for the three persisted entities.
//!
//! Uses SQLx with SQLite for lightweight, embedded storage. The pipeline
//! touches the store only at the edges of a run: reads feed reconciliation,
//! writes happen after all entities are assembled. Two write modes exist:
//!
//! - `append` for `tracks` (the play log accumulates history)
//! - `replace` for `artists` and `albums` (metadata snapshots)
//!
//! Natural-key columns are typed TEXT NOT NULL so ids never truncate or
//! collapse to NULL on the way in.

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::types::{AlbumRow, ArtistRow, TrackRow};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tracks (
        track_id TEXT NOT NULL,
        track_name TEXT NOT NULL,
        artist_id TEXT NOT NULL,
        artist_name TEXT NOT NULL,
        album_id TEXT NOT NULL,
        album_name TEXT NOT NULL,
        track_popularity INTEGER NOT NULL,
        track_duration REAL NOT NULL,
        datetime_played TEXT NOT NULL,
        explicit BOOLEAN NOT NULL,
        danceability REAL NOT NULL,
        energy REAL NOT NULL,
        song_key INTEGER NOT NULL,
        loudness REAL NOT NULL,
        mode INTEGER NOT NULL,
        speechiness REAL NOT NULL,
        acousticness REAL NOT NULL,
        liveness REAL NOT NULL,
        valence REAL NOT NULL,
        tempo REAL NOT NULL,
        uri TEXT NOT NULL,
        date_played DATE NOT NULL,
        time_played TIME NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS artists (
        artist_id TEXT NOT NULL,
        artist_name TEXT NOT NULL,
        artist_popularity INTEGER NOT NULL,
        artist_followers INTEGER NOT NULL,
        artist_image TEXT NOT NULL,
        artist_genre TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS albums (
        album_id TEXT NOT NULL,
        album_name TEXT NOT NULL,
        album_popularity INTEGER NOT NULL,
        album_tracks INTEGER NOT NULL,
        album_image TEXT NOT NULL,
        album_release_date TEXT NOT NULL,
        album_label TEXT NOT NULL,
        album_artist_id TEXT NOT NULL,
        album_artist_name TEXT NOT NULL
    )",
];

/// Initialize the database connection pool and create the entity tables.
///
/// Creates the database file if it doesn't exist and establishes a small
/// connection pool.
///
/// # Arguments
///
/// * `db_url` - SQLite connection URL (e.g., "sqlite:splaycli.db")
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    for stmt in SCHEMA {
        sqlx::query(stmt).execute(&pool).await?;
    }

    Ok(pool)
}

/// Appends track rows without touching prior contents.
///
/// The caller is expected to pass only reconciled new rows; the table itself
/// carries no uniqueness constraint because one track can legitimately
/// appear once per listen.
pub async fn append_tracks(pool: &SqlitePool, rows: &[TrackRow]) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    for row in rows {
        sqlx::query(
            "INSERT INTO tracks (
                track_id, track_name, artist_id, artist_name, album_id, album_name,
                track_popularity, track_duration, datetime_played, explicit,
                danceability, energy, song_key, loudness, mode, speechiness,
                acousticness, liveness, valence, tempo, uri, date_played, time_played
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.track_id)
        .bind(&row.track_name)
        .bind(&row.artist_id)
        .bind(&row.artist_name)
        .bind(&row.album_id)
        .bind(&row.album_name)
        .bind(row.track_popularity)
        .bind(row.track_duration)
        .bind(&row.datetime_played)
        .bind(row.explicit)
        .bind(row.danceability)
        .bind(row.energy)
        .bind(row.song_key)
        .bind(row.loudness)
        .bind(row.mode)
        .bind(row.speechiness)
        .bind(row.acousticness)
        .bind(row.liveness)
        .bind(row.valence)
        .bind(row.tempo)
        .bind(&row.uri)
        .bind(row.date_played)
        .bind(row.time_played)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Replaces the artists table with the current run's snapshot.
pub async fn replace_artists(pool: &SqlitePool, rows: &[ArtistRow]) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM artists").execute(&mut *tx).await?;
    for row in rows {
        sqlx::query(
            "INSERT INTO artists (
                artist_id, artist_name, artist_popularity, artist_followers,
                artist_image, artist_genre
            ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.artist_id)
        .bind(&row.artist_name)
        .bind(row.artist_popularity)
        .bind(row.artist_followers)
        .bind(&row.artist_image)
        .bind(&row.artist_genre)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Replaces the albums table with the current run's snapshot.
pub async fn replace_albums(pool: &SqlitePool, rows: &[AlbumRow]) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM albums").execute(&mut *tx).await?;
    for row in rows {
        sqlx::query(
            "INSERT INTO albums (
                album_id, album_name, album_popularity, album_tracks, album_image,
                album_release_date, album_label, album_artist_id, album_artist_name
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.album_id)
        .bind(&row.album_name)
        .bind(row.album_popularity)
        .bind(row.album_tracks)
        .bind(&row.album_image)
        .bind(&row.album_release_date)
        .bind(&row.album_label)
        .bind(&row.album_artist_id)
        .bind(&row.album_artist_name)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Reads the full tracks table for reconciliation.
pub async fn read_tracks(pool: &SqlitePool) -> sqlx::Result<Vec<TrackRow>> {
    sqlx::query_as::<_, TrackRow>("SELECT * FROM tracks")
        .fetch_all(pool)
        .await
}

/// Reads the full artists table.
pub async fn read_artists(pool: &SqlitePool) -> sqlx::Result<Vec<ArtistRow>> {
    sqlx::query_as::<_, ArtistRow>("SELECT * FROM artists")
        .fetch_all(pool)
        .await
}

/// Reads the full albums table.
pub async fn read_albums(pool: &SqlitePool) -> sqlx::Result<Vec<AlbumRow>> {
    sqlx::query_as::<_, AlbumRow>("SELECT * FROM albums")
        .fetch_all(pool)
        .await
}

/// Reads the most recent track rows for display, newest listen first.
pub async fn recent_tracks(pool: &SqlitePool, limit: i64) -> sqlx::Result<Vec<TrackRow>> {
    sqlx::query_as::<_, TrackRow>(
        "SELECT * FROM tracks ORDER BY datetime_played DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
