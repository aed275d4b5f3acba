use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

// --- Spotify Web API response shapes ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    pub items: Vec<PlayHistoryItem>,
}

/// One listen as returned by the recently-played endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    pub track: TrackObject,
    pub played_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    pub popularity: Option<i64>,
    pub duration_ms: i64,
    pub explicit: bool,
    pub album: AlbumRef,
}

/// Album stub embedded in a track; carries the album artists the primary
/// artist is taken from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    pub artists: Vec<ArtistObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub popularity: i64,
    pub followers: Followers,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralAlbumsResponse {
    pub albums: Vec<AlbumObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub popularity: i64,
    pub total_tracks: i64,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: String,
    pub label: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    /// One entry per requested id, in request order. Spotify returns `null`
    /// for tracks without analysis; those drop out of the track join.
    pub audio_features: Vec<Option<AudioFeaturesObject>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesObject {
    pub id: String,
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub uri: String,
}

// --- Pipeline entities ---

/// Column layout shared by the CSV writer, the whole-row de-duplication in
/// reconciliation, and the table store.
pub trait TableRecord {
    /// Table name in the store and file-name prefix for CSV output.
    const TABLE: &'static str;
    /// Column names, header order.
    const COLUMNS: &'static [&'static str];
    /// Natural-key value for this row.
    fn key(&self) -> &str;
    /// All column values rendered as strings, in `COLUMNS` order.
    fn record(&self) -> Vec<String>;
}

/// One listen flattened out of the recently-played response. Ephemeral: raw
/// material for the track assembler, never persisted directly.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub track_id: String,
    pub track_name: String,
    pub artist_id: String,
    pub artist_name: String,
    pub album_id: String,
    pub album_name: String,
    pub track_popularity: i64,
    pub duration_ms: i64,
    pub played_at: String,
    pub explicit: bool,
}

/// Persisted track entity: play metadata joined with audio features plus the
/// derived date/time/duration columns.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TrackRow {
    pub track_id: String,
    pub track_name: String,
    pub artist_id: String,
    pub artist_name: String,
    pub album_id: String,
    pub album_name: String,
    pub track_popularity: i64,
    /// Seconds, converted from the upstream milliseconds.
    pub track_duration: f64,
    /// Raw upstream timestamp, ISO-8601 with fractional seconds in UTC.
    pub datetime_played: String,
    pub explicit: bool,
    pub danceability: f64,
    pub energy: f64,
    pub song_key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub uri: String,
    pub date_played: NaiveDate,
    /// Wall-clock time converted to the fixed target timezone (US Central).
    pub time_played: NaiveTime,
}

/// Fetched artist metadata before genre explosion; `genres` may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub artist_name: String,
    pub artist_popularity: i64,
    pub artist_followers: i64,
    pub artist_image: String,
    pub genres: Vec<String>,
}

/// Persisted artist entity, one row per (artist, genre) pair. `artist_id` is
/// a grouping key here, not a unique row key.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ArtistRow {
    pub artist_id: String,
    pub artist_name: String,
    pub artist_popularity: i64,
    pub artist_followers: i64,
    pub artist_image: String,
    pub artist_genre: String,
}

/// Persisted album entity, keyed by `album_id`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AlbumRow {
    pub album_id: String,
    pub album_name: String,
    pub album_popularity: i64,
    pub album_tracks: i64,
    pub album_image: String,
    pub album_release_date: String,
    pub album_label: String,
    pub album_artist_id: String,
    pub album_artist_name: String,
}

impl TableRecord for TrackRow {
    const TABLE: &'static str = "tracks";
    const COLUMNS: &'static [&'static str] = &[
        "track_id",
        "track_name",
        "artist_id",
        "artist_name",
        "album_id",
        "album_name",
        "track_popularity",
        "track_duration",
        "datetime_played",
        "explicit",
        "danceability",
        "energy",
        "song_key",
        "loudness",
        "mode",
        "speechiness",
        "acousticness",
        "liveness",
        "valence",
        "tempo",
        "uri",
        "date_played",
        "time_played",
    ];

    fn key(&self) -> &str {
        &self.track_id
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.track_id.clone(),
            self.track_name.clone(),
            self.artist_id.clone(),
            self.artist_name.clone(),
            self.album_id.clone(),
            self.album_name.clone(),
            self.track_popularity.to_string(),
            self.track_duration.to_string(),
            self.datetime_played.clone(),
            self.explicit.to_string(),
            self.danceability.to_string(),
            self.energy.to_string(),
            self.song_key.to_string(),
            self.loudness.to_string(),
            self.mode.to_string(),
            self.speechiness.to_string(),
            self.acousticness.to_string(),
            self.liveness.to_string(),
            self.valence.to_string(),
            self.tempo.to_string(),
            self.uri.clone(),
            self.date_played.to_string(),
            self.time_played.to_string(),
        ]
    }
}

impl TableRecord for ArtistRow {
    const TABLE: &'static str = "artists";
    const COLUMNS: &'static [&'static str] = &[
        "artist_id",
        "artist_name",
        "artist_popularity",
        "artist_followers",
        "artist_image",
        "artist_genre",
    ];

    fn key(&self) -> &str {
        &self.artist_id
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.artist_id.clone(),
            self.artist_name.clone(),
            self.artist_popularity.to_string(),
            self.artist_followers.to_string(),
            self.artist_image.clone(),
            self.artist_genre.clone(),
        ]
    }
}

impl TableRecord for AlbumRow {
    const TABLE: &'static str = "albums";
    const COLUMNS: &'static [&'static str] = &[
        "album_id",
        "album_name",
        "album_popularity",
        "album_tracks",
        "album_image",
        "album_release_date",
        "album_label",
        "album_artist_id",
        "album_artist_name",
    ];

    fn key(&self) -> &str {
        &self.album_id
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.album_id.clone(),
            self.album_name.clone(),
            self.album_popularity.to_string(),
            self.album_tracks.to_string(),
            self.album_image.clone(),
            self.album_release_date.clone(),
            self.album_label.clone(),
            self.album_artist_id.clone(),
            self.album_artist_name.clone(),
        ]
    }
}

/// Display row for `splaycli tracks`.
#[derive(Tabled)]
pub struct TrackTableRow {
    pub played: String,
    pub name: String,
    pub artist: String,
}
