use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::{
    error::{PipelineError, PipelineResult},
    types::{ArtistRecord, ArtistRow, TableRecord},
};

/// Fixed target timezone for the derived `time_played` column.
pub const TARGET_TZ: Tz = chrono_tz::America::Chicago;

/// Genre value for artists Spotify reports no genres for, so the exploded
/// table still carries exactly one row per genreless artist.
pub const GENRE_SENTINEL: &str = "Null";

/// Upstream played-at wire format: ISO-8601 with fractional seconds, UTC.
const PLAYED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Parses an upstream played-at timestamp into a UTC instant.
pub fn parse_played_at(value: &str) -> PipelineResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, PLAYED_AT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| PipelineError::Timestamp {
            value: value.to_string(),
            source,
        })
}

/// Calendar date of the play in the source timezone (UTC).
pub fn played_date(played_at: &DateTime<Utc>) -> NaiveDate {
    played_at.date_naive()
}

/// Wall-clock time of the play converted to [`TARGET_TZ`], DST included.
pub fn played_time_local(played_at: &DateTime<Utc>) -> NaiveTime {
    played_at.with_timezone(&TARGET_TZ).time()
}

/// Milliseconds to seconds.
pub fn duration_seconds(duration_ms: i64) -> f64 {
    duration_ms as f64 / 1000.0
}

/// Removes exact-duplicate rows, comparing the whole row rather than just
/// the natural key, keeping first occurrences in order.
pub fn remove_duplicate_rows<T: TableRecord>(rows: &mut Vec<T>) {
    let mut seen = HashSet::new();
    rows.retain(|row| seen.insert(row.record().join("\u{1f}")));
}

/// Explodes each artist's genre list into one row per (artist, genre) pair.
///
/// All non-genre fields are repeated on every row; an artist with zero
/// genres yields exactly one row carrying [`GENRE_SENTINEL`]. `artist_id` is
/// only a grouping key in the exploded form.
pub fn explode_genres(records: Vec<ArtistRecord>) -> Vec<ArtistRow> {
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        let genres = if record.genres.is_empty() {
            vec![GENRE_SENTINEL.to_string()]
        } else {
            record.genres.clone()
        };

        for genre in genres {
            rows.push(ArtistRow {
                artist_id: record.artist_id.clone(),
                artist_name: record.artist_name.clone(),
                artist_popularity: record.artist_popularity,
                artist_followers: record.artist_followers,
                artist_image: record.artist_image.clone(),
                artist_genre: genre,
            });
        }
    }

    rows
}
