use crate::{
    error::{PipelineError, PipelineResult},
    types::{
        AlbumObject, AlbumRow, ArtistObject, ArtistRecord, AudioFeaturesObject, PlayEvent,
        PlayHistoryItem,
    },
};

/// Flattens raw play history items into [`PlayEvent`] rows.
///
/// A record missing its track id, album id, or primary artist id cannot be
/// keyed and fails the whole extraction; silently skipping it would let a
/// malformed batch pass through the downstream joins as a smaller table.
/// Missing popularity is metadata, not a key, and defaults to zero.
pub fn extract_play_events(items: Vec<PlayHistoryItem>) -> PipelineResult<Vec<PlayEvent>> {
    let mut events = Vec::with_capacity(items.len());

    for item in items {
        let track_id = item.track.id.ok_or(PipelineError::MalformedRecord {
            entity: "play",
            field: "track.id",
        })?;
        let album_id = item.track.album.id.clone().ok_or(PipelineError::MalformedRecord {
            entity: "play",
            field: "album.id",
        })?;
        // The primary artist is the first album artist, as reported at play
        // time.
        let artist = item
            .track
            .album
            .artists
            .first()
            .ok_or(PipelineError::MalformedRecord {
                entity: "play",
                field: "album.artists",
            })?;
        let artist_id = artist.id.clone().ok_or(PipelineError::MalformedRecord {
            entity: "play",
            field: "album.artists[0].id",
        })?;

        events.push(PlayEvent {
            track_id,
            track_name: item.track.name,
            artist_id,
            artist_name: artist.name.clone(),
            album_id,
            album_name: item.track.album.name,
            track_popularity: item.track.popularity.unwrap_or(0),
            duration_ms: item.track.duration_ms,
            played_at: item.played_at,
            explicit: item.track.explicit,
        });
    }

    Ok(events)
}

/// Flattens raw artist records into [`ArtistRecord`] rows, keyed by the id
/// embedded in each record rather than by response position.
///
/// The representative image is the mid-size one at index 1; an artist
/// without it gets an empty-string sentinel. An empty genre list is kept
/// empty here and becomes a single sentinel row at explosion time.
pub fn extract_artist_records(artists: Vec<ArtistObject>) -> PipelineResult<Vec<ArtistRecord>> {
    let mut records = Vec::with_capacity(artists.len());

    for artist in artists {
        let artist_id = artist.id.ok_or(PipelineError::MalformedRecord {
            entity: "artist",
            field: "id",
        })?;

        records.push(ArtistRecord {
            artist_id,
            artist_name: artist.name,
            artist_popularity: artist.popularity,
            artist_followers: artist.followers.total,
            artist_image: artist
                .images
                .get(1)
                .map(|i| i.url.clone())
                .unwrap_or_default(),
            genres: artist.genres,
        });
    }

    Ok(records)
}

/// Flattens raw album records into [`AlbumRow`] rows, keyed by embedded id.
///
/// Label and image are optional metadata and fall back to empty-string
/// sentinels; the album id and the primary artist id are natural keys and
/// their absence fails the batch.
pub fn extract_album_rows(albums: Vec<AlbumObject>) -> PipelineResult<Vec<AlbumRow>> {
    let mut rows = Vec::with_capacity(albums.len());

    for album in albums {
        let album_id = album.id.ok_or(PipelineError::MalformedRecord {
            entity: "album",
            field: "id",
        })?;
        let artist = album.artists.first().ok_or(PipelineError::MalformedRecord {
            entity: "album",
            field: "artists",
        })?;
        let album_artist_id = artist.id.clone().ok_or(PipelineError::MalformedRecord {
            entity: "album",
            field: "artists[0].id",
        })?;

        rows.push(AlbumRow {
            album_id,
            album_name: album.name,
            album_popularity: album.popularity,
            album_tracks: album.total_tracks,
            album_image: album
                .images
                .get(1)
                .map(|i| i.url.clone())
                .unwrap_or_default(),
            album_release_date: album.release_date,
            album_label: album.label.unwrap_or_default(),
            album_artist_id,
            album_artist_name: artist.name.clone(),
        });
    }

    Ok(rows)
}

/// Drops the `null` entries the audio-features endpoint returns for tracks
/// without an analysis. The matching play rows fall out of the track join
/// later; a track without audio features is not actionable for analysis.
pub fn extract_audio_features(
    features: Vec<Option<AudioFeaturesObject>>,
) -> Vec<AudioFeaturesObject> {
    features.into_iter().flatten().collect()
}
