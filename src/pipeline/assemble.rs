use std::collections::HashMap;

use crate::{
    error::PipelineResult,
    pipeline::transform,
    types::{AudioFeaturesObject, PlayEvent, TrackRow},
};

/// Inner-joins play events with audio-feature records on `track_id` and
/// applies the track-specific derived transforms.
///
/// Events without a matching feature record and feature records without a
/// matching event are dropped, deliberately: a track without audio features
/// is not actionable for analysis. The join is keyed by the id embedded in
/// each feature record, never by response position.
///
/// The artist and album entities need no assembler: their extractors already
/// produce one keyed row per fetched record, so there is no second source to
/// join against.
///
/// # Returns
///
/// De-duplicated track rows in play order. Fails only when a played-at
/// timestamp does not match the upstream wire format.
pub fn assemble_tracks(
    events: &[PlayEvent],
    features: &[AudioFeaturesObject],
) -> PipelineResult<Vec<TrackRow>> {
    let features_by_id: HashMap<&str, &AudioFeaturesObject> =
        features.iter().map(|f| (f.id.as_str(), f)).collect();

    let mut rows = Vec::with_capacity(events.len());

    for event in events {
        // inner join semantics
        let Some(feature) = features_by_id.get(event.track_id.as_str()) else {
            continue;
        };

        let played_at = transform::parse_played_at(&event.played_at)?;

        rows.push(TrackRow {
            track_id: event.track_id.clone(),
            track_name: event.track_name.clone(),
            artist_id: event.artist_id.clone(),
            artist_name: event.artist_name.clone(),
            album_id: event.album_id.clone(),
            album_name: event.album_name.clone(),
            track_popularity: event.track_popularity,
            track_duration: transform::duration_seconds(event.duration_ms),
            datetime_played: event.played_at.clone(),
            explicit: event.explicit,
            danceability: feature.danceability,
            energy: feature.energy,
            song_key: feature.key,
            loudness: feature.loudness,
            mode: feature.mode,
            speechiness: feature.speechiness,
            acousticness: feature.acousticness,
            liveness: feature.liveness,
            valence: feature.valence,
            tempo: feature.tempo,
            uri: feature.uri.clone(),
            date_played: transform::played_date(&played_at),
            time_played: transform::played_time_local(&played_at),
        });
    }

    transform::remove_duplicate_rows(&mut rows);
    Ok(rows)
}
