use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use indicatif::{ProgressBar, ProgressStyle};
use sqlx::sqlite::SqlitePool;

use crate::{
    config, error,
    error::PipelineResult,
    info,
    management::TokenManager,
    output,
    pipeline::{assemble, extract, reconcile, transform},
    spotify, store, success,
    types::{AlbumRow, ArtistRow, PlayEvent, TrackRow},
    utils, warning,
};

/// Executes one extraction batch run.
///
/// Reproduces the classic ETL narrative: fetch the recent plays, fan out to
/// the distinct artists and albums they reference, assemble the three entity
/// tables, then persist them. Tracks are appended (play log), artists and
/// albums are replaced (metadata snapshots).
///
/// Each entity kind is assembled independently so an upstream failure in one
/// does not discard the others; only a run where every entity failed exits
/// non-zero.
pub async fn run(skip_csv: bool, skip_db: bool, output_dir: Option<String>) {
    let started = Instant::now();

    let mut token_mgr = match TokenManager::load().await {
        Ok(manager) => manager,
        Err(e) => {
            error!(
                "Failed to load token. Please run splaycli auth\n Error: {}",
                e
            );
        }
    };

    let pool = if skip_db {
        None
    } else {
        match store::init_db(&config::database_url()).await {
            Ok(pool) => Some(pool),
            Err(e) => error!("Cannot open table store: {}", e),
        }
    };

    info!("Getting recent songs for {}...", config::spotify_user());
    let events = match fetch_play_events(&mut token_mgr).await {
        Ok(events) => events,
        Err(e) => error!("Cannot fetch recent plays: {}", e),
    };

    if events.is_empty() {
        success!("Zero plays reported upstream; nothing to do.");
        return;
    }
    info!("Retrieved {} songs", events.len());

    let track_ids =
        utils::distinct_ids(&events.iter().map(|e| e.track_id.clone()).collect::<Vec<_>>());
    let artist_ids =
        utils::distinct_ids(&events.iter().map(|e| e.artist_id.clone()).collect::<Vec<_>>());
    let album_ids =
        utils::distinct_ids(&events.iter().map(|e| e.album_id.clone()).collect::<Vec<_>>());
    info!(
        "Referencing {} artists and {} albums",
        artist_ids.len(),
        album_ids.len()
    );

    // Entities assemble independently; a failed one is reported and skipped.
    let tracks = match build_track_entity(&mut token_mgr, &events, &track_ids).await {
        Ok(rows) => {
            success!("Track entity created ({} rows)", rows.len());
            Some(rows)
        }
        Err(e) => {
            warning!("Track entity aborted: {}", e);
            None
        }
    };

    let artists = match build_artist_entity(&mut token_mgr, &artist_ids).await {
        Ok(rows) => {
            success!("Artist entity created ({} rows)", rows.len());
            Some(rows)
        }
        Err(e) => {
            warning!("Artist entity aborted: {}", e);
            None
        }
    };

    let albums = match build_album_entity(&mut token_mgr, &album_ids).await {
        Ok(rows) => {
            success!("Album entity created ({} rows)", rows.len());
            Some(rows)
        }
        Err(e) => {
            warning!("Album entity aborted: {}", e);
            None
        }
    };

    if tracks.is_none() && artists.is_none() && albums.is_none() {
        error!("All entities failed; nothing was written.");
    }

    let out_dir = output_dir
        .map(PathBuf::from)
        .unwrap_or_else(config::output_dir);

    if let Some(rows) = &tracks {
        persist_tracks(rows, pool.as_ref(), skip_csv, &out_dir).await;
    }
    if let Some(rows) = &artists {
        persist_artists(rows, pool.as_ref(), skip_csv, &out_dir).await;
    }
    if let Some(rows) = &albums {
        persist_albums(rows, pool.as_ref(), skip_csv, &out_dir).await;
    }

    let total_time = started.elapsed().as_secs_f64();
    success!(
        "Process took {} minutes and {:.2} seconds",
        (total_time / 60.0) as u64,
        total_time % 60.0
    );
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

async fn fetch_play_events(token_mgr: &mut TokenManager) -> PipelineResult<Vec<PlayEvent>> {
    let pb = spinner("Fetching recently played tracks...");
    let result = spotify::recent::get_recently_played(token_mgr).await;
    pb.finish_and_clear();

    extract::extract_play_events(result?)
}

async fn build_track_entity(
    token_mgr: &mut TokenManager,
    events: &[PlayEvent],
    track_ids: &[String],
) -> PipelineResult<Vec<TrackRow>> {
    let pb = spinner("Fetching audio features...");
    let result = spotify::features::get_audio_features(token_mgr, track_ids).await;
    pb.finish_and_clear();

    let features = extract::extract_audio_features(result?);
    assemble::assemble_tracks(events, &features)
}

async fn build_artist_entity(
    token_mgr: &mut TokenManager,
    artist_ids: &[String],
) -> PipelineResult<Vec<ArtistRow>> {
    let pb = spinner("Fetching artists...");
    let result = spotify::artists::get_several_artists(token_mgr, artist_ids).await;
    pb.finish_and_clear();

    let records = extract::extract_artist_records(result?)?;
    let mut rows = transform::explode_genres(records);
    transform::remove_duplicate_rows(&mut rows);
    Ok(rows)
}

async fn build_album_entity(
    token_mgr: &mut TokenManager,
    album_ids: &[String],
) -> PipelineResult<Vec<AlbumRow>> {
    let pb = spinner("Fetching albums...");
    let result = spotify::albums::get_several_albums(token_mgr, album_ids).await;
    pb.finish_and_clear();

    let mut rows = extract::extract_album_rows(result?)?;
    transform::remove_duplicate_rows(&mut rows);
    Ok(rows)
}

async fn persist_tracks(
    rows: &[TrackRow],
    pool: Option<&SqlitePool>,
    skip_csv: bool,
    out_dir: &Path,
) {
    if !skip_csv {
        match output::write_entity_csv(out_dir, rows).await {
            Ok(path) => info!("Wrote {}", path.display()),
            Err(e) => warning!("Cannot write tracks CSV: {}", e),
        }
    }

    let Some(pool) = pool else { return };

    let existing = match store::read_tracks(pool).await {
        Ok(rows) => rows,
        Err(e) => {
            warning!("Cannot read tracks table; append skipped: {}", e);
            return;
        }
    };

    let merged = reconcile::reconcile(&existing, rows);
    let track_count = reconcile::index_by_key(&merged.rows).len();

    match store::append_tracks(pool, &merged.new_rows).await {
        Ok(_) => success!(
            "Appended {} new track rows ({} rows across {} tracks total)",
            merged.new_rows.len(),
            merged.rows.len(),
            track_count
        ),
        Err(e) => warning!("Cannot append to tracks table: {}", e),
    }
}

async fn persist_artists(
    rows: &[ArtistRow],
    pool: Option<&SqlitePool>,
    skip_csv: bool,
    out_dir: &Path,
) {
    if !skip_csv {
        match output::write_entity_csv(out_dir, rows).await {
            Ok(path) => info!("Wrote {}", path.display()),
            Err(e) => warning!("Cannot write artists CSV: {}", e),
        }
    }

    let Some(pool) = pool else { return };

    let artist_count = reconcile::index_by_key(rows).len();
    match store::replace_artists(pool, rows).await {
        Ok(_) => success!(
            "Replaced artists table ({} rows across {} artists)",
            rows.len(),
            artist_count
        ),
        Err(e) => warning!("Cannot replace artists table: {}", e),
    }
}

async fn persist_albums(
    rows: &[AlbumRow],
    pool: Option<&SqlitePool>,
    skip_csv: bool,
    out_dir: &Path,
) {
    if !skip_csv {
        match output::write_entity_csv(out_dir, rows).await {
            Ok(path) => info!("Wrote {}", path.display()),
            Err(e) => warning!("Cannot write albums CSV: {}", e),
        }
    }

    let Some(pool) = pool else { return };

    match store::replace_albums(pool, rows).await {
        Ok(_) => success!("Replaced albums table ({} rows)", rows.len()),
        Err(e) => warning!("Cannot replace albums table: {}", e),
    }
}
