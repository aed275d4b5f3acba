use tabled::Table;

use crate::{config, error, store, types::TrackTableRow, warning};

/// Displays the most recently stored track rows, newest listen first.
pub async fn tracks(limit: i64) {
    let pool = match store::init_db(&config::database_url()).await {
        Ok(pool) => pool,
        Err(e) => error!("Cannot open table store: {}", e),
    };

    let rows = match store::recent_tracks(&pool, limit).await {
        Ok(rows) => rows,
        Err(e) => error!("Cannot read tracks table: {}", e),
    };

    if rows.is_empty() {
        warning!("No stored tracks yet. Run splaycli run first.");
        return;
    }

    let table_rows: Vec<TrackTableRow> = rows
        .into_iter()
        .map(|t| TrackTableRow {
            played: t.datetime_played,
            name: t.track_name,
            artist: t.artist_name,
        })
        .collect();

    let table = Table::new(table_rows);
    println!("{}", table);
}
