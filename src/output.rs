//! Timestamp-named CSV output, one delimited file per entity per run.
//!
//! Files land in the configured output directory as
//! `<entity> <MM-DD-YYYY>.csv` with the entity's column names as the header
//! row. A second run on the same day overwrites that day's file, which
//! mirrors the append/replace story of the table store closely enough for a
//! staging artifact.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::{
    error::PipelineResult,
    types::TableRecord,
    utils,
};

/// Writes one entity table as a CSV file into `dir`, creating the directory
/// if needed. Returns the path written.
pub async fn write_entity_csv<T: TableRecord>(dir: &Path, rows: &[T]) -> PipelineResult<PathBuf> {
    async_fs::create_dir_all(dir).await?;

    let path = dir.join(format!(
        "{table} {date}.csv",
        table = T::TABLE,
        date = Local::now().format("%m-%d-%Y")
    ));

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        T::COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(utils::csv_line(&row.record()));
    }
    lines.push(String::new()); // trailing newline

    async_fs::write(&path, lines.join("\n")).await?;
    Ok(path)
}
