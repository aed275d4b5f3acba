//! Typed error taxonomy for the extraction pipeline.
//!
//! Every fallible pipeline stage reports through [`PipelineError`] so that a
//! failed fetch or a record with a missing natural key aborts that entity's
//! run visibly instead of flowing downstream as an empty table. Optional
//! fields (an image missing at the expected index, an empty genre list) are
//! never errors; the extractors substitute sentinel values for those.

use thiserror::Error;

/// Result alias used throughout the fetch/extract/assemble/store stages.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Errors that abort an entity's run.
///
/// `Auth` is fatal for the whole run: without a usable token no fetch can
/// succeed. The other variants abort only the entity kind they occur in; the
/// orchestrator keeps going with the remaining entities.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The credential is missing, expired beyond refresh, or rejected.
    #[error("authentication failed: {0}. Run splaycli auth")]
    Auth(String),

    /// A Spotify Web API call failed (transport error or HTTP error status).
    #[error("upstream call to {endpoint} failed: {source}")]
    Upstream {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// A fetched record is missing a natural-key field and cannot be keyed.
    #[error("malformed {entity} record: missing required field '{field}'")]
    MalformedRecord {
        entity: &'static str,
        field: &'static str,
    },

    /// A played-at timestamp did not match the expected wire format.
    #[error("cannot parse played-at timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// SQLite table store failure.
    #[error("table store error: {0}")]
    Store(#[from] sqlx::Error),

    /// CSV or cache file IO failure.
    #[error("file output error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Wraps a reqwest error for the given endpoint, classifying credential
    /// rejections as `Auth` so the user gets pointed at `splaycli auth`
    /// instead of a bare HTTP status.
    pub fn from_response(endpoint: &'static str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return PipelineError::Auth(format!("{endpoint} returned {status}"));
            }
        }
        PipelineError::Upstream { endpoint, source: err }
    }
}
