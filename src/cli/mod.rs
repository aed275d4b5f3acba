//! # CLI Module
//!
//! Command-line interface layer for splaycli, the Spotify play-history
//! extractor. Each command coordinates the underlying API, pipeline, store,
//! and output components and handles user feedback.
//!
//! ## Commands
//!
//! - [`auth`] - Spotify OAuth authentication flow with PKCE security
//! - [`run`] - One extraction batch: fetch recent plays, assemble the track,
//!   artist, and album entities, write CSV files and the SQLite tables
//! - [`tracks`] - Display the most recently stored track rows
//!
//! ## Data Flow of a Run
//!
//! ```text
//! CLI Layer (feedback, per-entity error isolation)
//!     ↓
//! Spotify Layer (batched fetches)
//!     ↓
//! Pipeline Layer (extract → assemble → transform → reconcile)
//!     ↓
//! Store/Output Layer (SQLite append/replace, CSV files)
//! ```
//!
//! ## Error Handling Philosophy
//!
//! Authentication problems end the run before any fetch. After that, each
//! entity kind assembles independently: an upstream failure aborts that
//! entity's output for the run (no partial table write, no misleading
//! zero-row CSV) and is reported, while the other entities still complete.
//! The run only exits non-zero when nothing could be produced at all.

mod auth;
mod run;
mod tracks;

pub use auth::auth;
pub use run::run;
pub use tracks::tracks;
