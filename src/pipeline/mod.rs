//! # Pipeline Module
//!
//! The entity-assembly and incremental-upsert pipeline: the part of the
//! application with real data-shape concerns. Everything here is pure and
//! synchronous; network IO lives in [`crate::spotify`] and persistence in
//! [`crate::store`].
//!
//! Stages, in run order:
//!
//! - [`extract`] - flatten raw API records into keyed rows, substituting
//!   sentinels for missing optional fields and failing on missing natural
//!   keys
//! - [`assemble`] - inner-join play events with audio features into the
//!   track entity
//! - [`transform`] - derived columns (played date/time, duration seconds),
//!   exact-duplicate removal, genre explosion
//! - [`reconcile`] - merge fresh rows against previously stored rows so the
//!   track table accumulates history without duplication

pub mod assemble;
pub mod extract;
pub mod reconcile;
pub mod transform;
