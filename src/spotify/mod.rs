//! # Spotify Module
//!
//! Spotify Web API client implementation: the OAuth 2.0 PKCE flow and the
//! four raw fetchers the pipeline is built on (recent plays, artists, albums,
//! audio features).
//!
//! ## Fetch discipline
//!
//! Every batched endpoint routes its id list through
//! [`crate::utils::batch_ids`] and issues one call per chunk, sequentially,
//! concatenating results in chunk order. Responses are decoded into the typed
//! shapes in [`crate::types`]; transport and HTTP failures surface as
//! [`crate::error::PipelineError`] instead of empty results, so a failed
//! fetch can never masquerade as "zero plays".
//!
//! 502 responses are retried after a 10 second pause; 401/403 are reported as
//! authentication failures pointing the user at `splaycli auth`.

pub mod albums;
pub mod artists;
pub mod auth;
pub mod features;
pub mod recent;
