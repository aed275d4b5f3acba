//! # API Module
//!
//! HTTP endpoints for the local callback server used during authentication.
//!
//! The extractor itself listens on nothing; this server only exists while
//! `splaycli auth` runs, to receive the OAuth 2.0 PKCE redirect from
//! Spotify's authorization service and complete the code-for-token exchange.
//!
//! ## Endpoints
//!
//! - [`callback`] - Handles the OAuth redirect and exchanges the
//!   authorization code for an access token
//! - [`health`] - Health check returning application status and version

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
