use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    config,
    error::{PipelineError, PipelineResult},
    management::TokenManager,
    types::{PlayHistoryItem, RecentlyPlayedResponse},
};

/// Upstream cap on the recently-played endpoint.
pub const RECENT_PLAYS_LIMIT: u32 = 50;

const ENDPOINT: &str = "recently-played";

/// Retrieves the most recent play events for the authenticated user.
///
/// Fetches up to [`RECENT_PLAYS_LIMIT`] play records from the Spotify
/// recently-played endpoint. The source caps this endpoint at 50 items and
/// offers no deeper history, so one call covers the whole batch.
///
/// # Arguments
///
/// * `token_mgr` - Token manager supplying (and refreshing) the access token
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<PlayHistoryItem>)` - Raw play records, newest first
/// - `Err(PipelineError)` - Authentication or upstream failure
///
/// # Retry Logic
///
/// 502 Bad Gateway responses are retried automatically with a 10-second
/// delay. Other errors are propagated immediately; an empty item list is
/// returned only when the API genuinely reports zero plays.
pub async fn get_recently_played(
    token_mgr: &mut TokenManager,
) -> PipelineResult<Vec<PlayHistoryItem>> {
    loop {
        let token = token_mgr.get_valid_token().await;
        let api_url = format!(
            "{uri}/me/player/recently-played?limit={limit}",
            uri = &config::spotify_apiurl(),
            limit = RECENT_PLAYS_LIMIT
        );

        let client = Client::new();
        let response = client.get(&api_url).bearer_auth(token).send().await;

        let response = match response {
            Ok(resp) => match resp.error_for_status() {
                Ok(valid_response) => valid_response,
                Err(err) => {
                    if let Some(status) = err.status() {
                        if status == StatusCode::BAD_GATEWAY {
                            sleep(Duration::from_secs(10)).await;
                            continue; // retry
                        }
                    }
                    return Err(PipelineError::from_response(ENDPOINT, err));
                }
            },
            Err(err) => {
                return Err(PipelineError::from_response(ENDPOINT, err));
            } // network or reqwest error
        };

        let res = response
            .json::<RecentlyPlayedResponse>()
            .await
            .map_err(|e| PipelineError::from_response(ENDPOINT, e))?;

        return Ok(res.items);
    }
}
