use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    config,
    error::{PipelineError, PipelineResult},
    management::TokenManager,
    types::{ArtistObject, SeveralArtistsResponse},
    utils,
};

/// Ids per call to the several-artists endpoint. The API accepts up to 50;
/// 20 is used for consistency with the album batch cap.
pub const ARTIST_BATCH_LIMIT: usize = 20;

const ENDPOINT: &str = "several-artists";

/// Retrieves full artist records for a set of artist ids.
///
/// Chunks the id list via [`utils::batch_ids`] and issues one call per chunk,
/// sequentially, concatenating results in chunk order. The endpoint returns
/// records in request order within a chunk, but the assembler re-keys them by
/// id anyway, so order is a convenience rather than a contract.
///
/// # Arguments
///
/// * `token_mgr` - Token manager supplying the access token
/// * `ids` - Distinct artist ids referenced by the current batch of plays
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<ArtistObject>)` - One record per requested id
/// - `Err(PipelineError)` - Authentication or upstream failure
///
/// # Retry Logic
///
/// 502 Bad Gateway responses are retried per chunk with a 10-second delay.
/// Any other failure aborts the whole fetch; partial results are never
/// returned.
pub async fn get_several_artists(
    token_mgr: &mut TokenManager,
    ids: &[String],
) -> PipelineResult<Vec<ArtistObject>> {
    let mut artists: Vec<ArtistObject> = Vec::with_capacity(ids.len());

    for chunk in utils::batch_ids(ids, ARTIST_BATCH_LIMIT) {
        let api_url = format!(
            "{uri}/artists?ids={ids}",
            uri = &config::spotify_apiurl(),
            ids = chunk.join(",")
        );

        loop {
            let token = token_mgr.get_valid_token().await;
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
                .json::<SeveralArtistsResponse>()
                .await
                .map_err(|e| PipelineError::from_response(ENDPOINT, e))?;

            artists.extend(res.artists);
            break;
        }
    }

    Ok(artists)
}
