use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    config,
    error::{PipelineError, PipelineResult},
    management::TokenManager,
    types::{AlbumObject, SeveralAlbumsResponse},
    utils,
};

/// Upstream cap on ids per call to the several-albums endpoint.
pub const ALBUM_BATCH_LIMIT: usize = 20;

const ENDPOINT: &str = "several-albums";

/// Retrieves full album records for a set of album ids.
///
/// The several-albums endpoint accepts at most [`ALBUM_BATCH_LIMIT`] ids per
/// call, so the id list is chunked via [`utils::batch_ids`] and fetched one
/// chunk at a time in order. The chunk count follows from the input length;
/// there are no special cases for two or three batches.
///
/// # Arguments
///
/// * `token_mgr` - Token manager supplying the access token
/// * `ids` - Distinct album ids referenced by the current batch of plays
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<AlbumObject>)` - One record per requested id, chunk order
/// - `Err(PipelineError)` - Authentication or upstream failure
///
/// # Retry Logic
///
/// 502 Bad Gateway responses are retried per chunk with a 10-second delay.
/// Any other failure aborts the whole fetch so the album entity is never
/// assembled from a partial id set.
pub async fn get_several_albums(
    token_mgr: &mut TokenManager,
    ids: &[String],
) -> PipelineResult<Vec<AlbumObject>> {
    let mut albums: Vec<AlbumObject> = Vec::with_capacity(ids.len());

    for chunk in utils::batch_ids(ids, ALBUM_BATCH_LIMIT) {
        let api_url = format!(
            "{uri}/albums?ids={ids}",
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
                .json::<SeveralAlbumsResponse>()
                .await
                .map_err(|e| PipelineError::from_response(ENDPOINT, e))?;

            albums.extend(res.albums);
            break;
        }
    }

    Ok(albums)
}
