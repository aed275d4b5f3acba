use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    config,
    error::{PipelineError, PipelineResult},
    management::TokenManager,
    types::{AudioFeaturesObject, AudioFeaturesResponse},
    utils,
};

/// Upstream cap on ids per call to the audio-features endpoint.
pub const FEATURES_BATCH_LIMIT: usize = 100;

const ENDPOINT: &str = "audio-features";

/// Retrieves audio-feature records for a sequence of track ids.
///
/// Returns exactly one entry per requested id, in the same order as the
/// input sequence: the endpoint responds positionally and tracks without an
/// analysis come back as `null`, which is preserved as `None` here so the
/// track assembler can apply its inner-join semantics explicitly. No id is
/// silently dropped or reordered.
///
/// Recent plays cap at 50 ids, so this normally resolves to a single call,
/// but the id list still routes through [`utils::batch_ids`] like every
/// other batched fetch.
///
/// # Arguments
///
/// * `token_mgr` - Token manager supplying the access token
/// * `ids` - Track ids, typically the distinct ids of the current plays
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<Option<AudioFeaturesObject>>)` - Per-id entries in input order
/// - `Err(PipelineError)` - Authentication or upstream failure
pub async fn get_audio_features(
    token_mgr: &mut TokenManager,
    ids: &[String],
) -> PipelineResult<Vec<Option<AudioFeaturesObject>>> {
    let mut features: Vec<Option<AudioFeaturesObject>> = Vec::with_capacity(ids.len());

    for chunk in utils::batch_ids(ids, FEATURES_BATCH_LIMIT) {
        let api_url = format!(
            "{uri}/audio-features?ids={ids}",
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
                .json::<AudioFeaturesResponse>()
                .await
                .map_err(|e| PipelineError::from_response(ENDPOINT, e))?;

            features.extend(res.audio_features);
            break;
        }
    }

    Ok(features)
}
