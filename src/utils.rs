use std::collections::HashSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Splits an ordered id sequence into chunks of at most `chunk_size`.
///
/// Every batched Spotify endpoint caps the number of ids per call; all
/// fetchers route their id lists through this function instead of
/// special-casing one, two, or three batches by hand. Chunks cover the input
/// in original order with no overlap and no gaps; the final chunk may be
/// shorter. An empty input yields no chunks.
///
/// # Panics
///
/// Panics if `chunk_size` is zero.
///
/// # Example
///
/// ```
/// let ids: Vec<String> = (0..45).map(|i| i.to_string()).collect();
/// let chunks: Vec<_> = batch_ids(&ids, 20).collect();
/// assert_eq!(chunks.len(), 3);
/// ```
pub fn batch_ids<T>(ids: &[T], chunk_size: usize) -> impl Iterator<Item = &[T]> {
    assert!(chunk_size > 0, "chunk size must be positive");
    ids.chunks(chunk_size)
}

/// De-duplicates an id list while keeping first-seen order.
///
/// Used to fan out from play events to the distinct artist and album ids of
/// the current batch. Order is preserved so chunked fetch responses can be
/// paired back deterministically.
pub fn distinct_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Escapes a single CSV field: quotes it when it contains a delimiter,
/// quote, or newline, doubling embedded quotes.
pub fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Joins a record into one CSV line.
pub fn csv_line(record: &[String]) -> String {
    record
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}
