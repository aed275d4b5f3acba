use splaycli::utils::*;

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("id{}", i)).collect()
}

#[test]
fn test_batch_ids_reconstructs_input() {
    for len in [0, 1, 19, 20, 21, 40, 45, 100] {
        let input = ids(len);
        let chunks: Vec<&[String]> = batch_ids(&input, 20).collect();

        // Concatenating the chunks in order yields the original sequence
        let rebuilt: Vec<String> = chunks.iter().flat_map(|c| c.iter().cloned()).collect();
        assert_eq!(rebuilt, input);
    }
}

#[test]
fn test_batch_ids_chunk_lengths() {
    let input = ids(45);
    let chunks: Vec<&[String]> = batch_ids(&input, 20).collect();

    // Every chunk except possibly the last has exactly the chunk size
    for chunk in &chunks[..chunks.len() - 1] {
        assert_eq!(chunk.len(), 20);
    }
    assert_eq!(chunks.last().unwrap().len(), 5);
}

#[test]
fn test_batch_ids_chunk_count() {
    // chunk count = ceil(len / size)
    assert_eq!(batch_ids(&ids(0), 20).count(), 0);
    assert_eq!(batch_ids(&ids(1), 20).count(), 1);
    assert_eq!(batch_ids(&ids(20), 20).count(), 1);
    assert_eq!(batch_ids(&ids(21), 20).count(), 2);
    assert_eq!(batch_ids(&ids(40), 20).count(), 2);
    assert_eq!(batch_ids(&ids(41), 20).count(), 3);
}

#[test]
#[should_panic]
fn test_batch_ids_zero_chunk_size_panics() {
    let input = ids(3);
    let _ = batch_ids(&input, 0).count();
}

#[test]
fn test_distinct_ids_preserves_first_seen_order() {
    let input = vec![
        "b".to_string(),
        "a".to_string(),
        "b".to_string(),
        "c".to_string(),
        "a".to_string(),
    ];

    let distinct = distinct_ids(&input);
    assert_eq!(distinct, vec!["b", "a", "c"]);
}

#[test]
fn test_distinct_ids_empty() {
    assert!(distinct_ids(&[]).is_empty());
}

#[test]
fn test_csv_field_plain_value_unquoted() {
    assert_eq!(csv_field("plain"), "plain");
    assert_eq!(csv_field(""), "");
}

#[test]
fn test_csv_field_escapes_delimiters_and_quotes() {
    assert_eq!(csv_field("a,b"), "\"a,b\"");
    assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
}

#[test]
fn test_csv_line_joins_fields() {
    let record = vec![
        "id1".to_string(),
        "Name, The".to_string(),
        "42".to_string(),
    ];
    assert_eq!(csv_line(&record), "id1,\"Name, The\",42");
}

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    // Should be deterministic - same input produces same output
    assert_eq!(challenge, generate_code_challenge(verifier));

    // Different input should produce different output
    assert_ne!(challenge, generate_code_challenge("different_verifier"));

    // Should be base64-encoded (URL-safe, no padding)
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}
