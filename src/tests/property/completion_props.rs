use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::json;

use crate::core::boards::{calculate_stage_completion, stage_documents, template_info, BoardConfig};

/// A board in the backend shape with the given stage keys and documents.
fn board(keys: &[String], required: &[String], optional: &[String]) -> BoardConfig {
    let stages: Vec<_> = keys
        .iter()
        .map(|key| {
            json!({
                "key": key,
                "display_name": key,
                "required_documents": required,
                "optional_documents": optional,
            })
        })
        .collect();
    BoardConfig::from_json(json!({ "board_type": "prop", "stages": stages }))
        .expect("generated board is well formed")
}

proptest! {
    #[test]
    fn prop_percentage_matches_ratio(
        required in proptest::collection::hash_set("[a-z_]{1,8}", 0..10),
        take in 0usize..10,
    ) {
        let required: Vec<String> = required.into_iter().collect();
        let done: HashSet<String> = required.iter().take(take).cloned().collect();
        let config = board(&["s".to_string()], &required, &[]);
        let stage = config.stage("s").unwrap();

        let status = calculate_stage_completion(stage, &done);
        if status.total == 0 {
            prop_assert_eq!(status.percentage, 0);
            prop_assert!(!status.is_complete);
        } else {
            let expected = (100.0 * status.completed as f64 / status.total as f64).round() as u32;
            prop_assert_eq!(status.percentage, expected);
            prop_assert_eq!(status.is_complete, status.completed == status.total);
        }
        prop_assert_eq!(status.completed, done.len());
    }

    #[test]
    fn prop_unrelated_completions_do_not_count(
        required in proptest::collection::hash_set("[a-m]{1,6}", 1..6),
        noise in proptest::collection::hash_set("[n-z]{1,6}", 0..6),
    ) {
        let required: Vec<String> = required.into_iter().collect();
        let config = board(&["s".to_string()], &required, &[]);
        let status = calculate_stage_completion(config.stage("s").unwrap(), &noise);

        prop_assert_eq!(status.completed, 0);
        prop_assert_eq!(status.missing_documents, required);
    }

    #[test]
    fn prop_next_stage_walks_array_order(keys in proptest::collection::hash_set("[a-z]{2,6}", 2..8)) {
        let keys: Vec<String> = keys.into_iter().collect();
        let config = board(&keys, &[], &[]);

        for (i, key) in keys.iter().enumerate() {
            prop_assert_eq!(config.next_stage(key), keys.get(i + 1).map(String::as_str));
        }
        prop_assert_eq!(config.next_stage("0-not-a-stage"), None);
    }

    #[test]
    fn prop_unknown_templates_get_fallback_metadata(
        ids in proptest::collection::vec("zz_[a-z]{1,8}", 1..5),
    ) {
        let config = board(&["s".to_string()], &ids, &[]);
        let docs = stage_documents(config.stage("s").unwrap());

        prop_assert_eq!(docs.len(), ids.len());
        for (doc, id) in docs.iter().zip(&ids) {
            prop_assert!(template_info(id).is_none());
            prop_assert_eq!(&doc.description, &format!("Document: {id}"));
            prop_assert!(!doc.title.is_empty());
        }
    }
}
