//! Integration tests for board configuration and stage completion.
//!
//! Drives the public board API through the in-memory gateway.
//!
//! ```bash
//! cargo test --test board_completion
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use tomekeeper::core::boards::{calculate_stage_completion, BoardConfig, BoardError, BoardService};
use tomekeeper::core::gateway::{ApiResponse, MemoryGateway};

fn stage_with(required: &[&str]) -> BoardConfig {
    BoardConfig::from_json(json!({
        "boardType": "campaign",
        "stages": [{
            "key": "s",
            "displayName": "S",
            "requiredDocuments": required,
            "optionalDocuments": []
        }]
    }))
    .unwrap()
}

#[test]
fn test_half_complete_stage() {
    let config = stage_with(&["a", "b"]);
    let done: HashSet<String> = ["a".to_string()].into_iter().collect();

    let status = calculate_stage_completion(config.stage("s").unwrap(), &done);

    assert_eq!(status.completed, 1);
    assert_eq!(status.total, 2);
    assert_eq!(status.percentage, 50);
    assert!(!status.is_complete);
    assert_eq!(status.missing_documents, vec!["b".to_string()]);
}

#[test]
fn test_completion_serializes_in_client_casing() {
    let config = stage_with(&["a"]);
    let done: HashSet<&str> = ["a"].into_iter().collect();
    let status = calculate_stage_completion(config.stage("s").unwrap(), &done);

    let value = serde_json::to_value(&status).unwrap();
    assert_eq!(value["isComplete"], true);
    assert_eq!(value["missingDocuments"], json!([]));
    assert_eq!(value["percentage"], 100);
}

#[tokio::test]
async fn test_missing_board_is_not_found() {
    let gateway = MemoryGateway::new().with_response(
        "get_board_configuration",
        serde_json::to_value(ApiResponse::<()> {
            success: true,
            data: None,
            message: None,
        })
        .unwrap(),
    );
    let boards = BoardService::new(Arc::new(gateway));

    let err = boards.fetch_board_config("guild").await.unwrap_err();
    assert!(matches!(err, BoardError::NotFound(ref board) if board == "guild"));
    assert!(boards.get_board_config("guild").is_none());
}

#[tokio::test]
async fn test_rejected_fetch_is_reported() {
    let gateway = MemoryGateway::new().with_response(
        "get_board_configuration",
        serde_json::to_value(ApiResponse::<()>::error("unknown board type")).unwrap(),
    );
    let boards = BoardService::new(Arc::new(gateway));

    let err = boards.fetch_board_config("guild").await.unwrap_err();
    assert!(err.to_string().contains("unknown board type"));
}
