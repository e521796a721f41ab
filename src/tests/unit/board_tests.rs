//! Board configuration through the service cache.

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::boards::{BoardService, DocumentCategory};
use crate::tests::common::scripted_gateway;

#[tokio::test]
async fn test_fetched_board_drives_pure_queries() {
    let gateway = scripted_gateway();
    let boards = BoardService::new(Arc::new(gateway.clone()));

    boards.fetch_board_config("campaign").await.unwrap();
    boards.fetch_board_config("campaign").await.unwrap();
    assert_eq!(gateway.call_count("get_board_configuration"), 1);

    assert_eq!(boards.get_next_stage("campaign", "concept").as_deref(), Some("session_zero"));
    assert_eq!(boards.get_next_stage("campaign", "active"), None);
    assert!(boards.can_transition("campaign", "concept", "session_zero"));
    assert!(!boards.can_transition("campaign", "integration", "concept"));
    assert!(!boards.can_transition("campaign", "concept", "active"));

    let docs = boards.get_stage_documents("campaign", "session_zero");
    let categories: Vec<DocumentCategory> = docs.iter().map(|d| d.category).collect();
    assert_eq!(
        categories,
        vec![
            DocumentCategory::Required,
            DocumentCategory::Required,
            DocumentCategory::Optional,
            DocumentCategory::Optional
        ]
    );
    assert_eq!(docs[0].title, "Starting Scenario");
}

#[tokio::test]
async fn test_two_of_three_required_documents() {
    let gateway = scripted_gateway();
    let boards = BoardService::new(Arc::new(gateway));
    boards.fetch_board_config("campaign").await.unwrap();

    let done: HashSet<&str> = ["starting_scenario"].into_iter().collect();
    let status = boards.stage_completion("campaign", "session_zero", &done).unwrap();
    assert_eq!(status.completed, 1);
    assert_eq!(status.total, 2);
    assert_eq!(status.percentage, 50);
    assert_eq!(status.missing_documents, vec!["world_primer"]);
}

#[tokio::test]
async fn test_uncached_board_reads_are_empty() {
    let boards = BoardService::new(Arc::new(scripted_gateway()));

    assert!(boards.get_board_config("module").is_none());
    assert!(boards.get_stage_documents("module", "planning").is_empty());
    assert!(!boards.can_transition("module", "planning", "active"));
}
