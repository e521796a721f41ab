//! Module and session services sharing one backend.

use std::sync::Arc;

use serde_json::json;

use crate::core::campaign::{ModuleService, SessionService};
use crate::core::gateway::{MemoryGateway, SharedGateway};

fn module(status: &str, session_count: u32) -> serde_json::Value {
    json!({
        "id": 4,
        "name": "The Sunken Keep",
        "campaign_id": 1,
        "status": status,
        "session_count": session_count
    })
}

#[tokio::test]
async fn test_completing_session_refreshes_cached_module() {
    let gateway = MemoryGateway::new()
        .with_response("get_module", json!({ "data": module("active", 0) }))
        .with_response(
            "list_module_sessions",
            json!({ "data": [{ "id": 10, "module_id": 4, "status": "active" }] }),
        )
        .with_response(
            "transition_session",
            json!({ "data": { "id": 10, "module_id": 4, "status": "completed" } }),
        )
        .with_response("increment_module_sessions", json!({ "success": true }));
    let shared: SharedGateway = Arc::new(gateway.clone());

    let modules = Arc::new(ModuleService::new(Arc::clone(&shared)));
    let sessions = SessionService::new(shared, 4).with_module_service(Arc::clone(&modules));

    assert_eq!(modules.get(4).await.unwrap().session_count, 0);
    sessions.load().await;
    sessions.transition(10, "completed").await.unwrap();

    gateway.register("get_module", |_| async { Ok(json!({ "data": module("active", 1) })) });
    assert_eq!(modules.get(4).await.unwrap().session_count, 1);
    assert_eq!(gateway.call_count("get_module"), 2);
    assert_eq!(
        gateway.last_args("increment_module_sessions"),
        Some(json!({ "moduleId": 4 }))
    );
}

#[tokio::test]
async fn test_module_sessions_listing_matches_session_service() {
    let gateway = MemoryGateway::new().with_response(
        "list_module_sessions",
        json!({ "data": [
            { "id": 1, "module_id": 4, "status": "completed", "session_number": 1 },
            { "id": 2, "module_id": 4, "status": "planned" }
        ] }),
    );
    let shared: SharedGateway = Arc::new(gateway);

    let listed = ModuleService::new(Arc::clone(&shared)).list_sessions(4).await.unwrap();
    let sessions = SessionService::new(shared, 4);
    sessions.load().await;

    let held = sessions.sessions().await;
    assert_eq!(listed.len(), held.len());
    assert_eq!(held[1].session_number, 2);
    assert_eq!(listed[1].session_number, 2);
}
