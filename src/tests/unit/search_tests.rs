//! Unified search flows.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::core::search::{Category, ContentType, SearchParams, SearchResults, SearchService, SearchSession};
use crate::tests::common::{scripted_gateway, spell_rows};

#[tokio::test]
async fn test_combined_search_isolates_failing_domain() {
    let gateway = scripted_gateway().with_failure("search_items", "items table missing");
    let service = SearchService::new(Arc::new(gateway.clone()));

    let results = service.search_all(ContentType::All, "", &[]).await;

    assert_eq!(results.spells.len(), 3);
    assert_eq!(results.monsters.len(), 2);
    assert!(results.items.is_empty());
    assert!(service.items().error().await.is_some());
    assert!(service.spells().error().await.is_none());
}

#[tokio::test]
async fn test_combined_search_magic_items_sends_rarity_preset() {
    let gateway = scripted_gateway();
    let service = SearchService::new(Arc::new(gateway.clone()));

    service
        .search_all(ContentType::MagicItems, "sword", &["DMG".to_string()])
        .await;

    let args = gateway.last_args("search_items").unwrap();
    assert_eq!(args["query"], "sword");
    assert_eq!(
        args["rarities"],
        serde_json::json!(["uncommon", "rare", "very rare", "legendary", "artifact"])
    );
    assert_eq!(gateway.call_count("search_spells"), 0);
}

#[tokio::test]
async fn test_magic_item_category_drops_mundane_gear() {
    let gateway = scripted_gateway();
    let service = SearchService::new(Arc::new(gateway));

    let results = service.search(Category::MagicItems, &SearchParams::default()).await;
    let SearchResults::Items(items) = results else {
        panic!("expected item results");
    };
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Bag of Holding", "Vorpal Sword"]);
}

#[tokio::test]
async fn test_repeated_category_searches_initialize_once() {
    let gateway = scripted_gateway();
    let service = SearchService::new(Arc::new(gateway.clone()));

    service.search(Category::Monsters, &SearchParams::default()).await;
    service.search(Category::Monsters, &SearchParams::default()).await;

    assert_eq!(gateway.call_count("initialize_monster_catalog"), 1);
    assert_eq!(gateway.call_count("search_monsters"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_debounced_search_during_slow_search_clears_loading() {
    let gateway = scripted_gateway().with_async_handler("search_spells", |_| async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(spell_rows())
    });
    let service = Arc::new(SearchService::new(Arc::new(gateway.clone())));
    let config = SearchConfig {
        debounce_ms: 20,
        ..SearchConfig::default()
    };
    let session = SearchSession::new(Arc::clone(&service), Category::Spells, Vec::new(), config);

    session.set_query("fire").await;
    session.debounced_search();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(service.spells().is_loading().await);

    // Second keystroke lands while the first search is waiting on the backend.
    session.set_query("fireball").await;
    session.debounced_search();
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(!service.spells().is_loading().await);
    assert_eq!(gateway.call_count("search_spells"), 2);
    assert_eq!(session.snapshot().await.query, "fireball");
    assert_eq!(session.result_count().await, 3);
}
