//! Integration tests for the catalog façades and unified search.
//!
//! ```bash
//! cargo test --test search_facades
//! ```

use std::sync::Arc;

use serde_json::{json, Value};
use tomekeeper::core::catalog::domains::{MonsterCatalog, MonsterFilters};
use tomekeeper::core::gateway::{GatewayError, MemoryGateway};
use tomekeeper::core::search::{map_book_ids_to_sources, ContentType, SearchService};

fn backend() -> MemoryGateway {
    MemoryGateway::new()
        .with_response("initialize_spell_catalog", Value::Null)
        .with_response("initialize_item_catalog", Value::Null)
        .with_response("initialize_monster_catalog", Value::Null)
        .with_response(
            "search_spells",
            json!([{ "name": "Shield", "level": 1, "school": "A", "source": "PHB" }]),
        )
        .with_response(
            "search_items",
            json!([{ "name": "Potion of Healing", "source": "DMG", "rarity": "common" }]),
        )
        .with_response("search_monsters", json!([{ "name": "Owlbear", "source": "MM" }]))
}

#[test]
fn test_book_id_maps_to_source() {
    assert_eq!(map_book_ids_to_sources(&["phb-book-phb"]), vec!["PHB".to_string()]);
}

#[tokio::test]
async fn test_fan_out_survives_one_rejection() {
    let gateway = backend().with_failure("search_spells", "spell index corrupt");
    let service = SearchService::new(Arc::new(gateway));

    let results = service.search_all(ContentType::All, "o", &[]).await;

    assert!(results.spells.is_empty());
    assert_eq!(results.items.len(), 1);
    assert_eq!(results.monsters.len(), 1);
    assert_eq!(results.total(), 2);
}

#[tokio::test]
async fn test_stale_search_response_is_discarded() {
    let gateway = MemoryGateway::new()
        .with_response("initialize_monster_catalog", Value::Null)
        .with_async_handler("search_monsters", |args| async move {
            // The first query answers last.
            if args["query"] == "slow" {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                Ok(json!([{ "name": "Stale Result", "source": "MM" }]))
            } else {
                Ok::<_, GatewayError>(json!([{ "name": "Fresh Result", "source": "MM" }]))
            }
        });
    let catalog = Arc::new(MonsterCatalog::new(Arc::new(gateway)));
    catalog.initialize().await;

    let slow = {
        let catalog = Arc::clone(&catalog);
        tokio::spawn(async move {
            catalog
                .search(&MonsterFilters {
                    query: Some("slow".into()),
                    ..Default::default()
                })
                .await
        })
    };
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    catalog
        .search(&MonsterFilters {
            query: Some("fast".into()),
            ..Default::default()
        })
        .await;
    slow.await.unwrap();

    let held = catalog.results().await;
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].name, "Fresh Result");
}
