//! Catalog façade behavior against a mocked gateway.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::core::catalog::domains::{SpellCatalog, SpellFilters};
use crate::core::catalog::Lookup;
use crate::core::formatters::{format_spell_details, Record};
use crate::core::gateway::GatewayError;
use crate::tests::common::spell_rows;
use crate::tests::mocks::{expect_command, expect_failure, MockGateway};

#[tokio::test]
async fn test_search_initializes_exactly_once() {
    let mut mock = MockGateway::new();
    expect_command(&mut mock, "initialize_spell_catalog", Value::Null, 1);
    expect_command(&mut mock, "search_spells", spell_rows(), 3);
    let catalog = SpellCatalog::new(Arc::new(mock));

    for _ in 0..3 {
        let rows = catalog.search(&SpellFilters::default()).await;
        assert_eq!(rows.len(), 3);
    }
    assert!(catalog.is_initialized().await);
}

#[tokio::test]
async fn test_failed_initialize_is_retried_on_next_search() {
    let mut mock = MockGateway::new();
    let mut attempts = 0;
    mock.expect_invoke()
        .withf(|c, _| c == "initialize_spell_catalog")
        .times(2)
        .returning(move |c, _| {
            attempts += 1;
            if attempts == 1 {
                Err(GatewayError::transport(c, "not ready"))
            } else {
                Ok(Value::Null)
            }
        });
    expect_command(&mut mock, "search_spells", json!([]), 2);
    let catalog = SpellCatalog::new(Arc::new(mock));

    catalog.search(&SpellFilters::default()).await;
    assert!(!catalog.is_initialized().await);
    catalog.search(&SpellFilters::default()).await;
    assert!(catalog.is_initialized().await);
}

#[tokio::test]
async fn test_search_failure_is_fail_soft() {
    let mut mock = MockGateway::new();
    expect_command(&mut mock, "initialize_spell_catalog", Value::Null, 1);
    expect_failure(&mut mock, "search_spells", "database locked");
    let catalog = SpellCatalog::new(Arc::new(mock));

    let rows = catalog.search(&SpellFilters::default()).await;
    assert!(rows.is_empty());
    assert!(catalog.results().await.is_empty());
    assert!(catalog.error().await.unwrap().contains("database locked"));
    assert!(!catalog.is_loading().await);
}

#[tokio::test]
async fn test_detail_lookup_distinguishes_missing_from_failed() {
    let mut mock = MockGateway::new();
    mock.expect_invoke()
        .withf(|c, args| c == "get_spell_details" && args["name"] == "Fireball")
        .returning(|_, _| {
            Ok(json!({
                "name": "Fireball", "source": "PHB", "level": 3, "school": "V",
                "time": [{ "number": 1, "unit": "action" }],
                "range": { "type": "point", "distance": { "type": "feet", "amount": 150 } },
                "components": { "v": true, "s": true, "m": "a tiny ball of bat guano and sulfur" },
                "duration": [{ "type": "instant" }],
                "entries": ["A bright streak flashes to a point you choose. Each creature makes a {@skill Dexterity} save."]
            }))
        });
    mock.expect_invoke()
        .withf(|c, args| c == "get_spell_details" && args["name"] == "Nope")
        .returning(|_, _| Ok(Value::Null));
    mock.expect_invoke()
        .withf(|c, args| c == "get_spell_details" && args["name"] == "Other")
        .returning(|c, _| Err(GatewayError::transport(c, "ipc closed")));
    let catalog = SpellCatalog::new(Arc::new(mock));

    let found = catalog.get_details("Fireball", "PHB").await;
    let Lookup::Found(spell) = found else {
        panic!("expected Fireball");
    };
    let html = format_spell_details(&Record::Detail(spell));
    assert!(html.contains("150 feet"));
    assert!(!html.contains("{@"));

    assert!(matches!(catalog.get_details("Nope", "PHB").await, Lookup::NotFound));
    let failed = catalog.get_details("Other", "PHB").await;
    assert!(matches!(failed, Lookup::Failed(ref message) if message.contains("ipc closed")));
    assert!(failed.into_option().is_none());
}
