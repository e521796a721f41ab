//! Integration tests for rules text formatting.
//!
//! ```bash
//! cargo test --test formatting
//! ```

use serde_json::json;
use tomekeeper::core::catalog::domains::{Monster, MonsterSummary};
use tomekeeper::core::catalog::Entry;
use tomekeeper::core::formatters::{format_monster_details, process_formatting_tags, render_entries, Record};
use tomekeeper::core::gateway::MemoryGateway;

#[test]
fn test_dice_and_condition_tags() {
    let html = process_formatting_tags("Roll {@dice 2d6} and check {@condition prone}.");

    assert!(html.contains(r#"<span class="dice-roll">2d6</span>"#));
    assert!(html.contains(r#"<span class="condition">prone</span>"#));
    assert!(!html.contains("{@"));
}

#[test]
fn test_tag_free_text_passes_through() {
    let text = "The goblin hides behind a crate.";
    assert_eq!(process_formatting_tags(text), text);
    assert_eq!(process_formatting_tags(&process_formatting_tags(text)), text);
}

#[test]
fn test_entry_tree_renders_nested_sections() {
    let entries: Vec<Entry> = serde_json::from_value(json!([
        "You can try to {@b shove} a creature.",
        {
            "type": "entries",
            "name": "Grappling",
            "entries": [
                { "type": "list", "items": ["Escape with {@skill Athletics}", "Or {@skill Acrobatics}"] }
            ]
        }
    ]))
    .unwrap();

    let html = render_entries(&entries);
    assert!(html.starts_with("<p>You can try to <strong>shove</strong> a creature.</p>"));
    assert!(html.contains("<h4>Grappling</h4>"));
    assert_eq!(html.matches("<li>").count(), 2);
    assert!(!html.contains("{@"));
}

#[tokio::test]
async fn test_monster_summary_renders_without_backend() {
    let gateway = MemoryGateway::new();
    let summary: MonsterSummary = serde_json::from_value(json!({
        "name": "Owlbear", "source": "MM", "size": "L", "type": "monstrosity", "cr": "3"
    }))
    .unwrap();

    let html = format_monster_details(&Record::<MonsterSummary, Monster>::Summary(summary), &gateway).await;

    assert!(html.contains("Large monstrosity"));
    assert!(html.contains("Challenge 3"));
    assert!(gateway.calls().is_empty());
}
