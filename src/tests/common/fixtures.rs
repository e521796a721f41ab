//! Backend payload fixtures.

use serde_json::{json, Value};

use crate::core::gateway::MemoryGateway;

pub fn spell_rows() -> Value {
    json!([
        { "name": "Fireball", "level": 3, "school": "V", "source": "PHB", "range": "150 feet" },
        { "name": "Shield", "level": 1, "school": "A", "source": "PHB", "casting_time": "1 reaction" },
        { "name": "Find Familiar", "level": 1, "school": "C", "source": "PHB", "ritual": true }
    ])
}

pub fn item_rows() -> Value {
    json!([
        { "name": "Rope, Hempen (50 feet)", "source": "PHB", "rarity": "none", "value": 100.0 },
        { "name": "Bag of Holding", "source": "DMG", "rarity": "uncommon" },
        { "name": "Vorpal Sword", "source": "DMG", "rarity": "legendary", "reqAttune": "true" }
    ])
}

pub fn monster_rows() -> Value {
    json!([
        { "name": "Goblin", "source": "MM", "size": "Small", "creature_type": "humanoid (goblinoid)",
          "alignment": "NE", "cr": "1/4", "cr_numeric": 0.25, "hp": 7, "ac": 15,
          "environment": ["forest", "hill"], "description": "" },
        { "name": "Adult Red Dragon", "source": "MM", "size": "Huge", "creature_type": "dragon",
          "alignment": "CE", "cr": "17", "cr_numeric": 17.0, "hp": 256, "ac": 19,
          "environment": ["mountain"], "description": "" }
    ])
}

/// Campaign board in the backend's wire shape.
pub fn campaign_board() -> Value {
    json!({
        "board_type": "campaign",
        "stages": [
            { "key": "concept", "display_name": "Concept", "required_documents": ["campaign_pitch"] },
            {
                "key": "session_zero",
                "display_name": "Session Zero",
                "required_documents": ["starting_scenario", "world_primer"],
                "optional_documents": ["safety_tools", "house_rules"]
            },
            { "key": "integration", "display_name": "Integration", "required_documents": ["campaign_bible"] },
            { "key": "active", "display_name": "Active" }
        ],
        "transitions": [
            { "from": "concept", "to": "session_zero", "allowed": true },
            { "from": "session_zero", "to": "integration", "allowed": true },
            { "from": "integration", "to": "concept", "allowed": false }
        ]
    })
}

/// Backend answering every catalog, board and campaign command the
/// suites use.
pub fn scripted_gateway() -> MemoryGateway {
    MemoryGateway::new()
        .with_response("initialize_spell_catalog", Value::Null)
        .with_response("initialize_item_catalog", Value::Null)
        .with_response("initialize_monster_catalog", Value::Null)
        .with_response("search_spells", spell_rows())
        .with_response("search_items", item_rows())
        .with_response("search_monsters", monster_rows())
        .with_response(
            "get_board_configuration",
            json!({ "success": true, "data": campaign_board() }),
        )
        .with_response(
            "get_campaign",
            json!({ "success": true, "data": { "id": 1, "name": "Ashes", "status": "session_zero" } }),
        )
        .with_response(
            "get_campaign_documents",
            json!({ "success": true, "data": [
                { "id": 1, "template_id": "campaign_pitch", "title": "Pitch", "completed_at": "2024-05-01" },
                { "id": 2, "template_id": "world_primer", "title": "Primer", "completed_at": "2024-05-02" },
                { "id": 3, "template_id": "starting_scenario", "title": "Scenario" }
            ] }),
        )
}
