//! Display metadata for document templates referenced by board stages.

/// Title and blurb for one template id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

const fn info(id: &'static str, title: &'static str, description: &'static str) -> TemplateInfo {
    TemplateInfo {
        id,
        title,
        description,
    }
}

/// Known templates across the campaign, module and session boards.
pub const TEMPLATES: &[TemplateInfo] = &[
    // Campaign board
    info("campaign_pitch", "Campaign Pitch", "A one-page pitch to excite players about the campaign"),
    info("starting_scenario", "Starting Scenario", "The opening situation that brings the party together"),
    info("world_primer", "World Primer", "Essential world information players need before play"),
    info("character_guidelines", "Character Guidelines", "Rules and options for building characters"),
    info("table_expectations", "Table Expectations", "Agreed norms for play, tone and scheduling"),
    info("character_integration", "Character Integration", "How each character ties into the world and each other"),
    info("safety_tools", "Safety Tools", "Lines, veils and other tools for a comfortable table"),
    info("house_rules", "House Rules", "Rule changes and clarifications for this campaign"),
    info("campaign_bible", "Campaign Bible", "The master reference for the campaign world"),
    info("major_npc_tracker", "Major NPC Tracker", "Key non-player characters, their goals and status"),
    info("player_secrets", "Player Secrets", "Hidden character details known only to the GM"),
    info("faction_overview", "Faction Overview", "Major factions, their aims and relationships"),
    info("session_notes", "Session Notes", "Running notes from each session"),
    info("player_handouts", "Player Handouts", "Materials to share with players during play"),
    // Module board
    info("module_overview", "Module Overview", "Premise, structure and goals of the module"),
    info("quick_npc_reference", "Quick NPC Reference", "At-a-glance details for the module's NPCs"),
    info("faction_template", "Faction Template", "A faction's goals, resources and agents"),
    info("session_outline", "Session Outline", "Planned beats and scenes for upcoming sessions"),
    info("clue_tracker", "Clue Tracker", "Clues, where they are found and what they reveal"),
    info("region_overview", "Region Overview", "Geography, settlements and dangers of the region"),
    info("document_tracker", "Document Tracker", "Status of every document the module depends on"),
    // Session board
    info("prep_checklist", "Prep Checklist", "Everything to prepare before the session"),
    info("npc_dialogue", "NPC Dialogue", "Lines and mannerisms for NPCs likely to appear"),
    info("improv_prompts", "Improv Prompts", "Names, hooks and complications to draw on at the table"),
    info("session_plan", "Session Plan", "The concrete plan for the session"),
    info("encounter_notes", "Encounter Notes", "Stat blocks, tactics and terrain for planned encounters"),
    info("initiative_tracker", "Initiative Tracker", "Combat order and status effects"),
    info("loot_rolls", "Loot Rolls", "Treasure prepared or rolled for the session"),
    info("session_recap", "Session Recap", "What happened, for players and future prep"),
    info("xp_log", "XP Log", "Experience and milestones awarded"),
];

/// Look up a template by id.
pub fn template_info(id: &str) -> Option<&'static TemplateInfo> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// `unknown_document_type` → `Unknown Document Type`.
pub fn title_from_id(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
