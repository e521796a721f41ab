use std::collections::BTreeMap;

use serde_json::Value;

use super::entries::{render_entries, render_entry};
use super::tags::process_formatting_tags;
use super::{ordinal, property, value_text, Record};
use crate::core::catalog::domains::{ClassFeature, ClassSummary, ClassWithDetails, Subclass, SubclassFeature};

pub fn ability_name(code: &str) -> &str {
    match code {
        "str" => "Strength",
        "dex" => "Dexterity",
        "con" => "Constitution",
        "int" => "Intelligence",
        "wis" => "Wisdom",
        "cha" => "Charisma",
        other => other,
    }
}

pub fn format_class_details(class: &Record<ClassSummary, ClassWithDetails>) -> String {
    match class {
        Record::Summary(summary) => format_summary(summary),
        Record::Detail(detail) => format_detail(detail),
    }
}

fn format_summary(class: &ClassSummary) -> String {
    let mut html = String::from("<div class=\"class-details\">");

    html.push_str("<div class=\"class-header-info\">");
    match (&class.subclass_name, class.is_subclass()) {
        (Some(subclass), true) => {
            html.push_str(&format!("<div class=\"class-type\">Subclass of {}</div>", class.name));
            html.push_str(&format!("<h3>{subclass}</h3>"));
        }
        _ => {
            let kind = if class.spellcasting_ability.is_some() { "Spellcaster" } else { "Martial" };
            html.push_str(&format!("<div class=\"class-type\">{kind} Class</div>"));
        }
    }
    html.push_str("</div>");

    html.push_str("<div class=\"class-properties\">");
    property(&mut html, "Hit Die", &class.hit_dice);
    property(&mut html, "Primary Ability", &class.primary_ability);
    property(&mut html, "Saving Throw Proficiencies", &class.proficiency);
    if let Some(ability) = &class.spellcasting_ability {
        property(&mut html, "Spellcasting Ability", ability_name(ability));
    }
    if let Some(title) = &class.subclass_title {
        property(&mut html, "Subclass Type", title);
    }
    if !class.description.is_empty() {
        html.push_str(&format!("<div>{}</div>", process_formatting_tags(&class.description)));
    }
    html.push_str("</div>");

    html.push_str(&format!("<div class=\"item-source\">Source: {}</div>", class.source));
    html.push_str("</div>");
    html
}

fn format_detail(details: &ClassWithDetails) -> String {
    let class = &details.class;
    let mut html = String::from("<div class=\"class-details\">");

    html.push_str("<div class=\"class-properties\">");
    if let Some(faces) = class.hd.as_ref().and_then(|hd| hd.get("faces")) {
        property(&mut html, "Hit Die", &format!("d{}", value_text(faces)));
    }
    if let Some(Value::Array(saves)) = &class.proficiency {
        let names: Vec<&str> = saves.iter().filter_map(Value::as_str).map(ability_name).collect();
        property(&mut html, "Saving Throw Proficiencies", &names.join(", "));
    }
    if let Some(start) = &class.starting_proficiencies {
        for (key, label) in [("armor", "Armor"), ("weapons", "Weapons"), ("tools", "Tools")] {
            if let Some(values) = start.get(key) {
                property(&mut html, label, &process_formatting_tags(&value_text(values)));
            }
        }
    }
    if let Some(ability) = &class.spellcasting_ability {
        property(&mut html, "Spellcasting Ability", ability_name(ability));
    }
    if let Some(progression) = &class.caster_progression {
        property(&mut html, "Caster Progression", progression);
    }
    if let Some(title) = &class.subclass_title {
        property(&mut html, "Subclass Type", title);
    }
    html.push_str("</div>");

    if let Some(fluff) = &details.fluff {
        if !fluff.entries.is_empty() {
            html.push_str("<div class=\"class-fluff-section\"><h3>Description</h3>");
            html.push_str(&render_entries(&fluff.entries));
            html.push_str("</div>");
        }
    }

    if !class.entries.is_empty() {
        html.push_str("<div class=\"class-entries\"><h3>Class Features</h3>");
        html.push_str(&render_entries(&class.entries));
        html.push_str("</div>");
    }

    if !details.features.is_empty() {
        html.push_str("<div class=\"features-section\"><h3>Features by Level</h3>");
        html.push_str(&features_table(&details.features));
        for feature in &details.features {
            html.push_str(&format!(
                "<div class=\"class-feature\"><h4>{} <small>({} level)</small></h4>",
                feature.name,
                ordinal(u32::from(feature.level))
            ));
            html.push_str(&render_entries(&feature.entries));
            html.push_str("</div>");
        }
        html.push_str("</div>");
    }

    if !details.subclasses.is_empty() {
        let title = class.subclass_title.as_deref().unwrap_or("Subclasses");
        html.push_str(&format!("<div class=\"subclasses-section\"><h3>{title}</h3>"));
        for subclass in &details.subclasses {
            let features: Vec<&SubclassFeature> = details
                .subclass_features
                .iter()
                .filter(|f| belongs_to(f, subclass))
                .collect();
            html.push_str(&format_subclass(subclass, &features));
        }
        html.push_str("</div>");
    }

    let page = class.page.map(|p| format!(", p. {p}")).unwrap_or_default();
    html.push_str(&format!("<div class=\"source-info\">Source: {}{page}</div>", class.source));
    html.push_str("</div>");
    html
}

/// Features keyed by their subclass short name (or full name) and source.
fn belongs_to(feature: &SubclassFeature, subclass: &Subclass) -> bool {
    let Some(short) = feature.subclass_short_name.as_deref() else {
        return false;
    };
    let name_match = subclass.short_name.as_deref() == Some(short)
        || subclass.name == short
        || subclass
            .short_name
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(short));
    name_match && feature.subclass_source == subclass.source
}

fn format_subclass(subclass: &Subclass, features: &[&SubclassFeature]) -> String {
    let mut html = String::from("<div class=\"subclass-item\">");
    html.push_str(&format!("<h4>{}</h4>", subclass.name));
    if let Some(short) = subclass.short_name.as_deref().filter(|s| *s != subclass.name) {
        html.push_str(&format!("<p class=\"subclass-short-name\">Also known as: {short}</p>"));
    }

    // First entry of the lowest-level feature serves as the introduction.
    if let Some(intro) = features
        .iter()
        .min_by_key(|f| f.level)
        .and_then(|f| f.entries.first())
    {
        html.push_str("<div class=\"subclass-description\">");
        render_entry(intro, &mut html);
        html.push_str("</div>");
    }

    if subclass.spellcasting_ability.is_some() || subclass.caster_progression.is_some() {
        html.push_str("<div class=\"subclass-spellcasting\">");
        if let Some(ability) = &subclass.spellcasting_ability {
            html.push_str(&format!("<span>Spellcasting: {}</span>", ability_name(ability)));
        }
        if let Some(progression) = &subclass.caster_progression {
            html.push_str(&format!("<span> ({progression} caster)</span>"));
        }
        html.push_str("</div>");
    }

    if let Some(fluff) = &subclass.fluff {
        html.push_str("<div class=\"subclass-fluff\">");
        html.push_str(&render_entries(&fluff.entries));
        html.push_str("</div>");
    }

    if !features.is_empty() {
        html.push_str("<ul class=\"feature-list\">");
        for feature in features {
            html.push_str(&format!(
                "<li>{} ({} level)</li>",
                feature.name,
                ordinal(u32::from(feature.level))
            ));
        }
        html.push_str("</ul>");
    }

    html.push_str("</div>");
    html
}

/// Level / feature-name table, one row per level that gains something.
fn features_table(features: &[ClassFeature]) -> String {
    let mut by_level: BTreeMap<u8, Vec<&str>> = BTreeMap::new();
    for feature in features {
        by_level.entry(feature.level).or_default().push(&feature.name);
    }

    let mut html = String::from("<table class=\"features-table\"><thead><tr><th>Level</th><th>Features</th></tr></thead><tbody>");
    for (level, names) in by_level {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            ordinal(u32::from(level)),
            names.join(", ")
        ));
    }
    html.push_str("</tbody></table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fighter() -> ClassWithDetails {
        serde_json::from_value(json!({
            "class": {
                "name": "Fighter",
                "source": "PHB",
                "page": 70,
                "hd": {"number": 1, "faces": 10},
                "proficiency": ["str", "con"],
                "startingProficiencies": {"armor": ["light", "medium", "heavy", "{@item shield|phb|shields}"]},
                "subclassTitle": "Martial Archetype"
            },
            "subclasses": [{
                "name": "Champion", "source": "PHB", "className": "Fighter",
                "classSource": "PHB", "shortName": "Champion"
            }],
            "features": [
                {"name": "Fighting Style", "source": "PHB", "class_name": "Fighter", "class_source": "PHB", "level": 1, "entries": ["Adopt a style."]},
                {"name": "Second Wind", "source": "PHB", "class_name": "Fighter", "class_source": "PHB", "level": 1, "entries": ["Regain hit points."]},
                {"name": "Action Surge", "source": "PHB", "class_name": "Fighter", "class_source": "PHB", "level": 2, "entries": ["Push yourself."]}
            ],
            "subclass_features": [
                {"name": "Improved Critical", "source": "PHB", "class_name": "Fighter", "class_source": "PHB",
                 "subclass_short_name": "Champion", "subclass_source": "PHB", "level": 3,
                 "entries": ["Your weapon attacks score a critical hit on a roll of 19 or 20."]},
                {"name": "Combat Superiority", "source": "PHB", "class_name": "Fighter", "class_source": "PHB",
                 "subclass_short_name": "Battle Master", "subclass_source": "PHB", "level": 3, "entries": ["Maneuvers."]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_detail_rendering() {
        let html = format_class_details(&Record::Detail(fighter()));
        assert!(html.contains("<strong>Hit Die:</strong> d10"));
        assert!(html.contains("<strong>Saving Throw Proficiencies:</strong> Strength, Constitution"));
        assert!(html.contains("data-ref-name=\"shield\""));
        assert!(html.contains("<tr><td>1st</td><td>Fighting Style, Second Wind</td></tr>"));
        assert!(html.contains("<tr><td>2nd</td><td>Action Surge</td></tr>"));
        assert!(html.contains("<h3>Martial Archetype</h3>"));
        assert!(html.contains("critical hit on a roll of 19 or 20"));
        assert!(!html.contains("Maneuvers."));
        assert!(html.contains("Source: PHB, p. 70"));
    }

    #[test]
    fn test_summary_rendering() {
        let summary: ClassSummary = serde_json::from_value(json!({
            "name": "Wizard",
            "source": "PHB",
            "hitDice": "d6",
            "proficiency": "Intelligence, Wisdom",
            "primaryAbility": "Intelligence",
            "spellcastingAbility": "int",
            "description": "A scholarly magic-user.",
            "rowType": "class"
        }))
        .unwrap();

        let html = format_class_details(&Record::Summary(summary));
        assert!(html.contains("Spellcaster Class"));
        assert!(html.contains("<strong>Spellcasting Ability:</strong> Intelligence"));
        assert!(html.contains("<strong>Hit Die:</strong> d6"));
    }
}
