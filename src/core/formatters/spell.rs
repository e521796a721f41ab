use serde_json::Value;

use super::entries::render_entries;
use super::tags::process_formatting_tags;
use super::{ordinal, property, value_text, Record};
use crate::core::catalog::domains::{Spell, SpellSummary};

/// School abbreviations used by the source data.
pub fn school_name(code: &str) -> &str {
    match code {
        "A" => "Abjuration",
        "C" => "Conjuration",
        "D" => "Divination",
        "E" => "Enchantment",
        "V" => "Evocation",
        "I" => "Illusion",
        "N" => "Necromancy",
        "T" => "Transmutation",
        "P" => "Psionic",
        other => other,
    }
}

/// `Cantrip`, `1st-level`, `2nd-level`, ...
pub fn level_label(level: u8) -> String {
    if level == 0 {
        "Cantrip".to_string()
    } else {
        format!("{}-level", ordinal(u32::from(level)))
    }
}

pub fn format_spell_details(spell: &Record<SpellSummary, Spell>) -> String {
    match spell {
        Record::Summary(summary) => format_summary(summary),
        Record::Detail(detail) => format_detail(detail),
    }
}

fn format_summary(spell: &SpellSummary) -> String {
    let mut html = String::from("<div class=\"spell-details\">");

    html.push_str("<div class=\"spell-header\">");
    html.push_str(&format!(
        "<div class=\"spell-level\">{} {}</div>",
        level_label(spell.level),
        school_name(&spell.school)
    ));
    if spell.ritual {
        html.push_str("<div class=\"spell-ritual\">(Ritual)</div>");
    }
    html.push_str("</div>");

    html.push_str("<div class=\"spell-properties\">");
    property(&mut html, "Casting Time", &spell.casting_time);
    property(&mut html, "Range", &spell.range);
    property(&mut html, "Components", &spell.components);
    let duration = if spell.concentration { "Concentration" } else { "Instantaneous" };
    property(&mut html, "Duration", duration);
    property(&mut html, "Classes", &spell.classes.join(", "));
    html.push_str("</div>");

    if !spell.description.is_empty() {
        html.push_str("<div class=\"spell-description\"><h4>Description:</h4>");
        html.push_str(&format!("<p>{}</p>", process_formatting_tags(&spell.description)));
        html.push_str("</div>");
    }

    html.push_str(&format!("<div class=\"spell-source\">Source: {}</div>", spell.source));
    html.push_str("</div>");
    html
}

fn format_detail(spell: &Spell) -> String {
    let mut html = String::from("<div class=\"spell-details\">");

    html.push_str("<div class=\"spell-header\">");
    html.push_str(&format!(
        "<div class=\"spell-level\">{} {}</div>",
        level_label(spell.level),
        school_name(&spell.school)
    ));
    if spell.is_ritual() {
        html.push_str("<div class=\"spell-ritual\">(Ritual)</div>");
    }
    html.push_str("</div>");

    html.push_str("<div class=\"spell-properties\">");
    property(&mut html, "Casting Time", &casting_time(&spell.time));
    property(&mut html, "Range", &range(&spell.range));
    property(&mut html, "Components", &components(&spell.components));
    property(&mut html, "Duration", &duration(&spell.duration));
    property(&mut html, "Saving Throw", &title_join(&spell.saving_throw));
    property(&mut html, "Damage", &title_join(&spell.damage_inflict));
    property(&mut html, "Conditions", &title_join(&spell.condition_inflict));
    html.push_str("</div>");

    if !spell.entries.is_empty() {
        html.push_str("<div class=\"spell-description\">");
        html.push_str(&render_entries(&spell.entries));
        html.push_str("</div>");
    }
    if !spell.entries_higher_level.is_empty() {
        html.push_str("<div class=\"spell-higher-levels\">");
        html.push_str(&render_entries(&spell.entries_higher_level));
        html.push_str("</div>");
    }

    html.push_str(&format!("<div class=\"spell-source\">Source: {}</div>", spell.source));
    html.push_str("</div>");
    html
}

fn title_join(values: &[String]) -> String {
    values
        .iter()
        .map(|v| {
            let mut chars = v.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(", ")
}

/// `1 action`, `1 bonus action`, `10 minutes`.
pub fn casting_time(times: &[Value]) -> String {
    times
        .iter()
        .map(|time| {
            let number = time.get("number").and_then(Value::as_u64).unwrap_or(1);
            let unit = match time.get("unit").and_then(Value::as_str).unwrap_or("action") {
                "bonus" => "bonus action",
                other => other,
            };
            let mut text = plural(number, unit);
            if let Some(condition) = time.get("condition").and_then(Value::as_str) {
                text.push_str(&format!(", {condition}"));
            }
            text
        })
        .collect::<Vec<_>>()
        .join(" or ")
}

/// `Self`, `Touch`, `150 feet`, `Self (15-foot cone)`.
pub fn range(range: &Value) -> String {
    if let Some(text) = range.as_str() {
        return text.to_string();
    }
    let kind = range.get("type").and_then(Value::as_str).unwrap_or("");
    let distance = range.get("distance");
    let dist_kind = distance
        .and_then(|d| d.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let amount = distance.and_then(|d| d.get("amount")).and_then(Value::as_u64);

    match (kind, dist_kind, amount) {
        ("special", _, _) => "Special".to_string(),
        (_, "self", _) => "Self".to_string(),
        (_, "touch", _) => "Touch".to_string(),
        (_, "sight", _) => "Sight".to_string(),
        (_, "unlimited", _) => "Unlimited".to_string(),
        ("point", unit, Some(1)) => format!("1 {}", singular_unit(unit)),
        ("point", unit, Some(amount)) => format!("{amount} {unit}"),
        (shape, unit, Some(amount)) if !shape.is_empty() => {
            format!("Self ({amount}-{} {shape})", singular_unit(unit))
        }
        _ => value_text(range),
    }
}

fn singular_unit(unit: &str) -> &str {
    match unit {
        "feet" => "foot",
        "miles" => "mile",
        other => other,
    }
}

/// `V, S, M (a pinch of sulfur)`.
pub fn components(components: &Value) -> String {
    let Some(map) = components.as_object() else {
        return value_text(components);
    };
    let mut parts = Vec::new();
    if map.get("v").and_then(Value::as_bool).unwrap_or(false) {
        parts.push("V".to_string());
    }
    if map.get("s").and_then(Value::as_bool).unwrap_or(false) {
        parts.push("S".to_string());
    }
    match map.get("m") {
        Some(Value::Bool(true)) => parts.push("M".to_string()),
        Some(Value::String(text)) => parts.push(format!("M ({text})")),
        Some(material @ Value::Object(_)) => {
            parts.push(format!("M ({})", material.get("text").map(value_text).unwrap_or_default()))
        }
        _ => {}
    }
    parts.join(", ")
}

/// `Instantaneous`, `Concentration, up to 1 minute`, `Until dispelled`.
pub fn duration(durations: &[Value]) -> String {
    durations
        .iter()
        .map(|d| match d.get("type").and_then(Value::as_str).unwrap_or("") {
            "instant" => "Instantaneous".to_string(),
            "permanent" => "Until dispelled".to_string(),
            "special" => "Special".to_string(),
            "timed" => {
                let inner = d.get("duration");
                let amount = inner
                    .and_then(|i| i.get("amount"))
                    .and_then(Value::as_u64)
                    .unwrap_or(1);
                let unit = inner
                    .and_then(|i| i.get("type"))
                    .and_then(Value::as_str)
                    .unwrap_or("round");
                let span = plural(amount, unit);
                if d.get("concentration").and_then(Value::as_bool).unwrap_or(false) {
                    format!("Concentration, up to {span}")
                } else {
                    span
                }
            }
            _ => value_text(d),
        })
        .collect::<Vec<_>>()
        .join(" or ")
}

fn plural(amount: u64, unit: &str) -> String {
    if amount == 1 || unit.ends_with('s') || unit == "feet" {
        format!("{amount} {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fireball() -> Spell {
        serde_json::from_value(json!({
            "name": "Fireball",
            "source": "PHB",
            "level": 3,
            "school": "V",
            "time": [{"number": 1, "unit": "action"}],
            "range": {"type": "point", "distance": {"type": "feet", "amount": 150}},
            "components": {"v": true, "s": true, "m": "a tiny ball of bat guano and sulfur"},
            "duration": [{"type": "instant"}],
            "entries": ["Each creature takes {@damage 8d6} fire damage."],
            "entriesHigherLevel": [{"type": "entries", "name": "At Higher Levels", "entries": ["More."]}],
            "damageInflict": ["fire"],
            "savingThrow": ["dexterity"]
        }))
        .unwrap()
    }

    #[test]
    fn test_detail_rendering() {
        let html = format_spell_details(&Record::Detail(fireball()));
        assert!(html.contains("3rd-level Evocation"));
        assert!(html.contains("<strong>Casting Time:</strong> 1 action"));
        assert!(html.contains("<strong>Range:</strong> 150 feet"));
        assert!(html.contains("V, S, M (a tiny ball of bat guano and sulfur)"));
        assert!(html.contains("<strong>Duration:</strong> Instantaneous"));
        assert!(html.contains("<strong>Saving Throw:</strong> Dexterity"));
        assert!(html.contains("<span class=\"damage-roll\">8d6</span>"));
        assert!(html.contains("<h4>At Higher Levels</h4>"));
        assert!(!html.contains("(Ritual)"));
    }

    #[test]
    fn test_summary_rendering() {
        let summary = SpellSummary {
            name: "Detect Magic".into(),
            level: 1,
            school: "D".into(),
            source: "PHB".into(),
            concentration: true,
            ritual: true,
            casting_time: "1 action".into(),
            range: "Self".into(),
            components: "V, S".into(),
            classes: vec!["Cleric".into(), "Wizard".into()],
            description: String::new(),
        };
        let html = format_spell_details(&Record::Summary(summary));
        assert!(html.contains("1st-level Divination"));
        assert!(html.contains("(Ritual)"));
        assert!(html.contains("<strong>Duration:</strong> Concentration"));
        assert!(html.contains("<strong>Classes:</strong> Cleric, Wizard"));
        assert!(!html.contains("Description:"));
    }

    #[test]
    fn test_range_shapes() {
        assert_eq!(range(&json!({"type": "point", "distance": {"type": "self"}})), "Self");
        assert_eq!(range(&json!({"type": "point", "distance": {"type": "touch"}})), "Touch");
        assert_eq!(
            range(&json!({"type": "cone", "distance": {"type": "feet", "amount": 15}})),
            "Self (15-foot cone)"
        );
        assert_eq!(range(&json!({"type": "point", "distance": {"type": "miles", "amount": 1}})), "1 mile");
        assert_eq!(range(&json!("60 feet")), "60 feet");
    }

    #[test]
    fn test_duration_and_time() {
        assert_eq!(
            duration(&[json!({"type": "timed", "duration": {"type": "minute", "amount": 10}, "concentration": true})]),
            "Concentration, up to 10 minutes"
        );
        assert_eq!(duration(&[json!({"type": "permanent"})]), "Until dispelled");
        assert_eq!(casting_time(&[json!({"number": 1, "unit": "bonus"})]), "1 bonus action");
        assert_eq!(
            casting_time(&[json!({"number": 1, "unit": "reaction", "condition": "when you are hit"})]),
            "1 reaction, when you are hit"
        );
    }

    #[test]
    fn test_school_and_level_labels() {
        assert_eq!(school_name("N"), "Necromancy");
        assert_eq!(school_name("Homebrew"), "Homebrew");
        assert_eq!(level_label(0), "Cantrip");
        assert_eq!(level_label(9), "9th-level");
    }
}
