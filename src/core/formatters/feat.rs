use serde_json::Value;

use super::class::ability_name;
use super::entries::render_entries;
use super::tags::process_formatting_tags;
use super::{property, value_text, Record};
use crate::core::catalog::domains::{Feat, FeatSummary};

/// Human-readable prerequisite list, alternatives joined with `or`.
pub fn prerequisite_text(prerequisites: &[Value]) -> String {
    prerequisites
        .iter()
        .filter_map(Value::as_object)
        .map(|alternative| {
            let mut parts = Vec::new();
            for (key, value) in alternative {
                match key.as_str() {
                    "level" => {
                        let level = value.get("level").unwrap_or(value);
                        parts.push(format!("Level {}", value_text(level)));
                    }
                    "ability" => {
                        for req in value.as_array().into_iter().flatten().filter_map(Value::as_object) {
                            for (ability, score) in req {
                                parts.push(format!("{} {} or higher", ability_name(ability), value_text(score)));
                            }
                        }
                    }
                    "race" => {
                        let races: Vec<String> = value
                            .as_array()
                            .into_iter()
                            .flatten()
                            .map(|race| {
                                let name = race.get("name").map(value_text).unwrap_or_default();
                                match race.get("subrace").map(value_text) {
                                    Some(sub) => format!("{name} ({sub})"),
                                    None => name,
                                }
                            })
                            .collect();
                        parts.push(capitalize(&races.join(" or ")));
                    }
                    "spellcasting" | "spellcasting2020" if value.as_bool() == Some(true) => {
                        parts.push("The ability to cast at least one spell".to_string());
                    }
                    "proficiency" => {
                        for req in value.as_array().into_iter().flatten().filter_map(Value::as_object) {
                            for (kind, what) in req {
                                parts.push(format!("Proficiency with {} {kind}", value_text(what)));
                            }
                        }
                    }
                    "feat" => parts.push(value_text(value)),
                    "other" | "otherSummary" => parts.push(value_text(value)),
                    _ => {}
                }
            }
            process_formatting_tags(&parts.join(", "))
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// `Strength +1`, `+1 to one of Dexterity or Wisdom`.
pub fn ability_increase_text(abilities: &[Value]) -> String {
    abilities
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|increase| {
            increase.iter().map(|(key, value)| {
                if key == "choose" {
                    let from: Vec<&str> = value
                        .get("from")
                        .and_then(Value::as_array)
                        .into_iter()
                        .flatten()
                        .filter_map(Value::as_str)
                        .map(ability_name)
                        .collect();
                    let amount = value.get("amount").and_then(Value::as_i64).unwrap_or(1);
                    format!("+{amount} to one of {}", from.join(" or "))
                } else {
                    format!("{} +{}", ability_name(key), value_text(value))
                }
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_feat_details(feat: &Record<FeatSummary, Feat>) -> String {
    let mut html = String::from("<div class=\"feat-details\">");

    match feat {
        Record::Summary(summary) => {
            if let Some(prereq) = &summary.prerequisites {
                html.push_str(&format!(
                    "<div class=\"feat-prerequisite\"><em>Prerequisite: {}</em></div>",
                    process_formatting_tags(prereq)
                ));
            }
            if let Some(brief) = &summary.brief {
                html.push_str(&format!("<p>{}</p>", process_formatting_tags(brief)));
            }
            html.push_str(&format!("<div class=\"feat-source\">Source: {}</div>", summary.source));
        }
        Record::Detail(detail) => {
            let prereq = prerequisite_text(&detail.prerequisite);
            if !prereq.is_empty() {
                html.push_str(&format!(
                    "<div class=\"feat-prerequisite\"><em>Prerequisite: {prereq}</em></div>"
                ));
            }
            html.push_str("<div class=\"feat-properties\">");
            property(&mut html, "Ability Score Increase", &ability_increase_text(&detail.ability));
            html.push_str("</div>");
            if !detail.entries.is_empty() {
                html.push_str("<div class=\"feat-description\">");
                html.push_str(&render_entries(&detail.entries));
                html.push_str("</div>");
            }
            let page = detail.page.map(|p| format!(", p. {p}")).unwrap_or_default();
            html.push_str(&format!(
                "<div class=\"feat-source\">Source: {}{page}</div>",
                detail.source
            ));
        }
    }

    html.push_str("</div>");
    html
}
