use serde_json::{json, Value};
use tracing::warn;

use super::entries::render_entries;
use super::tags::{escape_attr, process_formatting_tags};
use super::{property, value_text, Record};
use crate::core::catalog::domains::{Monster, MonsterSummary, NamedBlock};
use crate::core::gateway::{call, Envelope, Gateway};

pub fn size_name(code: &str) -> &str {
    match code {
        "T" => "Tiny",
        "S" => "Small",
        "M" => "Medium",
        "L" => "Large",
        "H" => "Huge",
        "G" => "Gargantuan",
        other => other,
    }
}

/// Alignment codes (`L`, `N`, `C`, `G`, `E`, `U`, `A`) to words.
pub fn alignment(codes: &[Value]) -> String {
    let words: Vec<&str> = codes.iter().filter_map(Value::as_str).collect();
    match words.as_slice() {
        [] => "unaligned".to_string(),
        ["U"] => "unaligned".to_string(),
        ["A"] => "any alignment".to_string(),
        ["N"] => "neutral".to_string(),
        _ => words
            .iter()
            .map(|code| match *code {
                "L" => "lawful",
                "N" => "neutral",
                "C" => "chaotic",
                "G" => "good",
                "E" => "evil",
                "U" => "unaligned",
                "A" => "any",
                other => other,
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// `+3`, `-1`, `+0`.
pub fn ability_modifier(score: i32) -> String {
    let modifier = (score - 10).div_euclid(2);
    if modifier >= 0 {
        format!("+{modifier}")
    } else {
        modifier.to_string()
    }
}

fn creature_type(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let base = map.get("type").map(value_text).unwrap_or_default();
            match map.get("tags").map(value_text).filter(|t| !t.is_empty()) {
                Some(tags) => format!("{base} ({tags})"),
                None => base,
            }
        }
        other => value_text(other),
    }
}

fn armor_class(value: &Value) -> String {
    let Some(values) = value.as_array() else {
        return value_text(value);
    };
    values
        .iter()
        .map(|ac| match ac {
            Value::Object(map) => {
                let base = map.get("ac").map(value_text).unwrap_or_default();
                match map.get("from").map(value_text).filter(|f| !f.is_empty()) {
                    Some(from) => format!("{base} ({})", process_formatting_tags(&from)),
                    None => base,
                }
            }
            other => value_text(other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn hit_points(value: &Value) -> String {
    match (value.get("average"), value.get("formula")) {
        (Some(avg), Some(formula)) => format!("{} ({})", value_text(avg), value_text(formula)),
        (Some(avg), None) => value_text(avg),
        _ => value_text(value),
    }
}

fn speed(value: &Value) -> String {
    let Some(map) = value.as_object() else {
        return value_text(value);
    };
    let mut parts = Vec::new();
    for mode in ["walk", "burrow", "climb", "fly", "swim"] {
        let Some(amount) = map.get(mode) else { continue };
        let amount = match amount {
            Value::Object(inner) => inner.get("number").map(value_text).unwrap_or_default(),
            other => value_text(other),
        };
        if mode == "walk" {
            parts.push(format!("{amount} ft."));
        } else {
            parts.push(format!("{mode} {amount} ft."));
        }
    }
    parts.join(", ")
}

/// `{"dex": "+5", "wis": "+3"}` → `Dex +5, Wis +3`.
fn bonus_list(value: &Option<Value>) -> String {
    let Some(Value::Object(map)) = value else {
        return String::new();
    };
    map.iter()
        .map(|(key, bonus)| {
            let mut chars = key.chars();
            let label: String = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            format!("{label} {}", value_text(bonus))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_text(values: &[Value]) -> String {
    values
        .iter()
        .map(value_text)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn ability_table(html: &mut String, scores: [i32; 6]) {
    html.push_str("<table class=\"ability-scores\"><tr>");
    for label in ["STR", "DEX", "CON", "INT", "WIS", "CHA"] {
        html.push_str(&format!("<th>{label}</th>"));
    }
    html.push_str("</tr><tr>");
    for score in scores {
        html.push_str(&format!("<td>{score} ({})</td>", ability_modifier(score)));
    }
    html.push_str("</tr></table>");
}

fn named_blocks(html: &mut String, heading: &str, blocks: &[NamedBlock]) {
    if blocks.is_empty() {
        return;
    }
    html.push_str(&format!("<div class=\"monster-section\"><h4>{heading}</h4>"));
    for block in blocks {
        html.push_str("<div class=\"monster-block\">");
        if !block.name.is_empty() {
            html.push_str(&format!(
                "<strong><em>{}.</em></strong> ",
                process_formatting_tags(&block.name)
            ));
        }
        html.push_str(&render_entries(&block.entries));
        html.push_str("</div>");
    }
    html.push_str("</div>");
}

/// Resolve a book-relative image path to an embeddable source.
///
/// Failures are logged and yield `None`; the stat block renders without art.
pub async fn resolve_book_image(
    gateway: &dyn Gateway,
    book_id: &str,
    image_path: &str,
) -> Option<String> {
    let args = json!({ "bookId": book_id, "imagePath": image_path });
    match call::<_, Option<String>>(gateway, "serve_book_image", &args, Envelope::Wrapped).await {
        Ok(data) => data,
        Err(e) => {
            warn!(book_id, image_path, error = %e, "failed to load book image");
            None
        }
    }
}

pub async fn format_monster_details(
    monster: &Record<MonsterSummary, Monster>,
    gateway: &dyn Gateway,
) -> String {
    match monster {
        Record::Summary(summary) => format_summary(summary),
        Record::Detail(detail) => {
            let image = match detail.first_image_path() {
                Some(path) => resolve_book_image(gateway, &detail.source, path).await,
                None => None,
            };
            format_detail(detail, image.as_deref())
        }
    }
}

fn format_summary(monster: &MonsterSummary) -> String {
    let mut html = String::from("<div class=\"monster-details\">");

    let kind = monster
        .creature_type
        .as_deref()
        .unwrap_or(&monster.monster_type);
    html.push_str("<div class=\"monster-header\">");
    html.push_str(&format!(
        "<div class=\"monster-type\">{} {}, {}</div>",
        size_name(&monster.size),
        kind,
        monster.alignment
    ));
    html.push_str(&format!("<div class=\"monster-cr\">Challenge {}</div>", monster.cr));
    html.push_str("</div>");

    html.push_str("<div class=\"creature-stats\">");
    for (label, value) in [("AC", &monster.ac), ("HP", &monster.hp), ("CR", &monster.cr)] {
        html.push_str(&format!(
            "<div class=\"stat\"><div class=\"stat-label\">{label}</div><div class=\"stat-value\">{value}</div></div>"
        ));
    }
    html.push_str("</div>");

    if !monster.speed.is_empty() {
        property(&mut html, "Speed", &monster.speed);
    }
    // Backend summary rows carry no ability scores.
    let scores = [monster.str, monster.dex, monster.con, monster.int, monster.wis, monster.cha];
    if scores.iter().any(|&score| score != 0) {
        ability_table(&mut html, scores);
    }
    if let Some(senses) = &monster.senses {
        property(&mut html, "Senses", senses);
    }
    if let Some(languages) = &monster.languages {
        property(&mut html, "Languages", languages);
    }

    if !monster.environment.is_empty() {
        html.push_str("<div class=\"monster-environment\"><h4>Environment:</h4>");
        html.push_str(&format!("<p>{}</p>", monster.environment.join(", ")));
        html.push_str("</div>");
    }

    html.push_str(&format!("<div class=\"monster-source\">Source: {}</div>", monster.source));
    html.push_str("</div>");
    html
}

fn format_detail(monster: &Monster, image: Option<&str>) -> String {
    let mut html = String::from("<div class=\"monster-details\">");

    if let Some(src) = image {
        html.push_str(&format!(
            "<div class=\"monster-image\"><img src=\"{}\" alt=\"{}\" /></div>",
            escape_attr(src),
            escape_attr(&monster.name)
        ));
    }

    let sizes: Vec<&str> = monster.size.iter().map(|s| size_name(s)).collect();
    html.push_str("<div class=\"monster-header\">");
    html.push_str(&format!(
        "<div class=\"monster-type\"><em>{} {}, {}</em></div>",
        sizes.join(" or "),
        creature_type(&monster.monster_type),
        alignment(&monster.alignment)
    ));
    html.push_str("</div>");

    html.push_str("<div class=\"monster-properties\">");
    property(&mut html, "Armor Class", &armor_class(&monster.ac));
    property(&mut html, "Hit Points", &hit_points(&monster.hp));
    property(&mut html, "Speed", &speed(&monster.speed));
    html.push_str("</div>");

    ability_table(
        &mut html,
        [monster.str, monster.dex, monster.con, monster.int, monster.wis, monster.cha],
    );

    html.push_str("<div class=\"monster-properties\">");
    property(&mut html, "Saving Throws", &bonus_list(&monster.save));
    property(&mut html, "Skills", &bonus_list(&monster.skill));
    property(&mut html, "Damage Vulnerabilities", &list_text(&monster.vulnerable));
    property(&mut html, "Damage Resistances", &list_text(&monster.resist));
    property(&mut html, "Damage Immunities", &list_text(&monster.immune));
    property(&mut html, "Condition Immunities", &list_text(&monster.condition_immune));
    let mut senses = monster.senses.join(", ");
    if let Some(passive) = monster.passive {
        if !senses.is_empty() {
            senses.push_str(", ");
        }
        senses.push_str(&format!("passive Perception {passive}"));
    }
    property(&mut html, "Senses", &senses);
    property(&mut html, "Languages", &monster.languages.join(", "));
    property(&mut html, "Challenge", &value_text(&monster.cr));
    html.push_str("</div>");

    named_blocks(&mut html, "Traits", &monster.trait_);
    named_blocks(&mut html, "Actions", &monster.action);
    named_blocks(&mut html, "Bonus Actions", &monster.bonus);
    named_blocks(&mut html, "Reactions", &monster.reaction);
    named_blocks(&mut html, "Legendary Actions", &monster.legendary);

    if !monster.fluff_entries.is_empty() {
        html.push_str("<div class=\"monster-lore\">");
        html.push_str(&render_entries(&monster.fluff_entries));
        html.push_str("</div>");
    }

    html.push_str(&format!("<div class=\"monster-source\">Source: {}</div>", monster.source));
    html.push_str("</div>");
    html
}
