use serde_json::Value;

use super::entries::render_entries;
use super::tags::process_formatting_tags;
use super::{property, Record};
use crate::core::catalog::domains::{Item, ItemSummary};

/// Item values are stored in copper pieces.
pub fn format_cost(value: f64) -> String {
    if value >= 100.0 {
        format!("{} gp", value / 100.0)
    } else if value >= 10.0 {
        format!("{} sp", value / 10.0)
    } else {
        format!("{value} cp")
    }
}

/// `very rare` → `Very Rare`.
pub fn format_rarity(rarity: &str) -> String {
    rarity
        .split_whitespace()
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

pub fn damage_type(code: &str) -> &str {
    match code {
        "A" => "acid",
        "B" => "bludgeoning",
        "C" => "cold",
        "F" => "fire",
        "O" => "force",
        "L" => "lightning",
        "N" => "necrotic",
        "P" => "piercing",
        "I" => "poison",
        "Y" => "psychic",
        "R" => "radiant",
        "S" => "slashing",
        "T" => "thunder",
        other => other,
    }
}

pub fn weapon_property(code: &str) -> &str {
    // Codes may carry a source suffix, e.g. `V|XPHB`.
    match code.split('|').next().unwrap_or(code) {
        "A" => "Ammunition",
        "F" => "Finesse",
        "H" => "Heavy",
        "L" => "Light",
        "LD" => "Loading",
        "R" => "Reach",
        "RLD" | "REL" => "Reload",
        "S" => "Special",
        "T" => "Thrown",
        "2H" | "TH" => "Two-Handed",
        "V" => "Versatile",
        "BF" => "Burst Fire",
        other => other,
    }
}

fn is_magic_rarity(rarity: &str) -> bool {
    !rarity.trim().is_empty() && !rarity.eq_ignore_ascii_case("none")
}

pub fn format_item_details(item: &Record<ItemSummary, Item>) -> String {
    match item {
        Record::Summary(summary) => format_summary(summary),
        Record::Detail(detail) => format_detail(detail),
    }
}

fn format_summary(item: &ItemSummary) -> String {
    let mut html = String::from("<div class=\"item-details\">");

    html.push_str("<div class=\"item-header\">");
    html.push_str(&format!("<div class=\"item-type\">{}</div>", item.type_name));
    if item.is_magic() {
        html.push_str(&format!(
            "<div class=\"item-rarity\">{}</div>",
            format_rarity(&item.rarity)
        ));
    }
    html.push_str("</div>");

    html.push_str("<div class=\"item-properties\">");
    if let Some(value) = item.value.filter(|v| *v > 0.0) {
        property(&mut html, "Cost", &format_cost(value));
    }
    if let Some(weight) = item.weight.filter(|w| *w > 0.0) {
        property(&mut html, "Weight", &format!("{weight} lb"));
    }
    if let Some(ac) = item.ac {
        property(&mut html, "Armor Class", &ac.to_string());
    }
    if let Some(damage) = &item.damage {
        property(&mut html, "Damage", damage);
    }
    if let Some(attune) = &item.req_attune {
        let text = if attune.eq_ignore_ascii_case("true") { "Yes" } else { attune };
        property(&mut html, "Requires Attunement", text);
    }
    html.push_str("</div>");

    if !item.description.is_empty() {
        html.push_str("<div class=\"item-description\"><h4>Description:</h4>");
        html.push_str(&format!("<p>{}</p>", process_formatting_tags(&item.description)));
        html.push_str("</div>");
    }

    html.push_str(&format!("<div class=\"item-source\">Source: {}</div>", item.source));
    html.push_str("</div>");
    html
}

fn format_detail(item: &Item) -> String {
    let mut html = String::from("<div class=\"item-details\">");

    html.push_str("<div class=\"item-header\">");
    html.push_str(&format!("<div class=\"item-type\">{}</div>", item.item_type));
    if is_magic_rarity(&item.rarity) {
        html.push_str(&format!(
            "<div class=\"item-rarity\">{}</div>",
            format_rarity(&item.rarity)
        ));
    }
    html.push_str("</div>");

    html.push_str("<div class=\"item-properties\">");
    if let Some(value) = item.value.filter(|v| *v > 0.0) {
        property(&mut html, "Cost", &format_cost(value));
    }
    if let Some(weight) = item.weight.filter(|w| *w > 0.0) {
        property(&mut html, "Weight", &format!("{weight} lb"));
    }
    if let Some(ac) = item.ac {
        property(&mut html, "Armor Class", &ac.to_string());
    }
    if let Some(dmg1) = &item.dmg1 {
        let kind = item.dmg_type.as_deref().map(damage_type).unwrap_or("");
        property(&mut html, "Damage", format!("{dmg1} {kind}").trim_end());
    }
    if let Some(dmg2) = &item.dmg2 {
        property(&mut html, "Versatile", dmg2);
    }
    if let Some(range) = &item.range {
        property(&mut html, "Range", range);
    }
    if !item.property.is_empty() {
        let properties: Vec<&str> = item.property.iter().map(|p| weapon_property(p)).collect();
        property(&mut html, "Properties", &properties.join(", "));
    }
    match &item.req_attune {
        Some(Value::Bool(true)) => property(&mut html, "Requires Attunement", "Yes"),
        Some(Value::String(who)) => property(
            &mut html,
            "Requires Attunement",
            &format!("Yes ({})", process_formatting_tags(who)),
        ),
        _ => {}
    }
    html.push_str("</div>");

    if !item.entries.is_empty() {
        html.push_str("<div class=\"item-description\">");
        html.push_str(&render_entries(&item.entries));
        html.push_str("</div>");
    }

    html.push_str(&format!("<div class=\"item-source\">Source: {}</div>", item.source));
    html.push_str("</div>");
    html
}
