//! HTML formatters for catalog records.
//!
//! Every formatter takes a [`Record`], which says up front whether the caller
//! holds only the search-row summary or the full detail record, and renders
//! an HTML fragment for a modal body. Rule text inside either shape goes
//! through [`process_formatting_tags`].

pub mod class;
pub mod entries;
pub mod feat;
pub mod generic;
pub mod item;
pub mod monster;
pub mod spell;
pub mod tags;

pub use class::format_class_details;
pub use entries::{render_entries, render_entry};
pub use feat::format_feat_details;
pub use generic::{format_condition_details, format_generic_details};
pub use item::format_item_details;
pub use monster::format_monster_details;
pub use spell::format_spell_details;
pub use tags::process_formatting_tags;

use serde_json::Value;

/// Either the lightweight search row or the full record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record<S, D> {
    Summary(S),
    Detail(D),
}

impl<S, D> Record<S, D> {
    pub fn is_detail(&self) -> bool {
        matches!(self, Record::Detail(_))
    }
}

/// `1st`, `2nd`, `3rd`, `11th`, ...
pub(crate) fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Render a loosely typed JSON value as display text.
///
/// Strings pass through, numbers print plainly, arrays join with `, `, and
/// objects fall back to their most descriptive field.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => ["special", "entry", "name", "text", "value", "number"]
            .iter()
            .find_map(|key| map.get(*key))
            .map(value_text)
            .unwrap_or_default(),
    }
}

/// `<div><strong>{label}:</strong> {value}</div>`, skipped when `value` is blank.
pub(crate) fn property(html: &mut String, label: &str, value: &str) {
    if !value.trim().is_empty() {
        html.push_str(&format!("<div><strong>{label}:</strong> {value}</div>"));
    }
}
