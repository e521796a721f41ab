use serde_json::Value;

use super::entries::render_entries;
use super::tags::process_formatting_tags;
use crate::core::catalog::domains::{Condition, ConditionItem};
use crate::core::catalog::Entry;

pub fn format_condition_details(condition: &Condition) -> String {
    let record = condition.item.record();
    let class = match condition.item {
        ConditionItem::Condition { .. } => "condition-content",
        ConditionItem::Disease { .. } => "disease-content",
    };

    let mut html = format!("<div class=\"{class}\">");
    html.push_str(&render_entries(&record.entries));
    let page = record.page.map(|p| format!(", p. {p}")).unwrap_or_default();
    html.push_str(&format!("<div class=\"condition-source\">Source: {}{page}</div>", record.source));
    html.push_str("</div>");
    html
}

/// Fallback for records without a dedicated formatter.
///
/// Uses `entries` when present, otherwise `text` or `description`.
pub fn format_generic_details(data: &Value) -> String {
    let mut html = String::from("<div class=\"generic-content\">");

    let entries = data
        .get("entries")
        .and_then(|e| serde_json::from_value::<Vec<Entry>>(e.clone()).ok());
    match entries {
        Some(entries) => html.push_str(&render_entries(&entries)),
        None => {
            if let Some(text) = ["text", "description"]
                .iter()
                .find_map(|key| data.get(*key).and_then(Value::as_str))
            {
                html.push_str(&format!("<p>{}</p>", process_formatting_tags(text)));
            }
        }
    }

    html.push_str("</div>");
    html
}
