//! Rule-text entry rendering.

use serde_json::Value;

use super::tags::process_formatting_tags;
use crate::core::catalog::{Block, Entry};

/// Render a list of entries as block-level HTML.
pub fn render_entries(entries: &[Entry]) -> String {
    let mut html = String::new();
    for entry in entries {
        render_entry(entry, &mut html);
    }
    html
}

/// Append one entry to `html`.
pub fn render_entry(entry: &Entry, html: &mut String) {
    match entry {
        Entry::Text(text) => {
            html.push_str("<p>");
            html.push_str(&process_formatting_tags(text));
            html.push_str("</p>");
        }
        Entry::Block(block) => render_block(block, html),
        Entry::Other(value) => render_unknown(value, html),
    }
}

fn render_block(block: &Block, html: &mut String) {
    match block {
        Block::Entries { name, entries } | Block::Section { name, entries } => {
            html.push_str("<div class=\"entry-section\">");
            if let Some(name) = name {
                html.push_str(&format!("<h4>{}</h4>", process_formatting_tags(name)));
            }
            html.push_str(&render_entries(entries));
            html.push_str("</div>");
        }
        Block::Inset { name, entries } => render_inset("inset", name.as_deref(), entries, html),
        Block::InsetReadaloud { name, entries } => {
            render_inset("inset readaloud", name.as_deref(), entries, html)
        }
        Block::List { items, .. } => {
            html.push_str("<ul>");
            for item in items {
                html.push_str("<li>");
                render_inline(item, html);
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        }
        Block::Table {
            caption,
            col_labels,
            rows,
        } => {
            html.push_str("<table class=\"entry-table\">");
            if let Some(caption) = caption {
                html.push_str(&format!("<caption>{}</caption>", process_formatting_tags(caption)));
            }
            if !col_labels.is_empty() {
                html.push_str("<thead><tr>");
                for label in col_labels {
                    html.push_str(&format!("<th>{}</th>", process_formatting_tags(label)));
                }
                html.push_str("</tr></thead>");
            }
            html.push_str("<tbody>");
            for row in rows {
                html.push_str("<tr>");
                for cell in row {
                    html.push_str("<td>");
                    render_inline(cell, html);
                    html.push_str("</td>");
                }
                html.push_str("</tr>");
            }
            html.push_str("</tbody></table>");
        }
        Block::Quote { entries, by } => {
            html.push_str("<blockquote>");
            html.push_str(&render_entries(entries));
            if let Some(by) = by {
                html.push_str(&format!("<cite>{}</cite>", process_formatting_tags(by)));
            }
            html.push_str("</blockquote>");
        }
        Block::Item { name, .. } => {
            html.push_str("<p>");
            render_item(name.as_deref(), block, html);
            html.push_str("</p>");
        }
    }
}

fn render_inset(class: &str, name: Option<&str>, entries: &[Entry], html: &mut String) {
    html.push_str(&format!("<div class=\"{class}\">"));
    if let Some(name) = name {
        html.push_str(&format!("<h5>{}</h5>", process_formatting_tags(name)));
    }
    html.push_str(&render_entries(entries));
    html.push_str("</div>");
}

/// Render without a wrapping paragraph, for list items and table cells.
fn render_inline(entry: &Entry, html: &mut String) {
    match entry {
        Entry::Text(text) => html.push_str(&process_formatting_tags(text)),
        Entry::Block(block @ Block::Item { name, .. }) => render_item(name.as_deref(), block, html),
        other => render_entry(other, html),
    }
}

/// `<strong>Name.</strong> body` for a named list item.
fn render_item(name: Option<&str>, item: &Block, html: &mut String) {
    if let Some(name) = name {
        html.push_str(&format!("<strong>{}</strong> ", process_formatting_tags(name)));
    }
    let body: Vec<String> = item.children().iter().map(inline_string).collect();
    html.push_str(&body.join(" "));
}

fn inline_string(entry: &Entry) -> String {
    let mut html = String::new();
    render_inline(entry, &mut html);
    html
}

/// Block kinds without a typed variant still render their name and entries.
fn render_unknown(value: &Value, html: &mut String) {
    match value {
        Value::Number(n) => html.push_str(&format!("<p>{n}</p>")),
        Value::Object(map) => {
            let nested = map
                .get("entries")
                .or_else(|| map.get("items"))
                .and_then(|v| serde_json::from_value::<Vec<Entry>>(v.clone()).ok());
            let Some(nested) = nested else {
                return;
            };
            html.push_str("<div class=\"entry-section\">");
            if let Some(name) = map.get("name").and_then(Value::as_str) {
                html.push_str(&format!("<h4>{}</h4>", process_formatting_tags(name)));
            }
            html.push_str(&render_entries(&nested));
            html.push_str("</div>");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Vec<Entry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_text_entries_become_paragraphs() {
        let html = render_entries(&parse(json!(["Roll {@dice 1d4}.", "Second."])));
        assert_eq!(
            html,
            "<p>Roll <span class=\"dice-roll\">1d4</span>.</p><p>Second.</p>"
        );
    }

    #[test]
    fn test_named_section() {
        let html = render_entries(&parse(json!([
            {"type": "entries", "name": "At Higher Levels", "entries": ["More damage."]}
        ])));
        assert_eq!(
            html,
            "<div class=\"entry-section\"><h4>At Higher Levels</h4><p>More damage.</p></div>"
        );
    }

    #[test]
    fn test_list_items_are_inline() {
        let html = render_entries(&parse(json!([
            {"type": "list", "items": ["one", {"type": "item", "name": "Two.", "entry": "second"}]}
        ])));
        assert_eq!(html, "<ul><li>one</li><li><strong>Two.</strong> second</li></ul>");
    }

    #[test]
    fn test_table() {
        let html = render_entries(&parse(json!([
            {"type": "table", "caption": "Effects", "colLabels": ["d6", "Effect"],
             "rows": [["1", "{@condition blinded}"]]}
        ])));
        assert!(html.starts_with("<table class=\"entry-table\"><caption>Effects</caption>"));
        assert!(html.contains("<th>d6</th><th>Effect</th>"));
        assert!(html.contains("<td><span class=\"condition\">blinded</span></td>"));
        assert!(html.ends_with("</tbody></table>"));
    }

    #[test]
    fn test_quote_and_inset() {
        let html = render_entries(&parse(json!([
            {"type": "quote", "entries": ["Knowledge is power."], "by": "A sage"},
            {"type": "insetReadaloud", "entries": ["The door creaks."]}
        ])));
        assert!(html.contains("<blockquote><p>Knowledge is power.</p><cite>A sage</cite></blockquote>"));
        assert!(html.contains("<div class=\"inset readaloud\"><p>The door creaks.</p></div>"));
    }

    #[test]
    fn test_unknown_block_with_entries_still_renders() {
        let html = render_entries(&parse(json!([
            {"type": "variantSub", "name": "Option", "entries": ["text"]},
            {"type": "image", "href": {"path": "x.png"}}
        ])));
        assert_eq!(html, "<div class=\"entry-section\"><h4>Option</h4><p>text</p></div>");
    }
}
