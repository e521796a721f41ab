//! Rule-text entry tree.
//!
//! Detail records carry their prose as a recursive list of entries: plain
//! strings, named sub-sections, lists, tables, insets and quotes. Anything
//! with an unrecognized `type` is kept verbatim in [`Entry::Other`] so new
//! backend block kinds never fail deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// One node of rule text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Text(String),
    Block(Block),
    Other(Value),
}

/// Structured entry blocks, discriminated by their `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Entries {
        #[serde(default)]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient::nullable")]
        entries: Vec<Entry>,
    },
    Section {
        #[serde(default)]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient::nullable")]
        entries: Vec<Entry>,
    },
    List {
        #[serde(default, deserialize_with = "lenient::nullable")]
        items: Vec<Entry>,
        #[serde(default)]
        style: Option<String>,
    },
    Table {
        #[serde(default)]
        caption: Option<String>,
        #[serde(default, rename = "colLabels", alias = "col_labels", deserialize_with = "lenient::nullable")]
        col_labels: Vec<String>,
        #[serde(default, deserialize_with = "lenient::nullable")]
        rows: Vec<Vec<Entry>>,
    },
    Inset {
        #[serde(default)]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient::nullable")]
        entries: Vec<Entry>,
    },
    InsetReadaloud {
        #[serde(default)]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient::nullable")]
        entries: Vec<Entry>,
    },
    Quote {
        #[serde(default, deserialize_with = "lenient::nullable")]
        entries: Vec<Entry>,
        #[serde(default)]
        by: Option<String>,
    },
    Item {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        entry: Option<Box<Entry>>,
        #[serde(default, deserialize_with = "lenient::nullable")]
        entries: Vec<Entry>,
    },
}

impl Entry {
    pub fn text(value: impl Into<String>) -> Self {
        Entry::Text(value.into())
    }

    /// Plain string content, if this entry is a bare string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Entry::Text(text) => Some(text),
            _ => None,
        }
    }

    /// First plain string found walking the tree depth-first.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            Entry::Text(text) => Some(text),
            Entry::Block(block) => block.children().iter().find_map(Entry::first_text),
            Entry::Other(_) => None,
        }
    }
}

impl Block {
    /// Nested entries, in document order. Table cells are not included.
    pub fn children(&self) -> &[Entry] {
        match self {
            Block::Entries { entries, .. }
            | Block::Section { entries, .. }
            | Block::Inset { entries, .. }
            | Block::InsetReadaloud { entries, .. }
            | Block::Quote { entries, .. } => entries,
            Block::List { items, .. } => items,
            Block::Item { entry, entries, .. } => match entry {
                Some(entry) => std::slice::from_ref(entry.as_ref()),
                None => entries,
            },
            Block::Table { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_entries_deserialize() {
        let entries: Vec<Entry> = serde_json::from_value(json!([
            "A bright streak flashes from your pointing finger.",
            {"type": "entries", "name": "At Higher Levels", "entries": ["Damage increases by {@damage 1d6}."]},
            {"type": "list", "items": ["one", "two"]},
            {"type": "table", "caption": "Wild Magic", "colLabels": ["d100", "Effect"], "rows": [["01-02", "Roll again"]]},
            {"type": "homebrew-widget", "payload": 3}
        ]))
        .unwrap();

        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].as_text(), Some("A bright streak flashes from your pointing finger."));
        match &entries[1] {
            Entry::Block(Block::Entries { name, entries }) => {
                assert_eq!(name.as_deref(), Some("At Higher Levels"));
                assert_eq!(entries.len(), 1);
            }
            other => panic!("expected entries block, got {other:?}"),
        }
        assert!(matches!(&entries[2], Entry::Block(Block::List { items, .. }) if items.len() == 2));
        match &entries[3] {
            Entry::Block(Block::Table { col_labels, rows, .. }) => {
                assert_eq!(col_labels, &vec!["d100".to_string(), "Effect".to_string()]);
                assert_eq!(rows[0][1].as_text(), Some("Roll again"));
            }
            other => panic!("expected table, got {other:?}"),
        }
        assert!(matches!(entries[4], Entry::Other(_)));
    }

    #[test]
    fn test_item_with_single_entry() {
        let entry: Entry = serde_json::from_value(json!({
            "type": "item", "name": "Fey Step.", "entry": "You teleport 30 feet."
        }))
        .unwrap();
        assert_eq!(entry.first_text(), Some("You teleport 30 feet."));
    }

    #[test]
    fn test_first_text_walks_nested_sections() {
        let entry: Entry = serde_json::from_value(json!({
            "type": "section",
            "entries": [{"type": "inset", "entries": ["deep"]}]
        }))
        .unwrap();
        assert_eq!(entry.first_text(), Some("deep"));
    }
}
