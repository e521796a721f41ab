//! Equipment and magic items.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::catalog::filters::{non_blank, non_empty};
use crate::core::catalog::lenient;
use crate::core::catalog::{CatalogDomain, Entry, Initialization};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub item_type: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub type_name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub rarity: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub ac: Option<i32>,
    #[serde(default)]
    pub damage: Option<String>,
    #[serde(default)]
    pub req_attune: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub description: String,
}

impl ItemSummary {
    /// Whether the item carries a real rarity (anything but blank or "none").
    pub fn is_magic(&self) -> bool {
        let rarity = self.rarity.trim();
        !rarity.is_empty() && !rarity.eq_ignore_ascii_case("none")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub types: Vec<String>,
    pub rarities: Vec<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    pub source: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::nullable")]
    pub item_type: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub rarity: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub ac: Option<i32>,
    #[serde(default)]
    pub dmg1: Option<String>,
    #[serde(default)]
    pub dmg2: Option<String>,
    #[serde(default)]
    pub dmg_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub property: Vec<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default, alias = "requiresAttunement")]
    pub req_attune: Option<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

/// Item catalog descriptor.
pub struct Items;

impl CatalogDomain for Items {
    type Summary = ItemSummary;
    type Detail = Item;
    type Filters = ItemFilters;

    const NAME: &'static str = "item";
    const INITIALIZATION: Initialization = Initialization::Remote("initialize_item_catalog");
    const SEARCH_COMMAND: &'static str = "search_items";
    const DETAIL_COMMAND: &'static str = "get_item_details";

    fn search_args(filters: &ItemFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "types": non_empty(&filters.types),
            "rarities": non_empty(&filters.rarities),
            "minValue": filters.min_value,
            "maxValue": filters.max_value,
        })
    }
}
