//! Monsters.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::catalog::filters::{non_blank, non_empty};
use crate::core::catalog::lenient;
use crate::core::catalog::{CatalogDomain, Entry, Initialization};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterSummary {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub size: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::nullable")]
    pub monster_type: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub alignment: String,
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub cr: String,
    /// Sort key for `cr` (`1/4` → 0.25).
    #[serde(default)]
    pub cr_numeric: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub hp: String,
    #[serde(default, deserialize_with = "lenient::text_or_number")]
    pub ac: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub speed: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub str: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub dex: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub con: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub int: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub wis: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub cha: i32,
    #[serde(default)]
    pub senses: Option<String>,
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creature_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub environment: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonsterFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub types: Vec<String>,
    pub sizes: Vec<String>,
    pub min_cr: Option<f64>,
    pub max_cr: Option<f64>,
}

/// Full stat block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub size: Vec<String>,
    #[serde(rename = "type", default)]
    pub monster_type: Value,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub alignment: Vec<Value>,
    /// A bare number or a list of `{ac, from}` entries.
    #[serde(default)]
    pub ac: Value,
    #[serde(default)]
    pub hp: Value,
    #[serde(default)]
    pub speed: Value,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub str: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub dex: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub con: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub int: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub wis: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub cha: i32,
    #[serde(default)]
    pub save: Option<Value>,
    #[serde(default)]
    pub skill: Option<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub senses: Vec<String>,
    #[serde(default)]
    pub passive: Option<i32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub cr: Value,
    #[serde(rename = "trait", alias = "traitEntries", default, deserialize_with = "lenient::nullable")]
    pub trait_: Vec<NamedBlock>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub action: Vec<NamedBlock>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub bonus: Vec<NamedBlock>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub reaction: Vec<NamedBlock>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub legendary: Vec<NamedBlock>,
    #[serde(default, alias = "damageImmunities", deserialize_with = "lenient::nullable")]
    pub immune: Vec<Value>,
    #[serde(default, alias = "damageResistances", deserialize_with = "lenient::nullable")]
    pub resist: Vec<Value>,
    #[serde(default, alias = "damageVulnerabilities", deserialize_with = "lenient::nullable")]
    pub vulnerable: Vec<Value>,
    #[serde(default, alias = "conditionImmunities", deserialize_with = "lenient::nullable")]
    pub condition_immune: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub spellcasting: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub fluff_entries: Vec<Entry>,
    #[serde(default, alias = "fluff_images", deserialize_with = "lenient::nullable")]
    pub fluff_images: Vec<FluffImage>,
}

/// A named trait, action, or legendary action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedBlock {
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

/// Artwork reference attached to a monster's fluff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluffImage {
    #[serde(default)]
    pub href: Option<FluffHref>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluffHref {
    #[serde(default)]
    pub path: Option<String>,
}

impl Monster {
    /// Book-relative path of the first fluff image, if any.
    pub fn first_image_path(&self) -> Option<&str> {
        self.fluff_images
            .iter()
            .find_map(|img| img.href.as_ref()?.path.as_deref())
    }
}

/// Monster catalog descriptor.
pub struct Monsters;

impl CatalogDomain for Monsters {
    type Summary = MonsterSummary;
    type Detail = Monster;
    type Filters = MonsterFilters;

    const NAME: &'static str = "monster";
    const INITIALIZATION: Initialization = Initialization::Remote("initialize_monster_catalog");
    const SEARCH_COMMAND: &'static str = "search_monsters";
    const DETAIL_COMMAND: &'static str = "get_monster_details";

    fn search_args(filters: &MonsterFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "types": non_empty(&filters.types),
            "sizes": non_empty(&filters.sizes),
            "minCr": filters.min_cr,
            "maxCr": filters.max_cr,
        })
    }
}
