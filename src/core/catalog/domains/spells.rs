//! Spells.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::catalog::filters::{non_blank, non_empty};
use crate::core::catalog::lenient;
use crate::core::catalog::{CatalogDomain, Entry, Initialization};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellSummary {
    pub name: String,
    pub level: u8,
    pub school: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub concentration: bool,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub ritual: bool,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub casting_time: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub range: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub components: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub classes: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub description: String,
}

/// Spell search criteria. `ritual` and `concentration` are tri-state:
/// `None` means "don't care".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub levels: Vec<u8>,
    pub schools: Vec<String>,
    pub ritual: Option<bool>,
    pub concentration: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub name: String,
    pub source: String,
    pub level: u8,
    pub school: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub time: Vec<Value>,
    #[serde(default)]
    pub range: Value,
    #[serde(default)]
    pub components: Value,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub duration: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries_higher_level: Vec<Entry>,
    #[serde(default)]
    pub scaling_level_dice: Option<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub damage_inflict: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub condition_inflict: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub saving_throw: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub misc_tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub area_tags: Vec<String>,
    #[serde(default)]
    pub classes: Option<Value>,
    #[serde(default)]
    pub meta: Option<Value>,
}

impl Spell {
    /// Ritual flag lives under `meta.ritual`.
    pub fn is_ritual(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|m| m.get("ritual"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Spell catalog descriptor.
pub struct Spells;

impl CatalogDomain for Spells {
    type Summary = SpellSummary;
    type Detail = Spell;
    type Filters = SpellFilters;

    const NAME: &'static str = "spell";
    const INITIALIZATION: Initialization = Initialization::Remote("initialize_spell_catalog");
    const SEARCH_COMMAND: &'static str = "search_spells";
    const DETAIL_COMMAND: &'static str = "get_spell_details";

    fn search_args(filters: &SpellFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "levels": non_empty(&filters.levels),
            "schools": non_empty(&filters.schools),
            "ritual": filters.ritual,
            "concentration": filters.concentration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{Catalog, Lookup};
    use crate::core::gateway::MemoryGateway;
    use std::sync::Arc;

    #[test]
    fn test_search_args_flat_shape() {
        let args = Spells::search_args(&SpellFilters {
            query: Some("fire".into()),
            levels: vec![3],
            ritual: Some(false),
            ..Default::default()
        });
        assert_eq!(
            args,
            json!({
                "query": "fire",
                "sources": null,
                "levels": [3],
                "schools": null,
                "ritual": false,
                "concentration": null,
            })
        );
    }

    #[tokio::test]
    async fn test_fireball_details() {
        let gateway = MemoryGateway::new().with_handler("get_spell_details", |args| {
            assert_eq!(args, json!({"name": "Fireball", "source": "PHB"}));
            Ok(json!({
                "name": "Fireball",
                "source": "PHB",
                "level": 3,
                "school": "V",
                "time": [{"number": 1, "unit": "action"}],
                "range": {"type": "point", "distance": {"type": "feet", "amount": 150}},
                "components": {"v": true, "s": true, "m": "a tiny ball of bat guano and sulfur"},
                "duration": [{"type": "instant"}],
                "entries": ["A bright streak flashes from your pointing finger."],
                "damageInflict": ["fire"],
                "savingThrow": ["dexterity"]
            }))
        });
        let catalog = Catalog::<Spells>::new(Arc::new(gateway));

        match catalog.get_details("Fireball", "PHB").await {
            Lookup::Found(spell) => {
                assert_eq!(spell.level, 3);
                assert_eq!(spell.damage_inflict, vec!["fire"]);
                assert_eq!(spell.entries.len(), 1);
            }
            other => panic!("expected spell, got {other:?}"),
        }
    }
}
