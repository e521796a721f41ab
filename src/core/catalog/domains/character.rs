//! Character-building content: races, feats, backgrounds and class options.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::core::catalog::filters::{non_blank, non_empty};
use crate::core::catalog::lenient;
use crate::core::catalog::{CatalogDomain, Entry, Initialization};
use crate::core::gateway::Envelope;

// ============================================================================
// Races
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub size: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub speed: i32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub ability_bonuses: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub traits_count: u32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub is_subrace: bool,
    #[serde(default)]
    pub parent_race: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub sizes: Vec<String>,
    pub has_darkvision: Option<bool>,
    pub has_flight: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub size: Vec<String>,
    #[serde(default)]
    pub speed: Option<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub ability: Vec<Value>,
    #[serde(default)]
    pub darkvision: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub trait_tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub resist: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default, alias = "race_name")]
    pub race_name: Option<String>,
    #[serde(default, alias = "race_source")]
    pub race_source: Option<String>,
}

/// A race lookup result.
///
/// The backend returns one JSON document; a document with a parent race
/// name is a subrace, one with a name is a race (and a subrace document
/// usually satisfies both).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceWithDetails {
    pub race: Option<Race>,
    pub subrace: Option<Race>,
    pub related_subraces: Vec<Race>,
    pub fluff: Option<Value>,
}

impl<'de> Deserialize<'de> for RaceWithDetails {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = Value::deserialize(deserializer)?;
        let parse = |doc: &Value| {
            serde_json::from_value::<Race>(doc.clone()).map_err(serde::de::Error::custom)
        };

        let race = if document.get("name").is_some() {
            Some(parse(&document)?)
        } else {
            None
        };
        let subrace = if document.get("race_name").or_else(|| document.get("raceName")).is_some() {
            Some(parse(&document)?)
        } else {
            None
        };

        Ok(Self {
            race,
            subrace,
            related_subraces: Vec::new(),
            fluff: document.get("fluff").cloned(),
        })
    }
}

/// Race catalog descriptor.
pub struct Races;

impl CatalogDomain for Races {
    type Summary = RaceSummary;
    type Detail = RaceWithDetails;
    type Filters = RaceFilters;

    const NAME: &'static str = "race";
    const INITIALIZATION: Initialization = Initialization::Remote("init_race_catalog");
    const SEARCH_COMMAND: &'static str = "search_races";
    const DETAIL_COMMAND: &'static str = "get_race_details";
    const DETAIL_ENVELOPE: Envelope = Envelope::JsonString;

    fn search_args(filters: &RaceFilters) -> Value {
        json!({
            "search": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "sizes": non_empty(&filters.sizes),
            "has_darkvision": filters.has_darkvision,
            "has_flight": filters.has_flight,
        })
    }
}

// ============================================================================
// Feats
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatSummary {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub prerequisites: Option<String>,
    #[serde(default)]
    pub brief: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub has_prerequisites: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feat {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub srd: Option<bool>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub prerequisite: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub ability: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub additional_spells: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Feat catalog descriptor. Feats need no priming.
pub struct Feats;

impl CatalogDomain for Feats {
    type Summary = FeatSummary;
    type Detail = Feat;
    type Filters = FeatFilters;

    const NAME: &'static str = "feat";
    const INITIALIZATION: Initialization = Initialization::Local;
    const SEARCH_COMMAND: &'static str = "search_feats";
    const DETAIL_COMMAND: &'static str = "get_feat_details";

    fn search_args(filters: &FeatFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "has_prerequisites": filters.has_prerequisites,
        })
    }
}

// ============================================================================
// Backgrounds
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub skills: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub languages: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub tools: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub feature: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub has_tools: Option<bool>,
}

/// Background record. Proficiency blocks are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Background catalog descriptor.
pub struct Backgrounds;

impl CatalogDomain for Backgrounds {
    type Summary = BackgroundSummary;
    type Detail = Background;
    type Filters = BackgroundFilters;

    const NAME: &'static str = "background";
    const INITIALIZATION: Initialization = Initialization::Remote("init_background_catalog");
    const SEARCH_COMMAND: &'static str = "search_backgrounds";
    const DETAIL_COMMAND: &'static str = "get_background_details";

    fn search_args(filters: &BackgroundFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "hasTools": filters.has_tools,
        })
    }
}

// ============================================================================
// Optional features (invocations, maneuvers, metamagic, ...)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalFeatureSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub feature_types: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub feature_type_full: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub prerequisite_text: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub grants_spells: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionalFeatureFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub feature_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalFeature {
    pub name: String,
    pub source: String,
    #[serde(default, alias = "featureType", deserialize_with = "lenient::nullable")]
    pub feature_type: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Optional feature catalog descriptor.
pub struct OptionalFeatures;

impl CatalogDomain for OptionalFeatures {
    type Summary = OptionalFeatureSummary;
    type Detail = OptionalFeature;
    type Filters = OptionalFeatureFilters;

    const NAME: &'static str = "optional feature";
    const INITIALIZATION: Initialization =
        Initialization::Remote("init_optional_feature_catalog");
    const SEARCH_COMMAND: &'static str = "search_optional_features";
    const DETAIL_COMMAND: &'static str = "get_optional_feature_details";

    fn search_args(filters: &OptionalFeatureFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "featureTypes": non_empty(&filters.feature_types),
        })
    }
}
