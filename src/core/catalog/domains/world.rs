//! World content: deities, objects, traps, vehicles, rewards, psionics and cults.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::core::catalog::filters::{non_blank, non_empty};
use crate::core::catalog::lenient;
use crate::core::catalog::{Catalog, CatalogDomain, Entry, Initialization, Lookup};
use crate::core::gateway::{call, Envelope};

/// `{ "entry": "..." }` wrapper used by cult and boon sub-records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryText {
    pub entry: String,
}

// ============================================================================
// Deities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeitySummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub pantheon: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub alignment: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub domains: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeityFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub pantheons: Vec<String>,
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deity {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub pantheon: Option<String>,
    /// Either a single string or a list of alignment codes.
    #[serde(default)]
    pub alignment: Option<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub domains: Vec<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

/// Deity catalog descriptor (database-backed command family).
pub struct Deities;

impl CatalogDomain for Deities {
    type Summary = DeitySummary;
    type Detail = Deity;
    type Filters = DeityFilters;

    const NAME: &'static str = "deity";
    const INITIALIZATION: Initialization = Initialization::Remote("init_deity_catalog");
    const SEARCH_COMMAND: &'static str = "search_deities_db";
    const DETAIL_COMMAND: &'static str = "get_deity_details_db";

    fn search_args(filters: &DeityFilters) -> Value {
        json!({
            "filters": {
                "name": non_blank(&filters.query),
                "sources": non_empty(&filters.sources),
                "pantheons": non_empty(&filters.pantheons),
                "domains": non_empty(&filters.domains),
                "alignments": null,
            }
        })
    }

    fn detail_args(name: &str, source: &str) -> Value {
        json!({ "deityName": name, "deitySource": source })
    }
}

// ============================================================================
// Objects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub object_type: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub size: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub ac: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub hp: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub object_types: Vec<String>,
    pub sizes: Vec<String>,
}

/// Siege engines, statues and other interactive objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldObject {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, alias = "object_type")]
    pub object_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub size: Vec<String>,
    #[serde(default)]
    pub ac: Option<Value>,
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub immune: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub resist: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub vulnerable: Vec<String>,
    #[serde(default, alias = "action_entries", deserialize_with = "lenient::nullable")]
    pub action_entries: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

/// Object catalog descriptor. Details arrive as a JSON string.
pub struct Objects;

impl CatalogDomain for Objects {
    type Summary = ObjectSummary;
    type Detail = WorldObject;
    type Filters = ObjectFilters;

    const NAME: &'static str = "object";
    const INITIALIZATION: Initialization = Initialization::Remote("init_object_catalog");
    const SEARCH_COMMAND: &'static str = "search_objects";
    const DETAIL_COMMAND: &'static str = "get_object_details";
    const DETAIL_ENVELOPE: Envelope = Envelope::JsonString;

    fn search_args(filters: &ObjectFilters) -> Value {
        json!({
            "search": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "object_types": non_empty(&filters.object_types),
            "sizes": non_empty(&filters.sizes),
        })
    }
}

// ============================================================================
// Traps and hazards
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrapSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub trap_type: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrapFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub categories: Vec<String>,
    pub trap_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trap {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub trap_haz_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

/// Trap catalog descriptor.
pub struct Traps;

impl CatalogDomain for Traps {
    type Summary = TrapSummary;
    type Detail = Trap;
    type Filters = TrapFilters;

    const NAME: &'static str = "trap";
    const INITIALIZATION: Initialization = Initialization::Remote("init_trap_catalog");
    const SEARCH_COMMAND: &'static str = "search_traps";
    const DETAIL_COMMAND: &'static str = "get_trap_details";

    fn search_args(filters: &TrapFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "categories": non_empty(&filters.categories),
            "trap_types": non_empty(&filters.trap_types),
        })
    }
}

impl Catalog<Traps> {
    pub async fn trap_types(&self) -> Vec<String> {
        self.facet("get_trap_types").await
    }
}

// ============================================================================
// Vehicles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub cap_crew: Option<u32>,
    #[serde(default)]
    pub cap_passenger: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub capacity: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub terrain: Vec<String>,
    #[serde(default)]
    pub pace: Option<u32>,
    #[serde(default)]
    pub speed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub types: Vec<String>,
    pub terrains: Vec<String>,
    pub sizes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub cap_crew: Option<u32>,
    #[serde(default)]
    pub cap_passenger: Option<u32>,
    #[serde(default)]
    pub cap_cargo: Option<f64>,
    #[serde(default)]
    pub ac: Option<u32>,
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub speed: Option<Value>,
    #[serde(default)]
    pub pace: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub terrain: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub weapon: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

/// Vehicle catalog descriptor (database-backed, nothing to prime).
pub struct Vehicles;

impl CatalogDomain for Vehicles {
    type Summary = VehicleSummary;
    type Detail = Vehicle;
    type Filters = VehicleFilters;

    const NAME: &'static str = "vehicle";
    const INITIALIZATION: Initialization = Initialization::Local;
    const SEARCH_COMMAND: &'static str = "search_vehicles_db";
    const DETAIL_COMMAND: &'static str = "get_vehicle_details_db";

    fn search_args(filters: &VehicleFilters) -> Value {
        json!({
            "filters": {
                "name": non_blank(&filters.query),
                "sources": non_empty(&filters.sources),
                "vehicle_types": non_empty(&filters.types),
                "terrains": non_empty(&filters.terrains),
                "sizes": non_empty(&filters.sizes),
            }
        })
    }

    fn detail_args(name: &str, source: &str) -> Value {
        json!({ "vehicleName": name, "vehicleSource": source })
    }
}

impl Catalog<Vehicles> {
    pub async fn vehicle_types(&self) -> Vec<String> {
        self.facet("get_vehicle_types_db").await
    }

    pub async fn terrains(&self) -> Vec<String> {
        self.facet("get_vehicle_terrains_db").await
    }

    pub async fn sizes(&self) -> Vec<String> {
        self.facet("get_vehicle_sizes_db").await
    }

    /// Sources that contain at least one vehicle, from the per-source counts.
    pub async fn sources(&self) -> Vec<String> {
        match call::<_, Option<Vec<(String, u64)>>>(
            self.gateway().as_ref(),
            "get_vehicle_statistics_db",
            &json!({}),
            Envelope::Bare,
        )
        .await
        {
            Ok(stats) => stats
                .unwrap_or_default()
                .into_iter()
                .map(|(source, _)| source)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to load vehicle sources");
                Vec::new()
            }
        }
    }
}

// ============================================================================
// Rewards (blessings, charms, epic boons)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub reward_type: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub has_prerequisites: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub reward_types: Vec<String>,
    pub has_prerequisites: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub reward_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub prerequisite: Vec<Value>,
    #[serde(default)]
    pub duration: Option<String>,
}

/// Reward catalog descriptor.
pub struct Rewards;

impl CatalogDomain for Rewards {
    type Summary = RewardSummary;
    type Detail = Reward;
    type Filters = RewardFilters;

    const NAME: &'static str = "reward";
    const INITIALIZATION: Initialization = Initialization::Remote("initialize_reward_catalog");
    const SEARCH_COMMAND: &'static str = "search_rewards";
    const DETAIL_COMMAND: &'static str = "get_reward_details";

    fn search_args(filters: &RewardFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "reward_types": non_empty(&filters.reward_types),
            "has_prerequisites": filters.has_prerequisites,
        })
    }
}

impl Catalog<Rewards> {
    pub async fn reward_types(&self) -> Vec<String> {
        self.facet("get_reward_types").await
    }

    pub async fn sources(&self) -> Vec<String> {
        self.facet("get_reward_sources").await
    }
}

// ============================================================================
// Psionics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsionicSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub psionic_type: String,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PsionicFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub psionic_types: Vec<String>,
    pub orders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Psionic {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub psionic_type: String,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub modes: Vec<PsionicMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsionicMode {
    pub name: String,
    pub cost: PsiCost,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub concentration: Option<PsiConcentration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PsiCost {
    pub min: u32,
    #[serde(default)]
    pub max: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsiConcentration {
    pub duration: u32,
    pub unit: String,
}

/// Psionic catalog descriptor.
pub struct Psionics;

impl CatalogDomain for Psionics {
    type Summary = PsionicSummary;
    type Detail = Psionic;
    type Filters = PsionicFilters;

    const NAME: &'static str = "psionic";
    const INITIALIZATION: Initialization = Initialization::Local;
    const SEARCH_COMMAND: &'static str = "search_psionics";
    const DETAIL_COMMAND: &'static str = "get_psionic_details";

    fn search_args(filters: &PsionicFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "psionic_types": non_empty(&filters.psionic_types),
            "orders": non_empty(&filters.orders),
            "sources": non_empty(&filters.sources),
        })
    }
}

impl Catalog<Psionics> {
    pub async fn orders(&self) -> Vec<String> {
        self.facet("get_psionic_orders").await
    }

    pub async fn sources(&self) -> Vec<String> {
        self.facet("get_psionic_sources").await
    }
}

// ============================================================================
// Cults and demonic boons
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultSummary {
    pub name: String,
    pub source: String,
    /// `cult` or `boon`.
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub item_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CultFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub item_types: Vec<String>,
    pub subtypes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cult {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub cult_type: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub cultists: Option<EntryText>,
    #[serde(default)]
    pub goal: Option<EntryText>,
    #[serde(default)]
    pub signature_spells: Option<EntryText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boon {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub boon_type: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub ability: Option<EntryText>,
    #[serde(default)]
    pub signature_spells: Option<EntryText>,
}

/// Cult catalog descriptor.
pub struct Cults;

impl CatalogDomain for Cults {
    type Summary = CultSummary;
    type Detail = Cult;
    type Filters = CultFilters;

    const NAME: &'static str = "cult";
    const INITIALIZATION: Initialization = Initialization::Local;
    const SEARCH_COMMAND: &'static str = "search_cults";
    const DETAIL_COMMAND: &'static str = "get_cult_details";

    fn search_args(filters: &CultFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "item_types": non_empty(&filters.item_types),
            "subtypes": non_empty(&filters.subtypes),
            "sources": non_empty(&filters.sources),
        })
    }
}

impl Catalog<Cults> {
    /// Boons share the cult search but have their own detail command.
    pub async fn boon_details(&self, name: &str, source: &str) -> Lookup<Boon> {
        let args = Cults::detail_args(name, source);
        match call::<_, Option<Boon>>(self.gateway().as_ref(), "get_boon_details", &args, Envelope::Bare)
            .await
        {
            Ok(Some(boon)) => Lookup::Found(boon),
            Ok(None) => Lookup::NotFound,
            Err(e) => {
                warn!(name, source, error = %e, "Failed to get boon details");
                Lookup::Failed(e.to_string())
            }
        }
    }

    pub async fn cult_types(&self) -> Vec<String> {
        self.facet("get_cult_types").await
    }

    pub async fn sources(&self) -> Vec<String> {
        self.facet("get_cult_sources").await
    }
}
