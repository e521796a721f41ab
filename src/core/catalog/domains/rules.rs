//! Rules reference: actions, conditions, variant rules, tables and languages.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::catalog::filters::{non_blank, non_empty};
use crate::core::catalog::lenient;
use crate::core::catalog::{Catalog, CatalogDomain, Entry, Initialization};

// ============================================================================
// Actions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub see_also: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub time_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub time: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Action catalog descriptor.
pub struct Actions;

impl CatalogDomain for Actions {
    type Summary = ActionSummary;
    type Detail = Action;
    type Filters = ActionFilters;

    const NAME: &'static str = "action";
    const INITIALIZATION: Initialization = Initialization::Remote("init_action_catalog");
    const SEARCH_COMMAND: &'static str = "search_actions";
    const DETAIL_COMMAND: &'static str = "get_action_details";

    fn search_args(filters: &ActionFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "timeFilter": non_blank(&filters.time_filter),
        })
    }
}

// ============================================================================
// Conditions and diseases
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub name: String,
    pub source: String,
    /// `Condition` or `Disease`.
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub item_type: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub type_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub item: ConditionItem,
    #[serde(default)]
    pub fluff: Option<Value>,
}

/// The record, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConditionItem {
    Condition {
        #[serde(rename = "Condition")]
        record: ConditionRecord,
    },
    Disease {
        #[serde(rename = "Disease")]
        record: ConditionRecord,
    },
}

impl ConditionItem {
    pub fn record(&self) -> &ConditionRecord {
        match self {
            ConditionItem::Condition { record } | ConditionItem::Disease { record } => record,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

/// Condition catalog descriptor.
pub struct Conditions;

impl CatalogDomain for Conditions {
    type Summary = ConditionSummary;
    type Detail = Condition;
    type Filters = ConditionFilters;

    const NAME: &'static str = "condition";
    const INITIALIZATION: Initialization = Initialization::Remote("init_condition_catalog");
    const SEARCH_COMMAND: &'static str = "search_conditions";
    const DETAIL_COMMAND: &'static str = "get_condition_details";

    fn search_args(filters: &ConditionFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "typeFilter": non_blank(&filters.type_filter),
        })
    }
}

// ============================================================================
// Variant rules
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRuleSummary {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantRuleFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRule {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

/// Variant rule catalog descriptor. No priming.
pub struct VariantRules;

impl CatalogDomain for VariantRules {
    type Summary = VariantRuleSummary;
    type Detail = VariantRule;
    type Filters = VariantRuleFilters;

    const NAME: &'static str = "variant rule";
    const INITIALIZATION: Initialization = Initialization::Local;
    const SEARCH_COMMAND: &'static str = "search_variant_rules";
    const DETAIL_COMMAND: &'static str = "get_variant_rule_details";

    fn search_args(filters: &VariantRuleFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "rule_types": non_empty(&filters.types),
            "sources": non_empty(&filters.sources),
        })
    }
}

impl Catalog<VariantRules> {
    pub async fn rule_types(&self) -> Vec<String> {
        self.facet("get_variant_rule_types").await
    }

    pub async fn sources(&self) -> Vec<String> {
        self.facet("get_variant_rule_sources").await
    }
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub caption: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub columns: u32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub rows: u32,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub categories: Vec<String>,
    pub min_rows: Option<u32>,
    pub max_rows: Option<u32>,
}

/// A rollable or reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub col_labels: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub col_styles: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub rows: Vec<Vec<Entry>>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub intro: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub outro: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub footnotes: Vec<Entry>,
}

/// Table catalog descriptor.
pub struct Tables;

impl CatalogDomain for Tables {
    type Summary = TableSummary;
    type Detail = RuleTable;
    type Filters = TableFilters;

    const NAME: &'static str = "table";
    const INITIALIZATION: Initialization = Initialization::Remote("init_table_catalog");
    const SEARCH_COMMAND: &'static str = "search_tables";
    const DETAIL_COMMAND: &'static str = "get_table_details";

    fn search_args(filters: &TableFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "categories": non_empty(&filters.categories),
            "min_rows": filters.min_rows,
            "max_rows": filters.max_rows,
        })
    }
}

impl Catalog<Tables> {
    pub async fn categories(&self) -> Vec<String> {
        self.facet("get_table_categories").await
    }

    pub async fn sources(&self) -> Vec<String> {
        self.facet("get_table_sources").await
    }
}

// ============================================================================
// Languages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageSummary {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub language_type: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub script: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub typical_speakers: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageFilters {
    pub query: Option<String>,
    pub sources: Vec<String>,
    pub types: Vec<String>,
    pub scripts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub language_type: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub typical_speakers: Vec<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub dialects: Vec<String>,
}

/// Language catalog descriptor.
pub struct Languages;

impl CatalogDomain for Languages {
    type Summary = LanguageSummary;
    type Detail = Language;
    type Filters = LanguageFilters;

    const NAME: &'static str = "language";
    const INITIALIZATION: Initialization = Initialization::Remote("init_language_catalog");
    const SEARCH_COMMAND: &'static str = "search_languages";
    const DETAIL_COMMAND: &'static str = "get_language_details";

    fn search_args(filters: &LanguageFilters) -> Value {
        json!({
            "query": non_blank(&filters.query),
            "sources": non_empty(&filters.sources),
            "types": non_empty(&filters.types),
            "scripts": non_empty(&filters.scripts),
        })
    }
}

impl Catalog<Languages> {
    pub async fn language_types(&self) -> Vec<String> {
        self.facet("get_language_types").await
    }

    pub async fn scripts(&self) -> Vec<String> {
        self.facet("get_language_scripts").await
    }
}
