//! Unified search across the core reference catalogs.
//!
//! [`SearchService`] owns one façade per searchable category and dispatches
//! by [`Category`] (list searches) or [`DetailKind`] (detail lookups). The two
//! enumerations are deliberately separate: `Magic Items` and `Equipment`
//! both resolve to `item` details.
//!
//! [`SearchSession`] layers UI-facing state (query, sort, debounced search,
//! reference clicks) on top.

mod debounce;
mod session;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::core::catalog::domains::{
    ClassFilters, ClassSummary, ClassWithDetails, Classes, Feat, FeatFilters, FeatSummary, Feats,
    Item, ItemFilters, ItemSummary, Items, Monster, MonsterFilters, MonsterSummary, Monsters,
    Spell, SpellFilters, SpellSummary, Spells,
};
use crate::core::catalog::{Catalog, Lookup};
use crate::core::gateway::SharedGateway;

pub use debounce::Debouncer;
pub use session::{Modal, ReferenceEvent, SearchSession, SessionSnapshot, SortDirection};

// ============================================================================
// Categories
// ============================================================================

/// List-search category, as labelled in the source browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Spells,
    Equipment,
    #[serde(rename = "Magic Items")]
    MagicItems,
    Monsters,
    Classes,
    Feats,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Spells,
        Category::Equipment,
        Category::MagicItems,
        Category::Monsters,
        Category::Classes,
        Category::Feats,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Spells => "Spells",
            Category::Equipment => "Equipment",
            Category::MagicItems => "Magic Items",
            Category::Monsters => "Monsters",
            Category::Classes => "Classes",
            Category::Feats => "Feats",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Detail-lookup kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    Spell,
    Item,
    Monster,
    Class,
    Feat,
}

impl DetailKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailKind::Spell => "spell",
            DetailKind::Item => "item",
            DetailKind::Monster => "monster",
            DetailKind::Class => "class",
            DetailKind::Feat => "feat",
        }
    }
}

impl FromStr for DetailKind {
    type Err = String;

    /// Accepts `creature` as an alias for `monster`, matching reference tags.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spell" => Ok(DetailKind::Spell),
            "item" => Ok(DetailKind::Item),
            "monster" | "creature" => Ok(DetailKind::Monster),
            "class" => Ok(DetailKind::Class),
            "feat" => Ok(DetailKind::Feat),
            other => Err(format!("Unknown detail kind: {other}")),
        }
    }
}

// ============================================================================
// Parameters and Results
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellCriteria {
    pub school: Option<String>,
    pub level: Option<u8>,
    pub ritual: bool,
    pub concentration: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentCriteria {
    pub item_type: Option<String>,
    pub rarity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonsterCriteria {
    pub sizes: Vec<String>,
    pub types: Vec<String>,
    pub min_cr: Option<f64>,
    pub max_cr: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MagicItemCriteria {
    pub rarity: Option<String>,
}

/// Per-category filter panels. Only the panel matching the searched
/// category is consulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub spells: SpellCriteria,
    pub equipment: EquipmentCriteria,
    pub monsters: MonsterCriteria,
    pub magic_items: MagicItemCriteria,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub sources: Vec<String>,
    pub filters: SearchFilters,
}

/// Rows returned by a category search.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchResults {
    #[default]
    Empty,
    Spells(Vec<SpellSummary>),
    Items(Vec<ItemSummary>),
    Monsters(Vec<MonsterSummary>),
    Classes(Vec<ClassSummary>),
    Feats(Vec<FeatSummary>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Empty => 0,
            SearchResults::Spells(rows) => rows.len(),
            SearchResults::Items(rows) => rows.len(),
            SearchResults::Monsters(rows) => rows.len(),
            SearchResults::Classes(rows) => rows.len(),
            SearchResults::Feats(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(name, source)` of every row, in order.
    pub fn keys(&self) -> Vec<(&str, &str)> {
        fn keys<'a, T>(rows: &'a [T], f: impl Fn(&'a T) -> (&'a str, &'a str)) -> Vec<(&'a str, &'a str)> {
            rows.iter().map(f).collect()
        }
        match self {
            SearchResults::Empty => Vec::new(),
            SearchResults::Spells(rows) => keys(rows, |r| (r.name.as_str(), r.source.as_str())),
            SearchResults::Items(rows) => keys(rows, |r| (r.name.as_str(), r.source.as_str())),
            SearchResults::Monsters(rows) => keys(rows, |r| (r.name.as_str(), r.source.as_str())),
            SearchResults::Classes(rows) => keys(rows, |r| (r.name.as_str(), r.source.as_str())),
            SearchResults::Feats(rows) => keys(rows, |r| (r.name.as_str(), r.source.as_str())),
        }
    }
}

/// A fetched detail record.
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    Spell(Box<Spell>),
    Item(Box<Item>),
    Monster(Box<Monster>),
    Class(Box<ClassWithDetails>),
    Feat(Box<Feat>),
}

impl Details {
    pub fn name(&self) -> &str {
        match self {
            Details::Spell(d) => &d.name,
            Details::Item(d) => &d.name,
            Details::Monster(d) => &d.name,
            Details::Class(d) => &d.class.name,
            Details::Feat(d) => &d.name,
        }
    }
}

/// Content filter for the combined source search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    #[default]
    All,
    Spells,
    /// Mundane gear: rarities `none` and `common`.
    Items,
    /// Uncommon through artifact.
    MagicItems,
    Monsters,
}

const MUNDANE_RARITIES: [&str; 2] = ["none", "common"];
const MAGIC_RARITIES: [&str; 5] = ["uncommon", "rare", "very rare", "legendary", "artifact"];

/// Results of a combined source search, one list per domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceResults {
    pub spells: Vec<SpellSummary>,
    pub items: Vec<ItemSummary>,
    pub monsters: Vec<MonsterSummary>,
}

impl SourceResults {
    pub fn total(&self) -> usize {
        self.spells.len() + self.items.len() + self.monsters.len()
    }
}

/// Derive backend source codes from book ids: last `-` segment, upper-cased.
///
/// No check is made that the result names a real source.
pub fn map_book_ids_to_sources<S: AsRef<str>>(book_ids: &[S]) -> Vec<String> {
    book_ids
        .iter()
        .map(|id| {
            let id = id.as_ref();
            id.rsplit('-').next().unwrap_or(id).to_uppercase()
        })
        .collect()
}

// ============================================================================
// Search Service
// ============================================================================

/// Category dispatch over the core reference façades.
pub struct SearchService {
    gateway: SharedGateway,
    spells: Catalog<Spells>,
    items: Catalog<Items>,
    monsters: Catalog<Monsters>,
    classes: Catalog<Classes>,
    feats: Catalog<Feats>,
}

impl SearchService {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            spells: Catalog::new(Arc::clone(&gateway)),
            items: Catalog::new(Arc::clone(&gateway)),
            monsters: Catalog::new(Arc::clone(&gateway)),
            classes: Catalog::new(Arc::clone(&gateway)),
            feats: Catalog::new(Arc::clone(&gateway)),
            gateway,
        }
    }

    pub fn gateway(&self) -> &SharedGateway {
        &self.gateway
    }

    pub fn spells(&self) -> &Catalog<Spells> {
        &self.spells
    }

    pub fn items(&self) -> &Catalog<Items> {
        &self.items
    }

    pub fn monsters(&self) -> &Catalog<Monsters> {
        &self.monsters
    }

    pub fn classes(&self) -> &Catalog<Classes> {
        &self.classes
    }

    pub fn feats(&self) -> &Catalog<Feats> {
        &self.feats
    }

    /// Prime the façade behind `category`.
    pub async fn initialize(&self, category: Category) {
        match category {
            Category::Spells => self.spells.initialize().await,
            Category::Equipment | Category::MagicItems => self.items.initialize().await,
            Category::Monsters => self.monsters.initialize().await,
            Category::Classes => self.classes.initialize().await,
            Category::Feats => self.feats.initialize().await,
        };
    }

    /// Search by category label. Unknown labels yield no results.
    pub async fn search_label(&self, label: &str, params: &SearchParams) -> SearchResults {
        match Category::from_label(label) {
            Some(category) => self.search(category, params).await,
            None => {
                debug!(label, "Unknown search category");
                SearchResults::Empty
            }
        }
    }

    #[instrument(skip(self, params), fields(query = %params.query))]
    pub async fn search(&self, category: Category, params: &SearchParams) -> SearchResults {
        let query = Some(params.query.clone()).filter(|q| !q.is_empty());
        let sources = params.sources.clone();
        let filters = &params.filters;

        let results = match category {
            Category::Spells => {
                let criteria = &filters.spells;
                SearchResults::Spells(
                    self.spells
                        .search(&SpellFilters {
                            query,
                            sources,
                            schools: criteria.school.iter().cloned().collect(),
                            levels: criteria.level.into_iter().collect(),
                            // Unchecked boxes mean "don't care", not "must be false".
                            ritual: criteria.ritual.then_some(true),
                            concentration: criteria.concentration.then_some(true),
                        })
                        .await,
                )
            }
            Category::Equipment => SearchResults::Items(
                self.items
                    .search(&ItemFilters {
                        query,
                        sources,
                        types: filters.equipment.item_type.iter().cloned().collect(),
                        ..Default::default()
                    })
                    .await,
            ),
            Category::MagicItems => {
                let wanted = filters.magic_items.rarity.as_deref().filter(|r| !r.is_empty());
                let all = self
                    .items
                    .search(&ItemFilters {
                        query,
                        sources,
                        ..Default::default()
                    })
                    .await;
                SearchResults::Items(
                    all.into_iter()
                        .filter(|item| item.is_magic())
                        .filter(|item| wanted.map_or(true, |r| item.rarity == r))
                        .collect(),
                )
            }
            Category::Monsters => {
                let criteria = &filters.monsters;
                SearchResults::Monsters(
                    self.monsters
                        .search(&MonsterFilters {
                            query,
                            sources,
                            sizes: criteria.sizes.clone(),
                            types: criteria.types.clone(),
                            min_cr: criteria.min_cr,
                            max_cr: criteria.max_cr,
                        })
                        .await,
                )
            }
            Category::Classes => SearchResults::Classes(
                self.classes
                    .search(&ClassFilters {
                        name: query,
                        ..Default::default()
                    })
                    .await,
            ),
            Category::Feats => SearchResults::Feats(
                self.feats
                    .search(&FeatFilters {
                        query,
                        ..Default::default()
                    })
                    .await,
            ),
        };

        debug!(%category, count = results.len(), "Search complete");
        results
    }

    /// Fetch one record by kind.
    pub async fn get_details(&self, kind: DetailKind, name: &str, source: &str) -> Lookup<Details> {
        match kind {
            DetailKind::Spell => self
                .spells
                .get_details(name, source)
                .await
                .map(|d| Details::Spell(Box::new(d))),
            DetailKind::Item => self
                .items
                .get_details(name, source)
                .await
                .map(|d| Details::Item(Box::new(d))),
            DetailKind::Monster => self
                .monsters
                .get_details(name, source)
                .await
                .map(|d| Details::Monster(Box::new(d))),
            DetailKind::Class => self
                .classes
                .get_details(name, source)
                .await
                .map(|d| Details::Class(Box::new(d))),
            DetailKind::Feat => self
                .feats
                .get_details(name, source)
                .await
                .map(|d| Details::Feat(Box::new(d))),
        }
    }

    /// Distinct sources among the most recent class results.
    pub async fn class_sources(&self) -> Vec<String> {
        self.classes
            .results()
            .await
            .into_iter()
            .map(|c| c.source)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Combined search over spells, items and monsters.
    ///
    /// For [`ContentType::All`] the three searches run concurrently. Each
    /// façade is fail-soft, so one failing domain leaves the others intact.
    #[instrument(skip(self, sources))]
    pub async fn search_all(
        &self,
        content: ContentType,
        query: &str,
        sources: &[String],
    ) -> SourceResults {
        let query = Some(query.to_string()).filter(|q| !q.is_empty());
        let sources = sources.to_vec();

        let spell_filters = SpellFilters {
            query: query.clone(),
            sources: sources.clone(),
            ..Default::default()
        };
        let item_filters = |rarities: &[&str]| ItemFilters {
            query: query.clone(),
            sources: sources.clone(),
            rarities: rarities.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        };
        let monster_filters = MonsterFilters {
            query: query.clone(),
            sources: sources.clone(),
            ..Default::default()
        };

        let mut results = SourceResults::default();
        match content {
            ContentType::Spells => {
                self.spells.initialize().await;
                results.spells = self.spells.search(&spell_filters).await;
            }
            ContentType::Items => {
                self.items.initialize().await;
                results.items = self.items.search(&item_filters(&MUNDANE_RARITIES)).await;
            }
            ContentType::MagicItems => {
                self.items.initialize().await;
                results.items = self.items.search(&item_filters(&MAGIC_RARITIES)).await;
            }
            ContentType::Monsters => {
                self.monsters.initialize().await;
                results.monsters = self.monsters.search(&monster_filters).await;
            }
            ContentType::All => {
                futures::join!(
                    self.spells.initialize(),
                    self.items.initialize(),
                    self.monsters.initialize()
                );
                let all_items = item_filters(&[]);
                let (spells, items, monsters) = futures::join!(
                    self.spells.search(&spell_filters),
                    self.items.search(&all_items),
                    self.monsters.search(&monster_filters)
                );
                results = SourceResults {
                    spells,
                    items,
                    monsters,
                };
            }
        }

        debug!(total = results.total(), "Combined search complete");
        results
    }
}
