//! Per-domain catalog descriptors.
//!
//! Each submodule defines the summary/detail/filter types for one kind of
//! reference content and a zero-sized marker implementing
//! [`CatalogDomain`](super::CatalogDomain). The façade itself is always
//! `Catalog<Marker>`; the aliases below name the common ones.

pub mod character;
pub mod classes;
pub mod items;
pub mod monsters;
pub mod rules;
pub mod spells;
pub mod world;

pub use character::{
    Background, BackgroundFilters, BackgroundSummary, Backgrounds, Feat, FeatFilters,
    FeatSummary, Feats, OptionalFeature, OptionalFeatureFilters, OptionalFeatureSummary,
    OptionalFeatures, Race, RaceFilters, RaceSummary, RaceWithDetails, Races,
};
pub use classes::{
    ClassFeature, ClassFilters, ClassRecord, ClassSummary, ClassWithDetails, Classes, Fluff,
    Subclass, SubclassFeature,
};
pub use items::{Item, ItemFilters, ItemSummary, Items};
pub use monsters::{
    FluffHref, FluffImage, Monster, MonsterFilters, MonsterSummary, Monsters, NamedBlock,
};
pub use rules::{
    Action, ActionFilters, ActionSummary, Actions, Condition, ConditionFilters, ConditionItem,
    ConditionRecord, ConditionSummary,
    Conditions, Language, LanguageFilters, LanguageSummary, Languages, RuleTable, TableFilters,
    TableSummary, Tables, VariantRule, VariantRuleFilters, VariantRuleSummary, VariantRules,
};
pub use spells::{Spell, SpellFilters, SpellSummary, Spells};
pub use world::{
    Cult, CultFilters, CultSummary, Cults, Deities, Deity, DeityFilters, DeitySummary,
    Boon, ObjectFilters, ObjectSummary, Objects, Psionic, PsionicFilters, PsionicSummary, Psionics,
    Reward, RewardFilters, RewardSummary, Rewards, Trap, TrapFilters, TrapSummary, Traps,
    Vehicle, VehicleFilters, VehicleSummary, Vehicles, WorldObject,
};

use super::Catalog;

pub type SpellCatalog = Catalog<Spells>;
pub type ItemCatalog = Catalog<Items>;
pub type MonsterCatalog = Catalog<Monsters>;
pub type ClassCatalog = Catalog<Classes>;
pub type FeatCatalog = Catalog<Feats>;
