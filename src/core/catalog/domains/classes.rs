//! Classes and subclasses.
//!
//! Classes are served from the database-backed command family (`*_db`).
//! Nothing is primed remotely; the façade latch is set locally. Search rows
//! mix classes and subclasses, distinguished by `row_type`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::core::catalog::filters::non_blank;
use crate::core::catalog::lenient;
use crate::core::catalog::{Catalog, CatalogDomain, Entry, Initialization};
use crate::core::gateway::{call, Envelope};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub hit_dice: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub proficiency: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub primary_ability: String,
    #[serde(default)]
    pub spellcasting_ability: Option<String>,
    #[serde(default)]
    pub subclass_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub description: String,
    #[serde(default)]
    pub subclass_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub row_type: String,
}

impl ClassSummary {
    pub fn is_subclass(&self) -> bool {
        self.row_type == "subclass"
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassFilters {
    pub name: Option<String>,
    pub sources: Vec<String>,
    pub has_spellcasting: bool,
    pub primary_abilities: Vec<String>,
}

/// Class record with its subclasses, features and fluff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassWithDetails {
    pub class: ClassRecord,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub subclasses: Vec<Subclass>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub features: Vec<ClassFeature>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub subclass_features: Vec<SubclassFeature>,
    #[serde(default)]
    pub fluff: Option<Fluff>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub subclass_fluff: Vec<Fluff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub hd: Option<Value>,
    #[serde(default)]
    pub proficiency: Option<Value>,
    #[serde(default)]
    pub starting_proficiencies: Option<Value>,
    #[serde(default)]
    pub spellcasting_ability: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub class_table_groups: Vec<Value>,
    #[serde(default)]
    pub subclass_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub multiclassing: Option<Value>,
    #[serde(default)]
    pub caster_progression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subclass {
    pub name: String,
    pub source: String,
    pub class_name: String,
    pub class_source: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub spellcasting_ability: Option<String>,
    #[serde(default)]
    pub caster_progression: Option<String>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub subclass_table_groups: Vec<Value>,
    #[serde(default)]
    pub intro_description: Option<String>,
    #[serde(default)]
    pub fluff: Option<Fluff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassFeature {
    pub name: String,
    pub source: String,
    pub class_name: String,
    pub class_source: String,
    pub level: u8,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubclassFeature {
    pub name: String,
    pub source: String,
    pub class_name: String,
    pub class_source: String,
    #[serde(default)]
    pub subclass_short_name: Option<String>,
    pub subclass_source: String,
    pub level: u8,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
}

/// Flavor text for a class or subclass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fluff {
    pub name: String,
    pub source: String,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub entries: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient::nullable")]
    pub images: Vec<Value>,
}

/// Class catalog descriptor.
pub struct Classes;

impl CatalogDomain for Classes {
    type Summary = ClassSummary;
    type Detail = ClassWithDetails;
    type Filters = ClassFilters;

    const NAME: &'static str = "class";
    const INITIALIZATION: Initialization = Initialization::Local;
    const SEARCH_COMMAND: &'static str = "search_classes_db";
    const DETAIL_COMMAND: &'static str = "get_class_details_db";

    fn search_args(filters: &ClassFilters) -> Value {
        json!({
            "filters": {
                "name": non_blank(&filters.name),
                "sources": if filters.sources.is_empty() { None } else { Some(&filters.sources) },
                // Only an explicit requirement is forwarded; false means "any".
                "has_spellcasting": filters.has_spellcasting.then_some(true),
                "primary_abilities": if filters.primary_abilities.is_empty() { None } else { Some(&filters.primary_abilities) },
            }
        })
    }

    fn detail_args(name: &str, source: &str) -> Value {
        json!({ "className": name, "classSource": source })
    }
}

impl Catalog<Classes> {
    /// All subclasses of one class. Empty on failure.
    pub async fn subclasses(&self, class_name: &str, class_source: &str) -> Vec<Subclass> {
        let args = json!({ "class_name": class_name, "class_source": class_source });
        match call(self.gateway().as_ref(), "get_class_subclasses_db", &args, Envelope::Bare).await {
            Ok(Some(subclasses)) => subclasses,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(class_name, class_source, error = %e, "Failed to load subclasses");
                Vec::new()
            }
        }
    }

    /// One subclass, or `None` when missing or on failure.
    pub async fn subclass_details(
        &self,
        subclass_name: &str,
        class_name: &str,
        class_source: &str,
    ) -> Option<Subclass> {
        let args = json!({
            "subclassName": subclass_name,
            "className": class_name,
            "classSource": class_source,
        });
        match call(self.gateway().as_ref(), "get_subclass_details_db", &args, Envelope::Bare).await {
            Ok(subclass) => subclass,
            Err(e) => {
                warn!(subclass_name, class_name, error = %e, "Failed to load subclass details");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::MemoryGateway;
    use std::sync::Arc;

    #[test]
    fn test_search_args_nested_under_filters() {
        let args = Classes::search_args(&ClassFilters {
            name: Some("wiz".into()),
            ..Default::default()
        });
        assert_eq!(
            args,
            json!({"filters": {
                "name": "wiz",
                "sources": null,
                "has_spellcasting": null,
                "primary_abilities": null,
            }})
        );
    }

    #[tokio::test]
    async fn test_initialize_is_local() {
        let gateway = MemoryGateway::new().with_response("search_classes_db", json!([]));
        let catalog = Catalog::<Classes>::new(Arc::new(gateway.clone()));

        catalog.search(&ClassFilters::default()).await;

        assert!(catalog.is_initialized().await);
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_detail_args_and_subclasses() {
        let gateway = MemoryGateway::new()
            .with_handler("get_class_details_db", |args| {
                assert_eq!(args, json!({"className": "Wizard", "classSource": "PHB"}));
                Ok(json!({"class": {"name": "Wizard", "source": "PHB"}}))
            })
            .with_handler("get_class_subclasses_db", |args| {
                assert_eq!(args["class_name"], "Wizard");
                Ok(json!([{
                    "name": "School of Evocation", "source": "PHB",
                    "className": "Wizard", "classSource": "PHB", "shortName": "Evocation"
                }]))
            })
            .with_failure("get_subclass_details_db", "boom");
        let catalog = Catalog::<Classes>::new(Arc::new(gateway));

        let details = catalog.get_details("Wizard", "PHB").await.into_option().unwrap();
        assert_eq!(details.class.name, "Wizard");
        assert!(details.subclasses.is_empty());

        let subclasses = catalog.subclasses("Wizard", "PHB").await;
        assert_eq!(subclasses[0].short_name.as_deref(), Some("Evocation"));

        assert!(catalog
            .subclass_details("School of Evocation", "Wizard", "PHB")
            .await
            .is_none());
    }
}
