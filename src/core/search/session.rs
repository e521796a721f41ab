//! Interactive search session.
//!
//! Holds what a source browser panel needs between keystrokes: the selected
//! category and books, the query, filter panels, sort state, the latest
//! results, and a stack of open detail modals.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{
    map_book_ids_to_sources, Category, Debouncer, DetailKind, Details, SearchFilters,
    SearchParams, SearchResults, SearchService,
};
use crate::config::SearchConfig;
use crate::core::catalog::domains::{ClassSummary, FeatSummary, ItemSummary, MonsterSummary, SpellSummary};
use crate::core::catalog::Lookup;
use crate::core::formatters::{
    format_class_details, format_feat_details, format_item_details, format_monster_details,
    format_spell_details, Record,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// One open detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modal {
    pub title: String,
    pub content: String,
}

/// A click on a cross-reference inside rendered rule text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Observable session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub category: Category,
    pub query: String,
    pub selected_books: Vec<String>,
    pub filters: SearchFilters,
    pub search_performed: bool,
    pub sort_column: String,
    pub sort_direction: SortDirection,
    pub results: SearchResults,
    pub modals: Vec<Modal>,
}

pub struct SearchSession {
    service: Arc<SearchService>,
    config: SearchConfig,
    state: RwLock<SessionSnapshot>,
    tickets: AtomicU64,
    applied: AtomicU64,
    debouncer: Debouncer,
}

impl SearchSession {
    pub fn new(
        service: Arc<SearchService>,
        category: Category,
        selected_books: Vec<String>,
        config: SearchConfig,
    ) -> Arc<Self> {
        let debouncer = Debouncer::new(config.debounce());
        Arc::new(Self {
            service,
            config,
            state: RwLock::new(SessionSnapshot {
                category,
                query: String::new(),
                selected_books,
                filters: SearchFilters::default(),
                search_performed: false,
                sort_column: "name".to_string(),
                sort_direction: SortDirection::Asc,
                results: SearchResults::Empty,
                modals: Vec::new(),
            }),
            tickets: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            debouncer,
        })
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn result_count(&self) -> usize {
        self.state.read().await.results.len()
    }

    /// Prime the current category and run an initial search.
    pub async fn initialize(&self) {
        let category = self.state.read().await.category;
        self.service.initialize(category).await;
        self.perform_search().await;
    }

    /// Switch category, priming it and re-running the search.
    pub async fn set_category(&self, category: Category) {
        self.state.write().await.category = category;
        self.service.initialize(category).await;
        self.perform_search().await;
    }

    /// Replace the selected books and re-run the search.
    pub async fn set_selected_books(&self, books: Vec<String>) {
        self.state.write().await.selected_books = books;
        self.perform_search().await;
    }

    /// Update the query text without searching.
    pub async fn set_query(&self, query: impl Into<String>) {
        self.state.write().await.query = query.into();
    }

    pub async fn update_filters(&self, update: impl FnOnce(&mut SearchFilters)) {
        update(&mut self.state.write().await.filters);
    }

    /// Merge monster size/type selections, keeping the CR bounds.
    pub async fn update_monster_filters(&self, sizes: Option<Vec<String>>, types: Option<Vec<String>>) {
        let mut state = self.state.write().await;
        if let Some(sizes) = sizes {
            state.filters.monsters.sizes = sizes;
        }
        if let Some(types) = types {
            state.filters.monsters.types = types;
        }
    }

    /// Run the search for the current state and store the results.
    ///
    /// Returns the result count. A response for an older search than the
    /// latest one applied is dropped.
    pub async fn perform_search(&self) -> usize {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;

        let (category, params) = {
            let mut state = self.state.write().await;
            state.search_performed = true;
            let sources = if state.selected_books.is_empty() {
                Vec::new()
            } else {
                map_book_ids_to_sources(&state.selected_books)
            };
            (
                state.category,
                SearchParams {
                    query: state.query.clone(),
                    sources,
                    filters: state.filters.clone(),
                },
            )
        };

        let results = self.service.search(category, &params).await;
        let count = results.len();

        let mut state = self.state.write().await;
        if self.applied.fetch_max(ticket, Ordering::SeqCst) > ticket {
            debug!(ticket, "Dropping stale session results");
        } else {
            state.results = results;
        }
        count
    }

    /// Schedule a search after the configured quiet period.
    pub fn debounced_search(self: &Arc<Self>) {
        let session = Arc::clone(self);
        self.debouncer.call(async move {
            session.perform_search().await;
        });
    }

    /// Sort by `column`; clicking the active column flips the direction.
    pub async fn handle_sort(&self, column: &str) {
        let mut state = self.state.write().await;
        if state.sort_column == column {
            state.sort_direction = state.sort_direction.toggled();
        } else {
            state.sort_column = column.to_string();
            state.sort_direction = SortDirection::Asc;
        }
    }

    pub async fn select_spell(&self, spell: &SpellSummary) -> Modal {
        let record = match self.detail(DetailKind::Spell, &spell.name, &spell.source).await {
            Some(Details::Spell(detail)) => Record::Detail(*detail),
            _ => Record::Summary(spell.clone()),
        };
        self.push_modal(&spell.name, format_spell_details(&record)).await
    }

    pub async fn select_item(&self, item: &ItemSummary) -> Modal {
        let record = match self.detail(DetailKind::Item, &item.name, &item.source).await {
            Some(Details::Item(detail)) => Record::Detail(*detail),
            _ => Record::Summary(item.clone()),
        };
        self.push_modal(&item.name, format_item_details(&record)).await
    }

    pub async fn select_monster(&self, monster: &MonsterSummary) -> Modal {
        let record = match self.detail(DetailKind::Monster, &monster.name, &monster.source).await {
            Some(Details::Monster(detail)) => Record::Detail(*detail),
            _ => Record::Summary(monster.clone()),
        };
        let content = format_monster_details(&record, self.service.gateway().as_ref()).await;
        self.push_modal(&monster.name, content).await
    }

    pub async fn select_class(&self, class: &ClassSummary) -> Modal {
        let record = match self.detail(DetailKind::Class, &class.name, &class.source).await {
            Some(Details::Class(detail)) => Record::Detail(*detail),
            _ => Record::Summary(class.clone()),
        };
        self.push_modal(&class.name, format_class_details(&record)).await
    }

    pub async fn select_feat(&self, feat: &FeatSummary) -> Modal {
        let record = match self.detail(DetailKind::Feat, &feat.name, &feat.source).await {
            Some(Details::Feat(detail)) => Record::Detail(*detail),
            _ => Record::Summary(feat.clone()),
        };
        self.push_modal(&feat.name, format_feat_details(&record)).await
    }

    /// Close the modal at `index`, or the topmost one.
    pub async fn close_modal(&self, index: Option<usize>) {
        let mut state = self.state.write().await;
        match index {
            Some(i) if i < state.modals.len() => {
                state.modals.remove(i);
            }
            Some(_) => {}
            None => {
                state.modals.pop();
            }
        }
    }

    /// Resolve a cross-reference click to a rendered modal.
    ///
    /// References without a source fall back to the configured default for
    /// their kind. Creature lookups that miss are retried once with the
    /// name title-cased. Nothing is opened when the record can't be found.
    pub async fn open_reference(&self, event: &ReferenceEvent) -> Option<Modal> {
        let kind: DetailKind = match event.kind.parse() {
            Ok(kind) => kind,
            Err(e) => {
                debug!(kind = %event.kind, "Ignoring reference: {e}");
                return None;
            }
        };
        let source = event
            .source
            .clone()
            .unwrap_or_else(|| self.config.default_source_for(&event.kind).to_string());

        let mut details = self.detail(kind, &event.name, &source).await;
        if details.is_none() && kind == DetailKind::Monster {
            let retry = title_case(&event.name);
            if retry != event.name {
                details = self.detail(kind, &retry, &source).await;
            }
        }

        let details = details?;
        info!(kind = kind.as_str(), name = %event.name, %source, "Opening reference");
        let (title, content) = match details {
            Details::Spell(d) => (event.name.clone(), format_spell_details(&Record::Detail(*d))),
            Details::Item(d) => (event.name.clone(), format_item_details(&Record::Detail(*d))),
            Details::Monster(d) => {
                let title = if d.name.is_empty() { event.name.clone() } else { d.name.clone() };
                let content =
                    format_monster_details(&Record::Detail(*d), self.service.gateway().as_ref()).await;
                (title, content)
            }
            Details::Class(d) => (event.name.clone(), format_class_details(&Record::Detail(*d))),
            Details::Feat(d) => (event.name.clone(), format_feat_details(&Record::Detail(*d))),
        };
        Some(self.push_modal(&title, content).await)
    }

    async fn detail(&self, kind: DetailKind, name: &str, source: &str) -> Option<Details> {
        match self.service.get_details(kind, name, source).await {
            Lookup::Found(details) => Some(details),
            Lookup::NotFound | Lookup::Failed(_) => None,
        }
    }

    async fn push_modal(&self, title: &str, content: String) -> Modal {
        let modal = Modal {
            title: title.to_string(),
            content,
        };
        self.state.write().await.modals.push(modal.clone());
        modal
    }
}

/// `ancient red dragon` → `Ancient Red Dragon`.
fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::MemoryGateway;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn backend() -> MemoryGateway {
        MemoryGateway::new()
            .with_response("initialize_spell_catalog", Value::Null)
            .with_response("initialize_monster_catalog", Value::Null)
            .with_response(
                "search_spells",
                json!([{"name": "Fireball", "level": 3, "school": "V", "source": "PHB"}]),
            )
            .with_response("search_monsters", json!([]))
            .with_handler("get_monster_details", |args| {
                if args["name"] == "Adult Red Dragon" && args["source"] == "MM" {
                    Ok(json!({"name": "Adult Red Dragon", "source": "MM", "cr": "17"}))
                } else {
                    Ok(Value::Null)
                }
            })
            .with_response("get_spell_details", Value::Null)
    }

    fn session(gateway: &MemoryGateway, books: Vec<String>) -> Arc<SearchSession> {
        let service = Arc::new(SearchService::new(Arc::new(gateway.clone())));
        SearchSession::new(service, Category::Spells, books, SearchConfig::default())
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("adult RED dragon"), "Adult Red Dragon");
        assert_eq!(title_case("goblin"), "Goblin");
    }

    #[tokio::test]
    async fn test_handle_sort_toggles() {
        let session = session(&backend(), Vec::new());

        session.handle_sort("name").await;
        assert_eq!(session.snapshot().await.sort_direction, SortDirection::Desc);

        session.handle_sort("level").await;
        let snap = session.snapshot().await;
        assert_eq!(snap.sort_column, "level");
        assert_eq!(snap.sort_direction, SortDirection::Asc);

        session.handle_sort("level").await;
        assert_eq!(session.snapshot().await.sort_direction, SortDirection::Desc);
    }

    #[tokio::test]
    async fn test_search_maps_selected_books() {
        let gateway = backend();
        let session = session(&gateway, vec!["phb-book-phb".into()]);

        session.set_query("fire").await;
        let count = session.perform_search().await;

        assert_eq!(count, 1);
        assert!(session.snapshot().await.search_performed);
        let args = gateway.last_args("search_spells").unwrap();
        assert_eq!(args["sources"], json!(["PHB"]));
        assert_eq!(args["query"], "fire");
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_runs_once() {
        let gateway = backend();
        let session = session(&gateway, Vec::new());

        for q in ["f", "fi", "fir", "fire"] {
            session.set_query(q).await;
            session.debounced_search();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(gateway.call_count("search_spells"), 1);
        assert_eq!(gateway.last_args("search_spells").unwrap()["query"], "fire");
    }

    #[tokio::test]
    async fn test_reference_retries_title_cased_creature() {
        let gateway = backend();
        let session = session(&gateway, Vec::new());

        let modal = session
            .open_reference(&ReferenceEvent {
                kind: "creature".into(),
                name: "adult red dragon".into(),
                source: None,
            })
            .await
            .unwrap();

        assert_eq!(modal.title, "Adult Red Dragon");
        assert_eq!(gateway.call_count("get_monster_details"), 2);
        assert_eq!(session.snapshot().await.modals.len(), 1);
    }

    #[tokio::test]
    async fn test_reference_defaults_and_misses() {
        let gateway = backend();
        let session = session(&gateway, Vec::new());

        let modal = session
            .open_reference(&ReferenceEvent {
                kind: "spell".into(),
                name: "Wish".into(),
                source: None,
            })
            .await;

        assert!(modal.is_none());
        assert_eq!(
            gateway.last_args("get_spell_details"),
            Some(json!({"name": "Wish", "source": "PHB"}))
        );

        let unknown = session
            .open_reference(&ReferenceEvent {
                kind: "deity".into(),
                name: "Tyr".into(),
                source: None,
            })
            .await;
        assert!(unknown.is_none());
        assert!(session.snapshot().await.modals.is_empty());
    }

    #[tokio::test]
    async fn test_select_falls_back_to_summary() {
        let gateway = backend();
        let session = session(&gateway, Vec::new());
        let summary = SpellSummary {
            name: "Fireball".into(),
            level: 3,
            school: "V".into(),
            source: "PHB".into(),
            concentration: false,
            ritual: false,
            casting_time: "1 action".into(),
            range: "150 feet".into(),
            components: "V, S, M".into(),
            classes: vec!["Wizard".into()],
            description: "A bright streak flashes.".into(),
        };

        let modal = session.select_spell(&summary).await;
        assert_eq!(modal.title, "Fireball");
        assert!(modal.content.contains("150 feet"));

        session.close_modal(None).await;
        assert!(session.snapshot().await.modals.is_empty());
    }
}
