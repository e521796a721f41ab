//! Rules catalog façades.
//!
//! Every reference domain (spells, items, monsters, classes, ...) exposes the
//! same three operations: a one-time `initialize`, a `search` that replaces
//! a locally held result list, and a stateless `get_details` lookup keyed by
//! `(name, source)`. The shape lives once, in [`Catalog`]; each domain only
//! supplies a [`CatalogDomain`] descriptor naming its types, commands and
//! argument casing.
//!
//! # Fail-soft contract
//!
//! Façade operations never return errors. A failed call records a message
//! in [`Catalog::error`], logs it, and yields an empty list (search) or
//! [`Lookup::Failed`] (details).
//!
//! # Overlapping searches
//!
//! Each search takes a ticket from a monotonic counter. A response only
//! replaces the held results if no later-issued search has already been
//! applied, so a slow early response cannot overwrite a fast later one.
//!
//! # Example
//!
//! ```rust,ignore
//! use tomekeeper::core::catalog::{Catalog, domains::{Spells, SpellFilters}};
//!
//! let spells = Catalog::<Spells>::new(gateway.clone());
//! let found = spells.search(&SpellFilters { query: Some("fire".into()), ..Default::default() }).await;
//! if let Some(spell) = spells.get_details("Fireball", "PHB").await.into_option() {
//!     println!("{}", spell.name);
//! }
//! ```

pub mod domains;
pub mod entry;
pub mod filters;
pub mod lenient;

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::core::gateway::{call, Envelope, SharedGateway};

pub use entry::{Block, Entry};

// ============================================================================
// Domain Descriptor
// ============================================================================

/// How a domain primes backend-side state before its first search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialization {
    /// Issue this command once.
    Remote(&'static str),
    /// Nothing to prime; the latch is set locally.
    Local,
}

/// Static description of one catalog domain.
pub trait CatalogDomain: Send + Sync + 'static {
    /// Flattened row shown in result tables.
    type Summary: DeserializeOwned + Clone + Send + Sync + 'static;
    /// Full record fetched on demand.
    type Detail: DeserializeOwned + Send + 'static;
    /// Search criteria accepted by [`Catalog::search`].
    type Filters: Send + Sync;

    /// Human-readable domain name used in logs and error messages.
    const NAME: &'static str;
    const INITIALIZATION: Initialization;
    const SEARCH_COMMAND: &'static str;
    const DETAIL_COMMAND: &'static str;
    const DETAIL_ENVELOPE: Envelope = Envelope::Bare;

    /// Backend argument record for a search, with the command's exact casing.
    fn search_args(filters: &Self::Filters) -> Value;

    /// Backend argument record for a detail lookup.
    fn detail_args(name: &str, source: &str) -> Value {
        json!({ "name": name, "source": source })
    }
}

// ============================================================================
// Lookup Outcome
// ============================================================================

/// Result of a detail fetch.
///
/// Keeps "no such entry" apart from "backend unreachable" while still
/// offering the collapsed `Option` view through [`Lookup::into_option`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(String),
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Failed(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Failed(message) => Lookup::Failed(message),
        }
    }
}

// ============================================================================
// Catalog State
// ============================================================================

/// Observable state of one façade.
#[derive(Debug, Clone)]
pub struct CatalogState<S> {
    /// One-way latch; never reset once set.
    pub is_initialized: bool,
    pub error: Option<String>,
    pub results: Vec<S>,
    in_flight: usize,
    applied_ticket: u64,
}

impl<S> Default for CatalogState<S> {
    fn default() -> Self {
        Self {
            is_initialized: false,
            error: None,
            results: Vec::new(),
            in_flight: 0,
            applied_ticket: 0,
        }
    }
}

impl<S> CatalogState<S> {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Generic query façade over one domain.
pub struct Catalog<D: CatalogDomain> {
    gateway: SharedGateway,
    state: RwLock<CatalogState<D::Summary>>,
    init_guard: Mutex<()>,
    tickets: AtomicU64,
    in_flight: AtomicUsize,
    _domain: PhantomData<D>,
}

impl<D: CatalogDomain> std::fmt::Debug for Catalog<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").field("domain", &D::NAME).finish()
    }
}

impl<D: CatalogDomain> Catalog<D> {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            state: RwLock::new(CatalogState::default()),
            init_guard: Mutex::new(()),
            tickets: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            _domain: PhantomData,
        }
    }

    /// Prime the backend catalog. No-op once the latch is set.
    ///
    /// Returns whether the catalog is initialized afterwards. A failed
    /// attempt leaves the latch unset so a later call retries.
    pub async fn initialize(&self) -> bool {
        // Concurrent callers wait here so only one of them issues the command.
        let _guard = self.init_guard.lock().await;

        if self.state.read().await.is_initialized {
            return true;
        }

        let command = match D::INITIALIZATION {
            Initialization::Local => {
                self.state.write().await.is_initialized = true;
                return true;
            }
            Initialization::Remote(command) => command,
        };

        let _loading = self.begin().await;
        let outcome = self.gateway.invoke(command, json!({})).await;

        let mut state = self.state.write().await;
        match outcome {
            Ok(_) => {
                state.is_initialized = true;
                info!(domain = D::NAME, "{} catalog initialized", D::NAME);
                true
            }
            Err(e) => {
                warn!(domain = D::NAME, error = %e, "Failed to initialize {} catalog", D::NAME);
                state.error = Some(format!("Failed to initialize {} catalog: {}", D::NAME, e));
                false
            }
        }
    }

    /// Run a search and replace the held results with the response.
    ///
    /// Initializes first if needed. On failure the held results become
    /// empty, [`error`](Self::error) is set, and an empty list is returned.
    pub async fn search(&self, filters: &D::Filters) -> Vec<D::Summary> {
        if !self.is_initialized().await {
            self.initialize().await;
        }

        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let args = D::search_args(filters);

        let _loading = self.begin().await;
        let outcome = call::<_, Option<Vec<D::Summary>>>(
            self.gateway.as_ref(),
            D::SEARCH_COMMAND,
            &args,
            Envelope::Bare,
        )
        .await;

        let mut state = self.state.write().await;

        let stale = ticket < state.applied_ticket;
        if stale {
            debug!(
                domain = D::NAME,
                ticket,
                applied = state.applied_ticket,
                "Discarding stale {} search response",
                D::NAME
            );
        } else {
            state.applied_ticket = ticket;
        }

        match outcome {
            Ok(results) => {
                let results = results.unwrap_or_default();
                debug!(domain = D::NAME, count = results.len(), "{} search returned", D::NAME);
                if !stale {
                    state.results = results.clone();
                }
                results
            }
            Err(e) => {
                warn!(domain = D::NAME, error = %e, "{} search failed", D::NAME);
                if !stale {
                    state.results.clear();
                    state.error = Some(format!("Search failed: {}", e));
                }
                Vec::new()
            }
        }
    }

    /// Fetch the full record for `(name, source)`.
    pub async fn get_details(&self, name: &str, source: &str) -> Lookup<D::Detail> {
        let args = D::detail_args(name, source);
        match call::<_, Option<D::Detail>>(
            self.gateway.as_ref(),
            D::DETAIL_COMMAND,
            &args,
            D::DETAIL_ENVELOPE,
        )
        .await
        {
            Ok(Some(detail)) => Lookup::Found(detail),
            Ok(None) => {
                debug!(domain = D::NAME, name, source, "{} not found", D::NAME);
                Lookup::NotFound
            }
            Err(e) => {
                warn!(domain = D::NAME, name, source, error = %e, "Failed to get {} details", D::NAME);
                Lookup::Failed(e.to_string())
            }
        }
    }

    /// Fetch a list of distinct facet values (types, sources, categories).
    pub async fn facet(&self, command: &str) -> Vec<String> {
        match call::<_, Option<Vec<String>>>(self.gateway.as_ref(), command, &json!({}), Envelope::Bare)
            .await
        {
            Ok(values) => values.unwrap_or_default(),
            Err(e) => {
                warn!(domain = D::NAME, command, error = %e, "Failed to load {} facet", D::NAME);
                Vec::new()
            }
        }
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_initialized
    }

    pub async fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Results of the latest applied search.
    pub async fn results(&self) -> Vec<D::Summary> {
        self.state.read().await.results.clone()
    }

    pub async fn snapshot(&self) -> CatalogState<D::Summary> {
        let mut snapshot = self.state.read().await.clone();
        snapshot.in_flight = self.in_flight.load(Ordering::SeqCst);
        snapshot
    }

    pub(crate) fn gateway(&self) -> &SharedGateway {
        &self.gateway
    }

    async fn begin(&self) -> InFlight<'_> {
        let guard = InFlight::enter(&self.in_flight);
        self.state.write().await.error = None;
        guard
    }
}

/// One outstanding backend call.
///
/// Released on drop, so a search future cancelled mid-call still clears
/// the loading flag.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
