//! Related-content selection: co-cooks and linked recipes behind one search box.
//!
//! Each selection set keeps its display entries and its id list side by side;
//! every mutation goes through `Selection` so the two never drift apart.
//!
//! Searches are last-query-wins. `begin_query` bumps a token held in a
//! `watch` channel; a `SearchRequest` checks that token after its debounce
//! sleep and skips the network call when a newer query exists, and `apply`
//! drops any outcome whose token is no longer current.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiError, RecipeApi, SearchKind, SearchResult};

use super::types::{MAX_CO_COOKS, MAX_LINKED_RECIPES};

/// Queries shorter than this never reach the server
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("You can add up to {cap} {}", .kind.display_name())]
    AtCapacity { kind: SearchKind, cap: usize },
    #[error("{label} is already added")]
    Duplicate { label: String },
}

/// One bounded selection set with its mirrored id list
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    cap: usize,
    items: Vec<SearchResult>,
    ids: Vec<String>,
}

impl Selection {
    fn new(cap: usize) -> Self {
        Self {
            cap,
            items: Vec::new(),
            ids: Vec::new(),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    fn push(&mut self, item: SearchResult) {
        self.ids.push(item.id().to_string());
        self.items.push(item);
    }

    fn remove(&mut self, id: &str) -> Option<SearchResult> {
        let pos = self.ids.iter().position(|i| i == id)?;
        self.ids.remove(pos);
        Some(self.items.remove(pos))
    }

    fn replace(&mut self, items: Vec<SearchResult>) {
        self.items.clear();
        self.ids.clear();
        for item in items {
            if self.items.len() >= self.cap {
                warn!(cap = self.cap, "Dropping related item beyond selection cap");
                break;
            }
            if !self.contains(item.id()) {
                self.push(item);
            }
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
    }
}

/// A debounced search waiting to be dispatched.
///
/// Owns everything it needs so it can be awaited or spawned without borrowing
/// the wizard.
#[derive(Debug)]
pub struct SearchRequest {
    pub token: u64,
    pub query: String,
    pub kind: SearchKind,
    debounce: Duration,
    latest: watch::Receiver<u64>,
}

impl SearchRequest {
    /// Whether a newer query has replaced this one
    pub fn is_superseded(&self) -> bool {
        *self.latest.borrow() != self.token
    }

    /// Wait out the debounce, then query unless superseded
    pub async fn run(self, api: &dyn RecipeApi) -> SearchOutcome {
        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }

        if self.is_superseded() {
            debug!(query = %self.query, "Search superseded before dispatch");
            return SearchOutcome::Superseded { token: self.token };
        }

        match api.search(&self.query, self.kind).await {
            Ok(response) => SearchOutcome::Completed {
                token: self.token,
                kind: self.kind,
                results: response.into_results(self.kind),
            },
            Err(error) => SearchOutcome::Failed {
                token: self.token,
                error,
            },
        }
    }
}

/// What came back from a `SearchRequest`
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Completed {
        token: u64,
        kind: SearchKind,
        results: Vec<SearchResult>,
    },
    Superseded {
        token: u64,
    },
    Failed {
        token: u64,
        error: ApiError,
    },
}

impl SearchOutcome {
    pub fn token(&self) -> u64 {
        match self {
            SearchOutcome::Completed { token, .. }
            | SearchOutcome::Superseded { token }
            | SearchOutcome::Failed { token, .. } => *token,
        }
    }
}

/// Effect of applying an outcome
#[derive(Debug, Clone)]
pub enum ApplyResult {
    /// Results replaced, with this many hits
    Applied(usize),
    /// Outcome belonged to an older query and was ignored
    Stale,
    /// The current query failed
    Failed(ApiError),
}

/// Search box plus the two selection sets
#[derive(Debug)]
pub struct RelatedSelector {
    active: SearchKind,
    query: String,
    results: Vec<SearchResult>,
    people: Selection,
    recipes: Selection,
    token: watch::Sender<u64>,
    debounce: Duration,
}

impl RelatedSelector {
    pub fn new(debounce: Duration) -> Self {
        let (token, _) = watch::channel(0);
        Self {
            active: SearchKind::People,
            query: String::new(),
            results: Vec::new(),
            people: Selection::new(MAX_CO_COOKS),
            recipes: Selection::new(MAX_LINKED_RECIPES),
            token,
            debounce,
        }
    }

    fn set(&self, kind: SearchKind) -> &Selection {
        match kind {
            SearchKind::People => &self.people,
            SearchKind::Recipes => &self.recipes,
        }
    }

    fn set_mut(&mut self, kind: SearchKind) -> &mut Selection {
        match kind {
            SearchKind::People => &mut self.people,
            SearchKind::Recipes => &mut self.recipes,
        }
    }

    fn current_token(&self) -> u64 {
        *self.token.borrow()
    }

    fn bump_token(&mut self) -> u64 {
        let next = self.current_token() + 1;
        self.token.send_replace(next);
        next
    }

    pub fn active_kind(&self) -> SearchKind {
        self.active
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Display entries for one set, in selection order
    pub fn selected(&self, kind: SearchKind) -> &[SearchResult] {
        &self.set(kind).items
    }

    /// Canonical id list for one set, in selection order
    pub fn selected_ids(&self, kind: SearchKind) -> &[String] {
        &self.set(kind).ids
    }

    pub fn cap(&self, kind: SearchKind) -> usize {
        self.set(kind).cap
    }

    pub fn is_full(&self, kind: SearchKind) -> bool {
        let set = self.set(kind);
        set.items.len() >= set.cap
    }

    /// Switch the search box between people and recipes.
    /// Clears query and results; selections are kept.
    pub fn set_kind(&mut self, kind: SearchKind) {
        if self.active == kind {
            return;
        }
        self.active = kind;
        self.query.clear();
        self.results.clear();
        self.bump_token();
    }

    /// Register a new query. Returns the request to dispatch, or `None` when the
    /// query is too short (local results are cleared in that case).
    pub fn begin_query(&mut self, query: &str) -> Option<SearchRequest> {
        self.query = query.to_string();
        let token = self.bump_token();

        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            self.results.clear();
            return None;
        }

        Some(SearchRequest {
            token,
            query: trimmed.to_string(),
            kind: self.active,
            debounce: self.debounce,
            latest: self.token.subscribe(),
        })
    }

    /// Apply a finished search if it still belongs to the current query
    pub fn apply(&mut self, outcome: SearchOutcome) -> ApplyResult {
        if outcome.token() != self.current_token() {
            debug!(token = outcome.token(), "Discarding stale search outcome");
            return ApplyResult::Stale;
        }

        match outcome {
            SearchOutcome::Completed { kind, results, .. } => {
                if kind != self.active {
                    return ApplyResult::Stale;
                }
                let count = results.len();
                self.results = results;
                ApplyResult::Applied(count)
            }
            SearchOutcome::Superseded { .. } => ApplyResult::Stale,
            SearchOutcome::Failed { error, .. } => {
                self.results.clear();
                ApplyResult::Failed(error)
            }
        }
    }

    /// Add an item to the set matching its kind
    pub fn select(&mut self, item: SearchResult) -> Result<(), SelectError> {
        let kind = item.kind();
        let set = self.set_mut(kind);
        if set.contains(item.id()) {
            return Err(SelectError::Duplicate {
                label: item.label().to_string(),
            });
        }
        if set.items.len() >= set.cap {
            return Err(SelectError::AtCapacity { kind, cap: set.cap });
        }
        set.push(item);
        Ok(())
    }

    /// Remove by id from the `kind` set; a missing id is a no-op
    pub fn deselect(&mut self, kind: SearchKind, id: &str) -> Option<SearchResult> {
        self.set_mut(kind).remove(id)
    }

    /// Replace one set wholesale (hydration)
    pub fn seed(&mut self, kind: SearchKind, items: Vec<SearchResult>) {
        self.set_mut(kind).replace(items);
    }

    /// Forget query, results and selections; invalidates any in-flight search
    pub fn reset(&mut self) {
        self.active = SearchKind::People;
        self.query.clear();
        self.results.clear();
        self.people.clear();
        self.recipes.clear();
        self.bump_token();
    }
}
