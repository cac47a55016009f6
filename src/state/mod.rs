//! Application state transitions.
//!
//! Every mutation of the history list, the cellar, or the analysis view is
//! a pure function here: current value in, new value out. The command layer
//! owns loading and persisting; keeping the transitions pure makes
//! reconciliation and the list invariants unit-testable without a store.
//!
//! The one store-aware function is [`reconcile`], the synchronous fan-out
//! that pushes an updated report to every location holding a copy.

use serde::Serialize;

use crate::Result;
use crate::models::{CellarItem, WineReport};
use crate::storage::{CELLAR_KEY, HISTORY_KEY, Store};

/// Default bound for the recent-search history.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// The analysis view state machine.
///
/// One analysis at a time by construction: `begin` from `Analyzing` stays
/// `Analyzing`, so a driver cannot start a second request mid-flight.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Analyzing,
    Success(WineReport),
    Error(String),
}

impl AnalysisState {
    /// Enter the analyzing state. Idempotent while a request is outstanding.
    pub fn begin(self) -> Self {
        AnalysisState::Analyzing
    }

    /// Record a successful analysis.
    pub fn complete(self, report: WineReport) -> Self {
        AnalysisState::Success(report)
    }

    /// Record a failed analysis.
    pub fn fail(self, message: impl Into<String>) -> Self {
        AnalysisState::Error(message.into())
    }

    /// Return to idle (the "try again" affordance).
    pub fn reset(self) -> Self {
        AnalysisState::Idle
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self, AnalysisState::Analyzing)
    }
}

/// Insert a report at the front of the history.
///
/// De-duplicates by (name, vintage): an existing entry for the same wine is
/// removed first, so re-analyzing moves it to the front instead of adding a
/// second row. The list is then truncated to `limit`.
pub fn remember(history: Vec<WineReport>, report: WineReport, limit: usize) -> Vec<WineReport> {
    let mut next: Vec<WineReport> = history
        .into_iter()
        .filter(|item| !item.same_wine(&report))
        .collect();
    next.insert(0, report);
    next.truncate(limit);
    next
}

/// How an add-to-cellar call changed the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "itemId")]
pub enum CellarMutation {
    /// A new item was created.
    Added(String),
    /// An existing item for the same (name, vintage) absorbed the bottles.
    Merged(String),
}

impl CellarMutation {
    pub fn item_id(&self) -> &str {
        match self {
            CellarMutation::Added(id) | CellarMutation::Merged(id) => id,
        }
    }
}

/// Add bottles of a wine to the cellar.
///
/// Merge policy: if an item already wraps the same (name, vintage), its
/// quantity grows and a supplied price overwrites the stored one - latest
/// price wins, no averaging. Otherwise a new item is created at the front.
pub fn add_to_cellar(
    mut cellar: Vec<CellarItem>,
    wine: WineReport,
    quantity: u32,
    price: Option<f64>,
) -> (Vec<CellarItem>, CellarMutation) {
    if let Some(existing) = cellar.iter_mut().find(|i| i.wine.same_wine(&wine)) {
        existing.quantity += quantity;
        if price.is_some() {
            existing.purchase_price = price;
        }
        let mutation = CellarMutation::Merged(existing.id.clone());
        return (cellar, mutation);
    }

    let item = CellarItem::new(wine, quantity, price);
    let mutation = CellarMutation::Added(item.id.clone());
    let mut next = Vec::with_capacity(cellar.len() + 1);
    next.push(item);
    next.extend(cellar);
    (next, mutation)
}

/// Adjust an item's quantity by `delta`, clamping at 0 and pruning items
/// that reach 0. Returns the new list plus the resulting quantity, or
/// `None` if no item had that id.
pub fn adjust_quantity(
    cellar: Vec<CellarItem>,
    item_id: &str,
    delta: i64,
) -> (Vec<CellarItem>, Option<u32>) {
    let mut result = None;
    let next = cellar
        .into_iter()
        .filter_map(|mut item| {
            if item.id == item_id {
                let adjusted = (i64::from(item.quantity) + delta).max(0);
                item.quantity = adjusted as u32;
                result = Some(item.quantity);
                if item.quantity == 0 {
                    return None;
                }
            }
            Some(item)
        })
        .collect();
    (next, result)
}

/// Remove an item outright. Returns the new list and whether anything was
/// removed.
pub fn remove_item(cellar: Vec<CellarItem>, item_id: &str) -> (Vec<CellarItem>, bool) {
    let before = cellar.len();
    let next: Vec<CellarItem> = cellar.into_iter().filter(|i| i.id != item_id).collect();
    let removed = next.len() < before;
    (next, removed)
}

/// Which locations a reconciliation touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    /// The current-view slot was replaced.
    pub current: bool,
    /// Number of history entries replaced (0 or 1 in practice).
    pub history: usize,
    /// Number of cellar items whose wrapped wine was replaced.
    pub cellar: usize,
}

/// Propagate an updated report to every location holding a copy, keyed by
/// record id: the current slot, the history list, and the wrapped wine of
/// every matching cellar item. Collections that did not change are not
/// rewritten. After this returns, all three locations hold the new
/// snapshot; a failed save propagates as an error.
pub fn reconcile(store: &Store, updated: &WineReport) -> Result<ReconcileOutcome> {
    let mut outcome = ReconcileOutcome::default();

    if let Some(current) = store.load_current() {
        if current.id == updated.id {
            store.save_current(updated)?;
            outcome.current = true;
        }
    }

    let mut history: Vec<WineReport> = store.load(HISTORY_KEY);
    for entry in history.iter_mut() {
        if entry.id == updated.id {
            *entry = updated.clone();
            outcome.history += 1;
        }
    }
    if outcome.history > 0 {
        store.save(HISTORY_KEY, &history)?;
    }

    let mut cellar: Vec<CellarItem> = store.load(CELLAR_KEY);
    for item in cellar.iter_mut() {
        if item.wine.id == updated.id {
            item.wine = updated.clone();
            outcome.cellar += 1;
        }
    }
    if outcome.cellar > 0 {
        store.save(CELLAR_KEY, &cellar)?;
    }

    Ok(outcome)
}
