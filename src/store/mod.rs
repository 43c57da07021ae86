//! Layout Store - persisted card arrangement with subscribe/notify.
//!
//! Process-wide layout state (position overrides, z-index overrides, highest
//! z ever assigned) behind a small service object. All mutation goes through
//! [`LayoutStore::save`], which writes through to storage best-effort and then
//! notifies subscribers synchronously, exactly once per save.
//!
//! # API
//!
//! - `load(cards)` - Best-effort read; corrupt or missing data yields an empty state
//! - `save(state)` - Write through (failures swallowed), then notify
//! - `snapshot()` - Synchronous read; `None` before the first load
//! - `subscribe(cb)` - Returns a cleanup function that removes the callback
//!
//! Single-threaded cooperative: every write happens on the UI thread, so
//! subscribers always observe read-after-write consistent state.

mod storage;

pub use storage::{FileStorage, MemStorage, Storage, StorageError};

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{Card, CardId, Point};

/// Storage key of the persisted arrangement record.
pub const LAYOUT_KEY: &str = "library-layout";

/// Baseline for `max_z`, above every static stack value in the dataset.
pub const BASE_MAX_Z: i32 = 20;

// =============================================================================
// LayoutState
// =============================================================================

fn base_max_z() -> i32 {
    BASE_MAX_Z
}

/// The persisted arrangement: placement overrides, stacking overrides, and the
/// running z counter.
///
/// Serialized as `{"positions": {...}, "zIndexes": {...}, "maxZ": n}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutState {
    pub positions: BTreeMap<CardId, Point>,
    pub z_indexes: BTreeMap<CardId, i32>,
    #[serde(default = "base_max_z")]
    pub max_z: i32,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            positions: BTreeMap::new(),
            z_indexes: BTreeMap::new(),
            max_z: BASE_MAX_Z,
        }
    }
}

impl LayoutState {
    /// Assign the next z-index to `id` and return it.
    pub fn bump_z(&mut self, id: CardId) -> i32 {
        self.max_z += 1;
        self.z_indexes.insert(id, self.max_z);
        self.max_z
    }

    /// Current z for a card, falling back to its static stack value.
    pub fn z_for(&self, id: CardId, stack: i32) -> i32 {
        self.z_indexes.get(&id).copied().unwrap_or(stack)
    }

    /// Restore the invariants after an untrusted load: every key refers to a
    /// known card id, and `max_z` dominates both the baseline and every
    /// recorded z value.
    fn sanitize(&mut self, known: &BTreeSet<CardId>) {
        self.positions.retain(|id, _| known.contains(id));
        self.z_indexes.retain(|id, _| known.contains(id));
        let top = self.z_indexes.values().copied().max().unwrap_or(BASE_MAX_Z);
        self.max_z = self.max_z.max(top).max(BASE_MAX_Z);
    }
}

// =============================================================================
// LayoutStore
// =============================================================================

type Subscriber = Rc<dyn Fn(&LayoutState)>;

/// The layout service object. Wrap in `Rc` and share; all interior state is
/// behind `RefCell` since mutation is single-threaded and synchronous.
pub struct LayoutStore {
    storage: Box<dyn Storage>,
    state: RefCell<Option<LayoutState>>,
    subscribers: RefCell<Vec<(usize, Subscriber)>>,
    next_sub_id: Cell<usize>,
}

impl LayoutStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            state: RefCell::new(None),
            subscribers: RefCell::new(Vec::new()),
            next_sub_id: Cell::new(0),
        }
    }

    /// Whether the first load has completed.
    pub fn is_loaded(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Synchronous snapshot. `None` until [`load`](Self::load) has run, so a
    /// renderer working before storage is available sees a distinct value.
    pub fn snapshot(&self) -> Option<LayoutState> {
        self.state.borrow().clone()
    }

    /// Load the persisted record, best-effort. Any read or parse failure is
    /// logged and treated as an empty arrangement; keys that refer to unknown
    /// cards are dropped.
    pub fn load(&self, cards: &[Card]) -> LayoutState {
        let mut state = match self.storage.read(LAYOUT_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<LayoutState>(&raw) {
                Ok(state) => state,
                Err(err) => {
                    debug!(%err, "discarding malformed layout record");
                    LayoutState::default()
                }
            },
            Ok(None) => LayoutState::default(),
            Err(err) => {
                debug!(%err, "layout record unreadable, starting empty");
                LayoutState::default()
            }
        };

        let known: BTreeSet<CardId> = cards.iter().map(|c| c.id).collect();
        state.sanitize(&known);

        *self.state.borrow_mut() = Some(state.clone());
        state
    }

    /// Replace the arrangement. The storage write is best-effort; the new
    /// in-memory state stays authoritative either way, and subscribers are
    /// notified synchronously, once.
    pub fn save(&self, new_state: LayoutState) {
        match serde_json::to_string(&new_state) {
            Ok(raw) => {
                if let Err(err) = self.storage.write(LAYOUT_KEY, &raw) {
                    warn!(%err, "layout write failed, keeping in-memory state");
                }
            }
            Err(err) => warn!(%err, "layout state not serializable"),
        }

        *self.state.borrow_mut() = Some(new_state.clone());

        // Clone the callbacks out so a subscriber reading the store does not
        // hit the subscriber list borrow.
        let subs: Vec<Subscriber> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in subs {
            cb(&new_state);
        }
    }

    /// Register a subscriber. Returns a cleanup function.
    pub fn subscribe(self: &Rc<Self>, f: impl Fn(&LayoutState) + 'static) -> impl FnOnce() {
        let id = self.next_sub_id.get();
        self.next_sub_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(f)));

        let store = Rc::downgrade(self);
        move || {
            if let Some(store) = store.upgrade() {
                store
                    .subscribers
                    .borrow_mut()
                    .retain(|(sub_id, _)| *sub_id != id);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
