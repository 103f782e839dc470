//! Shared transposition table.
//!
//! Statistics are keyed by the adapter's state fingerprint and accumulate
//! across tree branches and across separate search calls. The table also
//! caches the ordered candidate list for `(fingerprint, player)` so repeated
//! visits to a state skip re-scoring its moves.
//!
//! Handles are cheap to clone and share the same underlying maps, so one
//! table can back several drivers (including drivers on other threads).
//! Entries are never evicted; call [`TranspositionTable::clear`] between
//! unrelated workloads if memory matters.

use std::sync::Arc;

use dashmap::DashMap;
use engine_core::PlayerId;

/// Accumulated statistics for one fingerprint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TranspositionEntry {
    pub visits: u32,
    /// Sum of backed-up values, from the perspective of the player to move in
    /// the fingerprinted state.
    pub value_sum: f32,
}

impl TranspositionEntry {
    pub fn mean_value(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }
}

/// Candidate actions with their ordering priors, best first.
pub type OrderedActions<A> = Arc<[(A, f32)]>;

/// Thread-safe transposition table using DashMap
#[derive(Debug)]
pub struct TranspositionTable<A> {
    stats: Arc<DashMap<u64, TranspositionEntry>>,
    ordered: Arc<DashMap<(u64, PlayerId), OrderedActions<A>>>,
}

impl<A> Clone for TranspositionTable<A> {
    /// Clone the table reference (shares underlying data)
    fn clone(&self) -> Self {
        Self {
            stats: Arc::clone(&self.stats),
            ordered: Arc::clone(&self.ordered),
        }
    }
}

impl<A> Default for TranspositionTable<A> {
    fn default() -> Self {
        Self {
            stats: Arc::new(DashMap::new()),
            ordered: Arc::new(DashMap::new()),
        }
    }
}

impl<A> TranspositionTable<A> {
    /// Create a new transposition table
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup an entry
    pub fn lookup(&self, key: u64) -> Option<TranspositionEntry> {
        self.stats.get(&key).map(|entry| *entry)
    }

    /// Add one backed-up value to the entry for `key`.
    pub fn record(&self, key: u64, value: f32) {
        let mut entry = self.stats.entry(key).or_default();
        entry.visits += 1;
        entry.value_sum += value;
    }

    /// Overwrite the entry for `key`.
    pub fn store(&self, key: u64, entry: TranspositionEntry) {
        self.stats.insert(key, entry);
    }

    pub fn ordered_actions(&self, key: u64, player: PlayerId) -> Option<OrderedActions<A>> {
        self.ordered.get(&(key, player)).map(|cached| Arc::clone(&*cached))
    }

    pub fn store_ordered(&self, key: u64, player: PlayerId, actions: OrderedActions<A>) {
        self.ordered.insert((key, player), actions);
    }

    /// Whether two handles share the same storage.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.stats, &other.stats)
    }

    /// Clear the table
    pub fn clear(&self) {
        self.stats.clear();
        self.ordered.clear();
    }

    /// Number of fingerprints with statistics.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Number of cached move orderings.
    pub fn ordered_len(&self) -> usize {
        self.ordered.len()
    }
}
