#![forbid(unsafe_code)]

//! Registry of live placeholders and the keys/options they last used.
//!
//! # Design
//!
//! Entries are keyed by [`PlaceholderId`], i.e. by placeholder identity and
//! not by keys: two placeholders bound to the same key are two entries.
//! Next to its [`RegistryEntry`] each slot keeps a handle `H` the refresh
//! sweep uses to reach the placeholder (the service stores a `Weak`, so the
//! registry never keeps a placeholder alive).
//!
//! # Sweep safety
//!
//! Sweeps iterate a [`PlaceholderRegistry::snapshot`] rather than the map
//! itself. Before refreshing a snapshotted id the sweep checks that the id is
//! still registered, so an entry removed mid-sweep is not visited and no
//! other entry is skipped or visited twice.
//!
//! | Operation    | Complexity |
//! |--------------|------------|
//! | `register`   | O(1)       |
//! | `unregister` | O(1)       |
//! | `snapshot`   | O(n log n) |

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;

use crate::keys::{Keys, Options};

static NEXT_PLACEHOLDER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one placeholder instance.
///
/// Ids are allocated in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(u64);

impl PlaceholderId {
    /// Allocate a fresh id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_PLACEHOLDER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "placeholder#{}", self.0)
    }
}

/// Keys and normalized options from a placeholder's latest evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub keys: Keys,
    pub options: Options,
}

struct Slot<H> {
    entry: RegistryEntry,
    handle: H,
}

pub struct PlaceholderRegistry<H> {
    slots: AHashMap<PlaceholderId, Slot<H>>,
}

impl<H> Default for PlaceholderRegistry<H> {
    fn default() -> Self {
        Self {
            slots: AHashMap::new(),
        }
    }
}

impl<H: Clone> PlaceholderRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or overwrite the entry for `id`.
    ///
    /// Returns `true` when the id was not registered before.
    pub fn register(&mut self, id: PlaceholderId, keys: Keys, options: Options, handle: H) -> bool {
        let slot = Slot {
            entry: RegistryEntry { keys, options },
            handle,
        };
        self.slots.insert(id, slot).is_none()
    }

    /// Remove the entry for `id`, if any. Removing twice is a no-op.
    pub fn unregister(&mut self, id: PlaceholderId) -> Option<RegistryEntry> {
        self.slots.remove(&id).map(|slot| slot.entry)
    }

    #[must_use]
    pub fn contains(&self, id: PlaceholderId) -> bool {
        self.slots.contains_key(&id)
    }

    #[must_use]
    pub fn entry(&self, id: PlaceholderId) -> Option<&RegistryEntry> {
        self.slots.get(&id).map(|slot| &slot.entry)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered ids with their handles, ordered by id.
    ///
    /// Id order is creation order, which keeps sweeps stable from one
    /// invocation to the next.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(PlaceholderId, H)> {
        let mut handles: Vec<(PlaceholderId, H)> = self
            .slots
            .iter()
            .map(|(&id, slot)| (id, slot.handle.clone()))
            .collect();
        handles.sort_unstable_by_key(|(id, _)| *id);
        handles
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<H> fmt::Debug for PlaceholderRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceholderRegistry")
            .field("entries", &self.slots.len())
            .finish()
    }
}
