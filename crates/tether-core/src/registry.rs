//! Liveness registry keyed by native address
//!
//! Presence of an entry is the only liveness signal the bridge has: an
//! address with an entry is considered live, an address without one is not.
//! Only the handle factory inserts; removal belongs to whoever frees the
//! native object (see `Bridge::invalidate`).

use std::sync::Arc;

use dashmap::DashMap;

use crate::address::NativeAddr;
use crate::dispatch::DispatchTable;

/// Metadata recorded for one live native object.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    table: Option<Arc<DispatchTable>>,
}

impl RegistryEntry {
    /// Entry pointing at the object's dispatch table
    pub fn new(table: Arc<DispatchTable>) -> Self {
        Self { table: Some(table) }
    }

    /// Entry without dispatch metadata.
    ///
    /// Marks an address as live without making it resolvable; callback
    /// resolution reports such entries as integrity violations.
    pub fn detached() -> Self {
        Self { table: None }
    }

    /// Dispatch table, if the entry carries one
    pub fn table(&self) -> Option<&Arc<DispatchTable>> {
        self.table.as_ref()
    }
}

/// Registry of live native objects
///
/// Owned by a `Bridge`; tests construct isolated instances. Point lookups are
/// O(1) expected, since every script-side operation on a wrapped object
/// performs one.
pub struct Registry {
    /// Map of native address to registry entry
    entries: DashMap<NativeAddr, RegistryEntry>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Create a registry with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
        }
    }

    /// Insert or overwrite the entry for `addr`, returning the previous one
    pub fn put(&self, addr: NativeAddr, entry: RegistryEntry) -> Option<RegistryEntry> {
        self.entries.insert(addr, entry)
    }

    /// Get the entry for `addr`
    pub fn get(&self, addr: NativeAddr) -> Option<RegistryEntry> {
        self.entries.get(&addr).map(|entry| entry.clone())
    }

    /// Check whether `addr` is considered live
    pub fn contains(&self, addr: NativeAddr) -> bool {
        self.entries.contains_key(&addr)
    }

    /// Remove the entry for `addr`.
    ///
    /// For the external subsystem only, when it frees the native object.
    pub fn remove(&self, addr: NativeAddr) -> Option<RegistryEntry> {
        self.entries.remove(&addr).map(|(_, entry)| entry)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered addresses
    pub fn addresses(&self) -> Vec<NativeAddr> {
        self.entries.iter().map(|entry| *entry.key()).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
