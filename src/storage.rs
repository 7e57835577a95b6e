//! Binding and instance storage for the container
//!
//! Uses DashMap for lock-free concurrent access. Map guards are never held
//! across user code: lookups clone what they need and release the shard.

use crate::{Factory, Identifier, Instance};
use ahash::RandomState;
use dashmap::DashMap;

/// Shard count for a map expected to hold `capacity` entries.
///
/// Default DashMap uses num_cpus * 4 shards which is overkill for
/// typical containers with <50 services.
#[inline]
fn shard_amount(capacity: usize) -> usize {
    if capacity <= 16 {
        8
    } else if capacity <= 64 {
        16
    } else {
        32
    }
}

#[inline]
fn new_map<V>(capacity: usize) -> DashMap<Identifier, V, RandomState> {
    DashMap::with_capacity_and_hasher_and_shard_amount(
        capacity,
        RandomState::new(),
        shard_amount(capacity),
    )
}

/// A registered construction rule.
#[derive(Clone, Debug)]
pub(crate) struct Binding {
    pub(crate) concrete: Factory,
    pub(crate) shared: bool,
    /// Created by resolution of an unbound identifier, not by the caller
    pub(crate) implicit: bool,
}

/// Identifier → binding map. Last registration wins.
pub(crate) struct BindingStorage {
    bindings: DashMap<Identifier, Binding, RandomState>,
}

impl BindingStorage {
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bindings: new_map(capacity),
        }
    }

    /// Insert or overwrite a binding
    #[inline]
    pub fn insert(&self, identifier: Identifier, binding: Binding) {
        self.bindings.insert(identifier, binding);
    }

    /// Insert the binding only if none exists; returns true if inserted
    #[inline]
    pub fn insert_if_absent(&self, identifier: Identifier, binding: Binding) -> bool {
        use dashmap::mapref::entry::Entry;

        match self.bindings.entry(identifier) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(binding);
                true
            }
        }
    }

    /// Clone the binding out of the map
    #[inline]
    pub fn get(&self, identifier: &Identifier) -> Option<Binding> {
        self.bindings.get(identifier).map(|b| b.value().clone())
    }

    #[inline]
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.bindings.contains_key(identifier)
    }

    /// True if a binding exists and the caller registered it
    #[inline]
    pub fn contains_explicit(&self, identifier: &Identifier) -> bool {
        self.bindings
            .get(identifier)
            .map(|b| !b.implicit)
            .unwrap_or(false)
    }

    #[inline]
    pub fn is_shared(&self, identifier: &Identifier) -> bool {
        self.bindings
            .get(identifier)
            .map(|b| b.shared)
            .unwrap_or(false)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// All bound identifiers, sorted
    pub fn identifiers(&self) -> Vec<Identifier> {
        let mut ids: Vec<_> = self.bindings.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }
}

impl Default for BindingStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingStorage")
            .field("count", &self.len())
            .finish()
    }
}

/// Identifier → resolved shared instance. Entries are never evicted.
pub(crate) struct InstanceCache {
    instances: DashMap<Identifier, Instance, RandomState>,
}

impl InstanceCache {
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: new_map(capacity),
        }
    }

    #[inline]
    pub fn get(&self, identifier: &Identifier) -> Option<Instance> {
        self.instances.get(identifier).map(|i| i.value().clone())
    }

    #[inline]
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.instances.contains_key(identifier)
    }

    /// Store `instance` unless another one is already cached, and return
    /// whichever instance ends up in the cache.
    #[inline]
    pub fn get_or_insert(&self, identifier: Identifier, instance: Instance) -> Instance {
        self.instances
            .entry(identifier)
            .or_insert(instance)
            .value()
            .clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

impl Default for InstanceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InstanceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceCache")
            .field("count", &self.len())
            .finish()
    }
}
