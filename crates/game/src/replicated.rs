use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

#[derive(Debug, Clone)]
struct Slot<K, V> {
    key: K,
    value: V,
    dirty: bool,
}

/// Server-authoritative map whose mutations are recorded for replication.
///
/// Iteration follows insertion order. Every `set`, tracked `get_mut` and
/// `delete` is remembered until the next [`ReplicatedMap::take_delta`].
#[derive(Debug, Clone)]
pub struct ReplicatedMap<K, V> {
    slots: Vec<Slot<K, V>>,
    index: HashMap<K, usize>,
    removed: Vec<K>,
}

/// Changes accumulated since the previous delta. Consumers apply `removed`
/// before `updated`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDelta<K, V> {
    pub updated: Vec<(K, V)>,
    pub removed: Vec<K>,
}

impl<K, V> MapDelta<K, V> {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.removed.is_empty()
    }
}

impl<K, V> Default for ReplicatedMap<K, V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            removed: Vec::new(),
        }
    }
}

impl<K, V> ReplicatedMap<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the value under `key`. A replaced value keeps its
    /// original position in iteration order.
    pub fn set(&mut self, key: K, value: V) -> &mut V {
        let idx = match self.index.get(&key) {
            Some(&idx) => {
                let slot = &mut self.slots[idx];
                slot.value = value;
                slot.dirty = true;
                idx
            }
            None => {
                let idx = self.slots.len();
                self.index.insert(key.clone(), idx);
                self.slots.push(Slot {
                    key,
                    value,
                    dirty: true,
                });
                idx
            }
        };
        &mut self.slots[idx].value
    }

    pub fn delete(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        let slot = self.slots.remove(idx);
        for later in &self.slots[idx..] {
            if let Some(i) = self.index.get_mut(&later.key) {
                *i -= 1;
            }
        }
        self.removed.push(slot.key);
        Some(slot.value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.slots[idx].value)
    }

    /// Mutable access that marks the entry as changed.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = *self.index.get(key)?;
        let slot = &mut self.slots[idx];
        slot.dirty = true;
        Some(&mut slot.value)
    }

    /// Mutable access for fields that are not replicated.
    pub fn get_mut_untracked(&mut self, key: &K) -> Option<&mut V> {
        let idx = *self.index.get(key)?;
        Some(&mut self.slots[idx].value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.iter().map(|s| (&s.key, &s.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.slots.iter().map(|s| &s.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().map(|s| &s.value)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.removed.extend(self.slots.drain(..).map(|s| s.key));
    }

    pub fn has_changes(&self) -> bool {
        !self.removed.is_empty() || self.slots.iter().any(|s| s.dirty)
    }

    pub fn take_delta(&mut self) -> MapDelta<K, V>
    where
        V: Clone,
    {
        let updated = self
            .slots
            .iter_mut()
            .filter(|s| s.dirty)
            .map(|s| {
                s.dirty = false;
                (s.key.clone(), s.value.clone())
            })
            .collect();

        MapDelta {
            updated,
            removed: std::mem::take(&mut self.removed),
        }
    }
}
