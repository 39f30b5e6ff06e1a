use ahash::AHashMap;
use std::{fmt::Debug, hash::Hash};

/// The reason a [`BiMap::insert`] was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiMapCollision<K, V> {
    /// The key is already mapped to a different value
    Key { key: K, existing: V },
    /// The value is already mapped from a different key
    Value { value: V, existing: K },
}

/// A bidirectional map in which both keys and values are unique.
///
/// Implemented as a pair of hash maps, one per direction. Inserts which would
/// desynchronize the two directions are rejected rather than overwriting, so
/// the map is always a bijection.
#[derive(Debug, Clone)]
pub struct BiMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    forward: AHashMap<K, V>,
    backward: AHashMap<V, K>,
}

impl<K, V> BiMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            forward: AHashMap::new(),
            backward: AHashMap::new(),
        }
    }

    pub fn with_capacity(size: usize) -> Self {
        Self {
            forward: AHashMap::with_capacity(size),
            backward: AHashMap::with_capacity(size),
        }
    }

    /// Store the `key <=> value` mapping. Re-inserting an identical pair is a
    /// no-op.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), BiMapCollision<K, V>> {
        match (self.forward.get(&key), self.backward.get(&value)) {
            (Some(existing), _) if existing != &value => {
                Err(BiMapCollision::Key {
                    existing: existing.clone(),
                    key,
                })
            }
            (_, Some(existing)) if existing != &key => {
                Err(BiMapCollision::Value {
                    existing: existing.clone(),
                    value,
                })
            }
            (Some(_), Some(_)) => Ok(()),
            _ => {
                self.forward.insert(key.clone(), value.clone());
                self.backward.insert(value, key);
                Ok(())
            }
        }
    }

    pub fn get_value(&self, key: &K) -> Option<&V> {
        self.forward.get(key)
    }

    pub fn get_key(&self, value: &V) -> Option<&K> {
        self.backward.get(value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    pub fn contains_value(&self, value: &V) -> bool {
        self.backward.contains_key(value)
    }

    /// Remove the mapping for `key` in both directions, returning the value
    /// it was associated with.
    pub fn remove_key(&mut self, key: &K) -> Option<V> {
        let value = self.forward.remove(key)?;
        self.backward.remove(&value);
        Some(value)
    }

    /// Remove the mapping for `value` in both directions, returning the key
    /// it was associated with.
    pub fn remove_value(&mut self, value: &V) -> Option<K> {
        let key = self.backward.remove(value)?;
        self.forward.remove(&key);
        Some(key)
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.forward.iter()
    }
}

impl<K, V> Default for BiMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
