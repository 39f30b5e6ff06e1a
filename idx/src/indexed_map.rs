use super::index_trait::IndexRef;
use std::{
    marker::PhantomData,
    ops::{Index, IndexMut},
};

/// An append-only arena. Each pushed value gets the next key in sequence, and
/// since nothing is ever removed a key stays valid for the life of the map.
#[derive(Debug, Clone)]
pub struct IndexedMap<K: IndexRef, D> {
    entries: Vec<D>,
    _key: PhantomData<K>,
}

impl<K: IndexRef, D> IndexedMap<K, D> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _key: PhantomData,
        }
    }

    /// Store `value`, returning the key it was stored under.
    pub fn push(&mut self, value: D) -> K {
        let key = K::new(self.entries.len());
        self.entries.push(value);
        key
    }

    /// `None` when `key` was issued by a different map.
    pub fn get(&self, key: K) -> Option<&D> {
        self.entries.get(key.index())
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut D> {
        self.entries.get_mut(key.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &D)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, value)| (K::new(idx), value))
    }

    /// Every issued key, oldest first. Does not borrow the map.
    pub fn keys(&self) -> impl Iterator<Item = K> + use<K, D> {
        (0..self.entries.len()).map(K::new)
    }
}

impl<K: IndexRef, D> Default for IndexedMap<K, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IndexRef, D> Index<K> for IndexedMap<K, D> {
    type Output = D;

    fn index(&self, key: K) -> &D {
        &self.entries[key.index()]
    }
}

impl<K: IndexRef, D> IndexMut<K> for IndexedMap<K, D> {
    fn index_mut(&mut self, key: K) -> &mut D {
        &mut self.entries[key.index()]
    }
}

/// Side data for the keys of an [`IndexedMap`], stored densely. Keys with no
/// entry read as `D::default()`, so it only has to grow when written to.
#[derive(Debug, Clone)]
pub struct SecondaryMap<K: IndexRef, D: Clone + Default> {
    entries: Vec<D>,
    fallback: D,
    _key: PhantomData<K>,
}

impl<K: IndexRef, D: Clone + Default> SecondaryMap<K, D> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            fallback: D::default(),
            _key: PhantomData,
        }
    }

    pub fn get(&self, key: K) -> &D {
        self.entries.get(key.index()).unwrap_or(&self.fallback)
    }

    /// The entry for `key`, filling any gap before it with defaults.
    pub fn get_mut_or_default(&mut self, key: K) -> &mut D {
        let idx = key.index();
        if idx >= self.entries.len() {
            self.entries.resize(idx + 1, D::default());
        }
        &mut self.entries[idx]
    }
}

impl<K: IndexRef, D: Clone + Default> Default for SecondaryMap<K, D> {
    fn default() -> Self {
        Self::new()
    }
}

// no IndexMut: writes go through get_mut_or_default so the map can grow
impl<K: IndexRef, D: Clone + Default> Index<K> for SecondaryMap<K, D> {
    type Output = D;

    fn index(&self, key: K) -> &D {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        IndexRef, define_index,
        maps::{IndexedMap, SecondaryMap},
    };
    use smallvec::{SmallVec, smallvec};

    define_index! {
        struct NodeIdx(u32);
    }

    #[test]
    fn keys_follow_insertion_order() {
        let mut map: IndexedMap<NodeIdx, &str> = IndexedMap::new();
        let a = map.push("a");
        let b = map.push("b");

        assert_eq!(a.index(), 0);
        assert_eq!(b, NodeIdx::from(1_usize));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(map.iter().map(|(_, v)| *v).collect::<String>(), "ab");
        assert_eq!(map[b], "b");
        map[a] = "c";
        assert_eq!(map.get(a), Some(&"c"));
        assert!(map.get_mut(NodeIdx(2)).is_none());
        assert!(map.get(NodeIdx(7)).is_none());
    }

    #[test]
    fn secondary_map_defaults_missing_entries() {
        let mut fanout: SecondaryMap<NodeIdx, SmallVec<[NodeIdx; 2]>> =
            SecondaryMap::new();
        fanout.get_mut_or_default(NodeIdx(3)).push(NodeIdx(0));

        assert!(fanout[NodeIdx(0)].is_empty());
        assert!(fanout[NodeIdx(12)].is_empty());
        let expected: SmallVec<[NodeIdx; 2]> = smallvec![NodeIdx(0)];
        assert_eq!(fanout[NodeIdx(3)], expected);
    }
}
