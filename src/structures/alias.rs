use std::fmt::Display;

use gatesim_idx::maps::{BiMap, BiMapCollision};
use smallvec::SmallVec;

use crate::errors::{SimError, SimResult};

/// Which side of a system a bus belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusKind {
    Input,
    Output,
}

impl Display for BusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusKind::Input => write!(f, "input"),
            BusKind::Output => write!(f, "output"),
        }
    }
}

/// The default alias for the bus at `index`, which is its 1-based position.
pub fn default_alias(index: usize) -> String {
    (index + 1).to_string()
}

fn fold(alias: &str) -> String {
    alias.to_lowercase()
}

/// A bijection between the buses of one kind on a system and their aliases.
///
/// Lookups by alias are case-insensitive. The alias is kept as it was given
/// for display, but uniqueness is decided on the case-folded form so `"Q"`
/// and `"q"` can not name different buses.
#[derive(Debug, Clone)]
pub struct AliasIndex {
    kind: BusKind,
    map: BiMap<usize, String>,
    display: SmallVec<[String; 4]>,
}

impl AliasIndex {
    pub fn new(kind: BusKind) -> Self {
        Self {
            kind,
            map: BiMap::new(),
            display: SmallVec::new(),
        }
    }

    /// Build the index for `count` buses named `"1"` through `"count"`.
    pub fn with_defaults(kind: BusKind, count: usize) -> Self {
        let mut index = Self::new(kind);
        for bus in 0..count {
            index.push_distinct(default_alias(bus));
        }
        index
    }

    /// An index holding the single bus `alias`.
    pub fn single(kind: BusKind, alias: &str) -> Self {
        let mut index = Self::new(kind);
        index.push_distinct(alias.to_string());
        index
    }

    /// Append the next bus. Callers guarantee `alias` is not in use.
    fn push_distinct(&mut self, alias: String) {
        let inserted = self.map.insert(self.display.len(), fold(&alias));
        debug_assert!(inserted.is_ok(), "alias \"{alias}\" is already in use");
        self.display.push(alias);
    }

    /// Build the index from construction data. When `aliases` is omitted the
    /// defaults are used, otherwise there must be exactly one unique alias per
    /// bus.
    pub fn from_aliases(
        kind: BusKind,
        count: usize,
        aliases: Option<&[String]>,
    ) -> SimResult<Self> {
        let Some(aliases) = aliases else {
            return Ok(Self::with_defaults(kind, count));
        };

        if aliases.len() != count {
            return Err(SimError::InconsistentBusCount {
                what: match kind {
                    BusKind::Input => "input aliases",
                    BusKind::Output => "output aliases",
                },
                expected: count,
                given: aliases.len(),
            });
        }

        let mut index = Self::new(kind);
        for (bus, alias) in aliases.iter().enumerate() {
            index.insert(bus, alias)?;
        }
        Ok(index)
    }

    /// Map `alias` to `bus`. Rejected if either side is already mapped to
    /// something else.
    pub fn insert(&mut self, bus: usize, alias: &str) -> SimResult<()> {
        match self.map.insert(bus, fold(alias)) {
            Ok(()) => {
                if bus >= self.display.len() {
                    self.display.resize(bus + 1, String::new());
                }
                self.display[bus] = alias.to_string();
                Ok(())
            }
            Err(BiMapCollision::Value { .. }) => Err(SimError::DuplicateAlias {
                kind: self.kind,
                alias: alias.to_string(),
            }),
            Err(BiMapCollision::Key { existing, .. }) => {
                Err(SimError::DuplicateAlias {
                    kind: self.kind,
                    alias: self.display.get(bus).cloned().unwrap_or(existing),
                })
            }
        }
    }

    /// Remove the alias of `bus`, returning it.
    pub fn remove(&mut self, bus: usize) -> Option<String> {
        self.map.remove_key(&bus)?;
        self.display.get_mut(bus).map(std::mem::take)
    }

    pub fn index_of(&self, alias: &str) -> SimResult<usize> {
        self.map
            .get_key(&fold(alias))
            .copied()
            .ok_or_else(|| SimError::UnknownAlias {
                kind: self.kind,
                alias: alias.to_string(),
            })
    }

    pub fn alias_of(&self, bus: usize) -> SimResult<&str> {
        if self.map.contains_key(&bus) {
            Ok(&self.display[bus])
        } else {
            Err(SimError::UnknownIndex {
                kind: self.kind,
                index: bus,
            })
        }
    }

    pub fn kind(&self) -> BusKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The aliases in bus order.
    pub fn aliases(&self) -> Vec<String> {
        (0..self.display.len())
            .filter(|bus| self.map.contains_key(bus))
            .map(|bus| self.display[bus].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{AliasIndex, BusKind};
    use crate::errors::SimError;
    use proptest::prelude::*;

    fn names(aliases: &[&str]) -> Vec<String> {
        aliases.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn defaults_are_one_based() {
        let index = AliasIndex::with_defaults(BusKind::Input, 3);
        assert_eq!(index.aliases(), vec!["1", "2", "3"]);
        assert_eq!(index.index_of("1").unwrap(), 0);
        assert_eq!(index.alias_of(2).unwrap(), "3");
        assert_eq!(
            index.index_of("0"),
            Err(SimError::UnknownAlias {
                kind: BusKind::Input,
                alias: "0".into()
            })
        );
    }

    #[test]
    fn lookup_ignores_case() {
        let aliases = names(&["Sum", "Cout"]);
        let index =
            AliasIndex::from_aliases(BusKind::Output, 2, Some(&aliases[..]))
                .unwrap();
        assert_eq!(index.index_of("SUM").unwrap(), 0);
        assert_eq!(index.index_of("cout").unwrap(), 1);
        assert_eq!(index.alias_of(1).unwrap(), "Cout");
    }

    #[test]
    fn construction_data_is_validated() {
        let short = names(&["a", "b"]);
        assert_eq!(
            AliasIndex::from_aliases(BusKind::Input, 3, Some(&short[..]))
                .unwrap_err(),
            SimError::InconsistentBusCount {
                what: "input aliases",
                expected: 3,
                given: 2
            }
        );
        let clashing = names(&["q", "Q"]);
        assert_eq!(
            AliasIndex::from_aliases(BusKind::Output, 2, Some(&clashing[..]))
                .unwrap_err(),
            SimError::DuplicateAlias {
                kind: BusKind::Output,
                alias: "Q".into()
            }
        );
    }

    #[test]
    fn insert_rejects_collisions_both_ways() {
        let mut index = AliasIndex::new(BusKind::Input);
        index.insert(0, "a").unwrap();
        assert!(index.insert(1, "A").is_err());
        assert!(index.insert(0, "b").is_err());
        assert_eq!(index.alias_of(0).unwrap(), "a");
        assert!(index.alias_of(1).is_err());

        assert_eq!(index.remove(0).as_deref(), Some("a"));
        assert!(index.index_of("a").is_err());
        index.insert(1, "a").unwrap();
        assert_eq!(index.index_of("a").unwrap(), 1);
    }

    #[test]
    fn single_alias_index() {
        let index = AliasIndex::single(BusKind::Output, "Q");
        assert_eq!(index.aliases(), vec!["Q"]);
        assert_eq!(index.index_of("q").unwrap(), 0);
        assert!(index.alias_of(1).is_err());
    }

    #[test]
    fn unknown_index_names_the_bus_kind() {
        let index = AliasIndex::with_defaults(BusKind::Output, 1);
        assert_eq!(
            index.alias_of(1),
            Err(SimError::UnknownIndex {
                kind: BusKind::Output,
                index: 1
            })
        );
    }

    proptest! {
        #[test]
        fn index_alias_bijection(
            aliases in prop::collection::hash_set("[a-z][a-z0-9_]{0,5}", 1..16)
        ) {
            let aliases: Vec<String> = aliases.into_iter().collect();
            let index = AliasIndex::from_aliases(
                BusKind::Input,
                aliases.len(),
                Some(aliases.as_slice()),
            ).unwrap();

            for bus in 0..aliases.len() {
                let alias = index.alias_of(bus).unwrap();
                prop_assert_eq!(index.index_of(alias).unwrap(), bus);
                let upper = alias.to_uppercase();
                prop_assert_eq!(index.index_of(&upper).unwrap(), bus);
            }
        }
    }
}
