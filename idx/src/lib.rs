//! Index and map structures shared by the gatesim crates.
//!
//! Systems are stored in arenas keyed by small integer newtypes rather than
//! behind shared pointers, which keeps feedback wiring free of ownership
//! cycles. [`IndexRef`] and [`define_index!`] define those keys and
//! [`maps::IndexedMap`] is the arena itself.

mod bimap;
mod index_trait;
mod indexed_map;
mod macros;

pub use index_trait::IndexRef;

pub mod maps {
    pub use super::bimap::{BiMap, BiMapCollision};
    pub use super::indexed_map::{IndexedMap, SecondaryMap};
}
