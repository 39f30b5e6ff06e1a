/// A key into one of the arena maps. Implementors are cheap integer newtypes,
/// usually declared with [`define_index!`](crate::define_index).
pub trait IndexRef: Copy + Eq {
    /// The position this key addresses
    fn index(&self) -> usize;
    /// The key for position `input`
    fn new(input: usize) -> Self;
}
