use gatesim_idx::define_index;

define_index! {
    /// The location of a system in an [`Environment`][] arena. Only
    /// meaningful relative to the environment which issued it.
    ///
    /// [`Environment`]: crate::structures::environment::Environment
    pub struct SystemIdx(u32);
}

/// A non-owning reference to one output bus of a system in the same
/// environment. Reading through it never triggers an update of the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputPointer {
    /// the producing system
    pub system: SystemIdx,
    /// index of the output bus on the producer
    pub bus: usize,
}

impl OutputPointer {
    pub fn new(system: SystemIdx, bus: usize) -> Self {
        Self { system, bus }
    }
}
