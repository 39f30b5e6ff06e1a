//! Identity issuance for systems.

use std::{
    fmt::Display,
    sync::atomic::{AtomicU32, Ordering},
};

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// The unique identity of a system instance. Issued once at construction and
/// never reused, including across blueprint builds.
#[derive(Debug, Eq, Copy, Clone, PartialEq, Hash, PartialOrd, Ord)]
pub struct SystemId(u32);

impl SystemId {
    /// Issue a fresh identity. Identities increase monotonically for the life
    /// of the process.
    pub(crate) fn issue() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
