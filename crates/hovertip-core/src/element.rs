#![forbid(unsafe_code)]

//! Element identity.

use std::fmt;

/// Opaque identity of a host element (a DOM node in a browser host).
///
/// Two triggers are "the same" exactly when their ids are equal; content is
/// never compared. Ids are minted by the host and are not reused while the
/// element is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Wrap a raw host id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}
