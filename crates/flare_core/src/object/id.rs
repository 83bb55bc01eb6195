//! # Object Identity
//!
//! Object ids are issued in order starting at 1 and are never reused, so a
//! stale id can always be told apart from a live one.

use std::fmt;

/// Unique identifier for an object.
///
/// The value doubles as the object's registry slot: id `n` lives in slot
/// `n - 1`. Zero is never issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Null/invalid object ID.
    pub const NULL: Self = Self(0);

    /// Wraps a raw id value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Registry slot for this id, or `None` for the null id.
    #[inline]
    pub(crate) fn slot(self) -> Option<usize> {
        usize::try_from(self.0).ok()?.checked_sub(1)
    }

    /// The id stored in registry slot `index`.
    #[inline]
    pub(crate) fn from_slot(index: usize) -> Self {
        Self(index as u64 + 1)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
