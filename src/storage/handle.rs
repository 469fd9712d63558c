//! `Handle`: a strong, zero-cost identity for elements of a [`HandleMap`]
//!
//! A handle is decoupled from the physical position of its element: the map's
//! dense array compacts on erase, but the handle keeps resolving to the same
//! logical element until that element is erased. Handle values are recycled
//! after erasure, so a handle is only meaningful for the map that issued it
//! and only while its element is live.
//!
//! [`HandleMap`]: crate::storage::handle_map::HandleMap

use std::fmt;

/// Opaque identity issued by [`HandleMap::insert`](crate::storage::handle_map::HandleMap::insert).
///
/// # Memory layout
/// This type is `repr(transparent)` over `usize`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct Handle(usize);

impl Handle {
    /// Wraps a raw handle value.
    ///
    /// Any value is representable; whether it is live is a question for the
    /// map that issued it.
    ///
    /// ```rust
    /// # use stable_containers::storage::handle::Handle;
    /// let h = Handle::new(3);
    /// assert_eq!(h.get(), 3);
    /// ```
    #[inline]
    pub const fn new(raw: usize) -> Self {
        Handle(raw)
    }

    /// Returns the raw handle value.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.0).finish()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Handle> for usize {
    #[inline]
    fn from(h: Handle) -> usize {
        h.0
    }
}
