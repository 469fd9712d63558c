//! Dense storage addressed through stable handles.
//!
//! [`HandleMap`] keeps its values packed in a dense array and hands out
//! [`Handle`]s that resolve through a sparse table. Erasing swaps the victim
//! with the last dense element and pops it, so the dense array never has
//! holes; the sparse and reverse tables are patched in the same call so that
//! every other handle keeps resolving to its own value.
//!
//! | table     | maps                    |
//! |-----------|-------------------------|
//! | `dense`   | position → value        |
//! | `sparse`  | handle → position       |
//! | `reverse` | position → handle       |
//! | `free`    | recyclable handles      |

use crate::container_error::ContainerError;
use crate::debug_invariants::DebugInvariants;
use crate::storage::handle::Handle;
use std::ops::{Index, IndexMut};

/// Dense value array with O(1) insert, erase, and access through stable handles.
///
/// Iteration walks the dense array directly; its order is **not** stable
/// across erasures, since erase moves the last element into the hole.
///
/// # Example
/// ```rust
/// use stable_containers::storage::handle_map::HandleMap;
/// let mut m = HandleMap::new();
/// let x = m.insert("x");
/// let y = m.insert("y");
/// m.erase(x).unwrap();
/// assert_eq!(m[y], "y");
/// assert_eq!(m.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct HandleMap<T> {
    dense: Vec<T>,
    /// `None` while the handle sits on the free list.
    sparse: Vec<Option<usize>>,
    reverse: Vec<Handle>,
    free: Vec<Handle>,
}

impl<T> Default for HandleMap<T> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            reverse: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> HandleMap<T> {
    /// Creates a new, empty `HandleMap`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            sparse: Vec::with_capacity(capacity),
            reverse: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Appends `value` to the dense array and returns its handle.
    ///
    /// The handle is recycled from the free list if one is available.
    pub fn insert(&mut self, value: T) -> Handle {
        self.emplace(|_| value)
    }

    /// Constructs the value in place from the handle it is about to receive.
    ///
    /// If `make` panics the map is left exactly as it was and the handle is
    /// not issued.
    ///
    /// ```rust
    /// use stable_containers::storage::handle_map::HandleMap;
    /// let mut m = HandleMap::new();
    /// let h = m.emplace(|h| format!("node-{h}"));
    /// assert_eq!(m[h], "node-0");
    /// ```
    pub fn emplace(&mut self, make: impl FnOnce(Handle) -> T) -> Handle {
        // nothing is touched until `make` has returned
        let recycled = self.free.last().copied();
        let handle = recycled.unwrap_or(Handle::new(self.sparse.len()));
        let value = make(handle);

        let position = self.dense.len();
        if recycled.is_some() {
            log::trace!("HandleMap: recycling handle {handle}");
            self.free.pop();
            self.sparse[handle.get()] = Some(position);
        } else {
            self.sparse.push(Some(position));
        }
        self.dense.push(value);
        self.reverse.push(handle);
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        handle
    }

    /// Removes the element behind `handle` and returns it.
    ///
    /// The last dense element is moved into the vacated position; its handle
    /// keeps resolving to it. `handle` goes to the free list.
    ///
    /// # Errors
    /// [`ContainerError::InvalidHandle`] if `handle` is not live; the map is
    /// left untouched.
    pub fn erase(&mut self, handle: Handle) -> Result<T, ContainerError> {
        // 1) dense position of the victim
        let position = self.position(handle)?;
        // 2) owner of the current back
        let last = self.dense.len() - 1;
        let back_handle = self.reverse[last];
        // 3) move the back value into the hole
        self.dense.swap(position, last);
        // 4) keep reverse aligned with dense
        self.reverse.swap(position, last);
        // 5) repoint the moved element
        self.sparse[back_handle.get()] = Some(position);
        // 6) pop the victim
        self.reverse.pop();
        let value = self
            .dense
            .pop()
            .ok_or_else(|| ContainerError::invariant("dense array empty during erase"))?;
        // 7) retire the handle
        self.sparse[handle.get()] = None;
        self.free.push(handle);

        if back_handle != handle {
            log::trace!("HandleMap: handle {back_handle} relocated {last} -> {position}");
        }
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(value)
    }

    #[inline]
    fn position(&self, handle: Handle) -> Result<usize, ContainerError> {
        self.sparse
            .get(handle.get())
            .copied()
            .flatten()
            .ok_or(ContainerError::InvalidHandle(handle))
    }

    /// `true` if `handle` currently resolves to an element.
    #[inline]
    pub fn contains(&self, handle: Handle) -> bool {
        self.position(handle).is_ok()
    }

    #[inline]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let position = self.position(handle).ok()?;
        self.dense.get(position)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let position = self.position(handle).ok()?;
        self.dense.get_mut(position)
    }

    /// Checked access.
    ///
    /// # Errors
    /// [`ContainerError::InvalidHandle`] if `handle` is not live.
    pub fn try_get(&self, handle: Handle) -> Result<&T, ContainerError> {
        self.get(handle).ok_or(ContainerError::InvalidHandle(handle))
    }

    /// Checked mutable access.
    pub fn try_get_mut(&mut self, handle: Handle) -> Result<&mut T, ContainerError> {
        self.get_mut(handle)
            .ok_or(ContainerError::InvalidHandle(handle))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Values in dense order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.dense.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.dense.iter_mut()
    }

    /// Live handles in dense order.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.reverse.iter().copied()
    }

    /// `(handle, &value)` pairs in dense order.
    pub fn iter_with_handles(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.reverse.iter().copied().zip(self.dense.iter())
    }

    /// The dense array itself.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.dense
    }

    /// Drops every element and invalidates every handle.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.sparse.clear();
        self.reverse.clear();
        self.free.clear();
    }
}

/// Unchecked fast path.
///
/// # Panics
/// Panics if `handle` is not live. Use [`HandleMap::try_get`] for a `Result`.
impl<T> Index<Handle> for HandleMap<T> {
    type Output = T;

    #[inline]
    fn index(&self, handle: Handle) -> &T {
        match self.sparse[handle.get()] {
            Some(position) => &self.dense[position],
            None => panic!("handle {handle} is not live"),
        }
    }
}

impl<T> IndexMut<Handle> for HandleMap<T> {
    #[inline]
    fn index_mut(&mut self, handle: Handle) -> &mut T {
        match self.sparse[handle.get()] {
            Some(position) => &mut self.dense[position],
            None => panic!("handle {handle} is not live"),
        }
    }
}

impl<'a, T> IntoIterator for &'a HandleMap<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> DebugInvariants for HandleMap<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self, "HandleMap");
    }

    fn validate_invariants(&self) -> Result<(), ContainerError> {
        if self.reverse.len() != self.dense.len() {
            return Err(ContainerError::invariant(format!(
                "reverse has {} entries for {} dense values",
                self.reverse.len(),
                self.dense.len()
            )));
        }
        // sparse[reverse[p]] == p for every dense position
        for (position, &handle) in self.reverse.iter().enumerate() {
            if self.sparse.get(handle.get()).copied().flatten() != Some(position) {
                return Err(ContainerError::invariant(format!(
                    "handle {handle} owns position {position} but sparse disagrees"
                )));
            }
        }
        // every live sparse entry is accounted for by reverse; the rest are free
        let live = self.sparse.iter().filter(|s| s.is_some()).count();
        if live != self.dense.len() {
            return Err(ContainerError::invariant(format!(
                "{live} live handles for {} dense values",
                self.dense.len()
            )));
        }
        if live + self.free.len() != self.sparse.len() {
            return Err(ContainerError::invariant(format!(
                "{} free + {live} live handles but {} issued",
                self.free.len(),
                self.sparse.len()
            )));
        }
        for &handle in &self.free {
            if self.sparse.get(handle.get()).copied().flatten().is_some() {
                return Err(ContainerError::invariant(format!(
                    "free handle {handle} still resolves"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let m: HandleMap<u8> = HandleMap::new();
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
    }

    #[test]
    fn insert_then_index() {
        let mut m = HandleMap::new();
        let a = m.insert(1);
        let b = m.insert(2);
        assert_ne!(a, b);
        assert_eq!(m[a], 1);
        assert_eq!(m[b], 2);
        m[a] = 11;
        assert_eq!(m.try_get(a), Ok(&11));
    }

    #[test]
    fn erase_relocates_back_and_keeps_handles() {
        let mut m = HandleMap::new();
        let x = m.insert("x");
        let y = m.insert("y");
        let z = m.insert("z");

        assert_eq!(m.erase(x), Ok("x"));
        assert_eq!(m.len(), 2);
        assert_eq!(m[y], "y");
        assert_eq!(m[z], "z");
        // "z" was moved into the hole at the front
        assert_eq!(m.as_slice(), &["z", "y"]);
        assert_eq!(m.handles().collect::<Vec<_>>(), vec![z, y]);
    }

    #[test]
    fn erase_of_back_element() {
        let mut m = HandleMap::new();
        let a = m.insert('a');
        let b = m.insert('b');
        assert_eq!(m.erase(b), Ok('b'));
        assert_eq!(m[a], 'a');
        assert!(!m.contains(b));
    }

    #[test]
    fn erase_only_element() {
        let mut m = HandleMap::new();
        let a = m.insert(5);
        assert_eq!(m.erase(a), Ok(5));
        assert!(m.is_empty());
        assert!(m.validate_invariants().is_ok());
    }

    #[test]
    fn freed_handle_is_recycled() {
        let mut m = HandleMap::new();
        let a = m.insert("a");
        let _b = m.insert("b");
        m.erase(a).unwrap();
        let w = m.insert("w");
        assert_eq!(w, a);
        assert_eq!(m[w], "w");
    }

    #[test]
    fn dead_handles_are_rejected() {
        let mut m = HandleMap::new();
        let a = m.insert(1);
        m.erase(a).unwrap();
        assert_eq!(m.erase(a), Err(ContainerError::InvalidHandle(a)));
        assert_eq!(m.try_get(a), Err(ContainerError::InvalidHandle(a)));
        let never = Handle::new(42);
        assert!(m.get(never).is_none());
        assert!(m.try_get_mut(never).is_err());
    }

    #[test]
    #[should_panic(expected = "is not live")]
    fn index_with_dead_handle_panics() {
        let mut m = HandleMap::new();
        let a = m.insert(1);
        m.insert(2);
        m.erase(a).unwrap();
        let _ = m[a];
    }

    #[test]
    fn emplace_sees_its_handle() {
        let mut m = HandleMap::new();
        let a = m.emplace(|h| h.get() * 10);
        let b = m.emplace(|h| h.get() * 10);
        assert_eq!(m[a], 0);
        assert_eq!(m[b], 10);
        m.erase(a).unwrap();
        let c = m.emplace(|h| h.get() * 10 + 1);
        assert_eq!(c, a);
        assert_eq!(m[c], 1);
    }

    #[test]
    fn panicking_emplace_leaves_map_untouched() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let mut m = HandleMap::new();
        let a = m.insert(1);
        let b = m.insert(2);
        m.erase(a).unwrap();

        // recycled handle
        let r = catch_unwind(AssertUnwindSafe(|| m.emplace(|_| -> i32 { panic!("boom") })));
        assert!(r.is_err());
        assert!(m.validate_invariants().is_ok());
        assert!(!m.contains(a));
        assert_eq!(m.len(), 1);

        // fresh handle
        let fresh = Handle::new(2);
        let r = catch_unwind(AssertUnwindSafe(|| m.emplace(|_| -> i32 { panic!("boom") })));
        assert!(r.is_err());
        assert!(m.validate_invariants().is_ok());
        assert!(!m.contains(fresh));

        let c = m.insert(3);
        assert_eq!(c, a);
        assert_eq!(m[b], 2);
        assert_eq!(m[c], 3);
        assert!(m.get(fresh).is_none());
    }

    #[test]
    fn iteration_follows_dense_order() {
        let mut m = HandleMap::new();
        let hs: Vec<_> = (0..4).map(|i| m.insert(i)).collect();
        m.erase(hs[1]).unwrap();
        assert_eq!(m.iter().copied().collect::<Vec<_>>(), vec![0, 3, 2]);
        for v in m.iter_mut() {
            *v *= 2;
        }
        let pairs: Vec<_> = m.iter_with_handles().map(|(h, v)| (h, *v)).collect();
        assert_eq!(pairs, vec![(hs[0], 0), (hs[3], 6), (hs[2], 4)]);
        assert_eq!((&m).into_iter().count(), 3);
    }

    #[test]
    fn clear_resets_handles() {
        let mut m = HandleMap::new();
        let a = m.insert(1);
        m.insert(2);
        m.clear();
        assert!(m.is_empty());
        assert!(!m.contains(a));
        assert_eq!(m.insert(3), Handle::new(0));
    }

    #[test]
    fn corrupted_reverse_is_detected() {
        let mut m = HandleMap::new();
        m.insert(1);
        m.insert(2);
        m.reverse.swap(0, 1);
        assert!(matches!(
            m.validate_invariants(),
            Err(ContainerError::InvariantViolation(_))
        ));
    }
}
