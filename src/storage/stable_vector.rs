//! Slot-recycling vector with indices that never move.
//!
//! [`StableVector`] stores each element in its own slot. Erasing a slot drops
//! the element in place and records the slot as vacant; no other element is
//! shifted or renumbered. The most recently vacated slot is the first one a
//! later [`add`](StableVector::add) reuses.

use crate::container_error::ContainerError;
use crate::debug_invariants::DebugInvariants;
use std::ops::{Index, IndexMut};

/// A vector whose indices stay valid across erasure of other elements.
///
/// # Example
/// ```rust
/// use stable_containers::storage::stable_vector::StableVector;
/// let mut v = StableVector::new();
/// let a = v.add('a');
/// let b = v.add('b');
/// v.erase(a).unwrap();
/// assert_eq!(v[b], 'b');
/// assert!(v.at(a).is_err());
/// assert_eq!(v.add('c'), a);
/// ```
#[derive(Clone, Debug)]
pub struct StableVector<T> {
    /// One slot per index ever handed out; `None` marks a vacant slot.
    slots: Vec<Option<T>>,
    /// Vacant slot indices, reused last-in first-out.
    erased: Vec<usize>,
}

impl<T> Default for StableVector<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            erased: Vec::new(),
        }
    }
}

impl<T> StableVector<T> {
    /// Creates a new, empty `StableVector`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty vector with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            erased: Vec::new(),
        }
    }

    /// Stores `value` and returns its index.
    ///
    /// Reuses the most recently erased slot if there is one, otherwise
    /// appends a new slot. O(1) amortized.
    pub fn add(&mut self, value: T) -> usize {
        let index = if let Some(vacant) = self.erased.pop() {
            log::trace!("StableVector: recycling slot {vacant}");
            self.slots[vacant] = Some(value);
            vacant
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        index
    }

    /// Checked access.
    ///
    /// # Errors
    /// * [`ContainerError::IndexOutOfRange`] if `index` was never allocated.
    /// * [`ContainerError::ErasedSlot`] if the slot is currently vacant.
    pub fn at(&self, index: usize) -> Result<&T, ContainerError> {
        match self.slots.get(index) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(ContainerError::ErasedSlot { index }),
            None => Err(ContainerError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            }),
        }
    }

    /// Checked mutable access. Fails exactly like [`at`](Self::at).
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ContainerError> {
        let len = self.slots.len();
        match self.slots.get_mut(index) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(ContainerError::ErasedSlot { index }),
            None => Err(ContainerError::IndexOutOfRange { index, len }),
        }
    }

    /// Returns the element at `index`, or `None` if the slot is vacant or unallocated.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Mutable counterpart of [`get`](Self::get).
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// `true` if `index` currently holds an element.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Removes and returns the element at `index`, leaving its slot vacant.
    ///
    /// No other index is affected.
    ///
    /// # Errors
    /// Same as [`at`](Self::at); erasing the same index twice reports
    /// [`ContainerError::ErasedSlot`] and leaves the vector untouched.
    pub fn erase(&mut self, index: usize) -> Result<T, ContainerError> {
        let len = self.slots.len();
        let value = match self.slots.get_mut(index) {
            Some(slot) => slot.take().ok_or(ContainerError::ErasedSlot { index })?,
            None => return Err(ContainerError::IndexOutOfRange { index, len }),
        };
        self.erased.push(index);
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(value)
    }

    /// Number of live elements (allocated slots minus vacant ones).
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - self.erased.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever allocated, live or vacant.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of vacant slots waiting to be recycled.
    #[inline]
    pub fn vacant_count(&self) -> usize {
        self.erased.len()
    }

    /// Live `(index, &value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }

    /// Live `(index, &mut value)` pairs in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (i, v)))
    }

    /// Live indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(|(i, _)| i)
    }

    /// Drops every element and forgets every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.erased.clear();
    }
}

/// Unchecked fast path.
///
/// # Panics
/// Panics if `index` is out of range or vacant. Use [`StableVector::at`] for a
/// `Result`.
impl<T> Index<usize> for StableVector<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        match self.slots[index].as_ref() {
            Some(value) => value,
            None => panic!("access of erased slot {index}"),
        }
    }
}

impl<T> IndexMut<usize> for StableVector<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.slots[index].as_mut() {
            Some(value) => value,
            None => panic!("access of erased slot {index}"),
        }
    }
}

impl<T> DebugInvariants for StableVector<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self, "StableVector");
    }

    fn validate_invariants(&self) -> Result<(), ContainerError> {
        let mut seen = vec![false; self.slots.len()];
        for &index in &self.erased {
            match self.slots.get(index) {
                None => {
                    return Err(ContainerError::invariant(format!(
                        "erased index {index} beyond {} slots",
                        self.slots.len()
                    )));
                }
                Some(Some(_)) => {
                    return Err(ContainerError::invariant(format!(
                        "erased index {index} still holds a value"
                    )));
                }
                Some(None) => {}
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(ContainerError::invariant(format!(
                    "slot {index} recorded as erased twice"
                )));
            }
        }
        let vacant = self.slots.iter().filter(|s| s.is_none()).count();
        if vacant != self.erased.len() {
            return Err(ContainerError::invariant(format!(
                "{vacant} vacant slots but {} recorded as erased",
                self.erased.len()
            )));
        }
        Ok(())
    }
}
