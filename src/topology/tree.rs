//! Append-only rooted tree on a [`HandleMap`].
//!
//! Node payloads live in a [`HandleMap`]; the shape is kept in two tables
//! indexed by handle: `parents[h]` (`None` for the root) and `children[h]`
//! (child handles in insertion order). Nodes are only ever attached under an
//! existing parent, so the structure stays connected and acyclic by
//! construction. There is no removal or re-parenting.
//!
//! Child iterators borrow the tree, so an insertion cannot invalidate an
//! iterator that is still alive.

use crate::container_error::ContainerError;
use crate::debug_invariants::DebugInvariants;
use crate::storage::handle::Handle;
use crate::storage::handle_map::HandleMap;
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};

type ChildTags = SmallVec<[Handle; 4]>;

/// A rooted tree with stable handles.
///
/// # Example
/// ```rust
/// use stable_containers::topology::tree::Tree;
/// let mut t = Tree::new('r');
/// let root = t.root_tag();
/// let c1 = t.insert_node('a', root).unwrap();
/// let c2 = t.insert_node('b', root).unwrap();
/// assert_eq!(t.child_tags(root), &[c1, c2]);
/// assert_eq!(t.parent_tag(c1), Some(root));
/// ```
#[derive(Clone, Debug)]
pub struct Tree<T> {
    nodes: HandleMap<T>,
    parents: Vec<Option<Handle>>,
    children: Vec<ChildTags>,
}

impl<T: Default> Default for Tree<T> {
    /// A tree whose root holds `T::default()`.
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Tree<T> {
    /// Creates a tree holding only `root`.
    pub fn new(root: T) -> Self {
        Self::with_capacity(root, 1)
    }

    /// Creates a tree holding only `root`, with room for `capacity` nodes.
    pub fn with_capacity(root: T, capacity: usize) -> Self {
        let mut nodes = HandleMap::with_capacity(capacity);
        let root = nodes.insert(root);
        debug_assert_eq!(root.get(), 0, "root must be the first handle");
        let mut parents = Vec::with_capacity(capacity);
        parents.push(None);
        let mut children = Vec::with_capacity(capacity);
        children.push(ChildTags::new());
        Self {
            nodes,
            parents,
            children,
        }
    }

    /// Handle of the root node (always the first handle issued).
    #[inline]
    pub fn root_tag(&self) -> Handle {
        Handle::new(0)
    }

    /// Attaches `value` as the last child of `parent`. O(1) amortized.
    ///
    /// # Errors
    /// [`ContainerError::InvalidHandle`] if `parent` is not a node of this tree.
    pub fn insert_node(&mut self, value: T, parent: Handle) -> Result<Handle, ContainerError> {
        if !self.nodes.contains(parent) {
            return Err(ContainerError::InvalidHandle(parent));
        }
        let tag = self.nodes.insert(value);
        let slot = tag.get();
        if slot >= self.parents.len() {
            self.parents.resize(slot + 1, None);
            self.children.resize_with(slot + 1, ChildTags::new);
        }
        self.parents[slot] = Some(parent);
        self.children[parent.get()].push(tag);
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(tag)
    }

    /// Parent of `node`; `None` for the root and for unknown handles.
    #[inline]
    pub fn parent_tag(&self, node: Handle) -> Option<Handle> {
        self.parents.get(node.get()).copied().flatten()
    }

    /// Child handles of `node` in insertion order; empty for unknown handles.
    pub fn child_tags(&self, node: Handle) -> &[Handle] {
        self.children
            .get(node.get())
            .map_or(&[][..], |tags| tags.as_slice())
    }

    /// Child payloads of `node` in insertion order.
    pub fn children(
        &self,
        node: Handle,
    ) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + Clone + '_ {
        self.child_tags(node).iter().map(move |&tag| &self.nodes[tag])
    }

    /// Handles from `node`'s parent up to the root.
    pub fn ancestors(&self, node: Handle) -> impl Iterator<Item = Handle> + '_ {
        std::iter::successors(self.parent_tag(node), move |&h| self.parent_tag(h))
    }

    /// Number of edges between `node` and the root.
    pub fn depth(&self, node: Handle) -> usize {
        self.ancestors(node).count()
    }

    /// `node` and everything below it, pre-order, children in insertion order.
    pub fn descendants(&self, node: Handle) -> Vec<Handle> {
        let mut out = Vec::new();
        if !self.contains(node) {
            return out;
        }
        let mut stack = vec![node];
        while let Some(h) = stack.pop() {
            out.push(h);
            stack.extend(self.child_tags(h).iter().rev().copied());
        }
        out
    }

    #[inline]
    pub fn contains(&self, node: Handle) -> bool {
        self.nodes.contains(node)
    }

    #[inline]
    pub fn get(&self, node: Handle) -> Option<&T> {
        self.nodes.get(node)
    }

    #[inline]
    pub fn get_mut(&mut self, node: Handle) -> Option<&mut T> {
        self.nodes.get_mut(node)
    }

    /// Number of nodes, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `(handle, &payload)` for every node, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.nodes.iter_with_handles()
    }
}

/// Unchecked fast path.
///
/// # Panics
/// Panics if `node` is not a node of this tree.
impl<T> Index<Handle> for Tree<T> {
    type Output = T;

    #[inline]
    fn index(&self, node: Handle) -> &T {
        &self.nodes[node]
    }
}

impl<T> IndexMut<Handle> for Tree<T> {
    #[inline]
    fn index_mut(&mut self, node: Handle) -> &mut T {
        &mut self.nodes[node]
    }
}

impl<T> DebugInvariants for Tree<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self, "Tree");
    }

    fn validate_invariants(&self) -> Result<(), ContainerError> {
        self.nodes.validate_invariants()?;
        if self.parents.len() != self.children.len() {
            return Err(ContainerError::invariant(format!(
                "{} parent entries but {} child lists",
                self.parents.len(),
                self.children.len()
            )));
        }
        if self.parent_tag(self.root_tag()).is_some() {
            return Err(ContainerError::invariant("root has a parent"));
        }
        let mut listed = 0usize;
        for handle in self.nodes.handles() {
            for &child in self.child_tags(handle) {
                listed += 1;
                if self.parent_tag(child) != Some(handle) {
                    return Err(ContainerError::invariant(format!(
                        "child {child} of {handle} records parent {:?}",
                        self.parent_tag(child)
                    )));
                }
            }
            if handle != self.root_tag() {
                match self.parent_tag(handle) {
                    Some(parent) if self.child_tags(parent).contains(&handle) => {}
                    other => {
                        return Err(ContainerError::invariant(format!(
                            "node {handle} missing from children of {other:?}"
                        )));
                    }
                }
            }
        }
        // every non-root node is listed exactly once
        if listed + 1 != self.nodes.len() {
            return Err(ContainerError::invariant(format!(
                "{listed} child entries for {} non-root nodes",
                self.nodes.len() - 1
            )));
        }
        Ok(())
    }
}
