//! Directed graph over slot-recycling storage.
//!
//! [`Dag`] keeps node payloads and the two adjacency views of the edge
//! relation in three parallel [`StableVector`]s that share one id space:
//!
//! - `from_links[a]`: the nodes `a` points to (children / out-edges),
//! - `to_links[b]`: the nodes pointing to `b` (parents / in-edges).
//!
//! An edge `a -> b` exists iff `b` is in `from_links[a]` and `a` is in
//! `to_links[b]`, with the same multiplicity on both sides. Every mutator
//! touches both views in one call, and no method hands out mutable access to
//! a single view.
//!
//! Despite the name the structure does not forbid cycles; only
//! [`Dag::topological_order`] and [`Dag::strata`] require acyclicity and
//! report [`ContainerError::CycleDetected`] otherwise.

use crate::container_error::ContainerError;
use crate::debug_invariants::DebugInvariants;
use crate::storage::stable_vector::StableVector;
use crate::topology::cache::InvalidateCache;
use crate::topology::node::NodeId;
use crate::topology::strata::{Strata, compute_strata};
use once_cell::sync::OnceCell;
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};

/// Adjacency list of one node. Most nodes have a handful of neighbours.
pub type Links = SmallVec<[NodeId; 4]>;

/// How [`Dag::link`] treats an edge that already exists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LinkPolicy {
    /// Add a parallel edge silently (multi-graph semantics).
    #[default]
    Allow,
    /// Add a parallel edge and emit a `log::warn!`.
    Warn,
    /// Refuse with [`ContainerError::DuplicateLink`].
    Reject,
}

/// A directed graph with stable node ids and symmetric adjacency lists.
///
/// # Example
/// ```rust
/// use stable_containers::topology::dag::Dag;
/// let mut g = Dag::new();
/// let a = g.insert('a');
/// let b = g.insert('b');
/// let c = g.insert('c');
/// g.link(a, b).unwrap();
/// g.link(b, c).unwrap();
/// assert_eq!(g.children(a).copied().collect::<Vec<_>>(), vec!['b']);
/// assert_eq!(g.parents(c).copied().collect::<Vec<_>>(), vec!['b']);
/// ```
#[derive(Clone, Debug)]
pub struct Dag<T> {
    nodes: StableVector<T>,
    from_links: StableVector<Links>,
    to_links: StableVector<Links>,
    policy: LinkPolicy,
    /// Cached strata, dropped by every mutation.
    strata: OnceCell<Strata>,
}

impl<T> Default for Dag<T> {
    fn default() -> Self {
        Self {
            nodes: StableVector::new(),
            from_links: StableVector::new(),
            to_links: StableVector::new(),
            policy: LinkPolicy::default(),
            strata: OnceCell::new(),
        }
    }
}

impl<T> Dag<T> {
    /// Creates a new, empty graph with [`LinkPolicy::Allow`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: StableVector::with_capacity(capacity),
            from_links: StableVector::with_capacity(capacity),
            to_links: StableVector::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Creates an empty graph using `policy` for duplicate edges.
    pub fn with_policy(policy: LinkPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[inline]
    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    /// Changes the duplicate-edge policy. Existing parallel edges are kept.
    pub fn set_policy(&mut self, policy: LinkPolicy) {
        self.policy = policy;
    }

    /// Adds an isolated node and returns its id. O(1) amortized.
    pub fn insert(&mut self, value: T) -> NodeId {
        let id = self.nodes.add(value);
        let out = self.from_links.add(Links::new());
        let inc = self.to_links.add(Links::new());
        debug_assert_eq!(id, out, "from_links out of step with nodes");
        debug_assert_eq!(id, inc, "to_links out of step with nodes");
        self.invalidate_cache();
        NodeId::new(id)
    }

    #[inline]
    fn ensure_live(&self, id: NodeId) -> Result<(), ContainerError> {
        if self.nodes.contains(id.index()) {
            Ok(())
        } else {
            Err(ContainerError::InvalidNode(id))
        }
    }

    /// Adds the edge `from -> to`.
    ///
    /// Self-loops are accepted. An edge that already exists is handled per
    /// [`LinkPolicy`]; under `Allow` and `Warn` a parallel edge is recorded and
    /// needs its own [`unlink`](Self::unlink).
    ///
    /// # Errors
    /// * [`ContainerError::InvalidNode`] if either endpoint is not live.
    /// * [`ContainerError::DuplicateLink`] under [`LinkPolicy::Reject`].
    pub fn link(&mut self, from: NodeId, to: NodeId) -> Result<(), ContainerError> {
        self.ensure_live(from)?;
        self.ensure_live(to)?;
        if self.has_link(from, to) {
            match self.policy {
                LinkPolicy::Allow => {
                    log::debug!("Dag: adding parallel edge {from} -> {to}");
                }
                LinkPolicy::Warn => {
                    log::warn!("Dag: adding parallel edge {from} -> {to}");
                }
                LinkPolicy::Reject => {
                    return Err(ContainerError::DuplicateLink { from, to });
                }
            }
        }
        self.from_links[from.index()].push(to);
        self.to_links[to.index()].push(from);
        self.invalidate_cache();
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Removes one occurrence of the edge `from -> to`.
    ///
    /// # Errors
    /// * [`ContainerError::InvalidNode`] if either endpoint is not live.
    /// * [`ContainerError::MissingLink`] if there is no such edge; nothing changes.
    pub fn unlink(&mut self, from: NodeId, to: NodeId) -> Result<(), ContainerError> {
        self.ensure_live(from)?;
        self.ensure_live(to)?;
        let out_pos = self.from_links[from.index()]
            .iter()
            .position(|&n| n == to)
            .ok_or(ContainerError::MissingLink { from, to })?;
        let in_pos = self.to_links[to.index()]
            .iter()
            .position(|&n| n == from)
            .ok_or_else(|| {
                ContainerError::invariant(format!("edge {from} -> {to} has no mirror"))
            })?;
        self.from_links[from.index()].remove(out_pos);
        self.to_links[to.index()].remove(in_pos);
        self.invalidate_cache();
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Removes `id` and every edge touching it, returning its payload.
    ///
    /// Neighbours are scrubbed first: `id` is stripped from each child's
    /// parent list and each parent's child list, and only then are the
    /// node's own slots erased. Other ids are unaffected; `id` itself may be
    /// reissued by a later [`insert`](Self::insert).
    ///
    /// # Errors
    /// [`ContainerError::InvalidNode`] if `id` is not live.
    pub fn remove(&mut self, id: NodeId) -> Result<T, ContainerError> {
        self.ensure_live(id)?;

        let children = std::mem::take(&mut self.from_links[id.index()]);
        for &child in &children {
            remove_first(&mut self.to_links[child.index()], id);
        }
        let parents = std::mem::take(&mut self.to_links[id.index()]);
        for &parent in &parents {
            remove_first(&mut self.from_links[parent.index()], id);
        }
        log::debug!(
            "Dag: removing node {id}, severing {} outgoing and {} incoming edges",
            children.len(),
            parents.len()
        );

        self.from_links.erase(id.index())?;
        self.to_links.erase(id.index())?;
        let value = self.nodes.erase(id.index())?;
        self.invalidate_cache();
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(value)
    }

    /// Payloads of the nodes `id` points to, in link order.
    ///
    /// Parallel edges yield the child once per edge. A dead `id` yields
    /// nothing. The iterator can be cloned to restart it.
    pub fn children(&self, id: NodeId) -> Neighbors<'_, T> {
        Neighbors {
            ids: self.child_ids(id).iter(),
            nodes: &self.nodes,
        }
    }

    /// Payloads of the nodes pointing to `id`, in link order.
    pub fn parents(&self, id: NodeId) -> Neighbors<'_, T> {
        Neighbors {
            ids: self.parent_ids(id).iter(),
            nodes: &self.nodes,
        }
    }

    /// Ids of the nodes `id` points to; empty for a dead `id`.
    pub fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.from_links
            .get(id.index())
            .map_or(&[][..], |links| links.as_slice())
    }

    /// Ids of the nodes pointing to `id`; empty for a dead `id`.
    pub fn parent_ids(&self, id: NodeId) -> &[NodeId] {
        self.to_links
            .get(id.index())
            .map_or(&[][..], |links| links.as_slice())
    }

    #[inline]
    pub fn has_link(&self, from: NodeId, to: NodeId) -> bool {
        self.child_ids(from).contains(&to)
    }

    /// Number of parallel edges `from -> to`.
    pub fn link_count(&self, from: NodeId, to: NodeId) -> usize {
        self.child_ids(from).iter().filter(|&&n| n == to).count()
    }

    /// Total number of edges, counting parallel edges separately.
    pub fn edge_count(&self) -> usize {
        self.from_links.iter().map(|(_, links)| links.len()).sum()
    }

    /// Every edge as `(from, to)`, grouped by source in id order.
    pub fn links(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.from_links.iter().flat_map(|(from, links)| {
            links.iter().map(move |&to| (NodeId::new(from), to))
        })
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.index())
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.index())
    }

    /// Mutable payload access. Payloads do not participate in the topology,
    /// so this leaves cached strata intact.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.index())
    }

    /// Checked access.
    pub fn try_get(&self, id: NodeId) -> Result<&T, ContainerError> {
        self.get(id).ok_or(ContainerError::InvalidNode(id))
    }

    pub fn try_get_mut(&mut self, id: NodeId) -> Result<&mut T, ContainerError> {
        self.get_mut(id).ok_or(ContainerError::InvalidNode(id))
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Live node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.indices().map(NodeId::new)
    }

    /// `(id, &payload)` for every live node in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.nodes.iter().map(|(i, v)| (NodeId::new(i), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut T)> + '_ {
        self.nodes.iter_mut().map(|(i, v)| (NodeId::new(i), v))
    }

    /// Nodes without parents.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.to_links
            .iter()
            .filter(|(_, links)| links.is_empty())
            .map(|(i, _)| NodeId::new(i))
    }

    /// Nodes without children.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.from_links
            .iter()
            .filter(|(_, links)| links.is_empty())
            .map(|(i, _)| NodeId::new(i))
    }

    /// Height/depth layering of the graph, computed on first use and cached
    /// until the next mutation.
    ///
    /// # Errors
    /// [`ContainerError::CycleDetected`] if the graph has a cycle (including a
    /// self-loop).
    pub fn strata(&self) -> Result<&Strata, ContainerError> {
        self.strata.get_or_try_init(|| compute_strata(self))
    }

    /// Node ids ordered so that every edge points forward: height-major, then
    /// ascending id within a height.
    ///
    /// # Errors
    /// [`ContainerError::CycleDetected`] if the graph has a cycle.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, ContainerError> {
        Ok(self.strata()?.chart_points.clone())
    }

    /// Drops every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.from_links.clear();
        self.to_links.clear();
        self.invalidate_cache();
    }
}

/// Removes the first occurrence of `id` from `links`, keeping order.
#[inline]
fn remove_first(links: &mut Links, id: NodeId) -> bool {
    match links.iter().position(|&n| n == id) {
        Some(pos) => {
            links.remove(pos);
            true
        }
        None => false,
    }
}

impl<T> InvalidateCache for Dag<T> {
    #[inline]
    fn invalidate_cache(&mut self) {
        self.strata.take();
    }
}

/// Unchecked fast path.
///
/// # Panics
/// Panics if `id` is not live. Use [`Dag::try_get`] for a `Result`.
impl<T> Index<NodeId> for Dag<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: NodeId) -> &T {
        &self.nodes[id.index()]
    }
}

impl<T> IndexMut<NodeId> for Dag<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.index()]
    }
}

/// Iterator over neighbour payloads, returned by [`Dag::children`] and
/// [`Dag::parents`].
pub struct Neighbors<'a, T> {
    ids: std::slice::Iter<'a, NodeId>,
    nodes: &'a StableVector<T>,
}

impl<'a, T> Neighbors<'a, T> {
    /// Ids still to be visited.
    pub fn ids(&self) -> &'a [NodeId] {
        self.ids.as_slice()
    }
}

impl<T> Clone for Neighbors<'_, T> {
    fn clone(&self) -> Self {
        Self {
            ids: self.ids.clone(),
            nodes: self.nodes,
        }
    }
}

impl<'a, T> Iterator for Neighbors<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let nodes = self.nodes;
        self.ids.next().map(|id| &nodes[id.index()])
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<T> DoubleEndedIterator for Neighbors<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        self.ids.next_back().map(|id| &nodes[id.index()])
    }
}

impl<T> ExactSizeIterator for Neighbors<'_, T> {}

impl<T> DebugInvariants for Dag<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self, "Dag");
    }

    fn validate_invariants(&self) -> Result<(), ContainerError> {
        self.nodes.validate_invariants()?;
        self.from_links.validate_invariants()?;
        self.to_links.validate_invariants()?;

        // 1) the three tables share one id space
        let slots = self.nodes.slot_count();
        if self.from_links.slot_count() != slots || self.to_links.slot_count() != slots {
            return Err(ContainerError::invariant(format!(
                "slot counts differ: nodes {slots}, from_links {}, to_links {}",
                self.from_links.slot_count(),
                self.to_links.slot_count()
            )));
        }
        for i in 0..slots {
            let live = self.nodes.contains(i);
            if self.from_links.contains(i) != live || self.to_links.contains(i) != live {
                return Err(ContainerError::invariant(format!(
                    "slot {i} liveness differs between tables"
                )));
            }
        }

        // 2) every out-edge is mirrored with the same multiplicity, and
        //    out-edge and in-edge totals agree
        for (a, outs) in self.from_links.iter() {
            let a = NodeId::new(a);
            for &b in outs.iter() {
                if !self.contains(b) {
                    return Err(ContainerError::invariant(format!(
                        "edge {a} -> {b} points at a dead node"
                    )));
                }
                let forward = outs.iter().filter(|&&n| n == b).count();
                let backward = self.parent_ids(b).iter().filter(|&&n| n == a).count();
                if forward != backward {
                    return Err(ContainerError::invariant(format!(
                        "edge {a} -> {b}: {forward} in from_links but {backward} in to_links"
                    )));
                }
            }
        }
        let incoming: usize = self.to_links.iter().map(|(_, links)| links.len()).sum();
        if incoming != self.edge_count() {
            return Err(ContainerError::invariant(format!(
                "{} out-edges but {incoming} in-edges",
                self.edge_count()
            )));
        }
        Ok(())
    }
}
