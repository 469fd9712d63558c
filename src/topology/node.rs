//! `NodeId`: identity of a node in a [`Dag`](crate::topology::dag::Dag).
//!
//! A node id is the index of the node's slot in the graph's backing
//! [`StableVector`](crate::storage::StableVector)s, so it survives removal of
//! any other node. Once its own node is removed the id may be handed out again
//! by a later insert.

use std::fmt;

/// Stable identity of a graph node.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub const fn new(raw: usize) -> Self {
        NodeId(raw)
    }

    /// Slot index backing this node.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeId").field(&self.0).finish()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
