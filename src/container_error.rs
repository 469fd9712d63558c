//! ContainerError: unified error type for stable-containers public APIs
//!
//! Every fallible container operation reports through this type. The unchecked
//! fast paths (`Index`/`IndexMut`) panic instead; everything that can be asked
//! about first (`at`, `try_get`, `erase`, `link`, ...) returns a `Result`.

use crate::storage::handle::Handle;
use crate::topology::node::NodeId;
use thiserror::Error;

/// Unified error type for container operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// The slot at `index` exists but was erased and not yet recycled.
    #[error("access of erased slot {index}")]
    ErasedSlot { index: usize },
    /// `index` is beyond the allocated slots.
    #[error("slot index {index} out of range (slot count {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// The handle was never issued by this map, or its element was erased.
    #[error("handle {0} is not live in this map")]
    InvalidHandle(Handle),
    /// The node id does not refer to a live node of this graph.
    #[error("node {0} is not live in this graph")]
    InvalidNode(NodeId),
    /// `unlink` was asked to remove an edge that is not present.
    #[error("no link from node {from} to node {to}")]
    MissingLink { from: NodeId, to: NodeId },
    /// `link` refused a parallel edge under [`LinkPolicy::Reject`](crate::topology::dag::LinkPolicy::Reject).
    #[error("link from node {from} to node {to} already exists")]
    DuplicateLink { from: NodeId, to: NodeId },
    /// The graph contains a cycle; an ordering was requested.
    #[error("topology error: cycle detected (expected DAG)")]
    CycleDetected,
    /// Internal tables disagree with each other.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl ContainerError {
    /// Shorthand for an [`InvariantViolation`](Self::InvariantViolation).
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = ContainerError::ErasedSlot { index: 3 };
        assert_eq!(e.to_string(), "access of erased slot 3");

        let e = ContainerError::MissingLink {
            from: NodeId::new(1),
            to: NodeId::new(2),
        };
        assert_eq!(e.to_string(), "no link from node 1 to node 2");

        let e = ContainerError::InvalidHandle(Handle::new(7));
        assert!(e.to_string().contains('7'));
    }
}
