#![cfg_attr(docsrs, feature(doc_cfg))]
//! # stable-containers
//!
//! Handle-stable in-memory containers and the graph and tree structures built
//! on them. Every container hands out lightweight identities (indices,
//! handles, node ids) that keep referring to the same element across
//! insertion and erasure of *other* elements.
//!
//! ## Features
//! - [`StableVector`](storage::StableVector): slot-recycling vector; erasing a
//!   slot never renumbers another.
//! - [`HandleMap`](storage::HandleMap): always-dense storage behind stable
//!   [`Handle`](storage::Handle)s, O(1) insert/erase/access via swap-and-pop.
//! - [`Dag`](topology::Dag): directed graph with mirrored child/parent
//!   adjacency lists, node removal that scrubs every incident edge, and cached
//!   topological strata.
//! - [`Tree`](topology::Tree): append-only rooted tree with ordered children.
//! - Closure/star traversals in [`algs::traversal`].
//!
//! ## Checked and unchecked access
//! `Index`/`IndexMut` are the fast paths and panic on a dead index or handle.
//! Every container also offers checked accessors (`at`, `try_get`, ...) and
//! fallible mutators that report a [`ContainerError`](container_error::ContainerError)
//! and leave the container untouched.
//!
//! ## Invariant checking
//! In debug builds, or with the `check-invariants` / `strict-invariants`
//! features, every mutation re-validates the container's internal tables via
//! [`DebugInvariants`].
//!
//! ## Concurrency
//! All containers are plain single-owner values with no internal locking.
//! Share them across threads behind your own lock.

pub mod algs;
pub mod container_error;
pub mod debug_invariants;
pub mod storage;
pub mod topology;

pub use container_error::ContainerError;
pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used types:
pub mod prelude {
    pub use crate::algs::traversal::{TraversalBuilder, closure, star};
    pub use crate::container_error::ContainerError;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::storage::{Handle, HandleMap, StableVector};
    pub use crate::topology::{Dag, InvalidateCache, LinkPolicy, NodeId, Strata, Tree};
}
