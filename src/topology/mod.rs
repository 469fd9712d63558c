//! Graph and tree structures layered on the handle-stable storage.
//!
//! This module provides:
//! - [`Dag`]: directed graph on three parallel [`StableVector`](crate::storage::StableVector)s
//!   with mirrored adjacency lists
//! - [`Tree`]: append-only rooted tree on a [`HandleMap`](crate::storage::HandleMap)
//! - [`Strata`]: height/depth layering and topological order of a [`Dag`]
//!
//! Most users will interact with [`Dag`] and [`Tree`] directly; traversal
//! helpers live in [`algs`](crate::algs).

pub mod cache;
pub mod dag;
pub mod node;
pub mod strata;
pub mod tree;

pub use cache::InvalidateCache;
pub use dag::{Dag, LinkPolicy, Neighbors};
pub use node::NodeId;
pub use strata::{Strata, compute_strata};
pub use tree::Tree;
