//! Re-export public algorithms.

pub mod traversal;

pub use traversal::{TraversalBuilder, closure, star};
