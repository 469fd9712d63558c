//! Handle-stable storage primitives.
//!
//! - [`StableVector`]: slot-recycling vector; indices never move.
//! - [`HandleMap`]: dense array behind stable [`Handle`]s; compacts on erase.
//!
//! Both are the building blocks of the graph and tree types in
//! [`topology`](crate::topology).

pub mod handle;
pub mod handle_map;
pub mod stable_vector;

pub use handle::Handle;
pub use handle_map::HandleMap;
pub use stable_vector::StableVector;
