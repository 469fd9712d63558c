//! Self-checks for the containers' internal bookkeeping.
//!
//! Each container keeps redundant tables (free lists, sparse/reverse maps,
//! mirrored adjacency) that must agree after every mutation. The
//! [`debug_invariants!`](crate::debug_invariants) macro re-checks them at the
//! end of each mutator when `debug_assertions` or one of the
//! `check-invariants` / `strict-invariants` features is on, and compiles to
//! nothing otherwise.

use crate::container_error::ContainerError;

/// Consistency check over a container's internal tables.
pub trait DebugInvariants {
    /// Panics on the first broken invariant when checking is enabled.
    fn debug_assert_invariants(&self);

    /// Walks every table and reports the first disagreement as
    /// [`ContainerError::InvariantViolation`].
    fn validate_invariants(&self) -> Result<(), ContainerError>;
}

/// Validates `$container` and panics with `$name` in the message if its
/// tables disagree. Expands to nothing unless checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($container:expr, $name:literal) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $crate::DebugInvariants::validate_invariants($container) {
            panic!(concat!($name, " tables out of sync: {}"), e);
        }
    };
}
