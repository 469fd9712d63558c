#![allow(dead_code)]
use stable_containers::{
    DebugInvariants,
    topology::{Dag, NodeId},
};

/// Build a graph with nodes `0..n` (payload = position) and the given arrows.
pub fn dag_from(n: usize, arrows: &[(usize, usize)]) -> (Dag<usize>, Vec<NodeId>) {
    let mut g = Dag::new();
    let ids: Vec<_> = (0..n).map(|i| g.insert(i)).collect();
    for &(a, b) in arrows {
        g.link(ids[a], ids[b]).expect("both endpoints are live");
    }
    (g, ids)
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}

/// Panics with the violation if `c` fails its own invariant check.
pub fn assert_valid<C: DebugInvariants>(c: &C) {
    if let Err(e) = c.validate_invariants() {
        panic!("invariants violated: {e}");
    }
}
