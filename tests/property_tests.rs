mod util;
use util::*;

use proptest::prelude::*;
use stable_containers::storage::{Handle, HandleMap, StableVector};
use stable_containers::topology::{Dag, NodeId, Tree};
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum MapOp {
    Insert(u32),
    /// Erase the live handle at this position (mod live count).
    Erase(usize),
    /// Overwrite the live handle at this position.
    Set(usize, u32),
}

fn map_op() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        3 => any::<u32>().prop_map(MapOp::Insert),
        2 => any::<usize>().prop_map(MapOp::Erase),
        1 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| MapOp::Set(i, v)),
    ]
}

#[derive(Clone, Debug)]
enum DagOp {
    Insert,
    Link(usize, usize),
    Unlink(usize, usize),
    Remove(usize),
}

fn dag_op() -> impl Strategy<Value = DagOp> {
    prop_oneof![
        2 => Just(DagOp::Insert),
        4 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| DagOp::Link(a, b)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| DagOp::Unlink(a, b)),
        1 => any::<usize>().prop_map(DagOp::Remove),
    ]
}

proptest! {
    #[test]
    fn handle_map_handles_keep_their_values(ops in prop::collection::vec(map_op(), 0..200)) {
        let mut m = HandleMap::new();
        let mut model: HashMap<Handle, u32> = HashMap::new();
        let mut live: Vec<Handle> = Vec::new();

        for op in ops {
            match op {
                MapOp::Insert(v) => {
                    let h = m.insert(v);
                    prop_assert!(model.insert(h, v).is_none(), "handle {h} issued twice");
                    live.push(h);
                }
                MapOp::Erase(i) if !live.is_empty() => {
                    let h = live.swap_remove(i % live.len());
                    prop_assert_eq!(m.erase(h).unwrap(), model.remove(&h).unwrap());
                }
                MapOp::Set(i, v) if !live.is_empty() => {
                    let h = live[i % live.len()];
                    m[h] = v;
                    model.insert(h, v);
                }
                _ => {}
            }
            prop_assert_eq!(m.len(), model.len());
            for (&h, &v) in &model {
                prop_assert_eq!(m[h], v);
            }
        }
        assert_valid(&m);
    }

    #[test]
    fn stable_vector_indices_never_move(
        values in prop::collection::vec(any::<i64>(), 1..64),
        erase_picks in prop::collection::vec(any::<usize>(), 0..32),
    ) {
        let mut v = StableVector::new();
        let mut model: HashMap<usize, i64> = HashMap::new();
        for &x in &values {
            let i = v.add(x);
            model.insert(i, x);
        }
        for pick in erase_picks {
            let mut keys: Vec<_> = model.keys().copied().collect();
            if keys.is_empty() {
                break;
            }
            keys.sort_unstable();
            let victim = keys[pick % keys.len()];
            v.erase(victim).unwrap();
            model.remove(&victim);

            let reused = v.add(-1);
            prop_assert_eq!(reused, victim);
            model.insert(reused, -1);
            for (&i, &x) in &model {
                prop_assert_eq!(v.at(i), Ok(&x));
            }
        }
        prop_assert_eq!(v.len(), model.len());
    }

    #[test]
    fn dag_adjacency_matches_edge_model(ops in prop::collection::vec(dag_op(), 0..120)) {
        let mut g = Dag::new();
        let mut live: Vec<NodeId> = Vec::new();
        let mut edges: Vec<(NodeId, NodeId)> = Vec::new();

        for op in ops {
            match op {
                DagOp::Insert => live.push(g.insert(())),
                DagOp::Link(a, b) if !live.is_empty() => {
                    let (a, b) = (live[a % live.len()], live[b % live.len()]);
                    g.link(a, b).unwrap();
                    edges.push((a, b));
                }
                DagOp::Unlink(a, b) if !live.is_empty() => {
                    let (a, b) = (live[a % live.len()], live[b % live.len()]);
                    match edges.iter().position(|&e| e == (a, b)) {
                        Some(pos) => {
                            edges.remove(pos);
                            prop_assert!(g.unlink(a, b).is_ok());
                        }
                        None => {
                            prop_assert!(g.unlink(a, b).is_err());
                        }
                    }
                }
                DagOp::Remove(i) if !live.is_empty() => {
                    let n = live.swap_remove(i % live.len());
                    g.remove(n).unwrap();
                    edges.retain(|&(a, b)| a != n && b != n);
                    for m in g.node_ids() {
                        prop_assert!(!g.child_ids(m).contains(&n));
                        prop_assert!(!g.parent_ids(m).contains(&n));
                    }
                }
                _ => {}
            }
        }

        prop_assert_eq!(g.len(), live.len());
        assert_permutation(&g.links().collect::<Vec<_>>(), &edges);
        for &n in &live {
            let mut want_children: Vec<_> =
                edges.iter().filter(|e| e.0 == n).map(|e| e.1).collect();
            let mut want_parents: Vec<_> =
                edges.iter().filter(|e| e.1 == n).map(|e| e.0).collect();
            let mut got_children = g.child_ids(n).to_vec();
            let mut got_parents = g.parent_ids(n).to_vec();
            want_children.sort_unstable();
            want_parents.sort_unstable();
            got_children.sort_unstable();
            got_parents.sort_unstable();
            prop_assert_eq!(got_children, want_children);
            prop_assert_eq!(got_parents, want_parents);
        }
        assert_valid(&g);
    }

    #[test]
    fn tree_parent_and_children_agree(parents in prop::collection::vec(any::<usize>(), 0..80)) {
        let mut t = Tree::new(0usize);
        let mut handles = vec![t.root_tag()];
        let mut expected = Vec::new();
        for (i, pick) in parents.into_iter().enumerate() {
            let p = handles[pick % handles.len()];
            let h = t.insert_node(i + 1, p).unwrap();
            handles.push(h);
            expected.push((h, p));
        }
        for (h, p) in expected {
            prop_assert_eq!(t.parent_tag(h), Some(p));
            prop_assert_eq!(t.child_tags(p).iter().filter(|&&c| c == h).count(), 1);
        }
        prop_assert_eq!(t.descendants(t.root_tag()).len(), t.len());
    }
}
