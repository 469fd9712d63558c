//! DFS/BFS traversal helpers for [`Dag`] topologies.
//!
//! `closure` follows child links (everything reachable from the seeds),
//! `star` follows parent links (everything that reaches the seeds). Both are
//! thin wrappers over [`TraversalBuilder`].

use crate::container_error::ContainerError;
use crate::topology::dag::Dag;
use crate::topology::node::NodeId;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dir {
    /// Follow child links.
    Down,
    /// Follow parent links.
    Up,
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    DFS,
    BFS,
}

pub struct TraversalBuilder<'a, T> {
    dag: &'a Dag<T>,
    seeds: Vec<NodeId>,
    dir: Dir,
    strat: Strategy,
    max_depth: Option<u32>,
    /// If returns true on a visited node, traversal stops early.
    early_stop: Option<&'a dyn Fn(NodeId) -> bool>,
}

impl<'a, T> TraversalBuilder<'a, T> {
    pub fn new(dag: &'a Dag<T>) -> Self {
        Self {
            dag,
            seeds: Vec::new(),
            dir: Dir::Down,
            strat: Strategy::DFS,
            max_depth: None,
            early_stop: None,
        }
    }

    /// Starting nodes. Ids that are not live in the graph are ignored.
    pub fn seeds<I: IntoIterator<Item = NodeId>>(mut self, it: I) -> Self {
        self.seeds = it.into_iter().filter(|&n| self.dag.contains(n)).collect();
        self
    }

    pub fn dir(mut self, d: Dir) -> Self {
        self.dir = d;
        self
    }

    pub fn dfs(mut self) -> Self {
        self.strat = Strategy::DFS;
        self
    }

    pub fn bfs(mut self) -> Self {
        self.strat = Strategy::BFS;
        self
    }

    /// Do not expand nodes `d` or more links away from a seed.
    pub fn max_depth(mut self, d: Option<u32>) -> Self {
        self.max_depth = d;
        self
    }

    pub fn early_stop(mut self, f: &'a dyn Fn(NodeId) -> bool) -> Self {
        self.early_stop = Some(f);
        self
    }

    /// Runs the traversal and returns every discovered node (seeds
    /// included), sorted by id.
    pub fn run(self) -> Vec<NodeId> {
        let TraversalBuilder {
            dag,
            seeds,
            dir,
            strat,
            max_depth,
            early_stop,
        } = self;
        let mut seen: HashSet<NodeId> = seeds.iter().copied().collect();
        let mut frontier: VecDeque<(NodeId, u32)> = seeds.into_iter().map(|n| (n, 0)).collect();

        loop {
            let next = match strat {
                Strategy::DFS => frontier.pop_back(),
                Strategy::BFS => frontier.pop_front(),
            };
            let Some((n, d)) = next else { break };
            if early_stop.is_some_and(|f| f(n)) {
                break;
            }
            if max_depth.is_some_and(|md| d >= md) {
                continue;
            }
            for m in step_neighbors(dag, dir, n) {
                if seen.insert(m) {
                    frontier.push_back((m, d + 1));
                }
            }
        }
        let mut out: Vec<_> = seen.into_iter().collect();
        out.sort_unstable();
        out
    }
}

fn step_neighbors<'a, T>(
    dag: &'a Dag<T>,
    dir: Dir,
    n: NodeId,
) -> Box<dyn Iterator<Item = NodeId> + 'a> {
    let down = dag.child_ids(n).iter().copied();
    let up = dag.parent_ids(n).iter().copied();
    match dir {
        Dir::Down => Box::new(down),
        Dir::Up => Box::new(up),
        Dir::Both => Box::new(down.chain(up)),
    }
}

/// Complete transitive closure following child links.
pub fn closure<T, I>(dag: &Dag<T>, seeds: I) -> Vec<NodeId>
where
    I: IntoIterator<Item = NodeId>,
{
    TraversalBuilder::new(dag)
        .dir(Dir::Down)
        .dfs()
        .seeds(seeds)
        .run()
}

/// Complete transitive star following parent links.
pub fn star<T, I>(dag: &Dag<T>, seeds: I) -> Vec<NodeId>
where
    I: IntoIterator<Item = NodeId>,
{
    TraversalBuilder::new(dag)
        .dir(Dir::Up)
        .dfs()
        .seeds(seeds)
        .run()
}

/// BFS distance (in links) from `seed` to every node below it, sorted by id.
pub fn depth_map<T>(dag: &Dag<T>, seed: NodeId) -> Vec<(NodeId, u32)> {
    let mut depth = HashMap::new();
    if dag.contains(seed) {
        let mut q = VecDeque::from([(seed, 0u32)]);
        // FIFO order pops every node first at its shortest distance
        while let Some((n, d)) = q.pop_front() {
            if depth.contains_key(&n) {
                continue;
            }
            depth.insert(n, d);
            q.extend(dag.child_ids(n).iter().map(|&m| (m, d + 1)));
        }
    }
    let mut v: Vec<_> = depth.into_iter().collect();
    v.sort_by_key(|&(n, _)| n);
    v
}

/// Transitive closure emitted in topological (chart) order instead of id
/// order.
///
/// # Errors
/// [`ContainerError::CycleDetected`] if the graph has a cycle.
pub fn closure_ordered<T, I>(dag: &Dag<T>, seeds: I) -> Result<Vec<NodeId>, ContainerError>
where
    I: IntoIterator<Item = NodeId>,
{
    let strata = dag.strata()?;
    let reached: HashSet<NodeId> = closure(dag, seeds).into_iter().collect();
    Ok(strata
        .chart_points
        .iter()
        .copied()
        .filter(|n| reached.contains(n))
        .collect())
}

/// Transitive star emitted in topological (chart) order.
///
/// # Errors
/// [`ContainerError::CycleDetected`] if the graph has a cycle.
pub fn star_ordered<T, I>(dag: &Dag<T>, seeds: I) -> Result<Vec<NodeId>, ContainerError>
where
    I: IntoIterator<Item = NodeId>,
{
    let strata = dag.strata()?;
    let reached: HashSet<NodeId> = star(dag, seeds).into_iter().collect();
    Ok(strata
        .chart_points
        .iter()
        .copied()
        .filter(|n| reached.contains(n))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 -> 1 -> 3, 0 -> 2 -> 3, 3 -> 4
    fn diamond_tail() -> (Dag<u8>, Vec<NodeId>) {
        let mut g = Dag::new();
        let n: Vec<_> = (0..5).map(|i| g.insert(i)).collect();
        for (a, b) in [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)] {
            g.link(n[a], n[b]).unwrap();
        }
        (g, n)
    }

    #[test]
    fn closure_and_star() {
        let (g, n) = diamond_tail();
        assert_eq!(closure(&g, [n[1]]), vec![n[1], n[3], n[4]]);
        assert_eq!(star(&g, [n[3]]), vec![n[0], n[1], n[2], n[3]]);
        assert_eq!(closure(&g, [n[4]]), vec![n[4]]);
    }

    #[test]
    fn bfs_and_dfs_agree() {
        let (g, n) = diamond_tail();
        let dfs = TraversalBuilder::new(&g).seeds([n[0]]).dfs().run();
        let bfs = TraversalBuilder::new(&g).seeds([n[0]]).bfs().run();
        assert_eq!(dfs, bfs);
        assert_eq!(dfs.len(), 5);
    }

    #[test]
    fn max_depth_limits_expansion() {
        let (g, n) = diamond_tail();
        let one = TraversalBuilder::new(&g)
            .seeds([n[0]])
            .bfs()
            .max_depth(Some(1))
            .run();
        assert_eq!(one, vec![n[0], n[1], n[2]]);
    }

    #[test]
    fn both_directions() {
        let (g, n) = diamond_tail();
        let all = TraversalBuilder::new(&g)
            .seeds([n[2]])
            .dir(Dir::Both)
            .run();
        assert_eq!(all, n);
    }

    #[test]
    fn early_stop_halts() {
        let (g, n) = diamond_tail();
        let stop = |_: NodeId| true;
        let out = TraversalBuilder::new(&g)
            .seeds([n[0]])
            .early_stop(&stop)
            .run();
        assert_eq!(out, vec![n[0]]);
    }

    #[test]
    fn dead_seeds_are_ignored() {
        let (mut g, n) = diamond_tail();
        g.remove(n[4]).unwrap();
        assert!(closure(&g, [n[4]]).is_empty());
        assert_eq!(closure(&g, [n[3], n[4]]), vec![n[3]]);
    }

    #[test]
    fn depth_map_uses_shortest_distance() {
        let (mut g, n) = diamond_tail();
        g.link(n[0], n[3]).unwrap();
        let d = depth_map(&g, n[0]);
        assert_eq!(
            d,
            vec![(n[0], 0), (n[1], 1), (n[2], 1), (n[3], 1), (n[4], 2)]
        );
    }

    #[test]
    fn ordered_variants_follow_chart() {
        let (g, n) = diamond_tail();
        assert_eq!(
            closure_ordered(&g, [n[0]]).unwrap(),
            vec![n[0], n[1], n[2], n[3], n[4]]
        );
        assert_eq!(star_ordered(&g, [n[4]]).unwrap().first(), Some(&n[0]));

        let mut cyclic = g.clone();
        cyclic.link(n[4], n[0]).unwrap();
        assert_eq!(
            closure_ordered(&cyclic, [n[0]]),
            Err(ContainerError::CycleDetected)
        );
    }
}
