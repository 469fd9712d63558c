//! Height/depth layering of a [`Dag`].
//!
//! [`compute_strata`] runs Kahn's topological sort over the live nodes and
//! derives, for each node, its height (longest path from a root) and depth
//! (longest path down to a leaf). Nodes are then charted height-major, in
//! ascending id order within a height, which is a valid topological order.
//!
//! # Errors
//! * [`ContainerError::CycleDetected`]: the graph contains a cycle.

use crate::container_error::ContainerError;
use crate::topology::dag::Dag;
use crate::topology::node::NodeId;
use std::collections::HashMap;

/// Precomputed stratum information for a graph.
#[derive(Clone, Debug, Default)]
pub struct Strata {
    /// Longest distance from any parentless node.
    pub height: HashMap<NodeId, u32>,
    /// Longest distance down to any childless node.
    pub depth: HashMap<NodeId, u32>,
    /// `strata[h]` = nodes at height `h`, ascending.
    pub strata: Vec<Vec<NodeId>>,
    /// Maximum height.
    pub diameter: u32,
    /// Height-major, then id order.
    pub chart_points: Vec<NodeId>,
    pub chart_index: HashMap<NodeId, usize>,
}

impl Strata {
    #[inline]
    pub fn height_of(&self, id: NodeId) -> Option<u32> {
        self.height.get(&id).copied()
    }

    #[inline]
    pub fn depth_of(&self, id: NodeId) -> Option<u32> {
        self.depth.get(&id).copied()
    }

    /// Position of `id` in the chart, if present.
    #[inline]
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.chart_index.get(&id).copied()
    }

    /// Total number of charted nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.chart_points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chart_points.is_empty()
    }
}

/// Compute strata for `dag` (no caching; see [`Dag::strata`]).
///
/// Parallel edges are counted with multiplicity, so they neither hide nor
/// fake a cycle. A self-loop is a cycle.
///
/// ## Complexity
/// O(|V| + |E|) time and space.
pub fn compute_strata<T>(dag: &Dag<T>) -> Result<Strata, ContainerError> {
    // 1) in-degrees over live nodes
    let mut in_deg: HashMap<NodeId, usize> = dag
        .node_ids()
        .map(|n| (n, dag.parent_ids(n).len()))
        .collect();

    // 2) Kahn
    let mut stack: Vec<NodeId> = in_deg
        .iter()
        .filter_map(|(&n, &d)| (d == 0).then_some(n))
        .collect();
    let mut topo = Vec::with_capacity(in_deg.len());
    while let Some(n) = stack.pop() {
        topo.push(n);
        for &child in dag.child_ids(n) {
            let d = in_deg.get_mut(&child).ok_or_else(|| {
                ContainerError::invariant(format!("edge {n} -> {child} points at a dead node"))
            })?;
            *d -= 1;
            if *d == 0 {
                stack.push(child);
            }
        }
    }
    if topo.len() != in_deg.len() {
        log::debug!(
            "compute_strata: {} of {} nodes sit on or behind a cycle",
            in_deg.len() - topo.len(),
            in_deg.len()
        );
        return Err(ContainerError::CycleDetected);
    }

    // 3) heights
    let mut height: HashMap<NodeId, u32> = HashMap::with_capacity(topo.len());
    for &n in &topo {
        let h = dag
            .parent_ids(n)
            .iter()
            .map(|p| height.get(p).copied().unwrap_or(0))
            .max()
            .map_or(0, |m| m + 1);
        height.insert(n, h);
    }
    let diameter = height.values().copied().max().unwrap_or(0);
    let mut strata = if height.is_empty() {
        Vec::new()
    } else {
        vec![Vec::new(); diameter as usize + 1]
    };
    for (&n, &h) in &height {
        strata[h as usize].push(n);
    }

    // 4) depths
    let mut depth: HashMap<NodeId, u32> = HashMap::with_capacity(topo.len());
    for &n in topo.iter().rev() {
        let d = dag
            .child_ids(n)
            .iter()
            .map(|c| depth.get(c).copied().unwrap_or(0))
            .max()
            .map_or(0, |m| m + 1);
        depth.insert(n, d);
    }

    // 5) deterministic chart
    for level in &mut strata {
        level.sort_unstable();
    }
    let chart_points: Vec<NodeId> = strata.iter().flatten().copied().collect();
    let chart_index = chart_points
        .iter()
        .copied()
        .enumerate()
        .map(|(i, n)| (n, i))
        .collect();

    Ok(Strata {
        height,
        depth,
        strata,
        diameter,
        chart_points,
        chart_index,
    })
}
