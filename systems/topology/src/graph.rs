//! Dense edge-weight matrix over the grid's nodes.

use firefly_maze_core::{GridCoord, GridIndex, GridSize};

/// Weight marking the absence of a direct edge.
///
/// Kept at a third of `i32::MAX` so relaxing two sub-sentinel weights can never
/// wrap into a value that looks finite.
pub const BLOCKED: u32 = (i32::MAX / 3) as u32;

/// Mutable square matrix of edge weights between every pair of grid nodes.
///
/// The matrix is deliberately not kept symmetric; callers write both
/// directions whenever an edge must be undirected.
#[derive(Clone, Debug)]
pub struct ConnectivityGraph {
    index: GridIndex,
    node_count: usize,
    weights: Vec<u32>,
}

impl ConnectivityGraph {
    /// Creates a graph with unit-cost cardinal adjacency over the grid.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        let index = GridIndex::new(size);
        let node_count = index.node_count();
        let mut graph = Self {
            index,
            node_count,
            weights: vec![BLOCKED; node_count.saturating_mul(node_count)],
        };
        graph.reset_cardinal();
        graph
    }

    /// Sentinel weight of a blocked edge.
    #[must_use]
    pub const fn blocked() -> u32 {
        BLOCKED
    }

    /// Index mapping coordinates to node ids.
    #[must_use]
    pub const fn index(&self) -> GridIndex {
        self.index
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Restores exactly the four cardinal edges of every cell at cost 1.
    pub fn reset_cardinal(&mut self) {
        let index = self.index;
        self.weights.fill(BLOCKED);
        for id in 0..self.node_count {
            self.set_edge(id, id, 0);
            let Some(cell) = index.coord(id) else {
                continue;
            };
            for neighbor in index.neighbors(cell) {
                if let Some(other) = index.id(neighbor) {
                    self.set_edge(id, other, 1);
                }
            }
        }
    }

    /// Writes the weight of the directed edge `a -> b`. Out-of-range ids are ignored.
    pub fn set_edge(&mut self, a: usize, b: usize, weight: u32) {
        if a >= self.node_count || b >= self.node_count {
            return;
        }
        if let Some(slot) = self.weights.get_mut(a * self.node_count + b) {
            *slot = weight;
        }
    }

    /// Weight of the directed edge `a -> b`; [`BLOCKED`] for out-of-range ids.
    #[must_use]
    pub fn edge(&self, a: usize, b: usize) -> u32 {
        if a >= self.node_count || b >= self.node_count {
            return BLOCKED;
        }
        self.weights
            .get(a * self.node_count + b)
            .copied()
            .unwrap_or(BLOCKED)
    }

    /// Blocks the edge between two cells in both directions.
    pub fn block_between(&mut self, a: GridCoord, b: GridCoord) {
        if let (Some(a), Some(b)) = (self.index.id(a), self.index.id(b)) {
            self.set_edge(a, b, BLOCKED);
            self.set_edge(b, a, BLOCKED);
        }
    }

    /// Blocks every edge between the cell and its cardinal neighbours, both ways.
    pub fn isolate(&mut self, cell: GridCoord) {
        let index = self.index;
        for neighbor in index.neighbors(cell) {
            self.block_between(cell, neighbor);
        }
    }

    pub(crate) fn weights(&self) -> &[u32] {
        &self.weights
    }
}
