//! Floyd–Warshall shortest paths with next-hop reconstruction.

use firefly_maze_core::{GridCoord, GridIndex};

use crate::graph::{ConnectivityGraph, BLOCKED};

/// Shortest distances and routing table over a [`ConnectivityGraph`].
///
/// Results describe the graph as it was at the most recent
/// [`AllPairsPathfinder::recompute`]; callers recompute after every mutation
/// that should influence later routing.
#[derive(Clone, Debug)]
pub struct AllPairsPathfinder {
    index: GridIndex,
    node_count: usize,
    dist: Vec<u32>,
    next: Vec<Option<usize>>,
}

impl AllPairsPathfinder {
    /// Creates a pathfinder and computes the routing table of `graph`.
    #[must_use]
    pub fn new(graph: &ConnectivityGraph) -> Self {
        let mut pathfinder = Self {
            index: graph.index(),
            node_count: 0,
            dist: Vec::new(),
            next: Vec::new(),
        };
        pathfinder.recompute(graph);
        pathfinder
    }

    /// Recomputes every shortest distance and next hop. Runs in `O(N^3)`.
    pub fn recompute(&mut self, graph: &ConnectivityGraph) {
        let n = graph.node_count();
        self.index = graph.index();
        self.node_count = n;
        self.dist.clear();
        self.dist.extend_from_slice(graph.weights());
        self.next.clear();
        self.next.extend(
            self.dist
                .iter()
                .enumerate()
                .map(|(slot, weight)| (*weight != BLOCKED).then_some(slot % n.max(1))),
        );
        for i in 0..n {
            self.dist[i * n + i] = 0;
            self.next[i * n + i] = Some(i);
        }

        for k in 0..n {
            for i in 0..n {
                let through_k = self.dist[i * n + k];
                if through_k == BLOCKED {
                    continue;
                }
                let hop = self.next[i * n + k];
                for j in 0..n {
                    let onward = self.dist[k * n + j];
                    if onward == BLOCKED {
                        continue;
                    }
                    let candidate = through_k + onward;
                    if candidate < self.dist[i * n + j] {
                        self.dist[i * n + j] = candidate;
                        self.next[i * n + j] = hop;
                    }
                }
            }
        }
    }

    /// Shortest distance between two cells, or `None` when unreachable.
    #[must_use]
    pub fn distance(&self, from: GridCoord, to: GridCoord) -> Option<u32> {
        let (from, to) = (self.index.id(from)?, self.index.id(to)?);
        let distance = *self.dist.get(from * self.node_count + to)?;
        (distance != BLOCKED).then_some(distance)
    }

    /// Shortest path from `from` to `to`, both inclusive.
    ///
    /// Returns an empty route when no path exists or either cell lies outside
    /// the grid.
    #[must_use]
    pub fn path(&self, from: GridCoord, to: GridCoord) -> Vec<GridCoord> {
        if self.distance(from, to).is_none() {
            return Vec::new();
        }
        let (Some(mut current), Some(target)) = (self.index.id(from), self.index.id(to)) else {
            return Vec::new();
        };

        let mut route = vec![from];
        while current != target {
            let Some(hop) = self
                .next
                .get(current * self.node_count + target)
                .copied()
                .flatten()
            else {
                return Vec::new();
            };
            let Some(cell) = self.index.coord(hop) else {
                return Vec::new();
            };
            route.push(cell);
            current = hop;
            if route.len() > self.node_count {
                return Vec::new();
            }
        }
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firefly_maze_core::GridSize;

    #[test]
    fn open_grid_distances_are_manhattan() {
        let size = GridSize::new(5, 4);
        let graph = ConnectivityGraph::new(size);
        let pathfinder = AllPairsPathfinder::new(&graph);
        let index = GridIndex::new(size);

        for a in 0..index.node_count() {
            for b in 0..index.node_count() {
                let from = index.coord(a).expect("from");
                let to = index.coord(b).expect("to");
                assert_eq!(
                    pathfinder.distance(from, to),
                    Some(from.manhattan_distance(to)),
                    "distance {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn path_walks_cardinal_steps_inclusive() {
        let graph = ConnectivityGraph::new(GridSize::new(4, 4));
        let pathfinder = AllPairsPathfinder::new(&graph);
        let from = GridCoord::new(0, 3);
        let to = GridCoord::new(3, 0);

        let route = pathfinder.path(from, to);

        assert_eq!(route.first(), Some(&from));
        assert_eq!(route.last(), Some(&to));
        assert_eq!(route.len(), 7);
        assert!(route.windows(2).all(|pair| pair[0].is_cardinal_neighbor(pair[1])));
        assert_eq!(pathfinder.path(from, from), vec![from]);
    }

    #[test]
    fn isolated_cell_is_unreachable() {
        let mut graph = ConnectivityGraph::new(GridSize::new(3, 3));
        let corner = GridCoord::new(2, 2);
        graph.isolate(corner);
        let pathfinder = AllPairsPathfinder::new(&graph);

        assert_eq!(pathfinder.distance(GridCoord::new(0, 0), corner), None);
        assert!(pathfinder.path(GridCoord::new(0, 0), corner).is_empty());
        assert!(pathfinder.path(GridCoord::new(0, 0), GridCoord::new(7, 7)).is_empty());
    }

    #[test]
    fn one_way_edge_is_respected() {
        let mut graph = ConnectivityGraph::new(GridSize::new(2, 1));
        graph.set_edge(0, 1, BLOCKED);
        let pathfinder = AllPairsPathfinder::new(&graph);

        assert_eq!(pathfinder.distance(GridCoord::new(0, 0), GridCoord::new(1, 0)), None);
        assert_eq!(pathfinder.distance(GridCoord::new(1, 0), GridCoord::new(0, 0)), Some(1));
    }
}
