//! Waypoint placement, route carving, and player-route attachment.

use std::iter;

use firefly_maze_core::{GenerationError, GridCoord, GridSize, MazeLayout, TileKind, TileMap};
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::{
    graph::ConnectivityGraph,
    pathfinder::AllPairsPathfinder,
};

const DEFAULT_WAYPOINT_COUNT: usize = 3;
const DEFAULT_MIN_SEPARATION: f32 = 2.0;
const DEFAULT_MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;
const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 16;

/// How carving reacts when a main-route segment has no path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentPolicy {
    /// Fail the attempt so the cycle retries with fresh waypoints.
    #[default]
    Strict,
    /// Drop the segment, log a warning, and continue carving.
    Skip,
}

/// Phase the engine is currently in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenerationPhase {
    /// No cycle has completed, or the last one failed.
    #[default]
    Idle,
    /// Sampling waypoints.
    PlacingWaypoints,
    /// Resetting the graph to cardinal adjacency.
    BuildingBaseGraph,
    /// Computing the next main-route segment.
    CarvingMainRoute,
    /// Walling off the segment that was just carved.
    EnclosingRoute,
    /// Attaching the player spawn to the main route.
    ConnectingPlayerRoute,
    /// A layout is complete and published.
    Published,
}

/// Fixed shape of every maze the engine generates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blueprint {
    /// Grid dimensions.
    pub size: GridSize,
    /// Start landmark.
    pub start: GridCoord,
    /// Exit landmark.
    pub exit: GridCoord,
    /// Number of waypoints placed per cycle.
    pub waypoint_count: usize,
    /// Minimum Euclidean spacing between waypoints and landmarks.
    pub min_separation: f32,
    /// Samples drawn before waypoint placement gives up.
    pub max_placement_attempts: u32,
    /// Attempts per cycle before the last recoverable error is reported.
    pub max_generation_attempts: u32,
    /// Reaction to unreachable main-route segments.
    pub segment_policy: SegmentPolicy,
}

impl Blueprint {
    /// Creates a blueprint with default waypoint and retry settings.
    #[must_use]
    pub const fn new(size: GridSize, start: GridCoord, exit: GridCoord) -> Self {
        Self {
            size,
            start,
            exit,
            waypoint_count: DEFAULT_WAYPOINT_COUNT,
            min_separation: DEFAULT_MIN_SEPARATION,
            max_placement_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
            max_generation_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
            segment_policy: SegmentPolicy::Strict,
        }
    }
}

impl Default for Blueprint {
    fn default() -> Self {
        let size = GridSize::new(12, 12);
        Self::new(
            size,
            GridCoord::new(0, 0),
            GridCoord::new(size.width() - 1, size.height() - 1),
        )
    }
}

/// Carves mazes into a weighted grid graph.
///
/// The graph and routing table survive publication so later queries observe
/// the enclosed corridors and the isolated exit.
#[derive(Debug)]
pub struct MazeTopologyEngine {
    blueprint: Blueprint,
    graph: ConnectivityGraph,
    pathfinder: AllPairsPathfinder,
    phase: GenerationPhase,
    generation: u64,
}

impl MazeTopologyEngine {
    /// Creates an idle engine for the blueprint.
    #[must_use]
    pub fn new(blueprint: Blueprint) -> Self {
        let graph = ConnectivityGraph::new(blueprint.size);
        let pathfinder = AllPairsPathfinder::new(&graph);
        Self {
            blueprint,
            graph,
            pathfinder,
            phase: GenerationPhase::Idle,
            generation: 0,
        }
    }

    /// Blueprint the engine generates from.
    #[must_use]
    pub const fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GenerationPhase {
        self.phase
    }

    /// Number of layouts published so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Graph as left by the most recent cycle.
    #[must_use]
    pub const fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    /// Shortest route between two cells through the current graph.
    #[must_use]
    pub fn route_between(&self, from: GridCoord, to: GridCoord) -> Vec<GridCoord> {
        self.pathfinder.path(from, to)
    }

    /// Runs a full regeneration cycle around the player spawn.
    ///
    /// Recoverable failures restart the cycle from waypoint placement until
    /// the blueprint's attempt budget runs out. A failed cycle leaves the
    /// engine `Idle`; the previously published layout is the caller's to keep.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        player_spawn: GridCoord,
        rng: &mut R,
    ) -> Result<MazeLayout, GenerationError> {
        self.validate(player_spawn)?;

        let attempts = self.blueprint.max_generation_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(player_spawn, rng) {
                Ok(mut layout) => {
                    self.generation += 1;
                    layout.generation = self.generation;
                    self.enter(GenerationPhase::Published);
                    debug!(
                        generation = self.generation,
                        attempt,
                        main_route = layout.main_route.len(),
                        player_route = layout.player_route.len(),
                        "maze layout generated"
                    );
                    return Ok(layout);
                }
                Err(error) if is_recoverable(&error) && attempt < attempts => {
                    debug!(attempt, %error, "generation attempt failed, retrying");
                    attempt += 1;
                }
                Err(error) => {
                    self.enter(GenerationPhase::Idle);
                    return Err(error);
                }
            }
        }
    }

    fn validate(&self, player_spawn: GridCoord) -> Result<(), GenerationError> {
        let size = self.blueprint.size;
        if size.cell_count() == 0 {
            return Err(GenerationError::EmptyGrid);
        }
        for cell in [self.blueprint.start, self.blueprint.exit, player_spawn] {
            if !size.contains(cell) {
                return Err(GenerationError::OutOfBounds { cell });
            }
        }
        Ok(())
    }

    fn attempt<R: Rng + ?Sized>(
        &mut self,
        player_spawn: GridCoord,
        rng: &mut R,
    ) -> Result<MazeLayout, GenerationError> {
        let Blueprint {
            size, start, exit, ..
        } = self.blueprint;

        self.enter(GenerationPhase::PlacingWaypoints);
        let waypoints = place_waypoints(&self.blueprint, player_spawn, rng)?;

        self.enter(GenerationPhase::BuildingBaseGraph);
        self.graph.reset_cardinal();
        for a in &waypoints {
            for b in &waypoints {
                if a != b {
                    self.graph.block_between(*a, *b);
                }
            }
        }

        self.enter(GenerationPhase::CarvingMainRoute);
        self.pathfinder.recompute(&self.graph);
        let anchors: Vec<GridCoord> = iter::once(start)
            .chain(waypoints.iter().copied())
            .chain(iter::once(exit))
            .collect();
        let mut main_route: Vec<GridCoord> = Vec::new();
        for pair in anchors.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let mut segment = self.pathfinder.path(from, to);
            if segment.is_empty() {
                match self.blueprint.segment_policy {
                    SegmentPolicy::Strict => {
                        return Err(GenerationError::RouteSegmentUnreachable { from, to });
                    }
                    SegmentPolicy::Skip => {
                        warn!(%from, %to, "skipping unreachable main-route segment");
                        continue;
                    }
                }
            }

            self.enter(GenerationPhase::EnclosingRoute);
            self.enclose(&segment);
            self.pathfinder.recompute(&self.graph);
            self.enter(GenerationPhase::CarvingMainRoute);

            if main_route.last() == segment.first() {
                let _ = segment.remove(0);
            }
            main_route.extend(segment);
        }

        let mut tiles = TileMap::new(size);
        tiles.set(start, start_tile(start, player_spawn));
        tiles.set(exit, exit_tile(exit, player_spawn));
        for waypoint in &waypoints {
            tiles.set(*waypoint, TileKind::Waypoint);
        }
        let spawn_is_landmark = player_spawn == start || player_spawn == exit;
        if !spawn_is_landmark {
            tiles.set(player_spawn, TileKind::Player);
        }
        mark_where_empty(&mut tiles, &main_route, TileKind::MainRoute);

        self.enter(GenerationPhase::ConnectingPlayerRoute);
        let player_route = if spawn_is_landmark {
            Vec::new()
        } else {
            self.connect_player(player_spawn, &main_route, &waypoints)?
        };
        mark_where_empty(&mut tiles, &player_route, TileKind::PlayerRoute);
        tiles.open_along(&main_route);
        tiles.open_along(&player_route);

        self.graph.isolate(exit);
        self.pathfinder.recompute(&self.graph);

        Ok(MazeLayout {
            generation: self.generation,
            tiles,
            start,
            exit,
            player_spawn,
            waypoints,
            main_route,
            player_route,
        })
    }

    fn enclose(&mut self, segment: &[GridCoord]) {
        match segment {
            [from, to] => self.graph.block_between(*from, *to),
            [_, interior @ .., _] => {
                for cell in interior {
                    self.graph.isolate(*cell);
                }
            }
            _ => {}
        }
        trace!(cells = segment.len(), "segment enclosed");
    }

    fn connect_player(
        &self,
        player_spawn: GridCoord,
        main_route: &[GridCoord],
        waypoints: &[GridCoord],
    ) -> Result<Vec<GridCoord>, GenerationError> {
        if main_route.contains(&player_spawn) {
            return Err(GenerationError::PlayerOnMainRoute { cell: player_spawn });
        }
        waypoints
            .iter()
            .map(|waypoint| self.pathfinder.path(player_spawn, *waypoint))
            .filter(|route| !route.is_empty())
            .max_by_key(Vec::len)
            .ok_or(GenerationError::PlayerRouteUnreachable {
                spawn: player_spawn,
            })
    }

    fn enter(&mut self, phase: GenerationPhase) {
        if self.phase != phase {
            trace!(from = ?self.phase, to = ?phase, "generation phase");
            self.phase = phase;
        }
    }
}

/// Samples waypoints uniformly under the blueprint's spacing rules.
///
/// A candidate is rejected when it coincides with, or lies closer than the
/// minimum separation to, any landmark or previously accepted waypoint.
pub fn place_waypoints<R: Rng + ?Sized>(
    blueprint: &Blueprint,
    player_spawn: GridCoord,
    rng: &mut R,
) -> Result<Vec<GridCoord>, GenerationError> {
    let requested = blueprint.waypoint_count;
    let mut waypoints = Vec::with_capacity(requested);
    if requested == 0 {
        return Ok(waypoints);
    }
    let size = blueprint.size;
    if size.cell_count() == 0 {
        return Err(GenerationError::EmptyGrid);
    }

    let landmarks = [blueprint.start, blueprint.exit, player_spawn];
    let mut attempts = 0;
    while waypoints.len() < requested {
        if attempts >= blueprint.max_placement_attempts {
            warn!(
                placed = waypoints.len(),
                requested, attempts, "waypoint placement exhausted"
            );
            return Err(GenerationError::PlacementExhausted {
                placed: waypoints.len(),
                requested,
            });
        }
        attempts += 1;

        let candidate = GridCoord::new(
            rng.gen_range(0..size.width()),
            rng.gen_range(0..size.height()),
        );
        let clear = landmarks.iter().chain(waypoints.iter()).all(|other| {
            *other != candidate && other.distance(candidate) >= blueprint.min_separation
        });
        if clear {
            waypoints.push(candidate);
        }
    }
    Ok(waypoints)
}

fn is_recoverable(error: &GenerationError) -> bool {
    matches!(
        error,
        GenerationError::RouteSegmentUnreachable { .. }
            | GenerationError::PlayerOnMainRoute { .. }
            | GenerationError::PlayerRouteUnreachable { .. }
    )
}

fn start_tile(start: GridCoord, player_spawn: GridCoord) -> TileKind {
    if start == player_spawn {
        TileKind::PlayerAndStart
    } else {
        TileKind::Start
    }
}

fn exit_tile(exit: GridCoord, player_spawn: GridCoord) -> TileKind {
    if exit == player_spawn {
        TileKind::PlayerAndExit
    } else {
        TileKind::Exit
    }
}

fn mark_where_empty(tiles: &mut TileMap, route: &[GridCoord], kind: TileKind) {
    for cell in route {
        if tiles.get(*cell) == Some(TileKind::Empty) {
            tiles.set(*cell, kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BLOCKED;
    use firefly_maze_core::GridIndex;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_blueprint() -> Blueprint {
        let mut blueprint = Blueprint::new(
            GridSize::new(6, 6),
            GridCoord::new(0, 0),
            GridCoord::new(5, 5),
        );
        blueprint.max_generation_attempts = 64;
        blueprint
    }

    #[test]
    fn waypoints_respect_separation() {
        let blueprint = small_blueprint();
        let spawn = GridCoord::new(0, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..20 {
            let waypoints = place_waypoints(&blueprint, spawn, &mut rng).expect("placed");
            assert_eq!(waypoints.len(), 3);
            let fixed = [blueprint.start, blueprint.exit, spawn];
            for (i, waypoint) in waypoints.iter().enumerate() {
                assert!(fixed.iter().all(|cell| cell.distance(*waypoint) >= 2.0));
                assert!(waypoints[i + 1..]
                    .iter()
                    .all(|other| other.distance(*waypoint) >= 2.0));
            }
        }
    }

    #[test]
    fn impossible_spacing_is_reported() {
        let mut blueprint = Blueprint::new(
            GridSize::new(2, 2),
            GridCoord::new(0, 0),
            GridCoord::new(1, 1),
        );
        blueprint.max_placement_attempts = 200;
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        assert_eq!(
            place_waypoints(&blueprint, GridCoord::new(0, 0), &mut rng),
            Err(GenerationError::PlacementExhausted {
                placed: 0,
                requested: 3
            })
        );
    }

    #[test]
    fn enclosed_segment_has_no_shortcut() {
        let mut engine = MazeTopologyEngine::new(small_blueprint());
        let segment = engine
            .pathfinder
            .path(GridCoord::new(0, 0), GridCoord::new(3, 4));
        assert_eq!(segment.len(), 8);

        engine.enclose(&segment);
        engine.pathfinder.recompute(&engine.graph);

        for (i, from) in segment.iter().enumerate() {
            for (j, to) in segment.iter().enumerate().skip(i + 2) {
                let detour = engine.route_between(*from, *to);
                assert!(
                    detour.is_empty() || detour.len() >= j - i + 1,
                    "shortcut {from} -> {to}: {detour:?}"
                );
            }
        }
    }

    #[test]
    fn adjacent_segment_blocks_its_single_edge() {
        let mut engine = MazeTopologyEngine::new(small_blueprint());
        let segment = vec![GridCoord::new(2, 2), GridCoord::new(3, 2)];

        engine.enclose(&segment);
        engine.pathfinder.recompute(&engine.graph);

        assert_eq!(
            engine.pathfinder.distance(segment[0], segment[1]),
            Some(3)
        );
    }

    #[test]
    fn generation_marks_single_start_and_exit() {
        let mut engine = MazeTopologyEngine::new(small_blueprint());
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

        let layout = engine
            .generate(GridCoord::new(0, 0), &mut rng)
            .expect("layout");

        assert_eq!(engine.phase(), GenerationPhase::Published);
        assert_eq!(layout.generation, 1);
        assert_eq!(layout.tiles.count(TileKind::is_start), 1);
        assert_eq!(layout.tiles.count(TileKind::is_exit), 1);
        assert_eq!(layout.tiles.get(GridCoord::new(0, 0)), Some(TileKind::PlayerAndStart));
        assert!(layout.player_route.is_empty());
    }

    #[test]
    fn exit_is_isolated_after_publish() {
        let mut engine = MazeTopologyEngine::new(small_blueprint());
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let layout = engine
            .generate(GridCoord::new(0, 0), &mut rng)
            .expect("layout");

        let index = GridIndex::new(layout.tiles.size());
        let exit = index.id(layout.exit).expect("exit id");
        for neighbor in index.neighbors(layout.exit) {
            let other = index.id(neighbor).expect("neighbour id");
            assert_eq!(engine.graph().edge(exit, other), BLOCKED);
            assert_eq!(engine.graph().edge(other, exit), BLOCKED);
        }
        assert!(engine.route_between(GridCoord::new(2, 0), layout.exit).is_empty());
    }

    #[test]
    fn out_of_grid_spawn_is_rejected() {
        let mut engine = MazeTopologyEngine::new(small_blueprint());
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(
            engine.generate(GridCoord::new(6, 0), &mut rng),
            Err(GenerationError::OutOfBounds {
                cell: GridCoord::new(6, 0)
            })
        );
        assert_eq!(engine.phase(), GenerationPhase::Idle);
    }
}
