#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Firefly Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots such as [`LightSnapshot`] and [`AgentView`], and
//! respond exclusively with new command batches.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of a single play session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session has been started yet.
    #[default]
    Idle,
    /// The player is exploring the maze and every system is live.
    Playing,
    /// An agent reached the player; the encounter is over.
    Caught,
    /// The player reached the exit.
    Escaped,
}

impl SessionState {
    /// Reports whether systems should advance while in this state.
    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Begins a new play session.
    StartSession,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the maze be regenerated around a new player spawn.
    RequestRegeneration {
        /// Cell the player occupies when the request is made.
        player_spawn: GridCoord,
    },
    /// Atomically replaces the published maze layout.
    PublishLayout {
        /// Freshly generated layout.
        layout: MazeLayout,
    },
    /// Reports that a regeneration cycle failed; the previous layout stays live.
    ReportRegenerationFailure {
        /// Reason the cycle failed.
        error: GenerationError,
    },
    /// Replaces the set of deployed lights wholesale.
    SetActiveLights {
        /// World-space centres of the deployed lights.
        positions: Vec<Vec2>,
    },
    /// Replaces the set of lights currently travelling between lamp and target.
    SetTransitLights {
        /// World-space centres of the travelling lights.
        positions: Vec<Vec2>,
    },
    /// Adds an environmental light.
    AddStaticLight {
        /// World-space centre of the light.
        position: Vec2,
    },
    /// Removes an environmental light.
    RemoveStaticLight {
        /// World-space centre of the light.
        position: Vec2,
    },
    /// Moves the player to a new world-space position.
    SetPlayerPosition {
        /// Position reported by the presentation layer.
        position: Vec2,
    },
    /// Requests that a new agent enter the maze.
    SpawnAgent {
        /// World-space position the agent appears at.
        position: Vec2,
    },
    /// Moves an agent to a new position.
    MoveAgent {
        /// Agent being moved.
        agent: AgentId,
        /// Destination of the move.
        position: Vec2,
    },
    /// Updates the behaviour mode an agent presents.
    SetAgentMode {
        /// Agent whose mode changed.
        agent: AgentId,
        /// Newly active mode.
        mode: AgentMode,
    },
    /// Teleports an agent to a respawn position.
    RespawnAgent {
        /// Agent being respawned.
        agent: AgentId,
        /// Selected respawn position.
        position: Vec2,
    },
    /// Publishes the latest set of cells suitable for agent placement.
    PublishSuitability {
        /// World-space centres of suitable cells.
        cells: Vec<Vec2>,
    },
    /// Reports that an agent could not complete an operation.
    ReportAgentFault {
        /// Agent affected by the fault.
        agent: AgentId,
        /// Nature of the fault.
        fault: AgentFault,
    },
    /// Reports that an agent reached the player.
    ReportTargetCaught {
        /// Agent that caught the player.
        agent: AgentId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the session entered a new state.
    SessionChanged {
        /// State that became active.
        state: SessionState,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a maze regeneration was requested.
    RegenerationRequested {
        /// Cell to use as the player spawn for the new layout.
        player_spawn: GridCoord,
    },
    /// Confirms that a new layout replaced the previous one.
    LayoutPublished {
        /// Monotonic generation counter of the published layout.
        generation: u64,
    },
    /// Reports that a regeneration cycle failed.
    RegenerationFailed {
        /// Reason the cycle failed.
        error: GenerationError,
    },
    /// Announces that the membership of the visible light set changed.
    LightsChanged {
        /// Registry version after the change.
        version: u64,
    },
    /// Confirms that the player moved into a different cell.
    PlayerMoved {
        /// Cell the player now occupies.
        cell: GridCoord,
    },
    /// Announces that the player reached the exit.
    ExitReached,
    /// Confirms that an agent entered the maze.
    AgentSpawned {
        /// Identifier allocated to the agent.
        agent: AgentId,
        /// Position the agent appeared at.
        position: Vec2,
    },
    /// Confirms that an agent moved.
    AgentMoved {
        /// Agent that moved.
        agent: AgentId,
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// Announces that an agent changed behaviour mode.
    AgentModeChanged {
        /// Agent whose mode changed.
        agent: AgentId,
        /// Newly active mode.
        mode: AgentMode,
    },
    /// Confirms that an agent respawned.
    AgentRespawned {
        /// Agent that respawned.
        agent: AgentId,
        /// Position the agent respawned at.
        position: Vec2,
    },
    /// Reports that an agent could not complete an operation.
    AgentFaulted {
        /// Agent affected by the fault.
        agent: AgentId,
        /// Nature of the fault.
        fault: AgentFault,
    },
    /// Announces that the set of suitable agent cells was recomputed.
    SuitabilityChanged {
        /// Number of suitable cells in the new set.
        suitable_cells: usize,
    },
    /// Announces that an agent caught the player.
    TargetCaught {
        /// Agent that caught the player.
        agent: AgentId,
    },
}

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: u32,
    y: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based horizontal index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based vertical index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the Euclidean distance between two coordinates.
    #[must_use]
    pub fn distance(self, other: GridCoord) -> f32 {
        let dx = self.x.abs_diff(other.x) as f32;
        let dy = self.y.abs_diff(other.y) as f32;
        dx.hypot(dy)
    }

    /// Reports whether `other` is exactly one cardinal step away.
    #[must_use]
    pub fn is_cardinal_neighbor(self, other: GridCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dimensions of the maze measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells, saturating on platforms where it would overflow.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: GridCoord) -> bool {
        cell.x < self.width && cell.y < self.height
    }
}

/// Bidirectional mapping between grid coordinates and flat node indices.
///
/// Node ids are laid out column-major: `id = x * height + y`. Every other
/// dense structure in the engine (connectivity matrices, tile maps) uses the
/// same layout so ids can be shared freely between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridIndex {
    size: GridSize,
}

impl GridIndex {
    /// Creates an index over the provided grid dimensions.
    #[must_use]
    pub const fn new(size: GridSize) -> Self {
        Self { size }
    }

    /// Dimensions the index was built for.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Number of nodes addressed by the index.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.size.cell_count()
    }

    /// Flat id of the coordinate, or `None` when it lies outside the grid.
    #[must_use]
    pub fn id(&self, cell: GridCoord) -> Option<usize> {
        if !self.size.contains(cell) {
            return None;
        }
        let x = usize::try_from(cell.x).ok()?;
        let y = usize::try_from(cell.y).ok()?;
        let height = usize::try_from(self.size.height).ok()?;
        x.checked_mul(height)?.checked_add(y)
    }

    /// Coordinate of the flat id, or `None` when the id is out of range.
    #[must_use]
    pub fn coord(&self, id: usize) -> Option<GridCoord> {
        if id >= self.node_count() {
            return None;
        }
        let height = usize::try_from(self.size.height).ok()?;
        let x = u32::try_from(id / height).ok()?;
        let y = u32::try_from(id % height).ok()?;
        Some(GridCoord::new(x, y))
    }

    /// Cardinal neighbours of the cell that lie inside the grid.
    pub fn neighbors(&self, cell: GridCoord) -> impl Iterator<Item = GridCoord> {
        let width = self.size.width;
        let height = self.size.height;
        let candidates = [
            cell.x.checked_add(1).filter(|x| *x < width).map(|x| GridCoord::new(x, cell.y)),
            cell.x.checked_sub(1).map(|x| GridCoord::new(x, cell.y)),
            cell.y.checked_add(1).filter(|y| *y < height).map(|y| GridCoord::new(cell.x, y)),
            cell.y.checked_sub(1).map(|y| GridCoord::new(cell.x, y)),
        ];
        candidates.into_iter().flatten()
    }
}

/// Set of cell sides that open onto a neighbouring route cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sides(u8);

impl Sides {
    /// No open sides.
    pub const NONE: Self = Self(0);
    /// Opening toward increasing `y`.
    pub const UP: Self = Self(1);
    /// Opening toward decreasing `y`.
    pub const DOWN: Self = Self(2);
    /// Opening toward increasing `x`.
    pub const RIGHT: Self = Self(4);
    /// Opening toward decreasing `x`.
    pub const LEFT: Self = Self(8);

    /// Side of `from` that faces the cardinal neighbour `to`.
    #[must_use]
    pub fn facing(from: GridCoord, to: GridCoord) -> Option<Self> {
        if !from.is_cardinal_neighbor(to) {
            return None;
        }
        let side = if to.x > from.x {
            Self::RIGHT
        } else if to.x < from.x {
            Self::LEFT
        } else if to.y > from.y {
            Self::UP
        } else {
            Self::DOWN
        };
        Some(side)
    }

    /// Reports whether every side in `other` is also open in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of both side sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Classification assigned to every cell of a published maze.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Unused cell.
    #[default]
    Empty,
    /// Player spawn.
    Player,
    /// Maze exit.
    Exit,
    /// Maze start.
    Start,
    /// Forced intermediate stop of the main route.
    Waypoint,
    /// Corridor linking the player spawn to the main route.
    PlayerRoute,
    /// Corridor of the main route.
    MainRoute,
    /// Player spawn coinciding with the start.
    PlayerAndStart,
    /// Player spawn coinciding with the exit.
    PlayerAndExit,
}

impl TileKind {
    /// Stable numeric code consumed by tile palettes.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Player => 1,
            Self::Exit => 2,
            Self::Start => 3,
            Self::Waypoint => 4,
            Self::PlayerRoute => 5,
            Self::MainRoute => 6,
            Self::PlayerAndStart => 7,
            Self::PlayerAndExit => 8,
        }
    }

    /// Reports whether the tile plays the start role.
    #[must_use]
    pub const fn is_start(self) -> bool {
        matches!(self, Self::Start | Self::PlayerAndStart)
    }

    /// Reports whether the tile plays the exit role.
    #[must_use]
    pub const fn is_exit(self) -> bool {
        matches!(self, Self::Exit | Self::PlayerAndExit)
    }

    /// Reports whether the tile hosts the player spawn.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(
            self,
            Self::Player | Self::PlayerAndStart | Self::PlayerAndExit
        )
    }

    /// Reports whether the tile is a fixed landmark that routes never overwrite.
    #[must_use]
    pub const fn is_landmark(self) -> bool {
        !matches!(self, Self::Empty | Self::PlayerRoute | Self::MainRoute)
    }
}

/// Dense tile classification grid plus the corridor openings of every cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    size: GridSize,
    tiles: Vec<TileKind>,
    openings: Vec<Sides>,
}

impl TileMap {
    /// Creates a map where every cell is [`TileKind::Empty`].
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            tiles: vec![TileKind::Empty; size.cell_count()],
            openings: vec![Sides::NONE; size.cell_count()],
        }
    }

    /// Dimensions of the map.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Classification of the cell, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, cell: GridCoord) -> Option<TileKind> {
        let id = GridIndex::new(self.size).id(cell)?;
        self.tiles.get(id).copied()
    }

    /// Overwrites the classification of the cell. Out-of-grid cells are ignored.
    pub fn set(&mut self, cell: GridCoord, kind: TileKind) {
        if let Some(id) = GridIndex::new(self.size).id(cell) {
            if let Some(slot) = self.tiles.get_mut(id) {
                *slot = kind;
            }
        }
    }

    /// Open sides of the cell.
    #[must_use]
    pub fn openings(&self, cell: GridCoord) -> Sides {
        GridIndex::new(self.size)
            .id(cell)
            .and_then(|id| self.openings.get(id).copied())
            .unwrap_or(Sides::NONE)
    }

    /// Opens the shared side between every pair of consecutive route cells.
    pub fn open_along(&mut self, route: &[GridCoord]) {
        let index = GridIndex::new(self.size);
        for pair in route.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let (Some(forward), Some(backward)) = (Sides::facing(from, to), Sides::facing(to, from))
            else {
                continue;
            };
            if let Some(slot) = index.id(from).and_then(|id| self.openings.get_mut(id)) {
                *slot = slot.union(forward);
            }
            if let Some(slot) = index.id(to).and_then(|id| self.openings.get_mut(id)) {
                *slot = slot.union(backward);
            }
        }
    }

    /// Iterator over every cell and its classification in id order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, TileKind)> + '_ {
        let index = GridIndex::new(self.size);
        self.tiles
            .iter()
            .enumerate()
            .filter_map(move |(id, kind)| index.coord(id).map(|cell| (cell, *kind)))
    }

    /// Number of cells matching the predicate.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(TileKind) -> bool) -> usize {
        self.tiles.iter().filter(|kind| predicate(**kind)).count()
    }
}

/// Immutable maze produced by one regeneration cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeLayout {
    /// Monotonic counter identifying the regeneration cycle.
    pub generation: u64,
    /// Classification of every cell.
    pub tiles: TileMap,
    /// Start landmark of the main route.
    pub start: GridCoord,
    /// Exit landmark of the main route.
    pub exit: GridCoord,
    /// Player spawn used for this cycle.
    pub player_spawn: GridCoord,
    /// Waypoints in visiting order.
    pub waypoints: Vec<GridCoord>,
    /// Main route from start through every waypoint to the exit.
    pub main_route: Vec<GridCoord>,
    /// Side route from the player spawn to a waypoint; empty when the spawn is a landmark.
    pub player_route: Vec<GridCoord>,
}

/// Describes how grid cells map into world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGrid {
    size: GridSize,
    tile_length: f32,
}

impl TileGrid {
    /// Creates a new tile grid description.
    #[must_use]
    pub const fn new(size: GridSize, tile_length: f32) -> Self {
        Self { size, tile_length }
    }

    /// Dimensions of the grid in cells.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Side length of a single square tile expressed in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// World-space centre of the cell.
    #[must_use]
    pub fn cell_center(&self, cell: GridCoord) -> Vec2 {
        Vec2::new(cell.x as f32, cell.y as f32) * self.tile_length
    }

    /// Cell whose centre lies closest to the point, clamped to the grid.
    ///
    /// Returns `None` for an empty grid or a non-positive tile length.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<GridCoord> {
        if self.size.width == 0 || self.size.height == 0 || self.tile_length <= 0.0 {
            return None;
        }
        let scaled = (point / self.tile_length).round();
        let x = scaled.x.clamp(0.0, (self.size.width - 1) as f32) as u32;
        let y = scaled.y.clamp(0.0, (self.size.height - 1) as f32) as u32;
        Some(GridCoord::new(x, y))
    }
}

/// Consistent read-only view of the visible light set for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightSnapshot {
    sources: Vec<Vec2>,
    radius: f32,
    version: u64,
}

impl LightSnapshot {
    /// Captures a snapshot of the provided light centres.
    #[must_use]
    pub fn new(sources: Vec<Vec2>, radius: f32, version: u64) -> Self {
        Self {
            sources,
            radius,
            version,
        }
    }

    /// Centres of every active and static light.
    #[must_use]
    pub fn sources(&self) -> &[Vec2] {
        &self.sources
    }

    /// Radius inside which a light makes the ground walkable.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Registry version the snapshot was taken at.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Reports whether no light is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behaviour mode an agent presents to the animation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AgentMode {
    /// Wandering around an idle anchor.
    #[default]
    Idling,
    /// Walking toward a requested anchor.
    Relocating,
    /// Standing in light, deciding whether to pursue.
    Alerted,
    /// Chasing the target.
    Pursuing,
    /// Waiting out a respawn.
    Cooldown,
}

/// Immutable representation of a single agent used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Identifier allocated to the agent.
    pub id: AgentId,
    /// World-space position of the agent.
    pub position: Vec2,
    /// Mode most recently reported for the agent.
    pub mode: AgentMode,
}

/// Read-only snapshot describing every agent in the maze.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the requested agent, if present.
    #[must_use]
    pub fn get(&self, agent: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots
            .binary_search_by_key(&agent, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of agents in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Reasons a maze regeneration cycle can fail.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum GenerationError {
    /// The requested grid has no cells.
    #[error("grid has no cells")]
    EmptyGrid,
    /// A landmark lies outside the grid.
    #[error("cell {cell} lies outside the grid")]
    OutOfBounds {
        /// Offending coordinate.
        cell: GridCoord,
    },
    /// Waypoint sampling could not satisfy the spacing constraints.
    #[error("placed {placed} of {requested} waypoints before exhausting attempts")]
    PlacementExhausted {
        /// Waypoints placed before giving up.
        placed: usize,
        /// Waypoints requested.
        requested: usize,
    },
    /// No path exists for a main-route segment.
    #[error("no route from {from} to {to}")]
    RouteSegmentUnreachable {
        /// Segment origin.
        from: GridCoord,
        /// Segment destination.
        to: GridCoord,
    },
    /// The player spawn lies on the carved main route.
    #[error("player spawn {cell} lies on the main route")]
    PlayerOnMainRoute {
        /// Player spawn coordinate.
        cell: GridCoord,
    },
    /// No waypoint can be reached from the player spawn.
    #[error("no waypoint reachable from player spawn {spawn}")]
    PlayerRouteUnreachable {
        /// Player spawn coordinate.
        spawn: GridCoord,
    },
}

/// Reasons an agent operation can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum AgentFault {
    /// The suitability grid held no cell at respawn time.
    #[error("no suitable respawn cell")]
    NoSuitableRespawnCell,
}
