#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Firefly Maze.

mod lights;

pub use lights::LightSourceRegistry;

use firefly_maze_core::{
    AgentId, AgentMode, Command, Event, GridCoord, GridSize, MazeLayout, SessionState, TileGrid,
};
use glam::Vec2;
use tracing::{debug, warn};

const DEFAULT_GRID_SIZE: GridSize = GridSize::new(12, 12);
const DEFAULT_TILE_LENGTH: f32 = 3.0;
const DEFAULT_WALKABLE_RANGE: f32 = 1.2;

/// Parameters fixed for the lifetime of a world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    tile_grid: TileGrid,
    walkable_range: f32,
    player_position: Vec2,
}

impl Config {
    /// Creates a configuration from the grid layout, light radius, and player start.
    #[must_use]
    pub const fn new(tile_grid: TileGrid, walkable_range: f32, player_position: Vec2) -> Self {
        Self {
            tile_grid,
            walkable_range,
            player_position,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            TileGrid::new(DEFAULT_GRID_SIZE, DEFAULT_TILE_LENGTH),
            DEFAULT_WALKABLE_RANGE,
            Vec2::ZERO,
        )
    }
}

/// Represents the authoritative Firefly Maze world state.
#[derive(Debug)]
pub struct World {
    session: SessionState,
    tile_grid: TileGrid,
    layout: Option<MazeLayout>,
    lights: LightSourceRegistry,
    start_light: Option<Vec2>,
    player: Player,
    agents: Vec<Agent>,
    next_agent_id: u32,
    suitable_cells: Vec<Vec2>,
    tick_index: u64,
}

impl World {
    /// Creates a new world ready for a session to start.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let player_cell = config
            .tile_grid
            .cell_at(config.player_position)
            .unwrap_or(GridCoord::new(0, 0));
        Self {
            session: SessionState::Idle,
            tile_grid: config.tile_grid,
            layout: None,
            lights: LightSourceRegistry::new(config.walkable_range),
            start_light: None,
            player: Player {
                position: config.player_position,
                cell: player_cell,
            },
            agents: Vec::new(),
            next_agent_id: 0,
            suitable_cells: Vec::new(),
            tick_index: 0,
        }
    }

    fn agent_mut(&mut self, agent: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|candidate| candidate.id == agent)
    }

    fn set_session(&mut self, state: SessionState, out_events: &mut Vec<Event>) {
        if self.session == state {
            return;
        }
        debug!(from = ?self.session, to = ?state, "session state changed");
        self.session = state;
        out_events.push(Event::SessionChanged { state });
    }

    fn publish_layout(&mut self, layout: MazeLayout, out_events: &mut Vec<Event>) {
        if layout.tiles.size() != self.tile_grid.size() {
            warn!(
                expected = ?self.tile_grid.size(),
                received = ?layout.tiles.size(),
                "discarding layout generated for a different grid"
            );
            return;
        }

        let mut lights_changed = false;
        let start_light = self.tile_grid.cell_center(layout.start);
        if let Some(previous) = self.start_light.take() {
            lights_changed |= self.lights.remove_static(previous);
        }
        lights_changed |= self.lights.add_static(start_light);
        self.start_light = Some(start_light);

        let generation = layout.generation;
        self.layout = Some(layout);
        out_events.push(Event::LayoutPublished { generation });
        if lights_changed {
            out_events.push(Event::LightsChanged {
                version: self.lights.version(),
            });
        }
    }

    fn move_player(&mut self, position: Vec2, out_events: &mut Vec<Event>) {
        self.player.position = position;
        let Some(cell) = self.tile_grid.cell_at(position) else {
            return;
        };
        if cell == self.player.cell {
            return;
        }
        self.player.cell = cell;
        out_events.push(Event::PlayerMoved { cell });

        let reached_exit = self
            .layout
            .as_ref()
            .and_then(|layout| layout.tiles.get(cell))
            .map_or(false, |tile| tile.is_exit());
        if reached_exit {
            out_events.push(Event::ExitReached);
            self.set_session(SessionState::Escaped, out_events);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let playing = world.session.is_playing();
    match command {
        Command::StartSession => {
            if playing {
                return;
            }
            world.agents.clear();
            world.suitable_cells.clear();
            world.set_session(SessionState::Playing, out_events);
            out_events.push(Event::RegenerationRequested {
                player_spawn: world.player.cell,
            });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::RequestRegeneration { player_spawn } => {
            out_events.push(Event::RegenerationRequested { player_spawn });
        }
        Command::PublishLayout { layout } => world.publish_layout(layout, out_events),
        Command::ReportRegenerationFailure { error } => {
            out_events.push(Event::RegenerationFailed { error });
        }
        Command::SetActiveLights { positions } => {
            if playing && world.lights.set_active(positions) {
                out_events.push(Event::LightsChanged {
                    version: world.lights.version(),
                });
            }
        }
        Command::SetTransitLights { positions } => {
            if playing {
                world.lights.set_in_transit(positions);
            }
        }
        Command::AddStaticLight { position } => {
            if world.lights.add_static(position) {
                out_events.push(Event::LightsChanged {
                    version: world.lights.version(),
                });
            }
        }
        Command::RemoveStaticLight { position } => {
            if world.lights.remove_static(position) {
                out_events.push(Event::LightsChanged {
                    version: world.lights.version(),
                });
            }
        }
        Command::SetPlayerPosition { position } => {
            if playing {
                world.move_player(position, out_events);
            }
        }
        Command::SpawnAgent { position } => {
            if !playing {
                return;
            }
            let agent = AgentId::new(world.next_agent_id);
            world.next_agent_id = world.next_agent_id.saturating_add(1);
            world.agents.push(Agent {
                id: agent,
                position,
                mode: AgentMode::Idling,
            });
            out_events.push(Event::AgentSpawned { agent, position });
        }
        Command::MoveAgent { agent, position } => {
            if !playing {
                return;
            }
            if let Some(body) = world.agent_mut(agent) {
                let from = body.position;
                body.position = position;
                out_events.push(Event::AgentMoved {
                    agent,
                    from,
                    to: position,
                });
            }
        }
        Command::SetAgentMode { agent, mode } => {
            if let Some(body) = world.agent_mut(agent) {
                if body.mode != mode {
                    body.mode = mode;
                    out_events.push(Event::AgentModeChanged { agent, mode });
                }
            }
        }
        Command::RespawnAgent { agent, position } => {
            if !playing {
                return;
            }
            if let Some(body) = world.agent_mut(agent) {
                body.position = position;
                out_events.push(Event::AgentRespawned { agent, position });
            }
        }
        Command::PublishSuitability { cells } => {
            let suitable_cells = cells.len();
            world.suitable_cells = cells;
            out_events.push(Event::SuitabilityChanged { suitable_cells });
        }
        Command::ReportAgentFault { agent, fault } => {
            out_events.push(Event::AgentFaulted { agent, fault });
        }
        Command::ReportTargetCaught { agent } => {
            if !playing {
                return;
            }
            out_events.push(Event::TargetCaught { agent });
            world.set_session(SessionState::Caught, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use firefly_maze_core::{
        AgentSnapshot, AgentView, GridCoord, LightSnapshot, MazeLayout, SessionState, TileGrid,
    };
    use glam::Vec2;

    use super::{LightSourceRegistry, World};

    /// Current session state.
    #[must_use]
    pub fn session(world: &World) -> SessionState {
        world.session
    }

    /// Provides read-only access to the world's tile grid definition.
    #[must_use]
    pub fn tile_grid(world: &World) -> TileGrid {
        world.tile_grid
    }

    /// Most recently published layout, if any cycle has completed.
    #[must_use]
    pub fn layout(world: &World) -> Option<&MazeLayout> {
        world.layout.as_ref()
    }

    /// Captures the visible light set for the current tick.
    #[must_use]
    pub fn light_snapshot(world: &World) -> LightSnapshot {
        world.lights.snapshot()
    }

    /// Provides read-only access to the light registry.
    #[must_use]
    pub fn light_registry(world: &World) -> &LightSourceRegistry {
        &world.lights
    }

    /// World-space position of the player.
    #[must_use]
    pub fn player_position(world: &World) -> Vec2 {
        world.player.position
    }

    /// Cell the player occupies.
    #[must_use]
    pub fn player_cell(world: &World) -> GridCoord {
        world.player.cell
    }

    /// Captures a read-only view of the agents inhabiting the maze.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(
            world
                .agents
                .iter()
                .map(|agent| AgentSnapshot {
                    id: agent.id,
                    position: agent.position,
                    mode: agent.mode,
                })
                .collect(),
        )
    }

    /// Cells most recently published as suitable for agent placement.
    #[must_use]
    pub fn suitable_cells(world: &World) -> &[Vec2] {
        &world.suitable_cells
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Vec2,
    cell: GridCoord,
}

#[derive(Clone, Copy, Debug)]
struct Agent {
    id: AgentId,
    position: Vec2,
    mode: AgentMode,
}
