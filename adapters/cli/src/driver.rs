//! Headless per-tick driver pumping the world and every system.

use std::{fmt::Write as _, time::Duration};

use anyhow::Result;
use firefly_maze_core::{
    Command, Event, GridCoord, LightSnapshot, MazeLayout, SessionState, TileGrid, TileKind,
};
use firefly_maze_system_avoidance::Avoidance;
use firefly_maze_system_lantern::{Lantern, LanternInput, LanternView};
use firefly_maze_system_topology::Topology;
use firefly_maze_system_visibility::can_step;
use firefly_maze_world::{self as world, query, World};
use glam::Vec2;
use tracing::{debug, info, warn};

use crate::config::Settings;

const ARRIVAL_TOLERANCE: f32 = 0.05;
const PLACE_COOLDOWN: Duration = Duration::from_secs(1);

/// Counters collected over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Report {
    pub(crate) ticks: u32,
    pub(crate) layouts: u64,
    pub(crate) failures: u32,
    pub(crate) respawns: u32,
    pub(crate) faults: u32,
    pub(crate) session: SessionState,
}

/// Owns the world and the systems reacting to it.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    topology: Topology,
    lantern: Lantern,
    avoidance: Avoidance,
    pilot: Pilot,
    tick: Duration,
    report: Report,
}

impl Simulation {
    /// Builds every system from the settings and starts the session.
    pub(crate) fn new(settings: &Settings) -> Result<Self> {
        let mut simulation = Self {
            world: World::new(settings.world_config()),
            topology: Topology::new(settings.topology_config()?),
            lantern: Lantern::new(settings.lantern_config()),
            avoidance: Avoidance::new(settings.avoidance_config()?),
            pilot: Pilot::new(settings.simulation.player_speed, settings.lights.walkable_range),
            tick: settings.tick(),
            report: Report::default(),
        };

        let mut commands: Vec<Command> = settings
            .static_lights()
            .into_iter()
            .map(|position| Command::AddStaticLight { position })
            .collect();
        commands.push(Command::StartSession);
        simulation.pump(commands, LanternInput::default());
        Ok(simulation)
    }

    /// Advances up to `ticks` ticks, stopping early once the session ends.
    pub(crate) fn run(&mut self, ticks: u32) -> Report {
        for _ in 0..ticks {
            if !query::session(&self.world).is_playing() {
                break;
            }
            self.step();
        }
        self.report()
    }

    pub(crate) fn report(&self) -> Report {
        Report {
            session: query::session(&self.world),
            ..self.report
        }
    }

    pub(crate) fn player_position(&self) -> Vec2 {
        query::player_position(&self.world)
    }

    pub(crate) fn lamp_count(&self) -> usize {
        self.lantern.lamp_count()
    }

    /// ASCII rendering of the current layout with the player overlaid.
    pub(crate) fn map(&self) -> Option<String> {
        query::layout(&self.world)
            .map(|layout| render_map(layout, query::player_cell(&self.world)))
    }

    fn step(&mut self) {
        let lights = query::light_snapshot(&self.world);
        let (movement, input) =
            self.pilot
                .plan(query::player_position(&self.world), &lights, self.tick);

        let mut commands = vec![Command::Tick { dt: self.tick }];
        if let Some(position) = movement {
            commands.push(Command::SetPlayerPosition { position });
        }
        self.pump(commands, input);
        self.report.ticks += 1;
    }

    fn pump(&mut self, commands: Vec<Command>, input: LanternInput) {
        let mut pending = commands;
        let mut input = Some(input);
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.observe(&events);

            let session = query::session(&self.world);
            let lights = query::light_snapshot(&self.world);
            let player = query::player_position(&self.world);
            let view = LanternView {
                player,
                lamp: player,
                statics: query::light_registry(&self.world).statics(),
                walkable_range: lights.radius(),
            };

            self.topology.handle(
                &events,
                session,
                query::player_cell(&self.world),
                &mut pending,
            );
            self.lantern.handle(
                &events,
                session,
                &view,
                input.take().unwrap_or_default(),
                &mut pending,
            );
            self.avoidance.handle(
                &events,
                session,
                &lights,
                player,
                &query::agent_view(&self.world),
                &mut pending,
            );
        }
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SessionChanged { state } => info!(?state, "session changed"),
                Event::LayoutPublished { generation } => {
                    self.report.layouts += 1;
                    info!(generation, "maze published");
                    if let Some(layout) = query::layout(&self.world) {
                        self.pilot.follow(layout, query::tile_grid(&self.world));
                    }
                }
                Event::RegenerationFailed { error } => {
                    self.report.failures += 1;
                    warn!(%error, "maze regeneration failed; keeping previous layout");
                }
                Event::AgentRespawned { agent, position } => {
                    self.report.respawns += 1;
                    debug!(agent = agent.get(), %position, "agent respawned");
                }
                Event::AgentFaulted { agent, fault } => {
                    self.report.faults += 1;
                    warn!(agent = agent.get(), %fault, "agent fault");
                }
                Event::ExitReached => info!("player reached the exit"),
                Event::TargetCaught { agent } => info!(agent = agent.get(), "player caught"),
                _ => {}
            }
        }
    }
}

/// Scripted player walking the published route and lighting its way.
#[derive(Debug)]
struct Pilot {
    route: Vec<Vec2>,
    next: usize,
    speed: f32,
    reach: f32,
    since_place: Duration,
}

impl Pilot {
    fn new(speed: f32, reach: f32) -> Self {
        Self {
            route: Vec::new(),
            next: 0,
            speed,
            reach,
            since_place: PLACE_COOLDOWN,
        }
    }

    /// Replaces the route with the path from the spawn to the exit.
    fn follow(&mut self, layout: &MazeLayout, grid: TileGrid) {
        let cells: Vec<GridCoord> = match layout.player_route.last() {
            Some(joined) => {
                let rest = layout
                    .main_route
                    .iter()
                    .position(|cell| cell == joined)
                    .map_or(&[][..], |index| &layout.main_route[index + 1..]);
                layout.player_route.iter().chain(rest).copied().collect()
            }
            None if layout.player_spawn == layout.start => layout.main_route.clone(),
            None => Vec::new(),
        };
        self.route = cells.into_iter().map(|cell| grid.cell_center(cell)).collect();
        self.next = 0;
    }

    fn plan(
        &mut self,
        position: Vec2,
        lights: &LightSnapshot,
        dt: Duration,
    ) -> (Option<Vec2>, LanternInput) {
        self.since_place = self.since_place.saturating_add(dt);
        let Some(target) = self.route.get(self.next).copied() else {
            return (None, LanternInput::default());
        };
        let offset = target - position;
        let distance = offset.length();
        if distance <= ARRIVAL_TOLERANCE {
            self.next += 1;
            return (None, LanternInput::default());
        }

        let direction = offset / distance;
        if can_step(lights, position, direction) {
            let step = (self.speed * dt.as_secs_f32()).min(distance);
            return (Some(position + direction * step), LanternInput::default());
        }
        if self.since_place < PLACE_COOLDOWN {
            return (None, LanternInput::default());
        }
        self.since_place = Duration::ZERO;
        let input = LanternInput {
            place: Some(position + direction * self.reach),
            recall: None,
        };
        (None, input)
    }
}

fn tile_char(kind: TileKind) -> char {
    match kind {
        TileKind::Empty => '.',
        TileKind::Player => 'P',
        TileKind::Exit => 'E',
        TileKind::Start => 'S',
        TileKind::Waypoint => 'W',
        TileKind::PlayerRoute => '+',
        TileKind::MainRoute => '#',
        TileKind::PlayerAndStart => 's',
        TileKind::PlayerAndExit => 'e',
    }
}

/// Renders one row per grid row, with `@` marking the player's cell.
pub(crate) fn render_map(layout: &MazeLayout, player: GridCoord) -> String {
    let size = layout.tiles.size();
    let mut map = String::with_capacity(size.cell_count() + size.height() as usize);
    for y in 0..size.height() {
        for x in 0..size.width() {
            let cell = GridCoord::new(x, y);
            let glyph = if cell == player {
                '@'
            } else {
                tile_char(layout.tiles.get(cell).unwrap_or_default())
            };
            map.push(glyph);
        }
        let _ = writeln!(map);
    }
    map
}
