#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Agent avoidance system that steers agents around the visible light set.
//!
//! Every agent carries an explicit behaviour state advanced once per tick from
//! the shared light snapshot. The system keeps agents out of light, relocates
//! idle agents into the dark ring around the player, and respawns agents that
//! wander off or get stuck.

mod brain;
mod spawner;

use std::time::Duration;

use firefly_maze_core::{
    AgentFault, AgentId, AgentMode, AgentView, Command, Event, LightSnapshot, SessionState,
};
use firefly_maze_system_visibility::{
    segment_intersects_any_light, IntersectionMode, SuitabilityGrid,
};
use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, warn};

use brain::{Behaviour, Brain, Step, Surroundings};
use spawner::Spawner;

/// Errors raised while choosing agent placements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AvoidanceError {
    /// The suitability grid held no cell at respawn time.
    #[error("no suitable respawn cell")]
    NoSuitableRespawnCell,
}

impl From<AvoidanceError> for AgentFault {
    fn from(error: AvoidanceError) -> Self {
        match error {
            AvoidanceError::NoSuitableRespawnCell => Self::NoSuitableRespawnCell,
        }
    }
}

/// Chooses a respawn position uniformly among the suitable cells.
pub fn select_respawn_cell<R: Rng + ?Sized>(
    cells: &[Vec2],
    rng: &mut R,
) -> Result<Vec2, AvoidanceError> {
    cells
        .choose(rng)
        .copied()
        .ok_or(AvoidanceError::NoSuitableRespawnCell)
}

/// Tuning parameters of the avoidance system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Agents spawned when a session starts.
    pub agent_count: usize,
    /// Closest spawn distance from the player.
    pub min_spawn_range: f32,
    /// Farthest spawn distance from the player.
    pub max_spawn_range: f32,
    /// Shortest delay between consecutive spawns.
    pub min_spawn_stagger: Duration,
    /// Longest delay between consecutive spawns.
    pub max_spawn_stagger: Duration,
    /// Extra clearance added to the light radius for placement and relocation.
    pub additional_light_avoidance: f32,
    /// Extra leash added to the light radius for the outer suitability ring.
    pub max_additional_distance: f32,
    /// Cells along each edge of the suitability window.
    pub window_side: usize,
    /// Spacing of suitability cells in world units.
    pub cell_size: f32,
    /// Cadence at which idle agents are relocated.
    pub reposition_interval: Duration,
    /// Walking speed in world units per second.
    pub walk_speed: f32,
    /// Pursuit speed in world units per second.
    pub pursuit_speed: f32,
    /// Radius around the idle anchor that wander targets are drawn from.
    pub wander_radius: f32,
    /// Shortest pause between wander moves.
    pub min_idle_wait: Duration,
    /// Longest pause between wander moves.
    pub max_idle_wait: Duration,
    /// Wander moves allowed before a respawn is forced.
    pub max_idle_cycles: u32,
    /// Distance a relocating agent backs off after flinching from light.
    pub flinch_distance: f32,
    /// Time an alerted agent waits before committing to pursuit.
    pub alert_grace: Duration,
    /// Continuous darkness that cancels an alert.
    pub dark_window: Duration,
    /// Distance at which a pursuing agent catches its target.
    pub stopping_distance: f32,
    /// Cadence of the distance watchdog.
    pub watchdog_interval: Duration,
    /// Multiple of the maximum additional distance tolerated by the watchdog.
    pub watchdog_multiplier: f32,
    /// Wait before a failed respawn is retried.
    pub respawn_retry: Duration,
    /// Shape tested when checking relocation routes.
    pub intersection_mode: IntersectionMode,
    /// Seed of the system's random stream.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent_count: 2,
            min_spawn_range: 4.0,
            max_spawn_range: 8.0,
            min_spawn_stagger: Duration::from_millis(100),
            max_spawn_stagger: Duration::from_millis(500),
            additional_light_avoidance: 2.0,
            max_additional_distance: 6.0,
            window_side: 11,
            cell_size: 0.4,
            reposition_interval: Duration::from_secs(3),
            walk_speed: 1.5,
            pursuit_speed: 2.5,
            wander_radius: 1.0,
            min_idle_wait: Duration::from_secs(1),
            max_idle_wait: Duration::from_secs(3),
            max_idle_cycles: 5,
            flinch_distance: 0.5,
            alert_grace: Duration::from_millis(750),
            dark_window: Duration::from_millis(500),
            stopping_distance: 0.5,
            watchdog_interval: Duration::from_secs(1),
            watchdog_multiplier: 2.0,
            respawn_retry: Duration::from_secs(1),
            intersection_mode: IntersectionMode::Segment,
            rng_seed: 0,
        }
    }
}

/// Pure system that advances every agent's behaviour state machine.
#[derive(Debug)]
pub struct Avoidance {
    config: Config,
    rng: ChaCha8Rng,
    grid: SuitabilityGrid,
    brains: Vec<Brain>,
    spawner: Spawner,
    reposition_elapsed: Duration,
    watchdog_elapsed: Duration,
}

impl Avoidance {
    /// Creates a new avoidance system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            grid: SuitabilityGrid::new(config.window_side, config.cell_size),
            brains: Vec::new(),
            spawner: Spawner::default(),
            reposition_elapsed: Duration::ZERO,
            watchdog_elapsed: Duration::ZERO,
            config,
        }
    }

    /// Behaviour mode the system currently holds for the agent.
    #[must_use]
    pub fn mode_of(&self, agent: AgentId) -> Option<AgentMode> {
        self.brains
            .iter()
            .find(|brain| brain.id == agent)
            .map(|brain| brain.behaviour.mode())
    }

    /// Agents still waiting to be spawned this session.
    #[must_use]
    pub const fn pending_spawns(&self) -> usize {
        self.spawner.pending()
    }

    /// Consumes events and immutable views to emit agent commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        session: SessionState,
        lights: &LightSnapshot,
        player: Vec2,
        agents: &AgentView,
        out: &mut Vec<Command>,
    ) {
        if !session.is_playing() {
            self.spawner.disarm();
            self.reposition_elapsed = Duration::ZERO;
            self.watchdog_elapsed = Duration::ZERO;
            return;
        }

        let mut dt = Duration::ZERO;
        let mut lights_changed = false;
        for event in events {
            match event {
                Event::SessionChanged {
                    state: SessionState::Playing,
                } => self.begin_session(),
                Event::TimeAdvanced { dt: step } => dt = dt.saturating_add(*step),
                Event::LightsChanged { .. } => lights_changed = true,
                Event::AgentSpawned { agent, position } => {
                    let wait = random_duration(
                        &mut self.rng,
                        self.config.min_idle_wait,
                        self.config.max_idle_wait,
                    );
                    self.brains.push(Brain::new(*agent, *position, wait));
                }
                _ => {}
            }
        }

        for brain in &mut self.brains {
            if let Some(snapshot) = agents.get(brain.id) {
                brain.position = snapshot.position;
            }
        }

        self.spawner
            .advance(dt, player, &self.config, &mut self.rng, out);

        self.reposition_elapsed = self.reposition_elapsed.saturating_add(dt);
        if lights_changed
            || (!self.config.reposition_interval.is_zero()
                && self.reposition_elapsed >= self.config.reposition_interval)
        {
            self.reposition_elapsed = Duration::ZERO;
            self.reposition(lights, player, out);
        }

        let mut forced = Vec::new();
        self.watchdog_elapsed = self.watchdog_elapsed.saturating_add(dt);
        if !self.config.watchdog_interval.is_zero()
            && self.watchdog_elapsed >= self.config.watchdog_interval
        {
            self.watchdog_elapsed = Duration::ZERO;
            let leash = self.config.watchdog_multiplier * self.config.max_additional_distance
                + lights.radius();
            for (index, brain) in self.brains.iter().enumerate() {
                let parked = matches!(brain.behaviour, Behaviour::Cooldown { .. });
                if !parked && brain.position.distance(player) > leash {
                    debug!(agent = ?brain.id, "agent strayed beyond leash");
                    forced.push(index);
                }
            }
        }

        if dt.is_zero() && forced.is_empty() {
            self.report_modes(out);
            return;
        }

        let env = Surroundings {
            lights,
            avoidance_radius: lights.radius() + self.config.additional_light_avoidance,
            target: player,
            dt,
        };
        for index in 0..self.brains.len() {
            let step = if forced.contains(&index) {
                Step::Respawn
            } else {
                let brain = &mut self.brains[index];
                let before = brain.position;
                let step = brain.step(&env, &self.config, &mut self.rng);
                if brain.position != before && step != Step::Respawn {
                    out.push(Command::MoveAgent {
                        agent: brain.id,
                        position: brain.position,
                    });
                }
                step
            };

            match step {
                Step::Continue => {}
                Step::Respawn => self.respawn(index, lights, player, out),
                Step::Caught => {
                    let agent = self.brains[index].id;
                    debug!(?agent, "target caught");
                    out.push(Command::ReportTargetCaught { agent });
                    break;
                }
            }
        }

        self.report_modes(out);
    }

    fn begin_session(&mut self) {
        self.brains.clear();
        self.reposition_elapsed = Duration::ZERO;
        self.watchdog_elapsed = Duration::ZERO;
        self.spawner.arm(self.config.agent_count);
    }

    fn inner_radius(&self, lights: &LightSnapshot) -> f32 {
        lights.radius() + self.config.additional_light_avoidance
    }

    fn outer_radius(&self, lights: &LightSnapshot) -> f32 {
        lights.radius() + self.config.max_additional_distance
    }

    fn reposition(&mut self, lights: &LightSnapshot, player: Vec2, out: &mut Vec<Command>) {
        let inner = self.inner_radius(lights);
        let outer = self.outer_radius(lights);
        let cells = self
            .grid
            .recompute(player, lights.sources(), inner, outer)
            .to_vec();
        out.push(Command::PublishSuitability {
            cells: cells.clone(),
        });

        let mode = self.config.intersection_mode;
        for brain in &mut self.brains {
            if !matches!(brain.behaviour, Behaviour::Idling { .. }) {
                continue;
            }
            let reachable: Vec<Vec2> = cells
                .iter()
                .copied()
                .filter(|cell| {
                    !segment_intersects_any_light(brain.position, *cell, lights.sources(), inner, mode)
                })
                .collect();
            if let Some(relocating) = reachable
                .choose(&mut self.rng)
                .and_then(|anchor| brain.behaviour.relocate(*anchor))
            {
                brain.behaviour = relocating;
            }
        }
    }

    fn respawn(
        &mut self,
        index: usize,
        lights: &LightSnapshot,
        player: Vec2,
        out: &mut Vec<Command>,
    ) {
        let inner = self.inner_radius(lights);
        let outer = self.outer_radius(lights);
        let cells = self.grid.recompute(player, lights.sources(), inner, outer);
        let selection = select_respawn_cell(cells, &mut self.rng);
        let wait = random_duration(
            &mut self.rng,
            self.config.min_idle_wait,
            self.config.max_idle_wait,
        );
        let Some(brain) = self.brains.get_mut(index) else {
            return;
        };

        match selection {
            Ok(position) => {
                brain.position = position;
                brain.behaviour = Behaviour::idle(position, wait);
                out.push(Command::RespawnAgent {
                    agent: brain.id,
                    position,
                });
            }
            Err(error) => {
                warn!(agent = ?brain.id, %error, "agent respawn failed");
                brain.behaviour = Behaviour::Cooldown {
                    remaining: self.config.respawn_retry,
                };
                out.push(Command::ReportAgentFault {
                    agent: brain.id,
                    fault: error.into(),
                });
            }
        }
    }

    fn report_modes(&mut self, out: &mut Vec<Command>) {
        for brain in &mut self.brains {
            let mode = brain.behaviour.mode();
            if mode != brain.reported {
                brain.reported = mode;
                out.push(Command::SetAgentMode {
                    agent: brain.id,
                    mode,
                });
            }
        }
    }
}

pub(crate) fn random_duration<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_suitable_cell_is_always_chosen() {
        let only = Vec2::new(2.5, -1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..16 {
            assert_eq!(select_respawn_cell(&[only], &mut rng), Ok(only));
        }
    }

    #[test]
    fn empty_grid_reports_fault() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let error = select_respawn_cell(&[], &mut rng).expect_err("no cells");

        assert_eq!(error, AvoidanceError::NoSuitableRespawnCell);
        assert_eq!(AgentFault::from(error), AgentFault::NoSuitableRespawnCell);
    }

    #[test]
    fn repeated_repositioning_still_forces_respawn() {
        let config = Config {
            agent_count: 0,
            reposition_interval: Duration::from_millis(500),
            max_idle_cycles: 2,
            min_idle_wait: Duration::from_secs(10),
            max_idle_wait: Duration::from_secs(10),
            walk_speed: 20.0,
            rng_seed: 3,
            ..Config::default()
        };
        let mut avoidance = Avoidance::new(config);
        let agent = AgentId::new(0);
        avoidance.brains.push(Brain::new(
            agent,
            Vec2::new(-1.6, 0.0),
            Duration::from_secs(10),
        ));
        let lights = LightSnapshot::new(vec![Vec2::new(3.0, 0.0)], 1.2, 1);
        let view = AgentView::default();
        let tick = [Event::TimeAdvanced {
            dt: Duration::from_millis(100),
        }];

        let mut published = 0;
        let mut respawned = false;
        for _ in 0..40 {
            let mut out = Vec::new();
            avoidance.handle(
                &tick,
                SessionState::Playing,
                &lights,
                Vec2::ZERO,
                &view,
                &mut out,
            );
            published += out
                .iter()
                .filter(|command| matches!(command, Command::PublishSuitability { .. }))
                .count();
            if out.iter().any(|command| {
                matches!(command, Command::RespawnAgent { agent: respawned, .. } if *respawned == agent)
            }) {
                respawned = true;
                break;
            }
        }

        assert!(respawned, "relocations must count toward the idle cap");
        assert!(published >= 2);
    }

    #[test]
    fn random_duration_handles_collapsed_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let fixed = Duration::from_millis(300);

        assert_eq!(random_duration(&mut rng, fixed, fixed), fixed);
        let sampled = random_duration(&mut rng, Duration::from_millis(100), fixed);
        assert!(sampled >= Duration::from_millis(100) && sampled <= fixed);
    }
}
