#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Maze topology system that carves and republishes the level layout.
//!
//! The system owns the connectivity graph and its routing table. It listens
//! for regeneration requests and for simulated time, runs a complete
//! generation cycle whenever one is due, and answers with either a
//! `PublishLayout` or a `ReportRegenerationFailure` command.

mod engine;
mod graph;
mod pathfinder;

use std::time::Duration;

pub use engine::{place_waypoints, Blueprint, GenerationPhase, MazeTopologyEngine, SegmentPolicy};
pub use graph::{ConnectivityGraph, BLOCKED};
pub use pathfinder::AllPairsPathfinder;

use firefly_maze_core::{Command, Event, GridCoord, SessionState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

const DEFAULT_REGENERATION_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration parameters required to construct the topology system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    blueprint: Blueprint,
    regeneration_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration; a zero interval disables timed regeneration.
    #[must_use]
    pub const fn new(blueprint: Blueprint, regeneration_interval: Duration, rng_seed: u64) -> Self {
        Self {
            blueprint,
            regeneration_interval,
            rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Blueprint::default(), DEFAULT_REGENERATION_INTERVAL, 0)
    }
}

/// Pure system that regenerates the maze on demand and on a fixed cadence.
#[derive(Debug)]
pub struct Topology {
    engine: MazeTopologyEngine,
    rng: ChaCha8Rng,
    regeneration_interval: Duration,
    accumulator: Duration,
}

impl Topology {
    /// Creates a new topology system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            engine: MazeTopologyEngine::new(config.blueprint),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            regeneration_interval: config.regeneration_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Engine holding the graph of the most recent cycle.
    #[must_use]
    pub const fn engine(&self) -> &MazeTopologyEngine {
        &self.engine
    }

    /// Consumes events and the player's current cell to emit layout commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        session: SessionState,
        player_cell: GridCoord,
        out: &mut Vec<Command>,
    ) {
        if !session.is_playing() {
            self.accumulator = Duration::ZERO;
            return;
        }

        let mut requested = None;
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::RegenerationRequested { player_spawn } => requested = Some(*player_spawn),
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                _ => {}
            }
        }

        if requested.is_none() && !self.regeneration_interval.is_zero() {
            self.accumulator = self.accumulator.saturating_add(accumulated);
            if self.accumulator >= self.regeneration_interval {
                debug!(%player_cell, "regeneration interval elapsed");
                requested = Some(player_cell);
            }
        }

        if let Some(player_spawn) = requested {
            self.accumulator = Duration::ZERO;
            self.regenerate(player_spawn, out);
        }
    }

    fn regenerate(&mut self, player_spawn: GridCoord, out: &mut Vec<Command>) {
        match self.engine.generate(player_spawn, &mut self.rng) {
            Ok(layout) => out.push(Command::PublishLayout { layout }),
            Err(error) => {
                warn!(%player_spawn, %error, "maze regeneration failed");
                out.push(Command::ReportRegenerationFailure { error });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firefly_maze_core::GridSize;

    #[test]
    fn idle_session_discards_elapsed_time() {
        let mut topology = Topology::new(Config::default());
        topology.accumulator = Duration::from_secs(9);
        let mut commands = Vec::new();

        topology.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(5),
            }],
            SessionState::Caught,
            GridCoord::new(0, 0),
            &mut commands,
        );

        assert!(commands.is_empty());
        assert_eq!(topology.accumulator, Duration::ZERO);
    }

    #[test]
    fn zero_interval_disables_timed_regeneration() {
        let blueprint = Blueprint::new(GridSize::new(6, 6), GridCoord::new(0, 0), GridCoord::new(5, 5));
        let mut topology = Topology::new(Config::new(blueprint, Duration::ZERO, 4));
        let mut commands = Vec::new();

        topology.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(600),
            }],
            SessionState::Playing,
            GridCoord::new(0, 0),
            &mut commands,
        );

        assert!(commands.is_empty());
    }
}
