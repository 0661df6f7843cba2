//! TOML configuration consumed by the headless driver.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use firefly_maze_core::{GridCoord, GridSize, TileGrid};
use firefly_maze_system_avoidance as avoidance;
use firefly_maze_system_lantern as lantern;
use firefly_maze_system_topology::{self as topology, Blueprint, SegmentPolicy};
use firefly_maze_system_visibility::IntersectionMode;
use firefly_maze_world as world;
use glam::Vec2;
use serde::Deserialize;

/// Seed offset keeping the avoidance stream independent of the topology stream.
const AVOIDANCE_STREAM: u64 = 0x5eed_0001;

/// Every tunable of a simulation run; an empty document yields the defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) grid: GridSection,
    pub(crate) topology: TopologySection,
    pub(crate) lights: LightsSection,
    pub(crate) lantern: LanternSection,
    pub(crate) avoidance: AvoidanceSection,
    pub(crate) simulation: SimulationSection,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GridSection {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) tile_length: f32,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            width: 12,
            height: 12,
            tile_length: 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TopologySection {
    pub(crate) start: Option<[u32; 2]>,
    pub(crate) exit: Option<[u32; 2]>,
    pub(crate) waypoint_count: usize,
    pub(crate) min_separation: f32,
    pub(crate) max_placement_attempts: u32,
    pub(crate) max_generation_attempts: u32,
    pub(crate) skip_unreachable_segments: bool,
    pub(crate) regeneration_interval_secs: f32,
}

impl Default for TopologySection {
    fn default() -> Self {
        Self {
            start: None,
            exit: None,
            waypoint_count: 3,
            min_separation: 2.0,
            max_placement_attempts: 10_000,
            max_generation_attempts: 16,
            skip_unreachable_segments: false,
            regeneration_interval_secs: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LightsSection {
    pub(crate) walkable_range: f32,
    pub(crate) statics: Vec<[f32; 2]>,
}

impl Default for LightsSection {
    fn default() -> Self {
        Self {
            walkable_range: 1.2,
            statics: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LanternSection {
    pub(crate) fireflies: usize,
    pub(crate) speed_to: f32,
    pub(crate) speed_from: f32,
    pub(crate) stopping_distance: f32,
    pub(crate) touch_distance: f32,
}

impl Default for LanternSection {
    fn default() -> Self {
        Self {
            fireflies: 4,
            speed_to: 2.0,
            speed_from: 2.0,
            stopping_distance: 0.5,
            touch_distance: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Intersection {
    Line,
    #[default]
    Segment,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AvoidanceSection {
    pub(crate) agent_count: usize,
    pub(crate) min_spawn_range: f32,
    pub(crate) max_spawn_range: f32,
    pub(crate) additional_light_avoidance: f32,
    pub(crate) max_additional_distance: f32,
    pub(crate) window_side: usize,
    pub(crate) cell_size: f32,
    pub(crate) reposition_interval_secs: f32,
    pub(crate) walk_speed: f32,
    pub(crate) pursuit_speed: f32,
    pub(crate) intersection: Intersection,
}

impl Default for AvoidanceSection {
    fn default() -> Self {
        let defaults = avoidance::Config::default();
        Self {
            agent_count: defaults.agent_count,
            min_spawn_range: defaults.min_spawn_range,
            max_spawn_range: defaults.max_spawn_range,
            additional_light_avoidance: defaults.additional_light_avoidance,
            max_additional_distance: defaults.max_additional_distance,
            window_side: defaults.window_side,
            cell_size: defaults.cell_size,
            reposition_interval_secs: defaults.reposition_interval.as_secs_f32(),
            walk_speed: defaults.walk_speed,
            pursuit_speed: defaults.pursuit_speed,
            intersection: Intersection::Segment,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationSection {
    pub(crate) seed: u64,
    pub(crate) ticks: u32,
    pub(crate) tick_ms: u64,
    pub(crate) player_start: [f32; 2],
    pub(crate) player_speed: f32,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: 0,
            ticks: 600,
            tick_ms: 100,
            player_start: [0.0, 0.0],
            player_speed: 1.5,
        }
    }
}

/// Reads settings from `path`, or returns the defaults when no file is given.
pub(crate) fn load(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

pub(crate) fn parse(contents: &str) -> Result<Settings> {
    let settings: Settings =
        toml::from_str(contents).context("failed to parse configuration toml contents")?;
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    fn validate(&self) -> Result<()> {
        if self.grid.width == 0 || self.grid.height == 0 {
            bail!(
                "grid must have at least one cell, got {}x{}",
                self.grid.width,
                self.grid.height
            );
        }
        if !(self.grid.tile_length > 0.0) {
            bail!("tile_length must be positive, got {}", self.grid.tile_length);
        }
        if !(self.lights.walkable_range > 0.0) {
            bail!(
                "walkable_range must be positive, got {}",
                self.lights.walkable_range
            );
        }
        if self.simulation.tick_ms == 0 {
            bail!("tick_ms must be positive");
        }
        let size = self.grid_size();
        for (name, cell) in [("start", self.start()), ("exit", self.exit())] {
            if !size.contains(cell) {
                bail!("{name} {cell} lies outside the {}x{} grid", size.width(), size.height());
            }
        }
        let _ = seconds("regeneration_interval_secs", self.topology.regeneration_interval_secs)?;
        let _ = seconds("reposition_interval_secs", self.avoidance.reposition_interval_secs)?;
        Ok(())
    }

    fn grid_size(&self) -> GridSize {
        GridSize::new(self.grid.width, self.grid.height)
    }

    fn start(&self) -> GridCoord {
        let [x, y] = self.topology.start.unwrap_or([0, 0]);
        GridCoord::new(x, y)
    }

    fn exit(&self) -> GridCoord {
        let [x, y] = self.topology.exit.unwrap_or([
            self.grid.width.saturating_sub(1),
            self.grid.height.saturating_sub(1),
        ]);
        GridCoord::new(x, y)
    }

    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.simulation.tick_ms)
    }

    pub(crate) fn player_start(&self) -> Vec2 {
        Vec2::from(self.simulation.player_start)
    }

    pub(crate) fn static_lights(&self) -> Vec<Vec2> {
        self.lights.statics.iter().copied().map(Vec2::from).collect()
    }

    pub(crate) fn world_config(&self) -> world::Config {
        world::Config::new(
            TileGrid::new(self.grid_size(), self.grid.tile_length),
            self.lights.walkable_range,
            self.player_start(),
        )
    }

    pub(crate) fn topology_config(&self) -> Result<topology::Config> {
        let mut blueprint = Blueprint::new(self.grid_size(), self.start(), self.exit());
        blueprint.waypoint_count = self.topology.waypoint_count;
        blueprint.min_separation = self.topology.min_separation;
        blueprint.max_placement_attempts = self.topology.max_placement_attempts;
        blueprint.max_generation_attempts = self.topology.max_generation_attempts;
        blueprint.segment_policy = if self.topology.skip_unreachable_segments {
            SegmentPolicy::Skip
        } else {
            SegmentPolicy::Strict
        };
        let interval = seconds(
            "regeneration_interval_secs",
            self.topology.regeneration_interval_secs,
        )?;
        Ok(topology::Config::new(
            blueprint,
            interval,
            self.simulation.seed,
        ))
    }

    pub(crate) fn avoidance_config(&self) -> Result<avoidance::Config> {
        let section = &self.avoidance;
        Ok(avoidance::Config {
            agent_count: section.agent_count,
            min_spawn_range: section.min_spawn_range,
            max_spawn_range: section.max_spawn_range,
            additional_light_avoidance: section.additional_light_avoidance,
            max_additional_distance: section.max_additional_distance,
            window_side: section.window_side,
            cell_size: section.cell_size,
            reposition_interval: seconds(
                "reposition_interval_secs",
                section.reposition_interval_secs,
            )?,
            walk_speed: section.walk_speed,
            pursuit_speed: section.pursuit_speed,
            intersection_mode: match section.intersection {
                Intersection::Line => IntersectionMode::Line,
                Intersection::Segment => IntersectionMode::Segment,
            },
            rng_seed: self.simulation.seed ^ AVOIDANCE_STREAM,
            ..avoidance::Config::default()
        })
    }

    pub(crate) fn lantern_config(&self) -> lantern::Config {
        let section = &self.lantern;
        lantern::Config::new(
            section.fireflies,
            section.speed_to,
            section.speed_from,
            section.stopping_distance,
            section.touch_distance,
        )
    }
}

fn seconds(name: &str, value: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(value)
        .with_context(|| format!("{name} must be a finite non-negative number, got {value}"))
}
