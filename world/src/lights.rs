//! Registry of the light sources that define where the ground is walkable.

use std::cmp::Ordering;

use firefly_maze_core::LightSnapshot;
use glam::Vec2;

/// Tracks deployed, travelling, and environmental lights.
///
/// Only the union of deployed and environmental lights is visible through
/// [`LightSourceRegistry::snapshot`]. Every membership change of that union
/// bumps a version counter; consumers compare the version they last observed
/// instead of subscribing to notifications.
#[derive(Clone, Debug)]
pub struct LightSourceRegistry {
    active: Vec<Vec2>,
    in_transit: Vec<Vec2>,
    statics: Vec<Vec2>,
    radius: f32,
    version: u64,
}

impl LightSourceRegistry {
    /// Creates an empty registry whose lights make ground walkable within `radius`.
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self {
            active: Vec::new(),
            in_transit: Vec::new(),
            statics: Vec::new(),
            radius,
            version: 0,
        }
    }

    /// Adds an environmental light. Returns `true` when the visible set changed.
    pub fn add_static(&mut self, position: Vec2) -> bool {
        if self.statics.contains(&position) {
            return false;
        }
        self.statics.push(position);
        self.bump();
        true
    }

    /// Removes an environmental light. Returns `true` when the visible set changed.
    pub fn remove_static(&mut self, position: Vec2) -> bool {
        let Some(index) = self.statics.iter().position(|light| *light == position) else {
            return false;
        };
        let _ = self.statics.remove(index);
        self.bump();
        true
    }

    /// Replaces the deployed lights wholesale.
    ///
    /// Returns `true` when the membership differs from the previous set; the
    /// order in which lights are listed is irrelevant.
    pub fn set_active(&mut self, positions: Vec<Vec2>) -> bool {
        let changed = !same_members(&self.active, &positions);
        self.active = positions;
        if changed {
            self.bump();
        }
        changed
    }

    /// Replaces the travelling lights. Travelling lights are never visible to
    /// queries, so this never bumps the version.
    pub fn set_in_transit(&mut self, positions: Vec<Vec2>) {
        self.in_transit = positions;
    }

    /// Deployed lights.
    #[must_use]
    pub fn active(&self) -> &[Vec2] {
        &self.active
    }

    /// Lights currently travelling between the lamp and their destination.
    #[must_use]
    pub fn in_transit(&self) -> &[Vec2] {
        &self.in_transit
    }

    /// Environmental lights.
    #[must_use]
    pub fn statics(&self) -> &[Vec2] {
        &self.statics
    }

    /// Radius inside which a light makes ground walkable.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Version counter, bumped on every visible membership change.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Captures the visible light set.
    #[must_use]
    pub fn snapshot(&self) -> LightSnapshot {
        let mut sources = Vec::with_capacity(self.active.len() + self.statics.len());
        sources.extend_from_slice(&self.active);
        sources.extend_from_slice(&self.statics);
        LightSnapshot::new(sources, self.radius, self.version)
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

fn same_members(current: &[Vec2], next: &[Vec2]) -> bool {
    if current.len() != next.len() {
        return false;
    }
    let mut left = current.to_vec();
    let mut right = next.to_vec();
    left.sort_by(compare_points);
    right.sort_by(compare_points);
    left == right
}

fn compare_points(a: &Vec2, b: &Vec2) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}
