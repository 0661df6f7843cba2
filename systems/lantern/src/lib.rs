#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Light-placement system driving the player's pool of fireflies.
//!
//! Fireflies rest in the lamp, fly out to a requested point, and glow there
//! until recalled. Only resting-in-place fireflies count as active lights;
//! fireflies in flight are reported separately and never make ground walkable.

use std::time::Duration;

use firefly_maze_core::{Command, Event, SessionState};
use glam::Vec2;
use tracing::{debug, trace};

/// Configuration parameters required to construct the lantern system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    firefly_count: usize,
    speed_to: f32,
    speed_from: f32,
    stopping_distance: f32,
    touch_distance: f32,
}

impl Config {
    /// Creates a configuration for a pool of `firefly_count` fireflies.
    ///
    /// `speed_from` applies when flying away from the lamp and `speed_to`
    /// when returning to it.
    #[must_use]
    pub const fn new(
        firefly_count: usize,
        speed_to: f32,
        speed_from: f32,
        stopping_distance: f32,
        touch_distance: f32,
    ) -> Self {
        Self {
            firefly_count,
            speed_to,
            speed_from,
            stopping_distance,
            touch_distance,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(4, 2.0, 2.0, 0.5, 1.0)
    }
}

/// Player requests gathered by the presentation layer for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LanternInput {
    /// Point where a firefly should be placed.
    pub place: Option<Vec2>,
    /// Point near which a deployed firefly should be recalled.
    pub recall: Option<Vec2>,
}

/// Read-only surroundings the lantern reasons about.
#[derive(Clone, Copy, Debug)]
pub struct LanternView<'a> {
    /// Player position.
    pub player: Vec2,
    /// Lamp position fireflies depart from and return to.
    pub lamp: Vec2,
    /// Environmental lights that stay lit regardless of the pool.
    pub statics: &'a [Vec2],
    /// Radius inside which a light makes ground walkable.
    pub walkable_range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Flight {
    Resting,
    Outbound { target: Vec2 },
    Returning { resend: Option<Vec2> },
    Glowing,
}

#[derive(Clone, Copy, Debug)]
struct Firefly {
    position: Vec2,
    flight: Flight,
}

/// Pure system that owns the firefly pool and emits light commands.
#[derive(Debug)]
pub struct Lantern {
    config: Config,
    flies: Vec<Firefly>,
    glowing: Vec<usize>,
    reported_transit: Vec<Vec2>,
}

impl Lantern {
    /// Creates a new lantern with every firefly resting in the lamp.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            flies: vec![
                Firefly {
                    position: Vec2::ZERO,
                    flight: Flight::Resting,
                };
                config.firefly_count
            ],
            glowing: Vec::new(),
            reported_transit: Vec::new(),
            config,
        }
    }

    /// Number of fireflies resting in the lamp.
    #[must_use]
    pub fn lamp_count(&self) -> usize {
        self.flies
            .iter()
            .filter(|fly| fly.flight == Flight::Resting)
            .count()
    }

    /// Positions of the deployed fireflies in deployment order.
    #[must_use]
    pub fn active_positions(&self) -> Vec<Vec2> {
        self.glowing
            .iter()
            .filter_map(|index| self.flies.get(*index).map(|fly| fly.position))
            .collect()
    }

    /// Consumes events, the tick's input, and surroundings to emit light commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        session: SessionState,
        view: &LanternView<'_>,
        input: LanternInput,
        out: &mut Vec<Command>,
    ) {
        let mut dt = Duration::ZERO;
        let mut restarted = false;
        for event in events {
            match event {
                Event::SessionChanged {
                    state: SessionState::Playing,
                } => restarted = true,
                Event::TimeAdvanced { dt: step } => dt = dt.saturating_add(*step),
                _ => {}
            }
        }

        if !session.is_playing() {
            return;
        }
        if restarted {
            self.reset(view.lamp, out);
        }

        let mut active_changed = false;
        if let Some(target) = input.place {
            active_changed |= self.place(target, view);
        }
        if let Some(point) = input.recall {
            active_changed |= self.recall(point, view);
        }
        active_changed |= self.fly(dt, view.lamp);

        if active_changed {
            out.push(Command::SetActiveLights {
                positions: self.active_positions(),
            });
        }

        let transit: Vec<Vec2> = self
            .flies
            .iter()
            .filter(|fly| {
                matches!(
                    fly.flight,
                    Flight::Outbound { .. } | Flight::Returning { .. }
                )
            })
            .map(|fly| fly.position)
            .collect();
        if transit != self.reported_transit {
            self.reported_transit = transit.clone();
            out.push(Command::SetTransitLights { positions: transit });
        }
    }

    fn reset(&mut self, lamp: Vec2, out: &mut Vec<Command>) {
        for fly in &mut self.flies {
            fly.position = lamp;
            fly.flight = Flight::Resting;
        }
        self.glowing.clear();
        self.reported_transit.clear();
        out.push(Command::SetActiveLights {
            positions: Vec::new(),
        });
        out.push(Command::SetTransitLights {
            positions: Vec::new(),
        });
    }

    fn place(&mut self, target: Vec2, view: &LanternView<'_>) -> bool {
        let resting = self
            .flies
            .iter()
            .position(|fly| fly.flight == Flight::Resting);
        if let Some(index) = resting {
            self.flies[index] = Firefly {
                position: view.lamp,
                flight: Flight::Outbound { target },
            };
            trace!(index, %target, "firefly sent out");
            return false;
        }

        if self.glowing.is_empty() {
            return false;
        }
        let Some(slot) = self.safe_to_replace(view) else {
            debug!(%target, "no firefly can be replaced without darkening the player");
            return false;
        };
        let index = self.glowing.remove(slot);
        self.flies[index].flight = Flight::Returning {
            resend: Some(target),
        };
        debug!(index, %target, "firefly recalled for replacement");
        true
    }

    fn recall(&mut self, point: Vec2, view: &LanternView<'_>) -> bool {
        let Some(slot) = self.safe_in_range(point, view) else {
            return false;
        };
        let index = self.glowing.remove(slot);
        self.flies[index].flight = Flight::Returning { resend: None };
        trace!(index, "firefly recalled");
        true
    }

    /// Slot in `glowing` of the first fly that can be pulled out without
    /// leaving the player in darkness.
    fn safe_to_replace(&self, view: &LanternView<'_>) -> Option<usize> {
        self.glowing.iter().position(|index| {
            let fly = self.flies[*index];
            fly.position.distance(view.player) > view.walkable_range
                || self.player_lit_without(*index, view)
        })
    }

    fn safe_in_range(&self, point: Vec2, view: &LanternView<'_>) -> Option<usize> {
        self.glowing.iter().position(|index| {
            self.flies[*index].position.distance(point) < self.config.touch_distance
                && self.player_lit_without(*index, view)
        })
    }

    fn player_lit_without(&self, excluded: usize, view: &LanternView<'_>) -> bool {
        self.glowing
            .iter()
            .filter(|index| **index != excluded)
            .map(|index| self.flies[*index].position)
            .chain(view.statics.iter().copied())
            .any(|light| light.distance(view.player) < view.walkable_range)
    }

    fn fly(&mut self, dt: Duration, lamp: Vec2) -> bool {
        let travel = dt.as_secs_f32();
        let outbound_step = self.config.speed_from * travel;
        let return_step = self.config.speed_to * travel;
        let stop = self.config.stopping_distance;
        let mut active_changed = false;
        for index in 0..self.flies.len() {
            let fly = &mut self.flies[index];
            match fly.flight {
                Flight::Outbound { target } => {
                    if advance(&mut fly.position, target, outbound_step, stop) {
                        fly.flight = Flight::Glowing;
                        self.glowing.push(index);
                        active_changed = true;
                    }
                }
                Flight::Returning { resend } => {
                    if advance(&mut fly.position, lamp, return_step, stop) {
                        fly.flight = match resend {
                            Some(target) => Flight::Outbound { target },
                            None => Flight::Resting,
                        };
                    }
                }
                Flight::Resting => fly.position = lamp,
                Flight::Glowing => {}
            }
        }
        active_changed
    }
}

/// Moves `position` toward `target`; reports arrival within `stopping_distance`.
fn advance(position: &mut Vec2, target: Vec2, max_step: f32, stopping_distance: f32) -> bool {
    if position.distance(target) <= stopping_distance {
        return true;
    }
    let delta = target - *position;
    let distance = delta.length();
    *position += delta / distance * max_step.min(distance);
    position.distance(target) <= stopping_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAMP: Vec2 = Vec2::ZERO;

    fn view(statics: &[Vec2]) -> LanternView<'_> {
        LanternView {
            player: Vec2::ZERO,
            lamp: LAMP,
            statics,
            walkable_range: 1.2,
        }
    }

    fn glowing_at(positions: &[Vec2]) -> Lantern {
        let mut lantern = Lantern::new(Config::new(positions.len(), 2.0, 2.0, 0.5, 1.0));
        for (index, position) in positions.iter().enumerate() {
            lantern.flies[index] = Firefly {
                position: *position,
                flight: Flight::Glowing,
            };
            lantern.glowing.push(index);
        }
        lantern
    }

    #[test]
    fn advance_stops_within_stopping_distance() {
        let mut position = Vec2::ZERO;
        assert!(!advance(&mut position, Vec2::new(3.0, 0.0), 1.0, 0.5));
        assert_eq!(position, Vec2::new(1.0, 0.0));
        assert!(advance(&mut position, Vec2::new(3.0, 0.0), 1.6, 0.5));
    }

    #[test]
    fn settles_without_new_time_while_fly_is_in_flight() {
        let mut lantern = Lantern::new(Config::default());
        let view = view(&[]);
        let step = [Event::TimeAdvanced {
            dt: Duration::from_millis(100),
        }];
        let place = LanternInput {
            place: Some(Vec2::new(4.0, 0.0)),
            recall: None,
        };

        let mut out = Vec::new();
        lantern.handle(&step, SessionState::Playing, &view, place, &mut out);
        assert_eq!(
            out,
            vec![Command::SetTransitLights {
                positions: vec![Vec2::new(0.2, 0.0)],
            }]
        );

        for _ in 0..3 {
            let mut follow_up = Vec::new();
            lantern.handle(
                &[],
                SessionState::Playing,
                &view,
                LanternInput::default(),
                &mut follow_up,
            );
            assert!(follow_up.is_empty(), "unexpected commands {follow_up:?}");
        }

        let mut moved = Vec::new();
        lantern.handle(&step, SessionState::Playing, &view, LanternInput::default(), &mut moved);
        assert_eq!(
            moved,
            vec![Command::SetTransitLights {
                positions: vec![Vec2::new(0.4, 0.0)],
            }]
        );
    }

    #[test]
    fn replacement_prefers_fly_away_from_player() {
        let lantern = glowing_at(&[Vec2::new(0.5, 0.0), Vec2::new(6.0, 0.0)]);

        assert_eq!(lantern.safe_to_replace(&view(&[])), Some(1));
    }

    #[test]
    fn only_light_keeping_player_lit_is_not_replaced() {
        let lantern = glowing_at(&[Vec2::new(0.5, 0.0), Vec2::new(0.0, 0.8)]);
        assert_eq!(lantern.safe_to_replace(&view(&[])), Some(0));

        let lonely = glowing_at(&[Vec2::new(0.5, 0.0)]);
        assert_eq!(lonely.safe_to_replace(&view(&[])), None);
        assert_eq!(lonely.safe_to_replace(&view(&[Vec2::new(-0.3, 0.0)])), Some(0));
    }

    #[test]
    fn recall_requires_touch_and_safety() {
        let lantern = glowing_at(&[Vec2::new(3.0, 0.0), Vec2::new(5.0, 5.0)]);

        assert_eq!(lantern.safe_in_range(Vec2::new(5.2, 5.0), &view(&[])), None);
        assert_eq!(
            lantern.safe_in_range(Vec2::new(5.2, 5.0), &view(&[Vec2::new(0.0, 1.0)])),
            Some(1)
        );
        assert_eq!(lantern.safe_in_range(Vec2::new(9.0, 9.0), &view(&[Vec2::ZERO])), None);
    }
}
