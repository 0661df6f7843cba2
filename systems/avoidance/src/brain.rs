//! Per-agent behaviour state advanced once per tick.

use std::time::Duration;

use firefly_maze_core::{AgentId, AgentMode, LightSnapshot};
use firefly_maze_system_visibility::is_point_lit;
use glam::Vec2;
use rand::Rng;
use rand_distr::{Distribution, UnitDisc};

use crate::{random_duration, Config};

/// Tagged behaviour state of a single agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Behaviour {
    Idling {
        anchor: Vec2,
        wait: Duration,
        destination: Option<Vec2>,
        cycles: u32,
    },
    Relocating {
        anchor: Vec2,
        cycles: u32,
    },
    Alerted {
        elapsed: Duration,
        dark_for: Duration,
    },
    Pursuing,
    Cooldown {
        remaining: Duration,
    },
}

impl Behaviour {
    pub(crate) fn idle(anchor: Vec2, wait: Duration) -> Self {
        Self::Idling {
            anchor,
            wait,
            destination: None,
            cycles: 0,
        }
    }

    /// Sends an idling agent to `anchor`; the relocation counts as an idle cycle.
    pub(crate) fn relocate(self, anchor: Vec2) -> Option<Self> {
        match self {
            Self::Idling { cycles, .. } => Some(Self::Relocating {
                anchor,
                cycles: cycles.saturating_add(1),
            }),
            _ => None,
        }
    }

    pub(crate) const fn mode(&self) -> AgentMode {
        match self {
            Self::Idling { .. } => AgentMode::Idling,
            Self::Relocating { .. } => AgentMode::Relocating,
            Self::Alerted { .. } => AgentMode::Alerted,
            Self::Pursuing => AgentMode::Pursuing,
            Self::Cooldown { .. } => AgentMode::Cooldown,
        }
    }
}

/// Outcome of advancing one agent by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    Respawn,
    Caught,
}

/// Per-tick inputs shared by every agent.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Surroundings<'a> {
    pub(crate) lights: &'a LightSnapshot,
    pub(crate) avoidance_radius: f32,
    pub(crate) target: Vec2,
    pub(crate) dt: Duration,
}

#[derive(Clone, Debug)]
pub(crate) struct Brain {
    pub(crate) id: AgentId,
    pub(crate) position: Vec2,
    pub(crate) behaviour: Behaviour,
    pub(crate) reported: AgentMode,
}

impl Brain {
    pub(crate) fn new(id: AgentId, position: Vec2, wait: Duration) -> Self {
        Self {
            id,
            position,
            behaviour: Behaviour::idle(position, wait),
            reported: AgentMode::Idling,
        }
    }

    pub(crate) fn step<R: Rng + ?Sized>(
        &mut self,
        env: &Surroundings<'_>,
        config: &Config,
        rng: &mut R,
    ) -> Step {
        let sources = env.lights.sources();
        let radius = env.lights.radius();
        let lit_here = is_point_lit(self.position, sources, radius);
        let travel = env.dt.as_secs_f32();

        let (next, step) = match self.behaviour {
            Behaviour::Idling { .. } | Behaviour::Relocating { .. } if lit_here => (
                Behaviour::Alerted {
                    elapsed: Duration::ZERO,
                    dark_for: Duration::ZERO,
                },
                Step::Continue,
            ),
            Behaviour::Idling {
                anchor,
                wait: _,
                destination: Some(destination),
                cycles,
            } => {
                let (position, arrived) =
                    move_toward(self.position, destination, config.walk_speed * travel);
                self.position = position;
                if arrived {
                    let wait = random_duration(rng, config.min_idle_wait, config.max_idle_wait);
                    (
                        Behaviour::Idling {
                            anchor,
                            wait,
                            destination: None,
                            cycles,
                        },
                        Step::Continue,
                    )
                } else {
                    (self.behaviour, Step::Continue)
                }
            }
            Behaviour::Idling {
                anchor,
                wait,
                destination: None,
                cycles,
            } => {
                let wait = wait.saturating_sub(env.dt);
                if cycles >= config.max_idle_cycles {
                    (self.behaviour, Step::Respawn)
                } else if !wait.is_zero() {
                    (
                        Behaviour::Idling {
                            anchor,
                            wait,
                            destination: None,
                            cycles,
                        },
                        Step::Continue,
                    )
                } else {
                    let [x, y]: [f32; 2] = UnitDisc.sample(rng);
                    let point = anchor + Vec2::new(x, y) * config.wander_radius;
                    if is_point_lit(point, sources, radius) {
                        (self.behaviour, Step::Respawn)
                    } else {
                        (
                            Behaviour::Idling {
                                anchor,
                                wait,
                                destination: Some(point),
                                cycles: cycles + 1,
                            },
                            Step::Continue,
                        )
                    }
                }
            }
            Behaviour::Relocating { anchor, cycles } => {
                let (position, arrived) =
                    move_toward(self.position, anchor, config.walk_speed * travel);
                if position != self.position && is_point_lit(position, sources, env.avoidance_radius)
                {
                    let back = (self.position - position).normalize_or_zero();
                    let behind = self.position + back * config.flinch_distance;
                    let wait = random_duration(rng, config.min_idle_wait, config.max_idle_wait);
                    (idle_after(behind, wait, cycles), Step::Continue)
                } else {
                    self.position = position;
                    if arrived {
                        let wait = random_duration(rng, config.min_idle_wait, config.max_idle_wait);
                        (idle_after(anchor, wait, cycles), Step::Continue)
                    } else {
                        (self.behaviour, Step::Continue)
                    }
                }
            }
            Behaviour::Alerted { elapsed, dark_for } => {
                let elapsed = elapsed.saturating_add(env.dt);
                let dark_for = if lit_here {
                    Duration::ZERO
                } else {
                    dark_for.saturating_add(env.dt)
                };
                if !lit_here && dark_for >= config.dark_window {
                    let wait = random_duration(rng, config.min_idle_wait, config.max_idle_wait);
                    (Behaviour::idle(self.position, wait), Step::Continue)
                } else if elapsed >= config.alert_grace {
                    (Behaviour::Pursuing, Step::Continue)
                } else {
                    (Behaviour::Alerted { elapsed, dark_for }, Step::Continue)
                }
            }
            Behaviour::Pursuing => {
                let (position, _) =
                    move_toward(self.position, env.target, config.pursuit_speed * travel);
                self.position = position;
                if position.distance(env.target) <= config.stopping_distance {
                    (Behaviour::Pursuing, Step::Caught)
                } else {
                    (Behaviour::Pursuing, Step::Continue)
                }
            }
            Behaviour::Cooldown { remaining } => {
                let remaining = remaining.saturating_sub(env.dt);
                if remaining.is_zero() {
                    (Behaviour::Cooldown { remaining }, Step::Respawn)
                } else {
                    (Behaviour::Cooldown { remaining }, Step::Continue)
                }
            }
        };

        self.behaviour = next;
        step
    }
}

fn idle_after(anchor: Vec2, wait: Duration, cycles: u32) -> Behaviour {
    Behaviour::Idling {
        anchor,
        wait,
        destination: None,
        cycles,
    }
}

/// Moves at most `max_step` toward `target`, reporting whether it was reached.
fn move_toward(position: Vec2, target: Vec2, max_step: f32) -> (Vec2, bool) {
    let delta = target - position;
    let distance = delta.length();
    if distance <= max_step {
        return (target, true);
    }
    (position + delta / distance * max_step, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn surroundings(lights: &LightSnapshot, dt_ms: u64) -> Surroundings<'_> {
        Surroundings {
            lights,
            avoidance_radius: lights.radius() + 2.0,
            target: Vec2::ZERO,
            dt: Duration::from_millis(dt_ms),
        }
    }

    #[test]
    fn light_on_agent_raises_alert() {
        let lights = LightSnapshot::new(vec![Vec2::new(5.0, 5.0)], 1.2, 1);
        let mut brain = Brain::new(AgentId::new(0), Vec2::new(5.5, 5.0), Duration::from_secs(1));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let step = brain.step(&surroundings(&lights, 16), &Config::default(), &mut rng);

        assert_eq!(step, Step::Continue);
        assert_eq!(brain.behaviour.mode(), AgentMode::Alerted);
    }

    #[test]
    fn continuous_darkness_cancels_alert() {
        let dark = LightSnapshot::default();
        let config = Config::default();
        let mut brain = Brain::new(AgentId::new(0), Vec2::new(8.0, 0.0), Duration::from_secs(1));
        brain.behaviour = Behaviour::Alerted {
            elapsed: Duration::ZERO,
            dark_for: Duration::ZERO,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let _ = brain.step(&surroundings(&dark, 100), &config, &mut rng);
        assert_eq!(brain.behaviour.mode(), AgentMode::Alerted);

        for _ in 0..5 {
            let _ = brain.step(&surroundings(&dark, 100), &config, &mut rng);
        }
        assert_eq!(brain.behaviour.mode(), AgentMode::Idling);
    }

    #[test]
    fn lit_grace_commits_to_pursuit_and_catches() {
        let config = Config::default();
        let lights = LightSnapshot::new(vec![Vec2::new(1.0, 0.0)], 1.2, 1);
        let mut brain = Brain::new(AgentId::new(0), Vec2::new(1.0, 0.0), Duration::from_secs(1));
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut steps = Vec::new();
        for _ in 0..200 {
            let step = brain.step(&surroundings(&lights, 50), &config, &mut rng);
            steps.push(step);
            if step == Step::Caught {
                break;
            }
        }

        assert_eq!(steps.last(), Some(&Step::Caught));
        assert_eq!(brain.behaviour.mode(), AgentMode::Pursuing);
        assert!(brain.position.distance(Vec2::ZERO) <= config.stopping_distance);
    }

    #[test]
    fn relocation_flinches_before_entering_light() {
        let config = Config::default();
        let lights = LightSnapshot::new(vec![Vec2::new(10.0, 0.0)], 1.2, 1);
        let start = Vec2::new(6.7, 0.0);
        let mut brain = Brain::new(AgentId::new(0), start, Duration::from_secs(1));
        brain.behaviour = Behaviour::Relocating {
            anchor: Vec2::new(12.0, 0.0),
            cycles: 2,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let _ = brain.step(&surroundings(&lights, 100), &config, &mut rng);

        assert_eq!(brain.position, start);
        match brain.behaviour {
            Behaviour::Idling { anchor, cycles, .. } => {
                assert!(anchor.x < start.x);
                assert_eq!(cycles, 2);
            }
            other => panic!("expected flinch back to idling, got {other:?}"),
        }
    }

    #[test]
    fn exhausted_idle_cycles_request_respawn() {
        let config = Config::default();
        let dark = LightSnapshot::default();
        let mut brain = Brain::new(AgentId::new(0), Vec2::ZERO, Duration::from_millis(10));
        brain.behaviour = Behaviour::Idling {
            anchor: Vec2::ZERO,
            wait: Duration::from_millis(10),
            destination: None,
            cycles: config.max_idle_cycles,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let step = brain.step(&surroundings(&dark, 20), &config, &mut rng);

        assert_eq!(step, Step::Respawn);
    }

    #[test]
    fn lit_wander_target_requests_respawn() {
        let config = Config {
            wander_radius: 0.1,
            ..Config::default()
        };
        let lights = LightSnapshot::new(vec![Vec2::ZERO], 1.2, 1);
        let mut brain = Brain::new(AgentId::new(0), Vec2::new(6.0, 0.0), Duration::from_millis(10));
        brain.behaviour = Behaviour::Idling {
            anchor: Vec2::ZERO,
            wait: Duration::from_millis(10),
            destination: None,
            cycles: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let step = brain.step(&surroundings(&lights, 20), &config, &mut rng);

        assert_eq!(step, Step::Respawn);
        assert_eq!(brain.position, Vec2::new(6.0, 0.0));
    }

    #[test]
    fn relocation_carries_idle_cycles() {
        let config = Config {
            max_idle_cycles: 2,
            min_idle_wait: Duration::from_secs(5),
            max_idle_wait: Duration::from_secs(5),
            ..Config::default()
        };
        let dark = LightSnapshot::default();
        let mut brain = Brain::new(AgentId::new(0), Vec2::ZERO, Duration::from_secs(5));
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for hop in 1..=2u32 {
            brain.behaviour = brain
                .behaviour
                .relocate(Vec2::new(hop as f32 * 0.1, 0.0))
                .expect("idling agent relocates");
            let step = brain.step(&surroundings(&dark, 100), &config, &mut rng);
            assert_eq!(step, Step::Continue);
            assert_eq!(brain.behaviour.mode(), AgentMode::Idling);
        }

        let step = brain.step(&surroundings(&dark, 100), &config, &mut rng);
        assert_eq!(step, Step::Respawn, "cap reached before the idle wait ran out");
    }

    #[test]
    fn move_toward_clamps_to_target() {
        assert_eq!(
            move_toward(Vec2::ZERO, Vec2::new(1.0, 0.0), 5.0),
            (Vec2::new(1.0, 0.0), true)
        );
        assert_eq!(
            move_toward(Vec2::ZERO, Vec2::new(4.0, 0.0), 1.0),
            (Vec2::new(1.0, 0.0), false)
        );
    }
}
