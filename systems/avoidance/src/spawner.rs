//! Staggered arrival of agents around the player.

use std::time::Duration;

use firefly_maze_core::Command;
use glam::Vec2;
use rand::Rng;
use rand_distr::{Distribution, UnitCircle};

use crate::{random_duration, Config};

#[derive(Clone, Debug, Default)]
pub(crate) struct Spawner {
    pending: usize,
    countdown: Duration,
}

impl Spawner {
    pub(crate) fn arm(&mut self, count: usize) {
        self.pending = count;
        self.countdown = Duration::ZERO;
    }

    pub(crate) fn disarm(&mut self) {
        self.pending = 0;
    }

    pub(crate) const fn pending(&self) -> usize {
        self.pending
    }

    pub(crate) fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: Duration,
        player: Vec2,
        config: &Config,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        if self.pending == 0 {
            return;
        }
        self.countdown = self.countdown.saturating_sub(dt);
        while self.pending > 0 && self.countdown.is_zero() {
            let [x, y]: [f32; 2] = UnitCircle.sample(rng);
            let distance = random_range(rng, config.min_spawn_range, config.max_spawn_range);
            out.push(Command::SpawnAgent {
                position: player + Vec2::new(x, y) * distance,
            });
            self.pending -= 1;
            self.countdown =
                random_duration(rng, config.min_spawn_stagger, config.max_spawn_stagger);
        }
    }
}

fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}
