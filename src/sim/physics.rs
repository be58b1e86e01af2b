//! Kinematics and the difficulty-scaled spawner
//!
//! Two independent knobs: the speed multiplier scales the fall velocity of
//! newly generated objects, the frequency multiplier shrinks the spawn
//! interval. Keeping the spawn decision (time-gated) apart from object
//! templating (randomized) lets difficulty push either without touching the
//! category mix.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::sim::pool::ObjectPool;
use crate::sim::state::{DifficultyConfig, FallingObject, ObjectKind};

#[derive(Debug, Clone)]
pub struct Physics {
    speed_multiplier: f32,
    spawn_frequency_multiplier: f32,
    /// Time accumulated toward the next spawn (ms)
    spawn_accumulator_ms: f32,
    rng: Pcg32,
}

impl Physics {
    pub fn new(seed: u64) -> Self {
        Self {
            speed_multiplier: 1.0,
            spawn_frequency_multiplier: 1.0,
            spawn_accumulator_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Absolute reset used at difficulty selection
    pub fn apply_difficulty(&mut self, config: &DifficultyConfig) {
        self.set_speed_multiplier(config.base_speed_multiplier);
        self.set_spawn_frequency_multiplier(1.0);
        self.spawn_accumulator_ms = 0.0;
    }

    pub fn set_speed_multiplier(&mut self, value: f32) {
        self.speed_multiplier = value;
    }

    pub fn set_spawn_frequency_multiplier(&mut self, value: f32) {
        self.spawn_frequency_multiplier = value;
    }

    /// Cumulative escalation bump; only the absolute setters reset it
    pub fn boost_speed(&mut self, delta: f32) {
        self.speed_multiplier += delta;
    }

    /// Cumulative escalation bump; only the absolute setters reset it
    pub fn boost_spawn_frequency(&mut self, delta: f32) {
        self.spawn_frequency_multiplier += delta;
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn spawn_frequency_multiplier(&self) -> f32 {
        self.spawn_frequency_multiplier
    }

    /// Advance every active object by `pos += vel * dt`. Non-positive deltas
    /// are a no-op step so a degenerate first frame can never produce NaN
    /// positions.
    pub fn advance(dt_ms: f32, pool: &mut ObjectPool) {
        if dt_ms <= 0.0 {
            return;
        }
        let dt = dt_ms / 1000.0;
        pool.for_each_active_mut(|object| {
            object.pos += object.vel * dt;
        });
    }

    /// Time-accumulator spawn gate. Fires at most once per call; the spawn
    /// interval shrinks as the frequency multiplier grows.
    pub fn should_spawn(&mut self, dt_ms: f32) -> bool {
        if dt_ms > 0.0 {
            self.spawn_accumulator_ms += dt_ms;
        }
        let interval = BASE_SPAWN_INTERVAL_MS / self.spawn_frequency_multiplier.max(0.01);
        if self.spawn_accumulator_ms >= interval {
            self.spawn_accumulator_ms -= interval;
            true
        } else {
            false
        }
    }

    /// Produce a spawn template: weighted category, random x within bounds,
    /// start just above the visible area, downward velocity scaled by the
    /// speed multiplier with a small per-object jitter.
    pub fn generate(&mut self, surface_width: f32, size: f32) -> FallingObject {
        let kind = self.pick_kind();
        let max_x = (surface_width - size).max(0.0);
        let x = self.rng.random_range(0.0..=max_x);
        let jitter = self.rng.random_range(0.85..1.15);
        let vy = BASE_FALL_SPEED * self.speed_multiplier * jitter;
        FallingObject {
            pos: Vec2::new(x, -size),
            vel: Vec2::new(0.0, vy),
            size: Vec2::splat(size),
            kind,
        }
    }

    /// Weighted category pick. Weights live in `consts`; snacks are the
    /// strict majority so bombs and hearts stay rare.
    fn pick_kind(&mut self) -> ObjectKind {
        let roll = self
            .rng
            .random_range(0..(SNACK_WEIGHT + BOMB_WEIGHT + HEART_WEIGHT));
        if roll < SNACK_WEIGHT {
            ObjectKind::Snack
        } else if roll < SNACK_WEIGHT + BOMB_WEIGHT {
            ObjectKind::Bomb
        } else {
            ObjectKind::Heart
        }
    }
}
