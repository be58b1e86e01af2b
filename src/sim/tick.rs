//! Per-tick rule engine
//!
//! `Session` is the game-progression state machine: Idle -> Running ->
//! Ended(win|lose). One `tick` call is the whole per-frame transition: prune
//! cosmetics, advance kinematics, spawn, resolve cup collisions, recycle
//! off-screen objects, then evaluate terminal conditions in a fixed order.
//! Observers get an ordered event list back instead of callbacks, which keeps
//! the simulation free of presentation concerns.

use crate::consts::*;
use crate::sim::collision::{hits_cup, past_bottom};
use crate::sim::physics::Physics;
use crate::sim::pool::ObjectPool;
use crate::sim::state::{
    Blast, Cup, Difficulty, FallingObject, GameEvent, GamePhase, GameResult, ObjectKind,
    WorldBounds,
};

/// Per-frame input flags. A pointer position wins over the discrete keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub pointer_x: Option<f32>,
}

/// What one tick produced. Events are in mutation order; `ended` is set on
/// the tick that reaches a terminal state.
#[derive(Debug, Default, PartialEq)]
pub struct TickOutcome {
    pub events: Vec<GameEvent>,
    pub ended: Option<GameResult>,
}

/// Translate per-frame input into cup movement. Pointer tracking takes
/// precedence over the discrete keys; the result is clamped to the surface.
pub fn move_cup(cup: &mut Cup, input: &FrameInput, dt_ms: f32, bounds: WorldBounds) {
    if let Some(x) = input.pointer_x {
        cup.pos.x = x - cup.size.x / 2.0;
    } else {
        let step = CUP_SPEED * (dt_ms.max(0.0) / 1000.0);
        if input.left {
            cup.pos.x -= step;
        }
        if input.right {
            cup.pos.x += step;
        }
    }
    cup.clamp_to(bounds.width);
}

/// One play session: counters, escalation bookkeeping, the object pool and
/// its spawner. Everything resets on `start()`.
pub struct Session {
    phase: GamePhase,
    difficulty: Difficulty,
    item_count: u32,
    lives: u8,
    total_items_spawned: u32,
    items_missed: u32,
    target_item_count: u32,
    /// One flag per entry in the difficulty's escalation schedule
    escalations_applied: Vec<bool>,
    /// Session clock, accumulated from tick deltas (ms)
    elapsed_ms: f32,
    blasts: Vec<Blast>,
    pool: ObjectPool,
    physics: Physics,
}

impl Session {
    /// A fresh session in `Idle` with the given difficulty and RNG seed
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        let config = difficulty.config();
        let mut physics = Physics::new(seed);
        physics.apply_difficulty(config);
        Self {
            phase: GamePhase::Idle,
            difficulty,
            item_count: 0,
            lives: MAX_LIVES,
            total_items_spawned: 0,
            items_missed: 0,
            target_item_count: config.target_item_count,
            escalations_applied: vec![false; config.escalations.len()],
            elapsed_ms: 0.0,
            blasts: Vec::new(),
            pool: ObjectPool::new(POOL_CAPACITY),
            physics,
        }
    }

    /// Reset every counter, clear the pool and enter `Running`. This is also
    /// the only way out of a terminal state.
    pub fn start(&mut self) -> Vec<GameEvent> {
        self.item_count = 0;
        self.lives = MAX_LIVES;
        self.total_items_spawned = 0;
        self.items_missed = 0;
        self.elapsed_ms = 0.0;
        self.blasts.clear();
        self.escalations_applied.iter_mut().for_each(|f| *f = false);
        self.pool.release_all();
        self.physics.apply_difficulty(self.difficulty.config());
        self.phase = GamePhase::Running;
        log::info!("session started ({})", self.difficulty.as_str());
        vec![GameEvent::ItemCount(0), GameEvent::Lives(MAX_LIVES)]
    }

    /// Switch difficulty: new target, fresh escalation flags, absolute
    /// multiplier reset. Allowed mid-session as an externally driven
    /// override; counters are untouched.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        let config = difficulty.config();
        self.target_item_count = config.target_item_count;
        self.escalations_applied = vec![false; config.escalations.len()];
        self.physics.apply_difficulty(config);
        log::info!(
            "difficulty {} (target {})",
            difficulty.as_str(),
            self.target_item_count
        );
    }

    /// The per-tick transition function. No-op unless `Running`.
    ///
    /// Step order is load-bearing: blast pruning, kinematics, spawn gate,
    /// cup collisions, off-screen recycling (miss-ratio rule), win check,
    /// then loss-by-lives.
    pub fn tick(&mut self, dt_ms: f32, cup: &Cup, bounds: WorldBounds) -> TickOutcome {
        let mut out = TickOutcome::default();
        if self.phase != GamePhase::Running {
            return out;
        }

        // Degenerate deltas (first frame, clock skew) step nothing
        let dt_ms = dt_ms.max(0.0);
        self.elapsed_ms += dt_ms;

        let now = self.elapsed_ms;
        self.blasts.retain(|b| now - b.created_ms < BLAST_TTL_MS);

        Physics::advance(dt_ms, &mut self.pool);

        if self.physics.should_spawn(dt_ms) {
            self.spawn_object(bounds.width);
        }

        // Cup collisions. A bomb short-circuits the rest of the scan.
        let mut terminal = false;
        for handle in self.pool.active_handles() {
            let Some(object) = self.pool.get(handle).copied() else {
                continue;
            };
            if !hits_cup(&object, cup) {
                continue;
            }
            match object.kind {
                ObjectKind::Snack => self.catch_snack(&mut out),
                ObjectKind::Bomb => {
                    // Bombs are unconditionally fatal regardless of lives
                    self.lives = 0;
                    out.events.push(GameEvent::Lives(0));
                    let center = object.center();
                    self.blasts.push(Blast {
                        pos: center,
                        created_ms: self.elapsed_ms,
                        radius: BLAST_RADIUS,
                    });
                    out.events.push(GameEvent::Blast { pos: center });
                    terminal = true;
                }
                ObjectKind::Heart => {
                    if self.lives < MAX_LIVES {
                        self.lives += 1;
                        out.events.push(GameEvent::Lives(self.lives));
                    } else {
                        out.events.push(GameEvent::MaxLivesReached);
                    }
                }
            }
            self.pool.release(handle);
            if terminal {
                break;
            }
        }

        // Off-screen recycling and the miss-ratio rule
        for handle in self.pool.active_handles() {
            let Some(object) = self.pool.get(handle) else {
                continue;
            };
            if !past_bottom(object, bounds.height) {
                continue;
            }
            let was_snack = object.kind == ObjectKind::Snack;
            self.pool.release(handle);
            if was_snack {
                self.items_missed += 1;
                log::debug!(
                    "missed {}/{} spawned",
                    self.items_missed,
                    self.total_items_spawned
                );
                if self.total_items_spawned > 0
                    && self.items_missed as f32 / self.total_items_spawned as f32
                        >= MISS_LOSS_RATIO
                {
                    terminal = true;
                    out.ended = Some(GameResult::Lose);
                    out.events.push(GameEvent::Ended(GameResult::Lose));
                    break;
                }
            }
        }

        // Win check, skipped once this tick is already terminal
        if out.ended.is_none() && !terminal && self.item_count >= self.target_item_count {
            out.ended = Some(GameResult::Win);
            out.events.push(GameEvent::Ended(GameResult::Win));
        }

        // Loss by lives (bomb earlier this tick)
        if out.ended.is_none() && terminal && self.lives == 0 {
            out.ended = Some(GameResult::Lose);
            out.events.push(GameEvent::Ended(GameResult::Lose));
        }

        if let Some(result) = out.ended {
            self.phase = GamePhase::Ended(result);
            log::info!(
                "session ended: {:?} ({} caught, {} missed of {})",
                result,
                self.item_count,
                self.items_missed,
                self.total_items_spawned
            );
        }
        out
    }

    fn spawn_object(&mut self, surface_width: f32) {
        // Pool exhaustion is a deliberate throttle, not an error
        let Some(handle) = self.pool.acquire() else {
            log::debug!("object pool exhausted, spawn skipped");
            return;
        };
        let template = self.physics.generate(surface_width, OBJECT_SIZE);
        // Only snacks count toward the miss-ratio denominator
        if template.kind == ObjectKind::Snack {
            self.total_items_spawned += 1;
        }
        if let Some(slot) = self.pool.get_mut(handle) {
            *slot = template;
        }
    }

    fn catch_snack(&mut self, out: &mut TickOutcome) {
        self.item_count += 1;
        out.events.push(GameEvent::ItemCount(self.item_count));

        // ">= threshold and not yet applied" so a large delta skipping past
        // a threshold value still applies the escalation exactly once
        let config = self.difficulty.config();
        for (i, escalation) in config.escalations.iter().enumerate() {
            if self.item_count >= escalation.at_count && !self.escalations_applied[i] {
                self.escalations_applied[i] = true;
                self.physics.boost_speed(escalation.speed);
                self.physics.boost_spawn_frequency(escalation.frequency);
                log::debug!(
                    "escalation at {} items: +{:.2} speed, +{:.2} frequency",
                    escalation.at_count,
                    escalation.speed,
                    escalation.frequency
                );
            }
        }
    }

    // --- read-only surface for the orchestrator and renderer ---

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn total_items_spawned(&self) -> u32 {
        self.total_items_spawned
    }

    pub fn items_missed(&self) -> u32 {
        self.items_missed
    }

    pub fn target_item_count(&self) -> u32 {
        self.target_item_count
    }

    /// Missed snacks as a whole percentage of spawned snacks
    pub fn miss_percentage(&self) -> u32 {
        if self.total_items_spawned == 0 {
            return 0;
        }
        (self.items_missed as f32 / self.total_items_spawned as f32 * 100.0).round() as u32
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    pub fn blasts(&self) -> &[Blast] {
        &self.blasts
    }

    /// Active falling objects in spawn order
    pub fn objects(&self) -> impl Iterator<Item = &FallingObject> {
        self.pool.iter_active()
    }

    pub fn active_object_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.physics.speed_multiplier()
    }

    pub fn spawn_frequency_multiplier(&self) -> f32 {
        self.physics.spawn_frequency_multiplier()
    }

    // --- debug overrides (externally driven difficulty/testing hooks) ---

    pub fn set_item_count(&mut self, count: u32) {
        self.item_count = count;
    }

    pub fn set_lives(&mut self, lives: u8) {
        self.lives = lives.min(MAX_LIVES);
    }

    pub fn set_target_item_count(&mut self, target: u32) {
        self.target_item_count = target;
    }

    #[cfg(test)]
    pub(crate) fn debug_pool(&mut self) -> &mut ObjectPool {
        &mut self.pool
    }
}
