//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (pool acquisition order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod physics;
pub mod pool;
pub mod state;
pub mod tick;

pub use collision::{aabb_overlap, hits_cup, past_bottom};
pub use physics::Physics;
pub use pool::{Handle, ObjectPool};
pub use state::{
    Blast, Cup, Difficulty, DifficultyConfig, Escalation, FallingObject, GameEvent, GamePhase,
    GameResult, ObjectKind, WorldBounds,
};
pub use tick::{FrameInput, Session, TickOutcome, move_cup};
