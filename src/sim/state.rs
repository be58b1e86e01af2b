//! Core simulation types and difficulty configuration

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Category of a falling object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Beneficial - counts toward the win condition when caught
    Snack,
    /// Harmful - instant session-ending loss on catch
    Bomb,
    /// Bonus-life - restores one life up to the cap
    Heart,
}

/// A falling object. The backing storage is a pool slot; physics mutates it
/// in place every tick.
#[derive(Debug, Clone, Copy)]
pub struct FallingObject {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub kind: ObjectKind,
}

impl FallingObject {
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

impl Default for FallingObject {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: Vec2::splat(OBJECT_SIZE),
            kind: ObjectKind::Snack,
        }
    }
}

/// Logical size of the drawing surface, passed into every tick so the
/// simulation never queries ambient state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

/// The player's catching cup
#[derive(Debug, Clone, Copy)]
pub struct Cup {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Cup {
    /// Cup centered horizontally, resting near the bottom of the surface
    pub fn centered(bounds: WorldBounds) -> Self {
        let size = Vec2::new(CUP_WIDTH, CUP_HEIGHT);
        Self {
            pos: Vec2::new(
                (bounds.width - size.x) / 2.0,
                bounds.height - size.y - CUP_BOTTOM_MARGIN,
            ),
            size,
        }
    }

    /// Clamp the horizontal position to `[0, width - cup_width]`
    pub fn clamp_to(&mut self, width: f32) {
        self.pos.x = self.pos.x.clamp(0.0, (width - self.size.x).max(0.0));
    }
}

/// Outcome of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Lose,
}

/// Session state machine. Terminal states are exited only via `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No session yet
    Idle,
    /// Active gameplay
    Running,
    /// Session over
    Ended(GameResult),
}

/// A one-time permanent multiplier bump at a cumulative catch count
#[derive(Debug, Clone, Copy)]
pub struct Escalation {
    pub at_count: u32,
    pub speed: f32,
    pub frequency: f32,
}

/// Rule tuning for one difficulty. A single record keyed by `Difficulty`
/// keeps rule tuning decoupled from asset lookup.
#[derive(Debug)]
pub struct DifficultyConfig {
    pub target_item_count: u32,
    pub base_speed_multiplier: f32,
    pub escalations: &'static [Escalation],
}

static EASY: DifficultyConfig = DifficultyConfig {
    target_item_count: 10,
    base_speed_multiplier: 0.8,
    escalations: &[],
};

static MEDIUM: DifficultyConfig = DifficultyConfig {
    target_item_count: 20,
    base_speed_multiplier: 1.0,
    escalations: &[Escalation {
        at_count: 10,
        speed: 0.10,
        frequency: 0.10,
    }],
};

static HARD: DifficultyConfig = DifficultyConfig {
    target_item_count: 40,
    base_speed_multiplier: 1.2,
    escalations: &[
        Escalation {
            at_count: 10,
            speed: 0.10,
            frequency: 0.10,
        },
        Escalation {
            at_count: 20,
            speed: 0.20,
            frequency: 0.05,
        },
        Escalation {
            at_count: 30,
            speed: 0.20,
            frequency: 0.05,
        },
    ],
};

/// Difficulty category selected on the start screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn config(self) -> &'static DifficultyConfig {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Medium => &MEDIUM,
            Difficulty::Hard => &HARD,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Ephemeral blast cosmetic, pruned by age. Never affects gameplay.
#[derive(Debug, Clone, Copy)]
pub struct Blast {
    pub pos: Vec2,
    /// Session time when the blast was created (ms)
    pub created_ms: f32,
    pub radius: f32,
}

/// Observable things that happened during one tick, in mutation order.
/// The orchestrator drains these; observers never re-enter the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ItemCount(u32),
    Lives(u8),
    MaxLivesReached,
    Blast { pos: Vec2 },
    Ended(GameResult),
}
