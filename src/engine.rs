//! Frame loop orchestration
//!
//! Owns the cup, input translation, resize handling, difficulty wiring and
//! the session lifecycle. The platform layer calls `frame` once per animation
//! frame with the current timestamp; everything else flows from there. When a
//! session ends the engine records the result with its sink and stops - the
//! platform layer must then cancel any pending frame callback.

use std::fmt;

use crate::sim::{
    Cup, Difficulty, FrameInput, GameEvent, GameResult, Session, TickOutcome, WorldBounds,
    move_cup,
};

/// End-of-session record handed to the statistics collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameRecord {
    pub result: GameResult,
    pub item_count: u32,
    pub elapsed_ms: f32,
}

/// Receives the record exactly once per finished session
pub trait ResultSink {
    fn record(&mut self, record: &GameRecord);
}

/// Sink that drops records; for tests and headless runs
pub struct NullSink;

impl ResultSink for NullSink {
    fn record(&mut self, _record: &GameRecord) {}
}

/// Boundary-layer misuse: driving or querying the engine outside a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    NotRunning,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotRunning => write!(f, "no active game session"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Rolling frames-per-second estimate over a one-second window
#[derive(Debug, Default)]
struct FpsCounter {
    frames: u32,
    window_start_ms: f64,
    fps: f32,
}

impl FpsCounter {
    fn frame(&mut self, now_ms: f64) {
        if self.window_start_ms == 0.0 {
            self.window_start_ms = now_ms;
        }
        self.frames += 1;
        let elapsed = now_ms - self.window_start_ms;
        if elapsed >= 1000.0 {
            self.fps = (self.frames as f64 * 1000.0 / elapsed) as f32;
            self.frames = 0;
            self.window_start_ms = now_ms;
        }
    }
}

/// Ties the session, cup, input and result sink into a frame-driven loop
pub struct GameEngine<S: ResultSink> {
    session: Session,
    cup: Cup,
    input: FrameInput,
    bounds: WorldBounds,
    running: bool,
    last_time_ms: Option<f64>,
    fps: FpsCounter,
    sink: S,
}

impl<S: ResultSink> GameEngine<S> {
    pub fn new(bounds: WorldBounds, difficulty: Difficulty, seed: u64, sink: S) -> Self {
        Self {
            session: Session::new(difficulty, seed),
            cup: Cup::centered(bounds),
            input: FrameInput::default(),
            bounds,
            running: false,
            last_time_ms: None,
            fps: FpsCounter::default(),
            sink,
        }
    }

    /// Begin a session: reset counters and start ticking
    pub fn start(&mut self) -> Vec<GameEvent> {
        self.running = true;
        self.last_time_ms = None;
        self.fps = FpsCounter::default();
        self.session.start()
    }

    /// Stop the loop. No tick runs after this returns; the platform layer
    /// cancels its pending frame callback.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Restart after a terminal state: same difficulty, fresh counters
    pub fn restart(&mut self) -> Vec<GameEvent> {
        self.start()
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn set_input(&mut self, input: FrameInput) {
        self.input = input;
    }

    /// New surface size: recenter the cup, leave every counter untouched
    pub fn resize(&mut self, bounds: WorldBounds) {
        self.bounds = bounds;
        self.cup = Cup::centered(bounds);
    }

    /// Map the selected category to target count and base multipliers
    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.session.select_difficulty(difficulty);
    }

    /// One animation frame: delta from the previous timestamp, input to cup
    /// movement, rule engine tick, then session-end handling.
    pub fn frame(&mut self, now_ms: f64) -> Result<TickOutcome, EngineError> {
        if !self.running {
            return Err(EngineError::NotRunning);
        }
        // First frame after start has no previous timestamp: zero delta
        let dt_ms = match self.last_time_ms {
            Some(last) => (now_ms - last) as f32,
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);
        self.fps.frame(now_ms);

        move_cup(&mut self.cup, &self.input, dt_ms, self.bounds);
        let outcome = self.session.tick(dt_ms, &self.cup, self.bounds);

        if let Some(result) = outcome.ended {
            let record = GameRecord {
                result,
                item_count: self.session.item_count(),
                elapsed_ms: self.session.elapsed_ms(),
            };
            self.sink.record(&record);
            self.stop();
        }
        Ok(outcome)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Debug/override surface (direct counter setters live on the session)
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn cup(&self) -> &Cup {
        &self.cup
    }

    /// The result sink, readable for HUD display (high score etc.)
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps
    }
}
