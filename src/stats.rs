//! Play statistics and high score
//!
//! The result sink: every finished session lands here, and wins push the
//! high score. Persisted to LocalStorage, separately from settings.

use serde::{Deserialize, Serialize};

use crate::engine::{GameRecord, ResultSink};
use crate::sim::GameResult;

/// Lifetime play statistics plus the current high score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Best item count achieved in a won session
    pub high_score: u32,
    pub games_played: u32,
    pub total_items_collected: u64,
    /// Most items caught in any single session, won or lost
    pub best_streak: u32,
    pub average_game_time_ms: f32,
}

impl Scoreboard {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "snackfall_stats";

    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished session into the running statistics
    pub fn record_game(&mut self, record: &GameRecord) {
        let prior = self.games_played as f32;
        self.games_played += 1;
        self.total_items_collected += record.item_count as u64;
        self.best_streak = self.best_streak.max(record.item_count);
        self.average_game_time_ms =
            (self.average_game_time_ms * prior + record.elapsed_ms) / self.games_played as f32;

        if record.result == GameResult::Win && record.item_count > self.high_score {
            self.high_score = record.item_count;
            log::info!("New high score: {}", self.high_score);
        }
    }

    /// Load statistics from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(stats) = serde_json::from_str::<Scoreboard>(&json) {
                    log::info!("Loaded stats ({} games played)", stats.games_played);
                    return stats;
                }
            }
        }

        log::info!("No stats found, starting fresh");
        Self::new()
    }

    /// Save statistics to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ResultSink for Scoreboard {
    fn record(&mut self, record: &GameRecord) {
        self.record_game(record);
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn won(items: u32, elapsed_ms: f32) -> GameRecord {
        GameRecord {
            result: GameResult::Win,
            item_count: items,
            elapsed_ms,
        }
    }

    fn lost(items: u32, elapsed_ms: f32) -> GameRecord {
        GameRecord {
            result: GameResult::Lose,
            item_count: items,
            elapsed_ms,
        }
    }

    #[test]
    fn test_high_score_only_on_win() {
        let mut board = Scoreboard::new();
        board.record_game(&lost(25, 10_000.0));
        assert_eq!(board.high_score, 0);

        board.record_game(&won(10, 8_000.0));
        assert_eq!(board.high_score, 10);

        // Lower win never regresses it
        board.record_game(&won(5, 4_000.0));
        assert_eq!(board.high_score, 10);
    }

    #[test]
    fn test_best_streak_counts_losses_too() {
        let mut board = Scoreboard::new();
        board.record_game(&lost(33, 30_000.0));
        board.record_game(&won(10, 9_000.0));
        assert_eq!(board.best_streak, 33);
    }

    #[test]
    fn test_average_game_time() {
        let mut board = Scoreboard::new();
        board.record_game(&won(10, 10_000.0));
        board.record_game(&lost(3, 20_000.0));
        assert!((board.average_game_time_ms - 15_000.0).abs() < 0.01);

        board.record_game(&lost(1, 30_000.0));
        assert!((board.average_game_time_ms - 20_000.0).abs() < 0.01);
    }

    #[test]
    fn test_totals_accumulate() {
        let mut board = Scoreboard::new();
        board.record_game(&won(10, 1_000.0));
        board.record_game(&lost(4, 1_000.0));
        assert_eq!(board.games_played, 2);
        assert_eq!(board.total_items_collected, 14);
    }
}
