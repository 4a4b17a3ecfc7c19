//! Score ledger: current score, live high score, and save bookkeeping.
//!
//! The ledger never touches storage.  It only remembers which high score was
//! last persisted so the engine can tell when a save is warranted.

use tracing::info;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    score: u32,
    high_score: u32,
    persisted_high_score: u32,
}

impl Ledger {
    /// Start from a previously stored high score.
    pub fn new(high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            persisted_high_score: high_score,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Credit points and raise the high score immediately if beaten, so the
    /// HUD stays live.  Saturates rather than wrapping.
    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        if self.score > self.high_score {
            self.high_score = self.score;
        }
    }

    /// New session: the score goes, the high score stays.
    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    /// Worth celebrating on the game-over screen.
    pub fn is_new_high_score(&self) -> bool {
        self.score > 0 && self.score >= self.high_score
    }

    /// The in-memory high score is ahead of what was last saved.
    pub fn needs_save(&self) -> bool {
        self.high_score > self.persisted_high_score
    }

    /// Record that `value` reached storage.
    pub fn mark_saved(&mut self, value: u32) {
        if value > self.persisted_high_score {
            info!(high_score = value, "high score persisted");
        }
        self.persisted_high_score = self.persisted_high_score.max(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beating_the_high_score_updates_it_live() {
        let mut ledger = Ledger::new(45);
        ledger.add_points(40);
        assert_eq!(ledger.high_score(), 45);
        ledger.add_points(10);
        assert_eq!(ledger.score(), 50);
        assert_eq!(ledger.high_score(), 50);
        assert!(ledger.needs_save());
    }

    #[test]
    fn reset_keeps_high_score() {
        let mut ledger = Ledger::new(0);
        ledger.add_points(30);
        ledger.reset_score();
        assert_eq!(ledger.score(), 0);
        assert_eq!(ledger.high_score(), 30);
    }

    #[test]
    fn add_points_saturates() {
        let mut ledger = Ledger::new(0);
        ledger.add_points(u32::MAX);
        ledger.add_points(5);
        assert_eq!(ledger.score(), u32::MAX);
    }

    #[test]
    fn save_bookkeeping() {
        let mut ledger = Ledger::new(20);
        assert!(!ledger.needs_save());
        ledger.add_points(25);
        assert!(ledger.needs_save());
        ledger.mark_saved(25);
        assert!(!ledger.needs_save());
    }

    #[test]
    fn new_high_score_flag() {
        let mut ledger = Ledger::new(0);
        assert!(!ledger.is_new_high_score());
        ledger.add_points(10);
        assert!(ledger.is_new_high_score());

        let mut ledger = Ledger::new(100);
        ledger.add_points(10);
        assert!(!ledger.is_new_high_score());
    }
}
