//! Score-driven scroll speed ramp
//!
//! Score grows by `scroll_speed / 60` per playing tick. Every time the whole
//! score reaches the next multiple of the threshold, the scroll speed steps up
//! and the difficulty level increments, at most once per tick.

use serde::{Deserialize, Serialize};

use crate::Settings;
use crate::consts::TICKS_PER_SECOND;

/// Scroll speed and difficulty level for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub scroll_speed: f32,
    pub level: u32,
    base_speed: f32,
    step: f32,
    threshold: u32,
    /// Next whole score that raises the level
    next_threshold: u32,
}

impl Difficulty {
    pub fn new(settings: &Settings) -> Self {
        Self {
            scroll_speed: settings.base_scroll_speed,
            level: 0,
            base_speed: settings.base_scroll_speed,
            step: settings.scroll_speed_step,
            threshold: settings.difficulty_threshold.max(1),
            next_threshold: settings.difficulty_threshold.max(1),
        }
    }

    /// Score gained in one tick at the current speed
    #[inline]
    pub fn score_increment(&self) -> f32 {
        self.scroll_speed / TICKS_PER_SECOND
    }

    pub fn next_threshold(&self) -> u32 {
        self.next_threshold
    }

    /// Raise the level if `score` has reached the next threshold. Returns true
    /// when a raise happened.
    pub fn check(&mut self, score: f32) -> bool {
        let whole = score.max(0.0).floor() as u32;
        if whole == 0 || whole < self.next_threshold {
            return false;
        }

        self.scroll_speed += self.step;
        self.level += 1;
        self.next_threshold = (whole / self.threshold + 1) * self.threshold;
        log::info!(
            "Difficulty {} at score {} (scroll speed {:.1})",
            self.level,
            whole,
            self.scroll_speed
        );
        true
    }

    /// Stop the world while the player is dead
    pub fn freeze(&mut self) {
        self.scroll_speed = 0.0;
    }

    /// Back to the base speed and level zero
    pub fn reset(&mut self) {
        self.scroll_speed = self.base_speed;
        self.level = 0;
        self.next_threshold = self.threshold;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn difficulty() -> Difficulty {
        Difficulty::new(&Settings::default())
    }

    #[test]
    fn test_crossing_threshold_fires_once() {
        let mut d = difficulty();
        assert!(!d.check(19.9));
        assert!(d.check(20.1));
        assert_eq!(d.level, 1);
        assert!((d.scroll_speed - 2.3).abs() < 1e-6);

        // Still inside the same threshold on later ticks
        assert!(!d.check(20.13));
        assert!(!d.check(20.99));
        assert!(!d.check(39.99));
        assert_eq!(d.level, 1);
    }

    #[test]
    fn test_next_multiple_fires_again() {
        let mut d = difficulty();
        d.check(20.0);
        assert_eq!(d.next_threshold(), 40);
        assert!(d.check(40.02));
        assert_eq!(d.level, 2);
        assert!((d.scroll_speed - 2.6).abs() < 1e-6);
    }

    /// The raise is an edge check against the stored next multiple, so a
    /// whole score that skips past 40 still raises once. A modulo equality
    /// check would miss 41 entirely. The score itself is never bumped after
    /// a raise; the stored threshold is what keeps later ticks from firing.
    #[test]
    fn test_large_jump_counts_one_crossing() {
        let mut d = difficulty();
        assert!(!d.check(19.0));
        assert!(d.check(41.0));
        assert_eq!(d.level, 1);
        assert_eq!(d.next_threshold(), 60);
        assert!(!d.check(41.0), "same score does not raise twice");
        assert_eq!(d.level, 1);
    }

    #[test]
    fn test_zero_score_never_fires() {
        let mut d = difficulty();
        assert!(!d.check(0.0));
        assert!(!d.check(0.5));
        assert_eq!(d.level, 0);
    }

    #[test]
    fn test_accumulated_ticks_fire_exactly_once() {
        let mut d = difficulty();
        let mut score = 0.0f32;
        let mut raises = 0;
        // Long enough to cross 20 but not 40 at the base speed
        for _ in 0..(60 * 15) {
            score += d.score_increment();
            if d.check(score) {
                raises += 1;
            }
        }
        assert_eq!(raises, 1);
        assert!(score > 20.0 && score < 40.0);
    }

    #[test]
    fn test_reset_restores_base() {
        let mut d = difficulty();
        d.check(60.0);
        d.freeze();
        assert_eq!(d.scroll_speed, 0.0);
        d.reset();
        assert_eq!(d.scroll_speed, 2.0);
        assert_eq!(d.level, 0);
        assert_eq!(d.next_threshold(), 20);
    }
}
