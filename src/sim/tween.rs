//! Time-based easing sequences for platform motion
//!
//! A sequence is a chain of one-dimensional tweens played back to back.
//! Oscillating platforms use a two-step sequence (out and back) that is reset
//! every time it finishes.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Easing curve applied to normalized time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant velocity
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    SineInOut,
}

impl Easing {
    /// Map `t` in [0, 1] to eased progress in [0, 1]
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// One leg of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Seconds
    pub duration: f32,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
        }
    }

    fn value_at(&self, elapsed: f32) -> f32 {
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            elapsed / self.duration
        };
        self.from + (self.to - self.from) * self.easing.apply(t)
    }
}

/// Tweens played in order; never empty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweenSequence {
    steps: Vec<Tween>,
    index: usize,
    elapsed: f32,
}

impl TweenSequence {
    pub fn new(first: Tween) -> Self {
        Self {
            steps: vec![first],
            index: 0,
            elapsed: 0.0,
        }
    }

    pub fn then(mut self, step: Tween) -> Self {
        self.steps.push(step);
        self
    }

    /// Advance by `dt` seconds. Returns the current value and whether the
    /// final step has completed.
    pub fn update(&mut self, dt: f32) -> (f32, bool) {
        let mut remaining = dt;
        loop {
            let step = self.steps[self.index];
            let left = step.duration - self.elapsed;
            if remaining < left {
                self.elapsed += remaining;
                return (step.value_at(self.elapsed), false);
            }
            remaining -= left.max(0.0);
            if self.index + 1 == self.steps.len() {
                self.elapsed = step.duration;
                return (step.to, true);
            }
            self.index += 1;
            self.elapsed = 0.0;
        }
    }

    /// Rewind to the start of the first step
    pub fn reset(&mut self) {
        self.index = 0;
        self.elapsed = 0.0;
    }
}
