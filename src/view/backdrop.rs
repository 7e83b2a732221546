//! Rotating tower backdrop
//!
//! The tower sprite has 16 rotation frames. The forward strip plays them
//! 16 down to 1 and the reverse strip 1 up to 16; flipping direction jumps to
//! the mirrored position so the visible frame does not change. Two copies of
//! the tower image scroll down with the world and wrap inside the overscan
//! band.

use serde::{Deserialize, Serialize};

use crate::Settings;

pub const FRAME_COUNT: u32 = 16;
/// Seconds each rotation frame is shown
pub const FRAME_TIME: f32 = 0.03;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backdrop {
    /// 1-based position within the active strip
    position: u32,
    /// Playing the reverse strip (player facing left)
    flipped: bool,
    elapsed: f32,
    /// Vertical offsets of the two tower copies
    pub offsets: [f32; 2],
    wrap_at: f32,
    restart_at: f32,
}

impl Backdrop {
    pub fn new(settings: &Settings) -> Self {
        let half = settings.half_height();
        let restart_at = settings.world_height - (half + settings.screen_height);
        Self {
            position: 1,
            flipped: false,
            elapsed: 0.0,
            offsets: [settings.world_height - half, restart_at],
            wrap_at: settings.world_height + half,
            restart_at,
        }
    }

    /// Rotation frame to draw, 1..=16
    pub fn frame(&self) -> u32 {
        if self.flipped {
            self.position
        } else {
            FRAME_COUNT - self.position + 1
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Switch strips, keeping the visible frame
    pub fn set_flip(&mut self, flip: bool) {
        if self.flipped != flip {
            self.flipped = flip;
            self.position = FRAME_COUNT - self.position + 1;
        }
    }

    /// Advance the rotation by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        while self.elapsed >= FRAME_TIME {
            self.elapsed -= FRAME_TIME;
            self.position = self.position % FRAME_COUNT + 1;
        }
    }

    /// Move both tower copies down by the scroll speed
    pub fn scroll(&mut self, speed: f32) {
        for offset in &mut self.offsets {
            *offset += speed;
            if *offset >= self.wrap_at {
                *offset = self.restart_at;
            }
        }
    }
}
