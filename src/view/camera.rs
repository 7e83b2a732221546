//! World to screen camera
//!
//! Follows the player horizontally. Zoom is an integer step count; the scale
//! is `1.01^zoom`. The transform translates the camera position to the
//! origin, scales, then moves the origin to the viewport centre.

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

use crate::sim::TickInput;

/// Zoom steps in either direction
pub const MAX_ZOOM: i32 = 2400;
/// Initial zoom step
pub const DEFAULT_ZOOM: i32 = 48;
/// Scale factor per zoom step
const ZOOM_BASE: f32 = 1.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub viewport: Vec2,
    pub position: Vec2,
    pub zoom: i32,
}

impl Camera {
    pub fn new(viewport: Vec2, position: Vec2) -> Self {
        Self {
            viewport,
            position,
            zoom: DEFAULT_ZOOM,
        }
    }

    /// Track the player horizontally and apply held zoom keys
    pub fn update(&mut self, player_pos: Vec2, input: &TickInput) {
        self.position.x = player_pos.x;

        if input.zoom_out && self.zoom > -MAX_ZOOM {
            self.zoom -= 1;
        }
        if input.zoom_in && self.zoom < MAX_ZOOM {
            self.zoom += 1;
        }
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        ZOOM_BASE.powi(self.zoom)
    }

    /// World to screen transform
    pub fn world_matrix(&self) -> Affine2 {
        Affine2::from_translation(self.viewport * 0.5)
            * Affine2::from_scale(Vec2::splat(self.scale()))
            * Affine2::from_translation(-self.position)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.world_matrix().transform_point2(world)
    }

    /// Screen to world, or `None` when the transform cannot be inverted
    pub fn screen_to_world(&self, screen: Vec2) -> Option<Vec2> {
        invert(self.world_matrix()).map(|m| m.transform_point2(screen))
    }
}

fn invert(m: Affine2) -> Option<Affine2> {
    let det = m.matrix2.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let inv = m.inverse();
    inv.is_finite().then_some(inv)
}
