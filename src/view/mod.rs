//! Presentation-facing state
//!
//! Nothing here feeds back into the simulation. A renderer reads the camera,
//! the backdrop and the projected drawables after each tick.

pub mod backdrop;
pub mod camera;
pub mod sprites;

pub use backdrop::Backdrop;
pub use camera::Camera;
pub use sprites::{DrawKey, Drawable, Layer, collect, project};

use glam::Vec2;

use crate::consts::SIM_DT;
use crate::sim::{CellCoord, GameState, TickInput};

/// View state that persists across ticks
#[derive(Debug, Clone)]
pub struct View {
    pub camera: Camera,
    pub backdrop: Backdrop,
}

impl View {
    pub fn new(state: &GameState) -> Self {
        let settings = &state.settings;
        Self {
            camera: Camera::new(
                Vec2::new(settings.screen_width, settings.screen_height),
                state.player_pos(),
            ),
            backdrop: Backdrop::new(settings),
        }
    }

    /// Follow the session after a simulation tick
    pub fn update(&mut self, state: &GameState, input: &TickInput) {
        // Pinned at a seam or dead: hold the rotation and facing
        if state.player.is_moving() {
            self.backdrop.set_flip(!state.player.facing_right);
            self.backdrop.advance(SIM_DT);
        }
        self.backdrop.scroll(state.scroll_speed());
        self.camera.update(state.player_pos(), input);
    }

    pub fn drawables(&self, state: &GameState) -> Vec<Drawable> {
        collect(state)
    }
}

/// Occupied collision cells, only while the debug overlay is on
pub fn debug_cells(state: &GameState) -> Option<Vec<CellCoord>> {
    state.debug.then(|| state.space.occupied_cells().collect())
}
