//! Drawable projection onto the tower
//!
//! The visible tower face is a strip centred on the player. Bodies far enough
//! to either side are mirrored back onto the far face of the tower and drawn
//! behind it; past one more tower width they are hidden.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::GameState;

/// Gap between the tower edge and the point where bodies turn around
const EDGE_MARGIN: f32 = 10.0;

/// Draw layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Background,
    BehindTower,
    Tower,
    BeforeTower,
    Ui,
    Invisible,
}

/// What a drawable belongs to. Platform keys reuse the pool slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawKey {
    Player,
    Platform(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    pub key: DrawKey,
    pub pos: Vec2,
    pub size: Vec2,
    pub layer: Layer,
    /// Mirror the sprite horizontally
    pub flip_h: bool,
}

/// Draw position and layer of a box seen from `player_x`. `x` must already
/// be unwrapped near the player.
pub fn project(pos: Vec2, size: Vec2, player_x: f32, tower_width: f32) -> (Vec2, Layer) {
    let reach = tower_width / 2.0 + size.x + EDGE_MARGIN;
    let left_edge = player_x - reach;
    let right_edge = player_x + reach;
    let right = pos.x + size.x;

    let mut draw = pos;
    let mut layer = Layer::BeforeTower;

    if pos.x <= left_edge {
        let offset = (pos.x - left_edge).abs();
        draw.x = left_edge + offset;
        layer = if pos.x <= left_edge - tower_width {
            Layer::Invisible
        } else {
            Layer::BehindTower
        };
    }

    if right >= right_edge {
        let offset = (right - right_edge).abs();
        draw.x = right_edge - offset - size.x;
        layer = if right >= right_edge + tower_width {
            Layer::Invisible
        } else {
            Layer::BehindTower
        };
    }

    (draw, layer)
}

/// Drawables for the player and every live platform, platforms in slot order
pub fn collect(state: &GameState) -> Vec<Drawable> {
    let player_pos = state.player_pos();
    let tower_width = state.settings.tower_width;
    let mut out = Vec::with_capacity(state.spawner.live_count() + 1);

    if let Some(body) = state.space.get(state.player.body) {
        out.push(Drawable {
            key: DrawKey::Player,
            pos: body.pos,
            size: body.size,
            layer: Layer::BeforeTower,
            flip_h: !state.player.facing_right,
        });
    }

    for (slot, platform) in state.spawner.iter_live() {
        let Some(body) = state.space.get(platform.body) else {
            continue;
        };
        let x = state.space.unwrap_near(body.pos.x, player_pos.x);
        let (pos, layer) = project(Vec2::new(x, body.pos.y), body.size, player_pos.x, tower_width);
        out.push(Drawable {
            key: DrawKey::Platform(slot),
            pos,
            size: body.size,
            layer,
            flip_h: false,
        });
    }

    out
}
