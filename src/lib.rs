//! Hextower - climb a wrapped cylindrical tower through falling platforms
//!
//! Core modules:
//! - `sim`: Deterministic simulation (wrapped space, platform pool, player physics)
//! - `view`: Presentation-facing projections (camera, wrap layers, backdrop scroll)
//! - `settings`: Startup configuration

pub mod settings;
pub mod sim;
pub mod view;

pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the score ramp assumes this rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    pub const TICKS_PER_SECOND: f32 = 60.0;

    /// Screen dimensions
    pub const SCREEN_WIDTH: f32 = 640.0;
    pub const SCREEN_HEIGHT: f32 = 480.0;

    /// Collision grid cell and platform grid size
    pub const TILE_SIZE: f32 = 16.0;

    /// World (tower circumference unrolled) dimensions
    pub const WORLD_WIDTH: f32 = 1024.0;
    pub const WORLD_HEIGHT: f32 = 960.0;

    /// Left edge of the climbable tower face
    pub const TOWER_OFFSET: f32 = 208.0;
    /// Width of the climbable face (38 tiles)
    pub const TOWER_BOUNDS: f32 = 608.0;
    /// On-screen width of the tower sprite
    pub const TOWER_WIDTH: f32 = 192.0;

    /// Player spawn point
    pub const START_X: f32 = 400.0;
    pub const START_Y: f32 = WORLD_HEIGHT - 32.0;
    pub const PLAYER_SIZE: f32 = 16.0;

    /// Player movement
    pub const GRAVITY: f32 = 0.5;
    pub const PLAYER_ACCEL: f32 = 0.75;
    pub const PLAYER_FRICTION: f32 = 0.25;
    pub const MAX_SPEED: f32 = 4.0;
    pub const JUMP_SPEED: f32 = 8.0;

    /// Platform pool
    pub const POOL_CAPACITY: usize = 100;
    pub const BASE_PLATFORM_BATCH: usize = 15;
    /// Grid extents sampled by the spawner (columns x rows)
    pub const SPAWN_COLUMNS: i32 = 38;
    pub const SPAWN_ROWS: i32 = 30;

    /// Oscillating platform travel (px) and half-cycle duration (s)
    pub const OSCILLATION_TRAVEL: f32 = 128.0;
    pub const OSCILLATION_HALF_PERIOD: f32 = 2.0;

    /// Scroll speed ramp
    pub const BASE_SCROLL_SPEED: f32 = 2.0;
    pub const SCROLL_SPEED_STEP: f32 = 0.3;
    pub const DIFFICULTY_THRESHOLD: u32 = 20;
}

/// Wrap a value into [0, modulus)
#[inline]
pub fn wrap(value: i32, modulus: i32) -> i32 {
    value.rem_euclid(modulus)
}

/// Wrap a world-space coordinate into [0, width)
#[inline]
pub fn wrap_f32(value: f32, width: f32) -> f32 {
    let wrapped = value.rem_euclid(width);
    // rem_euclid can round up to `width` for tiny negative inputs
    if wrapped >= width { 0.0 } else { wrapped }
}
