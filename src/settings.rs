//! Startup configuration
//!
//! Geometry and tuning constants for a session. Loaded once (JSON or defaults)
//! and treated as immutable while the simulation runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::tween::Easing;

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// How the player moves vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlMode {
    /// Gravity, jumping and contact resolution drive vertical motion
    Jump,
    /// Up/down keys move the player directly; contacts only have side-effects
    #[default]
    Fly,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Jump => "Jump",
            ControlMode::Fly => "Fly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jump" | "jumping" => Some(ControlMode::Jump),
            "fly" | "flying" => Some(ControlMode::Fly),
            _ => None,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// RNG seed for platform generation
    pub seed: u64,

    // === World geometry ===
    pub screen_width: f32,
    pub screen_height: f32,
    pub world_width: f32,
    pub world_height: f32,
    pub tile_size: f32,
    pub tower_offset: f32,
    pub tower_bounds: f32,
    pub tower_width: f32,

    // === Player ===
    pub start_x: f32,
    pub start_y: f32,
    pub player_size: f32,
    pub control_mode: ControlMode,
    pub gravity: f32,
    pub accel: f32,
    pub friction: f32,
    pub max_speed: f32,
    pub jump_speed: f32,

    // === Platforms ===
    pub pool_capacity: usize,
    pub base_batch: usize,
    pub spawn_columns: i32,
    pub spawn_rows: i32,
    /// Percentage of spawns that oscillate horizontally
    pub oscillating_percent: u32,
    pub oscillation_travel: f32,
    pub oscillation_half_period: f32,
    pub oscillation_easing: Easing,

    // === Difficulty ===
    pub base_scroll_speed: f32,
    pub scroll_speed_step: f32,
    pub difficulty_threshold: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x4845_5854,

            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            tile_size: TILE_SIZE,
            tower_offset: TOWER_OFFSET,
            tower_bounds: TOWER_BOUNDS,
            tower_width: TOWER_WIDTH,

            start_x: START_X,
            start_y: START_Y,
            player_size: PLAYER_SIZE,
            control_mode: ControlMode::Fly,
            gravity: GRAVITY,
            accel: PLAYER_ACCEL,
            friction: PLAYER_FRICTION,
            max_speed: MAX_SPEED,
            jump_speed: JUMP_SPEED,

            pool_capacity: POOL_CAPACITY,
            base_batch: BASE_PLATFORM_BATCH,
            spawn_columns: SPAWN_COLUMNS,
            spawn_rows: SPAWN_ROWS,
            oscillating_percent: 30,
            oscillation_travel: OSCILLATION_TRAVEL,
            oscillation_half_period: OSCILLATION_HALF_PERIOD,
            oscillation_easing: Easing::Linear,

            base_scroll_speed: BASE_SCROLL_SPEED,
            scroll_speed_step: SCROLL_SPEED_STEP,
            difficulty_threshold: DIFFICULTY_THRESHOLD,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Default settings with a different control mode
    pub fn with_control_mode(mut self, mode: ControlMode) -> Self {
        self.control_mode = mode;
        self
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Half the screen height, used as the vertical overscan band
    #[inline]
    pub fn half_height(&self) -> f32 {
        self.screen_height / 2.0
    }

    /// Height of the collision space (world plus overscan)
    #[inline]
    pub fn space_height(&self) -> f32 {
        self.world_height + self.half_height()
    }

    /// Right edge of the climbable tower face
    #[inline]
    pub fn tower_right(&self) -> f32 {
        self.tower_offset + self.tower_bounds
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), SettingsError> {
            Err(SettingsError::Invalid { field, reason })
        }

        if self.tile_size <= 0.0 || self.tile_size.is_nan() {
            return invalid("tile_size", "must be positive");
        }
        if self.world_width.is_nan()
            || self.world_height.is_nan()
            || self.world_width < self.tile_size
            || self.world_height < self.tile_size
        {
            return invalid("world_width", "world must be at least one tile in each axis");
        }
        if (self.world_width / self.tile_size).fract() != 0.0 {
            return invalid("world_width", "must be a whole number of tiles");
        }
        if self.tower_offset < 0.0 || self.tower_right() > self.world_width {
            return invalid("tower_bounds", "tower must lie inside the world");
        }
        if self.player_size <= 0.0 || self.player_size.is_nan() {
            return invalid("player_size", "must be positive");
        }
        if self.accel <= self.friction || self.accel.is_nan() || self.friction.is_nan() {
            return invalid("accel", "must exceed friction or the player can never move");
        }
        if self.max_speed < 0.0 || self.friction < 0.0 {
            return invalid("max_speed", "speeds must not be negative");
        }
        if self.oscillation_half_period <= 0.0 || self.oscillation_half_period.is_nan() {
            return invalid("oscillation_half_period", "must be positive");
        }
        if self.pool_capacity == 0 {
            return invalid("pool_capacity", "pool needs at least one slot");
        }
        if self.spawn_columns <= 0 || self.spawn_rows <= 0 {
            return invalid("spawn_columns", "spawn grid must not be empty");
        }
        if self.oscillating_percent > 100 {
            return invalid("oscillating_percent", "must be within 0..=100");
        }
        if self.difficulty_threshold == 0 {
            return invalid("difficulty_threshold", "must be positive");
        }
        Ok(())
    }
}
