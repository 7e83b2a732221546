//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod platforms;
pub mod player;
pub mod space;
pub mod state;
pub mod tick;
pub mod tween;

pub use collision::{resolve_horizontal, resolve_vertical};
pub use difficulty::Difficulty;
pub use platforms::{
    GridCoord, Placement, Platform, PlatformKind, PlatformSpawner, PoolReport, SpawnerConfig,
};
pub use player::{Player, Support, apply_friction};
pub use space::{
    Body, BodyId, BodyKind, CellCoord, Contact, ContactBody, ContactCell, Tags, WrappedSpace,
};
pub use state::{GamePhase, GameState, Hud};
pub use tick::{TickInput, tick};
pub use tween::{Easing, Tween, TweenSequence};
