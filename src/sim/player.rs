//! Player state machine
//!
//! Movement model (acceleration, friction, speed cap), the jump/fly control
//! modes, death, and the tower seam clamp. Contact resolution against the
//! wrapped space lives in [`super::collision`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{resolve_horizontal, resolve_vertical};
use super::platforms::PlatformSpawner;
use super::space::{Body, BodyId, BodyKind, Tags, WrappedSpace};
use super::tick::TickInput;
use crate::Settings;
use crate::settings::ControlMode;

/// What the player is standing on. Both variants are weak handles that must
/// be checked against their owner before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Support {
    /// A pooled platform, by slot index
    Platform { slot: usize },
    /// Any other body in the space
    Body(BodyId),
}

/// The climbing player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: BodyId,
    pub speed: Vec2,
    pub on_ground: Option<Support>,
    /// Platform slot the player is dropping through
    pub ignore_platform: Option<usize>,
    pub facing_right: bool,
    pub control_mode: ControlMode,
    /// Pinned against a tower seam this tick
    pub stuck: bool,
    pub dead: bool,
    /// Vertical correction computed by the last resolve
    pub last_dy: f32,
}

impl Player {
    /// Register the player body at the configured start position
    pub fn spawn(space: &mut WrappedSpace, settings: &Settings) -> Self {
        let body = space.add(Body::new(
            Vec2::new(settings.start_x, settings.start_y),
            Vec2::splat(settings.player_size),
            Tags::NONE,
            BodyKind::Player,
        ));
        Self {
            body,
            speed: Vec2::ZERO,
            on_ground: None,
            ignore_platform: None,
            facing_right: true,
            control_mode: settings.control_mode,
            stuck: false,
            dead: false,
            last_dy: 0.0,
        }
    }

    pub fn position(&self, space: &WrappedSpace) -> Vec2 {
        space.get(self.body).map(|b| b.pos).unwrap_or_default()
    }

    pub fn bottom(&self, space: &WrappedSpace) -> f32 {
        space.get(self.body).map(|b| b.bottom()).unwrap_or_default()
    }

    /// Moving horizontally and free to turn the backdrop
    pub fn is_moving(&self) -> bool {
        self.speed.x != 0.0 && !self.stuck && !self.dead
    }

    /// Drop weak handles whose target has been released
    pub fn validate_handles(&mut self, pool: &PlatformSpawner, space: &WrappedSpace) {
        let live = |support: Support| match support {
            Support::Platform { slot } => pool.is_live(slot),
            Support::Body(id) => space.contains(id),
        };
        if self.on_ground.is_some_and(|s| !live(s)) {
            self.on_ground = None;
        }
        if self.ignore_platform.is_some_and(|slot| !pool.is_live(slot)) {
            self.ignore_platform = None;
        }
    }

    /// Put the player back at the start height with no motion or contacts
    pub fn reset(&mut self, space: &mut WrappedSpace, settings: &Settings) {
        let x = self.position(space).x;
        space.move_to(self.body, Vec2::new(x, settings.start_y));
        self.speed = Vec2::ZERO;
        self.on_ground = None;
        self.ignore_platform = None;
        self.stuck = false;
        self.dead = false;
        self.last_dy = 0.0;
    }

    /// One fixed tick of player physics. A dead player is frozen.
    pub fn update(
        &mut self,
        input: &TickInput,
        space: &mut WrappedSpace,
        pool: &PlatformSpawner,
        settings: &Settings,
        scroll_speed: f32,
    ) {
        if self.dead {
            return;
        }
        self.validate_handles(pool, space);

        match self.control_mode {
            ControlMode::Jump => self.speed.y += settings.gravity,
            ControlMode::Fly => self.speed.y -= scroll_speed,
        }

        self.stuck = false;

        if input.right {
            self.speed.x += settings.accel;
            self.facing_right = true;
        }
        if input.left {
            self.speed.x -= settings.accel;
            self.facing_right = false;
        }

        if self.control_mode == ControlMode::Fly {
            self.fly(input, space, settings, scroll_speed);
        }

        self.speed.x = apply_friction(self.speed.x, settings.friction, settings.max_speed);
        if self.control_mode == ControlMode::Fly {
            self.speed.y = apply_friction(self.speed.y, settings.friction, settings.max_speed);
        }

        if input.jump && self.control_mode == ControlMode::Jump {
            match self.on_ground {
                Some(Support::Platform { slot }) if input.down => {
                    self.ignore_platform = Some(slot);
                }
                Some(_) => self.speed.y = -settings.jump_speed,
                None => {}
            }
        }

        resolve_horizontal(self, space);
        let dy = resolve_vertical(self, space);

        if self.dead {
            log::info!("Player died on contact at {}", self.position(space));
        }

        let mut pos = self.position(space);
        if self.control_mode == ControlMode::Jump {
            pos.y += dy;
        }
        self.last_dy = dy;

        let right_bound = settings.tower_right();
        if pos.x > right_bound {
            pos.x = right_bound;
            self.stuck = true;
        }
        if pos.x < settings.tower_offset {
            pos.x = settings.tower_offset;
            self.stuck = true;
        }

        space.move_to(self.body, pos);
    }

    /// Direct vertical travel while flying, kept inside the overscan band
    fn fly(&mut self, input: &TickInput, space: &mut WrappedSpace, settings: &Settings, step: f32) {
        let Some(body) = space.get(self.body) else {
            return;
        };
        let mut pos = body.pos;
        let bottom = body.bottom();
        if input.up && pos.y > settings.world_height - settings.half_height() + 64.0 {
            pos.y -= step;
        }
        if input.down && bottom < settings.world_height + 100.0 {
            pos.y += step;
        }
        space.move_to(self.body, pos);
    }
}

/// Reduce `speed` toward zero by `friction`, then clamp to `max`
#[inline]
pub fn apply_friction(speed: f32, friction: f32, max: f32) -> f32 {
    let slowed = if speed > friction {
        speed - friction
    } else if speed < -friction {
        speed + friction
    } else {
        0.0
    };
    slowed.clamp(-max, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platforms::{PlatformKind, SpawnerConfig};

    struct World {
        settings: Settings,
        space: WrappedSpace,
        pool: PlatformSpawner,
        player: Player,
    }

    fn world(mode: ControlMode) -> World {
        let settings = Settings::default().with_control_mode(mode);
        let mut space = WrappedSpace::new(
            settings.world_width,
            settings.space_height(),
            settings.tile_size,
        );
        let pool = PlatformSpawner::new(SpawnerConfig::from_settings(&settings));
        let player = Player::spawn(&mut space, &settings);
        World {
            settings,
            space,
            pool,
            player,
        }
    }

    impl World {
        fn step(&mut self, input: &TickInput) {
            self.player
                .update(input, &mut self.space, &self.pool, &self.settings, 2.0);
        }

        fn place(&mut self, pos: Vec2) {
            self.space.move_to(self.player.body, pos);
        }

        fn pos(&self) -> Vec2 {
            self.player.position(&self.space)
        }
    }

    #[test]
    fn test_friction_then_clamp() {
        assert_eq!(apply_friction(0.2, 0.25, 4.0), 0.0);
        assert_eq!(apply_friction(-0.2, 0.25, 4.0), 0.0);
        assert_eq!(apply_friction(1.0, 0.25, 4.0), 0.75);
        assert_eq!(apply_friction(-1.0, 0.25, 4.0), -0.75);
        assert_eq!(apply_friction(9.0, 0.25, 4.0), 4.0);
        assert_eq!(apply_friction(-9.0, 0.25, 4.0), -4.0);
    }

    #[test]
    fn test_horizontal_acceleration_and_facing() {
        let mut w = world(ControlMode::Jump);
        let start = w.pos();
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        w.step(&input);
        assert!(!w.player.facing_right);
        assert_eq!(w.player.speed.x, -0.5);
        assert_eq!(w.pos().x, start.x - 0.5);
    }

    #[test]
    fn test_speed_caps_at_max() {
        let mut w = world(ControlMode::Jump);
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..50 {
            w.step(&input);
        }
        assert_eq!(w.player.speed.x, w.settings.max_speed);
    }

    #[test]
    fn test_clamp_at_right_seam_sets_stuck() {
        let mut w = world(ControlMode::Jump);
        let bound = w.settings.tower_offset + w.settings.tower_bounds;
        w.place(Vec2::new(bound + 5.0, 500.0));
        w.step(&TickInput::default());
        assert_eq!(w.pos().x, bound);
        assert!(w.player.stuck);

        // Walking back off the seam clears the flag on the next tick
        w.place(Vec2::new(bound - 40.0, 500.0));
        w.step(&TickInput::default());
        assert!(!w.player.stuck);
    }

    #[test]
    fn test_clamp_at_left_seam_sets_stuck() {
        let mut w = world(ControlMode::Jump);
        w.place(Vec2::new(w.settings.tower_offset - 3.0, 500.0));
        w.step(&TickInput::default());
        assert_eq!(w.pos().x, w.settings.tower_offset);
        assert!(w.player.stuck);
    }

    #[test]
    fn test_gravity_pulls_in_jump_mode() {
        let mut w = world(ControlMode::Jump);
        w.place(Vec2::new(400.0, 300.0));
        w.step(&TickInput::default());
        w.step(&TickInput::default());
        assert_eq!(w.player.speed.y, 1.0);
        assert_eq!(w.pos().y, 301.5);
    }

    #[test]
    fn test_fly_mode_ignores_vertical_correction() {
        let mut w = world(ControlMode::Fly);
        assert_eq!(w.pos(), Vec2::new(400.0, 928.0));
        // Solid overlapping the top two pixels of the player
        w.space.add(Body::new(
            Vec2::new(384.0, 914.0),
            Vec2::new(64.0, 16.0),
            Tags::SOLID,
            BodyKind::Scenery,
        ));

        w.step(&TickInput::default());
        assert_eq!(w.player.last_dy, 2.0);
        assert_eq!(w.player.speed.y, 0.0);
        assert_eq!(w.pos(), Vec2::new(400.0, 928.0), "position left as is");
        assert!(w.player.on_ground.is_none());
        assert!(!w.player.dead);
    }

    #[test]
    fn test_jump_from_solid_ground() {
        let mut w = world(ControlMode::Jump);
        w.space.add(Body::new(
            Vec2::new(352.0, 512.0),
            Vec2::new(128.0, 16.0),
            Tags::SOLID,
            BodyKind::Scenery,
        ));
        w.place(Vec2::new(400.0, 496.0));
        w.step(&TickInput::default());
        assert!(matches!(w.player.on_ground, Some(Support::Body(_))));
        assert_eq!(w.pos().y, 496.0);

        w.step(&TickInput {
            jump: true,
            ..Default::default()
        });
        assert!(w.pos().y < 496.0, "jumped upward");
        assert!(w.player.on_ground.is_none());
    }

    #[test]
    fn test_jump_in_air_does_nothing() {
        let mut w = world(ControlMode::Jump);
        w.place(Vec2::new(400.0, 300.0));
        w.step(&TickInput {
            jump: true,
            ..Default::default()
        });
        assert_eq!(w.player.speed.y, 0.5);
    }

    #[test]
    fn test_drop_through_marks_platform_ignored() {
        let mut w = world(ControlMode::Jump);
        let slot = w
            .pool
            .spawn(&mut w.space, Vec2::new(400.0, 600.0), PlatformKind::Normal, Tags::PLATFORM)
            .unwrap();
        w.player.on_ground = Some(Support::Platform { slot });
        w.place(Vec2::new(400.0, 300.0));
        w.step(&TickInput {
            jump: true,
            down: true,
            ..Default::default()
        });
        assert_eq!(w.player.ignore_platform, Some(slot));
        assert!(w.player.speed.y > 0.0, "no jump impulse when dropping");
    }

    #[test]
    fn test_stale_handles_are_dropped() {
        let mut w = world(ControlMode::Jump);
        let slot = w
            .pool
            .spawn(&mut w.space, Vec2::new(400.0, 600.0), PlatformKind::Normal, Tags::PLATFORM)
            .unwrap();
        w.player.on_ground = Some(Support::Platform { slot });
        w.player.ignore_platform = Some(slot);
        w.pool.release(&mut w.space, slot);
        w.player.validate_handles(&w.pool, &w.space);
        assert_eq!(w.player.on_ground, None);
        assert_eq!(w.player.ignore_platform, None);
    }

    #[test]
    fn test_fly_mode_moves_directly() {
        let mut w = world(ControlMode::Fly);
        let start = w.pos();
        w.step(&TickInput {
            up: true,
            ..Default::default()
        });
        assert_eq!(w.pos().y, start.y - 2.0);

        w.step(&TickInput {
            down: true,
            ..Default::default()
        });
        assert_eq!(w.pos().y, start.y);
    }

    #[test]
    fn test_fly_mode_respects_travel_band() {
        let mut w = world(ControlMode::Fly);
        let top = w.settings.world_height - w.settings.half_height() + 64.0;
        w.place(Vec2::new(400.0, top));
        w.step(&TickInput {
            up: true,
            ..Default::default()
        });
        assert_eq!(w.pos().y, top);

        let floor = w.settings.world_height + 100.0 - w.settings.player_size;
        w.place(Vec2::new(400.0, floor));
        w.step(&TickInput {
            down: true,
            ..Default::default()
        });
        assert_eq!(w.pos().y, floor);
    }

    #[test]
    fn test_dead_player_is_frozen() {
        let mut w = world(ControlMode::Jump);
        w.place(Vec2::new(400.0, 300.0));
        w.player.dead = true;
        w.step(&TickInput {
            right: true,
            ..Default::default()
        });
        assert_eq!(w.pos(), Vec2::new(400.0, 300.0));
        assert_eq!(w.player.speed, Vec2::ZERO);
    }
}
