//! Session state
//!
//! Everything one run of the game owns: the collision space, the platform
//! pool, the player, score and difficulty. Passed explicitly to every
//! simulation step; there is no global state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::platforms::{PlatformSpawner, SpawnerConfig};
use super::player::Player;
use super::space::{Body, BodyId, BodyKind, Tags, WrappedSpace};
use crate::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title overlay; the player moves but the world is frozen
    Title,
    /// Active run
    Playing,
    /// Death overlay; everything frozen until restart
    Dead,
}

impl GamePhase {
    /// Phases that accept the restart command
    pub fn can_restart(self) -> bool {
        matches!(self, GamePhase::Title | GamePhase::Dead)
    }
}

/// Values the text overlay needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub phase: GamePhase,
    /// Whole points
    pub score: u32,
    pub difficulty: u32,
    pub scroll_speed: f32,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub space: WrappedSpace,
    pub spawner: PlatformSpawner,
    pub player: Player,
    pub phase: GamePhase,
    pub score: f32,
    pub difficulty: Difficulty,
    pub rng: Pcg32,
    /// Show the collision grid
    pub debug: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Create a new session on the title screen
    pub fn new(settings: Settings) -> Self {
        let mut space = WrappedSpace::new(
            settings.world_width,
            settings.space_height(),
            settings.tile_size,
        );
        let spawner = PlatformSpawner::new(SpawnerConfig::from_settings(&settings));
        let player = Player::spawn(&mut space, &settings);
        let difficulty = Difficulty::new(&settings);
        let rng = Pcg32::seed_from_u64(settings.seed);

        Self {
            settings,
            space,
            spawner,
            player,
            phase: GamePhase::Title,
            score: 0.0,
            difficulty,
            rng,
            debug: false,
            time_ticks: 0,
        }
    }

    /// Start a fresh run: zero score, base speed, player alive at the start
    /// height, every platform released. Safe to call repeatedly.
    pub fn restart(&mut self) {
        self.score = 0.0;
        self.difficulty.reset();
        self.spawner.sweep(&mut self.space);
        self.player.reset(&mut self.space, &self.settings);
        self.phase = GamePhase::Playing;
        log::info!("Run restarted (seed {})", self.settings.seed);
    }

    /// Register a piece of static level geometry
    pub fn add_scenery(&mut self, pos: Vec2, size: Vec2, tags: Tags) -> BodyId {
        self.space.add(Body::new(pos, size, tags, BodyKind::Scenery))
    }

    pub fn scroll_speed(&self) -> f32 {
        self.difficulty.scroll_speed
    }

    pub fn player_pos(&self) -> Vec2 {
        self.player.position(&self.space)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            phase: self.phase,
            score: self.score.max(0.0) as u32,
            difficulty: self.difficulty.level,
            scroll_speed: self.difficulty.scroll_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platforms::PlatformKind;

    #[test]
    fn test_new_session_starts_on_title() {
        let state = GameState::new(Settings::default());
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.scroll_speed(), 2.0);
        assert_eq!(state.spawner.live_count(), 0);
        assert_eq!(state.player_pos(), Vec2::new(400.0, 928.0));
        assert_eq!(state.space.len(), 1);
    }

    #[test]
    fn test_restart_from_death() {
        let mut state = GameState::new(Settings::default());
        for x in [300.0, 400.0, 500.0] {
            state.spawner.spawn(
                &mut state.space,
                Vec2::new(x, 100.0),
                PlatformKind::Normal,
                Tags::PLATFORM,
            );
        }
        state.space.move_to(state.player.body, Vec2::new(512.0, 700.0));
        state.player.dead = true;
        state.phase = GamePhase::Dead;
        state.score = 137.4;
        state.difficulty.scroll_speed = 5.3;

        state.restart();
        assert_eq!(state.score, 0.0);
        assert_eq!(state.scroll_speed(), 2.0);
        assert!(!state.player.dead);
        assert_eq!(state.spawner.live_count(), 0);
        assert_eq!(state.player_pos().y, state.settings.start_y);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_restart_is_idempotent() {
        let mut state = GameState::new(Settings::default());
        state.score = 55.0;
        state.difficulty.check(55.0);
        state.restart();
        state.restart();
        assert_eq!(state.score, 0.0);
        assert_eq!(state.difficulty.level, 0);
        assert_eq!(state.spawner.live_count(), 0);
        assert_eq!(state.space.len(), 1, "only the player remains");
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_restart_keeps_scenery() {
        let mut state = GameState::new(Settings::default());
        let floor = state.add_scenery(Vec2::new(208.0, 944.0), Vec2::new(608.0, 16.0), Tags::SOLID);
        state.restart();
        assert!(state.space.contains(floor));
    }

    #[test]
    fn test_hud_truncates_score() {
        let mut state = GameState::new(Settings::default());
        state.score = 19.97;
        let hud = state.hud();
        assert_eq!(hud.score, 19);
        assert_eq!(hud.phase, GamePhase::Title);
        assert_eq!(hud.difficulty, 0);
    }

    #[test]
    fn test_restart_allowed_only_from_title_or_dead() {
        assert!(GamePhase::Title.can_restart());
        assert!(GamePhase::Dead.can_restart());
        assert!(!GamePhase::Playing.can_restart());
    }
}
