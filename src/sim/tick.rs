//! Fixed timestep simulation tick
//!
//! One call advances the session by one step, in a fixed order: session
//! commands, player physics, platform pool, spawner refill, difficulty.

use super::state::{GamePhase, GameState};

/// Input state for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Jump pressed this tick (edge, not held)
    pub jump: bool,
    /// Restart pressed this tick
    pub restart: bool,
    /// Debug overlay toggle pressed this tick
    pub debug: bool,
    /// Camera zoom held
    pub zoom_in: bool,
    pub zoom_out: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    if input.debug {
        state.debug = !state.debug;
        log::debug!("Debug overlay {}", if state.debug { "on" } else { "off" });
    }

    if input.restart && state.phase.can_restart() {
        state.restart();
    }

    let scroll_speed = state.difficulty.scroll_speed;
    state.player.update(
        input,
        &mut state.space,
        &state.spawner,
        &state.settings,
        scroll_speed,
    );

    if state.player.dead {
        if state.phase != GamePhase::Dead {
            log::info!("Game over with score {}", state.hud().score);
        }
        state.phase = GamePhase::Dead;
        state.difficulty.freeze();
        return;
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    let player_bottom = state.player.bottom(&state.space);
    state.spawner.update(
        &mut state.space,
        &mut state.rng,
        scroll_speed,
        player_bottom,
        state.difficulty.level,
    );

    state.score += state.difficulty.score_increment();
    state.difficulty.check(state.score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::settings::ControlMode;
    use crate::sim::platforms::PlatformKind;
    use crate::sim::space::Tags;
    use glam::Vec2;

    fn restart() -> TickInput {
        TickInput {
            restart: true,
            ..Default::default()
        }
    }

    fn platform_positions(state: &GameState) -> Vec<(usize, Vec2)> {
        state
            .spawner
            .iter_live()
            .filter_map(|(slot, p)| state.space.get(p.body).map(|b| (slot, b.pos)))
            .collect()
    }

    #[test]
    fn test_title_freezes_world() {
        let mut state = GameState::new(Settings::default());
        for _ in 0..30 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.spawner.live_count(), 0);
        assert_eq!(state.time_ticks, 30);
    }

    #[test]
    fn test_player_moves_on_title() {
        let mut state = GameState::new(Settings::default());
        let start = state.player_pos();
        tick(
            &mut state,
            &TickInput {
                right: true,
                ..Default::default()
            },
        );
        assert!(state.player_pos().x > start.x);
    }

    #[test]
    fn test_restart_starts_run_and_fills_pool() {
        let mut state = GameState::new(Settings::default());
        tick(&mut state, &restart());
        assert_eq!(state.phase, GamePhase::Playing);
        let live = state.spawner.live_count();
        assert!(live > 0 && live <= state.settings.base_batch);
        assert!(state.score > 0.0);
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut state = GameState::new(Settings::default());
        tick(&mut state, &restart());
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        let score = state.score;
        tick(&mut state, &restart());
        assert!(state.score > score, "run continued");
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_score_accumulates_at_scroll_rate() {
        let mut state = GameState::new(Settings::default());
        tick(&mut state, &restart());
        for _ in 1..60 {
            tick(&mut state, &TickInput::default());
        }
        assert!((state.score - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_difficulty_raised_on_threshold_tick() {
        let mut state = GameState::new(Settings::default());
        tick(&mut state, &restart());
        state.score = 19.99;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.difficulty.level, 1);
        assert!((state.scroll_speed() - 2.3).abs() < 1e-6);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.difficulty.level, 1);
    }

    #[test]
    fn test_platform_landing_ends_run() {
        let settings = Settings::default().with_control_mode(ControlMode::Jump);
        let mut state = GameState::new(settings);
        state.restart();
        state.spawner.spawn(
            &mut state.space,
            Vec2::new(400.0, 944.0),
            PlatformKind::Normal,
            Tags::PLATFORM,
        );

        tick(&mut state, &TickInput::default());
        assert!(state.player.dead);
        assert_eq!(state.phase, GamePhase::Dead);
        assert_eq!(state.scroll_speed(), 0.0);

        // Frozen until restart
        let score = state.score;
        let pos = state.player_pos();
        tick(&mut state, &TickInput::default());
        assert_eq!(state.score, score);
        assert_eq!(state.player_pos(), pos);

        tick(&mut state, &restart());
        assert!(!state.player.dead);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.scroll_speed(), 2.0);
    }

    #[test]
    fn test_fly_mode_platform_contact_is_fatal() {
        let mut state = GameState::new(Settings::default());
        assert_eq!(state.settings.control_mode, ControlMode::Fly);
        state.restart();
        // Just above the player's head, scrolling down onto it
        state.spawner.spawn(
            &mut state.space,
            Vec2::new(400.0, 908.0),
            PlatformKind::Normal,
            Tags::PLATFORM,
        );

        for _ in 0..3 {
            tick(&mut state, &TickInput::default());
            assert!(!state.player.dead);
        }
        tick(&mut state, &TickInput::default());
        assert!(state.player.dead);
        assert_eq!(state.phase, GamePhase::Dead);
        assert_eq!(state.scroll_speed(), 0.0);
        assert_eq!(state.player_pos(), Vec2::new(400.0, 928.0));
    }

    #[test]
    fn test_debug_toggle() {
        let mut state = GameState::new(Settings::default());
        let toggle = TickInput {
            debug: true,
            ..Default::default()
        };
        tick(&mut state, &toggle);
        assert!(state.debug);
        tick(&mut state, &toggle);
        assert!(!state.debug);
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed and inputs must match exactly
        let mut state1 = GameState::new(Settings::default());
        let mut state2 = GameState::new(Settings::default());

        let script = [
            restart(),
            TickInput {
                left: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                up: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..600 {
            let input = &script[i % script.len()];
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player_pos(), state2.player_pos());
        assert_eq!(state1.score, state2.score);
        assert_eq!(platform_positions(&state1), platform_positions(&state2));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut state1 = GameState::new(Settings::default());
        let mut state2 = GameState::new(Settings {
            seed: 1234,
            ..Settings::default()
        });
        tick(&mut state1, &restart());
        tick(&mut state2, &restart());
        assert_ne!(platform_positions(&state1), platform_positions(&state2));
    }
}
