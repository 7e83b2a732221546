//! Hextower headless runner
//!
//! Runs a scripted session without a window and reports the outcome.
//!
//! Usage: `hextower [settings.json|-] [ticks] [jump|fly]`

use std::fs;

use anyhow::{Context, Result, bail};

use hextower::Settings;
use hextower::consts::TICKS_PER_SECOND;
use hextower::settings::ControlMode;
use hextower::sim::{GamePhase, GameState, TickInput, tick};
use hextower::view::{Layer, View};

const DEFAULT_TICKS: u64 = 60 * 60;
/// Ticks spent walking in one direction before turning around
const SWEEP_TICKS: u64 = 90;

fn load_settings(path: Option<&str>) -> Result<Settings> {
    match path {
        None | Some("-") => Ok(Settings::default()),
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading settings from {path}"))?;
            Settings::from_json(&json).with_context(|| format!("loading settings from {path}"))
        }
    }
}

/// Scripted input: restart whenever possible, walk back and forth, hop now
/// and then
fn scripted_input(state: &GameState) -> TickInput {
    let t = state.time_ticks;
    let rightward = (t / SWEEP_TICKS) % 2 == 0;
    TickInput {
        left: !rightward,
        right: rightward,
        jump: t % 45 == 0,
        restart: state.phase.can_restart(),
        ..Default::default()
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut settings = load_settings(args.first().map(String::as_str))?;
    let ticks = match args.get(1) {
        Some(n) => n.parse::<u64>().with_context(|| format!("invalid tick count `{n}`"))?,
        None => DEFAULT_TICKS,
    };
    if let Some(mode) = args.get(2) {
        let Some(mode) = ControlMode::from_str(mode) else {
            bail!("unknown control mode `{mode}` (expected jump or fly)");
        };
        settings.control_mode = mode;
    }

    log::info!(
        "Hextower starting: seed {}, {} ticks, {} mode",
        settings.seed,
        ticks,
        settings.control_mode.as_str()
    );

    let mut state = GameState::new(settings);
    let mut view = View::new(&state);
    let mut deaths = 0u32;
    let mut best = 0u32;

    for _ in 0..ticks {
        let input = scripted_input(&state);
        let was_dead = state.phase == GamePhase::Dead;
        tick(&mut state, &input);
        view.update(&state, &input);

        let hud = state.hud();
        best = best.max(hud.score);
        if state.phase == GamePhase::Dead && !was_dead {
            deaths += 1;
        }
        if state.time_ticks % (TICKS_PER_SECOND as u64 * 10) == 0 {
            let visible = view
                .drawables(&state)
                .iter()
                .filter(|d| d.layer != Layer::Invisible)
                .count();
            log::info!(
                "t={}s score={} difficulty={} speed={:.1} platforms={} visible={}",
                state.time_ticks / TICKS_PER_SECOND as u64,
                hud.score,
                hud.difficulty,
                hud.scroll_speed,
                state.spawner.live_count(),
                visible
            );
        }
    }

    let hud = state.hud();
    println!("{}", serde_json::to_string_pretty(&hud)?);
    println!("deaths: {deaths}, best score: {best}");
    Ok(())
}
