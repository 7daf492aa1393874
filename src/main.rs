//! Chaotic Hegemony headless duel
//!
//! Runs a scripted duel against the simulation core and logs the outcome.
//! Pass a settings JSON path as the first argument to override the stock duel.

use std::path::PathBuf;

use chaotic_hegemony::CombatSettings;
use chaotic_hegemony::sim::{CombatState, InputFlags, ManualClock, PlayerSlot, TickInput, tick};

/// Frames to run before giving up on a decision
const MAX_FRAMES: u64 = 64 * 120;

fn main() {
    env_logger::init();
    log::info!("Chaotic Hegemony (headless) starting...");

    let settings = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => match CombatSettings::load(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        None => CombatSettings::default(),
    };

    let mut state = CombatState::new(&settings);
    let clock = ManualClock::new(0);
    let frame_ms = settings.frame_ms();

    for frame in 0..MAX_FRAMES {
        tick(&mut state, &scripted_input(frame), &clock);
        for entity in &mut state.roster {
            entity.body.finish_draw();
        }
        clock.set(((frame + 1) as f64 * frame_ms) as u64);

        if frame % 64 == 0 {
            for slot in PlayerSlot::ALL {
                if let Some((body, ship)) = state.ship(slot) {
                    log::debug!(
                        "{:?}: pos ({:.1}, {:.1}) life {} energy {}",
                        slot,
                        body.pos.x,
                        body.pos.y,
                        body.life,
                        ship.energy
                    );
                }
            }
        }

        if let Some(victory) = state.victory {
            log::info!(
                "{:?} after {} frames ({} ms)",
                victory.outcome,
                state.frame_count,
                victory.decided_at_ms
            );
            return;
        }
    }

    log::info!("No decision after {} frames", state.frame_count);
}

/// Both pilots turn toward each other and fire in bursts
fn scripted_input(frame: u64) -> TickInput {
    let one = InputFlags {
        thrust: frame % 128 < 48,
        right: frame % 96 < 8,
        primary: frame % 32 < 16,
        ..Default::default()
    };
    let two = InputFlags {
        thrust: frame % 160 < 40,
        left: frame % 80 < 6,
        primary: frame % 200 < 4,
        ..Default::default()
    };
    TickInput::default()
        .for_player(PlayerSlot::One, one)
        .for_player(PlayerSlot::Two, two)
}
