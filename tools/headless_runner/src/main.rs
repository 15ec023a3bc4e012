//! Runs a full match against the default level with a scripted player:
//! builds a small defense, starts every wave as soon as the build phase
//! opens, and logs the event stream. Useful for smoke-testing balance
//! changes without a client.
//!
//! Usage: headless_runner [seed]

use sim_core::ActionEnvelope;
use sim_host::MatchHost;
use sim_td::{GamePhase, Resource, TdAction, TdConfig, TdGame};

const MAX_TICKS: u64 = 20 * 60 * 20; // 20 minutes of simulated time

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let config = TdConfig::default();
    let tick_hz = config.tick_hz;
    let mut host: MatchHost<TdGame> = MatchHost::new(config, seed, tick_hz);
    let player = host.join_player();
    tracing::info!(seed, tick_hz, "match starting");

    let mut action_id = 0;
    let mut submit = |host: &mut MatchHost<TdGame>, action: TdAction| {
        action_id += 1;
        host.submit(ActionEnvelope {
            player_id: player,
            action_id,
            intended_tick: 0,
            payload: action,
        });
    };

    // Opening build: one catch-all tower near the first bend, a sniper
    // covering the long middle leg.
    submit(
        &mut host,
        TdAction::PlaceTower {
            x: 240.0,
            y: 220.0,
            preset: "arrow".to_owned(),
        },
    );
    submit(
        &mut host,
        TdAction::PlaceTower {
            x: 340.0,
            y: 180.0,
            preset: "sniper".to_owned(),
        },
    );

    let mut last_started_wave = None;
    let mut bought_cannon = false;

    loop {
        let Some(events) = host.step_one_tick() else {
            break;
        };
        for event in &events {
            tracing::info!(tick = host.current_tick(), ?event, "event");
        }
        if host.current_tick() >= MAX_TICKS {
            tracing::warn!("tick budget exhausted before the match ended");
            break;
        }

        let (phase, gold, current_wave) = {
            let state = host.game().state();
            (
                state.phase,
                state.resources.get(Resource::Gold),
                state.current_wave,
            )
        };
        if phase != GamePhase::Build {
            continue;
        }

        // Reinvest between waves, then send the next one.
        if !bought_cannon && gold >= 180 {
            bought_cannon = true;
            submit(
                &mut host,
                TdAction::PlaceTower {
                    x: 440.0,
                    y: 280.0,
                    preset: "cannon".to_owned(),
                },
            );
            submit(
                &mut host,
                TdAction::PlaceFactory {
                    preset: "sawmill".to_owned(),
                },
            );
        }
        if last_started_wave != Some(current_wave) {
            last_started_wave = Some(current_wave);
            submit(&mut host, TdAction::StartWave);
        }
    }

    let state = host.game().state();
    println!(
        "outcome: {:?} after {} ticks (wave {}/{}, gold {}, health {})",
        host.is_terminal(),
        host.current_tick(),
        state.current_wave,
        state.waves.len(),
        state.resources.get(Resource::Gold),
        state.resources.get(Resource::Health),
    );
}
