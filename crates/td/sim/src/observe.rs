//! Builds the serializable snapshot external observers consume.

use slotmap::Key;
use td_types::{EnemyInfo, ProjectileInfo, TdObservation, TowerInfo, WaveStatus};

use crate::economy::Resource;
use crate::world::{GamePhase, TdState};

pub fn snapshot(state: &TdState) -> TdObservation {
    let enemies = state
        .world
        .enemies
        .iter()
        .map(|(id, enemy)| EnemyInfo {
            id: id.data().as_ffi().to_string(),
            x: enemy.pos.x,
            y: enemy.pos.y,
            health: enemy.health,
            max_health: enemy.max_health,
            invisible: enemy.is_invisible,
            silenced: enemy.silence.active,
            shape: enemy.shape,
            color: enemy.color,
            radius: enemy.radius,
        })
        .collect();

    let towers = state
        .world
        .towers
        .iter()
        .map(|(id, tower)| TowerInfo {
            id: id.data().as_ffi().to_string(),
            x: tower.pos.x,
            y: tower.pos.y,
            preset: tower.preset.clone(),
            facing: tower.facing,
            range: tower.stats.range,
            magazine_shots: tower.current_magazine_shots,
            reloading_magazine: tower.is_reloading_magazine,
        })
        .collect();

    let projectiles = state
        .world
        .projectiles
        .values()
        .map(|proj| ProjectileInfo {
            x: proj.pos.x,
            y: proj.pos.y,
            explosive: proj.explosive,
        })
        .collect();

    TdObservation {
        tick: state.tick,
        ticks_per_second: state.config.tick_hz,
        game_speed: state.game_speed,
        phase: phase_name(state.phase).to_owned(),
        current_wave: state.current_wave,
        waves_total: state.waves.len(),
        wave_status: wave_status(state),
        gold: state.resources.get(Resource::Gold),
        wood: state.resources.get(Resource::Wood),
        metal: state.resources.get(Resource::Metal),
        health: state.resources.get(Resource::Health),
        enemies,
        towers,
        projectiles,
    }
}

fn phase_name(phase: GamePhase) -> &'static str {
    match phase {
        GamePhase::Build => "build",
        GamePhase::Wave => "wave",
        GamePhase::Victory => "victory",
        GamePhase::Defeat => "defeat",
    }
}

fn wave_status(state: &TdState) -> WaveStatus {
    if state.phase != GamePhase::Wave || !state.spawner.is_active() {
        return WaveStatus::Idle;
    }
    if state.spawner.prep_remaining() > 0.0 {
        return WaveStatus::Prep {
            remaining: state.spawner.prep_remaining(),
        };
    }
    match state.waves.get(state.current_wave) {
        Some(wave) if !state.spawner.all_spawned(wave) => {
            let (group, spawned_in_group) = state.spawner.progress();
            WaveStatus::Spawning {
                group,
                spawned_in_group,
            }
        }
        _ => WaveStatus::Clearing,
    }
}
