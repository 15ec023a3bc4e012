//! `Game` implementation wiring actions, systems and terminal detection
//! into the host-driven tick loop.

use glam::Vec2;
use sim_core::{ActionEnvelope, Game, PlayerId, TerminalOutcome, Tick};
use td_types::TdObservation;

use crate::actions::TdAction;
use crate::config::TdConfig;
use crate::economy::{Factory, Resource};
use crate::events::TdEvent;
use crate::player_abilities;
use crate::systems;
use crate::tower::Tower;
use crate::world::{GamePhase, TdState};

const MIN_GAME_SPEED: f32 = 0.25;
const MAX_GAME_SPEED: f32 = 4.0;

pub struct TdGame {
    state: TdState,
}

impl TdGame {
    pub fn state(&self) -> &TdState {
        &self.state
    }
}

impl Game for TdGame {
    type Config = TdConfig;
    type Action = TdAction;
    type Observation = TdObservation;
    type Event = TdEvent;

    fn new(config: TdConfig, seed: u64) -> Self {
        Self {
            state: TdState::new(config, seed),
        }
    }

    fn step(
        &mut self,
        tick: Tick,
        actions: &[ActionEnvelope<TdAction>],
        out_events: &mut Vec<TdEvent>,
    ) {
        let state = &mut self.state;
        state.tick = tick;
        if matches!(state.phase, GamePhase::Victory | GamePhase::Defeat) {
            return;
        }

        for envelope in actions {
            apply_action(state, &envelope.payload, out_events);
        }

        let wave_complete = systems::update_wave(state, out_events);
        systems::update_enemies(state, out_events);
        let dt = state.dt();
        player_abilities::update(state, dt, out_events);
        systems::update_towers(state);
        systems::update_projectiles(state);
        systems::housekeep_projectiles(state);
        systems::housekeep_enemies(state, out_events);
        if wave_complete {
            systems::finish_wave(state, out_events);
        }

        if state.phase != GamePhase::Victory && state.resources.get(Resource::Health) == 0 {
            state.phase = GamePhase::Defeat;
            out_events.push(TdEvent::GameOver { won: false });
        }
    }

    fn observe(&self, _tick: Tick, _player: PlayerId) -> TdObservation {
        crate::observe::snapshot(&self.state)
    }

    fn is_terminal(&self) -> Option<TerminalOutcome> {
        match self.state.phase {
            GamePhase::Victory => Some(TerminalOutcome::Win),
            GamePhase::Defeat => Some(TerminalOutcome::Lose),
            GamePhase::Build | GamePhase::Wave => None,
        }
    }
}

fn apply_action(state: &mut TdState, action: &TdAction, events: &mut Vec<TdEvent>) {
    match action {
        TdAction::StartWave => {
            if !systems::start_wave(state, events) {
                tracing::warn!("start_wave ignored: wave running or none left");
            }
        }
        TdAction::PlaceTower { x, y, preset } => {
            let Some(def) = state.config.tower_presets.get(preset).cloned() else {
                tracing::warn!(preset = %preset, "unknown tower preset");
                return;
            };
            if !state.resources.spend_multiple(&def.cost) {
                events.push(TdEvent::ResourcesInsufficient { cost: def.cost });
                return;
            }
            let tower = Tower::from_preset(preset, &def, Vec2::new(*x, *y));
            let id = state.world.towers.insert(tower);
            events.push(TdEvent::TowerBuilt {
                tower: id,
                preset: preset.clone(),
            });
        }
        TdAction::UpgradeTower { tower } => {
            let (preset_name, upgraded) = match state.world.towers.get(*tower) {
                Some(t) => (t.preset.clone(), t.upgraded),
                None => {
                    tracing::warn!("upgrade targets a tower that no longer exists");
                    return;
                }
            };
            if upgraded {
                tracing::warn!(preset = %preset_name, "tower already upgraded");
                return;
            }
            let upgrade = state
                .config
                .tower_presets
                .get(&preset_name)
                .and_then(|p| p.upgrade.clone());
            let Some(upgrade) = upgrade else {
                tracing::warn!(preset = %preset_name, "preset has no upgrade");
                return;
            };
            if !state.resources.spend_multiple(&upgrade.cost) {
                events.push(TdEvent::ResourcesInsufficient {
                    cost: upgrade.cost,
                });
                return;
            }
            if let Some(t) = state.world.towers.get_mut(*tower) {
                t.stats.apply_upgrade(&upgrade);
                t.current_magazine_shots = t.current_magazine_shots.min(t.stats.magazine_size);
                t.upgraded = true;
            }
            events.push(TdEvent::TowerUpgraded { tower: *tower });
        }
        TdAction::PlaceFactory { preset } => {
            let Some(def) = state.config.factory_presets.get(preset).cloned() else {
                tracing::warn!(preset = %preset, "unknown factory preset");
                return;
            };
            let Some(resource) = Resource::from_name(&def.resource) else {
                tracing::warn!(resource = %def.resource, "factory preset names unknown resource");
                return;
            };
            if !state.resources.spend_multiple(&def.cost) {
                events.push(TdEvent::ResourcesInsufficient { cost: def.cost });
                return;
            }
            state.factories.push(Factory {
                preset: preset.clone(),
                resource,
                payout_per_wave: def.payout_per_wave,
            });
            events.push(TdEvent::FactoryBuilt {
                preset: preset.clone(),
            });
        }
        TdAction::UseAbility { ability, x, y } => {
            player_abilities::activate(state, *ability, Vec2::new(*x, *y), events);
        }
        TdAction::SetGameSpeed { speed } => {
            let clamped = speed.clamp(MIN_GAME_SPEED, MAX_GAME_SPEED);
            state.game_speed = clamped;
            events.push(TdEvent::GameSpeedChanged { speed: clamped });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game() -> TdGame {
        TdGame::new(TdConfig::default(), 42)
    }

    fn act(game: &mut TdGame, tick: Tick, action: TdAction) -> Vec<TdEvent> {
        let mut events = Vec::new();
        let envelope = ActionEnvelope {
            player_id: 0,
            action_id: 1,
            intended_tick: tick,
            payload: action,
        };
        game.step(tick, std::slice::from_ref(&envelope), &mut events);
        events
    }

    #[test]
    fn place_tower_pays_and_inserts() {
        let mut game = new_game();
        let events = act(
            &mut game,
            1,
            TdAction::PlaceTower {
                x: 220.0,
                y: 150.0,
                preset: "arrow".to_owned(),
            },
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::TowerBuilt { .. })));
        assert_eq!(game.state().world.towers.len(), 1);
        assert_eq!(game.state().resources.get(Resource::Gold), 100);
    }

    #[test]
    fn place_tower_rejected_when_broke() {
        let mut game = new_game();
        for _ in 0..3 {
            act(
                &mut game,
                1,
                TdAction::PlaceTower {
                    x: 220.0,
                    y: 150.0,
                    preset: "sniper".to_owned(),
                },
            );
        }
        // 150 gold buys one 90g sniper; the second fails on gold.
        assert_eq!(game.state().world.towers.len(), 1);
    }

    #[test]
    fn upgrade_applies_once() {
        let mut game = new_game();
        let events = act(
            &mut game,
            1,
            TdAction::PlaceTower {
                x: 220.0,
                y: 150.0,
                preset: "arrow".to_owned(),
            },
        );
        let tower = events
            .iter()
            .find_map(|e| match e {
                TdEvent::TowerBuilt { tower, .. } => Some(*tower),
                _ => None,
            })
            .unwrap();

        let events = act(&mut game, 2, TdAction::UpgradeTower { tower });
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::TowerUpgraded { .. })));
        let stats = &game.state().world.towers[tower].stats;
        assert_eq!(stats.damage, 20.0);
        assert_eq!(stats.range, 165.0);

        // Second upgrade is refused and charges nothing.
        let gold = game.state().resources.get(Resource::Gold);
        let events = act(&mut game, 3, TdAction::UpgradeTower { tower });
        assert!(!events
            .iter()
            .any(|e| matches!(e, TdEvent::TowerUpgraded { .. })));
        assert_eq!(game.state().resources.get(Resource::Gold), gold);
    }

    #[test]
    fn game_speed_is_clamped() {
        let mut game = new_game();
        act(&mut game, 1, TdAction::SetGameSpeed { speed: 100.0 });
        assert_eq!(game.state().game_speed, MAX_GAME_SPEED);
        act(&mut game, 2, TdAction::SetGameSpeed { speed: 0.0 });
        assert_eq!(game.state().game_speed, MIN_GAME_SPEED);
    }

    #[test]
    fn factory_build_spends_resources() {
        let mut game = new_game();
        let events = act(
            &mut game,
            1,
            TdAction::PlaceFactory {
                preset: "sawmill".to_owned(),
            },
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::FactoryBuilt { .. })));
        assert_eq!(game.state().factories.len(), 1);
        assert_eq!(game.state().resources.get(Resource::Gold), 90);
    }

    #[test]
    fn terminal_states_freeze_the_game() {
        let mut game = new_game();
        game.state.phase = GamePhase::Defeat;
        let mut events = Vec::new();
        game.step(5, &[], &mut events);
        assert!(events.is_empty());
        assert_eq!(game.is_terminal(), Some(TerminalOutcome::Lose));
    }
}
