//! Player-cast area abilities: an instant fireball plus three timed
//! ground effects (scanner, disruptor, glue).
//!
//! Scanner and glue re-apply every tick while their effect lasts, so an
//! enemy walking into the circle late is still affected. The disruptor
//! silences only the enemies inside at activation; its lingering state is
//! purely visual. Reveals and glue slows are permanent on the enemy even
//! after the effect expires.

use glam::Vec2;

use crate::abilities::Ability;
use crate::events::TdEvent;
use crate::world::TdState;
use td_types::ResourceCost;

const FIREBALL_RADIUS: f32 = 80.0;
const FIREBALL_DAMAGE: f32 = 100.0;
const FIREBALL_LINGER: f32 = 0.3;

const SCANNER_RADIUS: f32 = 150.0;
const SCANNER_DURATION: f32 = 5.0;

const DISRUPTOR_RADIUS: f32 = 120.0;
const DISRUPTOR_DURATION: f32 = 10.0;

const GLUE_RADIUS: f32 = 100.0;
const GLUE_DURATION: f32 = 5.0;
const GLUE_SLOW_FACTOR: f32 = 0.70;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerAbility {
    Fireball,
    Scanner,
    Disruptor,
    Glue,
}

impl PlayerAbility {
    pub fn cost(self) -> ResourceCost {
        let (gold, wood, metal) = match self {
            Self::Fireball => (70, 0, 0),
            Self::Scanner => (30, 15, 15),
            Self::Disruptor => (100, 30, 30),
            Self::Glue => (10, 50, 0),
        };
        ResourceCost { gold, wood, metal }
    }

    pub fn radius(self) -> f32 {
        match self {
            Self::Fireball => FIREBALL_RADIUS,
            Self::Scanner => SCANNER_RADIUS,
            Self::Disruptor => DISRUPTOR_RADIUS,
            Self::Glue => GLUE_RADIUS,
        }
    }
}

/// A placed circle with time left on it.
#[derive(Clone, Copy, Debug)]
pub struct AreaEffect {
    pub pos: Vec2,
    pub remaining: f32,
}

impl AreaEffect {
    fn tick(effect: &mut Option<AreaEffect>, dt: f32) {
        if let Some(inner) = effect {
            inner.remaining -= dt;
            if inner.remaining <= 0.0 {
                *effect = None;
            }
        }
    }
}

/// At most one live instance per ability; re-casting replaces it.
#[derive(Clone, Debug, Default)]
pub struct PlayerEffects {
    pub fireball: Option<AreaEffect>,
    pub scanner: Option<AreaEffect>,
    pub disruptor: Option<AreaEffect>,
    pub glue: Option<AreaEffect>,
}

/// Pays for and activates an ability at `pos`. Returns false (leaving
/// the ledger untouched) when the player cannot afford it.
pub fn activate(
    state: &mut TdState,
    ability: PlayerAbility,
    pos: Vec2,
    events: &mut Vec<TdEvent>,
) -> bool {
    let cost = ability.cost();
    if !state.resources.spend_multiple(&cost) {
        events.push(TdEvent::ResourcesInsufficient { cost });
        return false;
    }

    match ability {
        PlayerAbility::Fireball => {
            for enemy in state.world.enemies.values_mut() {
                if enemy.is_dead() || pos.distance(enemy.pos) > FIREBALL_RADIUS {
                    continue;
                }
                enemy.take_damage(FIREBALL_DAMAGE, td_types::DamageType::Physical);
            }
            state.player_effects.fireball = Some(AreaEffect {
                pos,
                remaining: FIREBALL_LINGER,
            });
        }
        PlayerAbility::Scanner => {
            state.player_effects.scanner = Some(AreaEffect {
                pos,
                remaining: SCANNER_DURATION,
            });
        }
        PlayerAbility::Disruptor => {
            // Only enemies inside at activation are silenced.
            for (id, enemy) in state.world.enemies.iter_mut() {
                if enemy.is_dead() || pos.distance(enemy.pos) > DISRUPTOR_RADIUS {
                    continue;
                }
                enemy.silence_for(DISRUPTOR_DURATION);
                events.push(TdEvent::EnemySilenced { enemy: id });
            }
            state.player_effects.disruptor = Some(AreaEffect {
                pos,
                remaining: DISRUPTOR_DURATION,
            });
        }
        PlayerAbility::Glue => {
            state.player_effects.glue = Some(AreaEffect {
                pos,
                remaining: GLUE_DURATION,
            });
        }
    }

    events.push(TdEvent::AbilityUsed { ability });
    true
}

/// Per-tick upkeep for the lingering effects.
pub fn update(state: &mut TdState, dt: f32, events: &mut Vec<TdEvent>) {
    if let Some(scanner) = state.player_effects.scanner {
        for (id, enemy) in state.world.enemies.iter_mut() {
            if !enemy.is_invisible || scanner.pos.distance(enemy.pos) > SCANNER_RADIUS {
                continue;
            }
            enemy.is_invisible = false;
            // The reveal is permanent: strip the ability so nothing can
            // re-cloak the enemy later.
            enemy
                .abilities
                .retain(|ability| !matches!(ability, Ability::Invisible));
            events.push(TdEvent::EnemyRevealed { enemy: id });
        }
    }

    if let Some(glue) = state.player_effects.glue {
        for (id, enemy) in state.world.enemies.iter_mut() {
            if enemy.was_glued || enemy.is_dead() || glue.pos.distance(enemy.pos) > GLUE_RADIUS {
                continue;
            }
            enemy.speed *= GLUE_SLOW_FACTOR;
            enemy.was_glued = true;
            events.push(TdEvent::EnemySlowed { enemy: id });
        }
    }

    AreaEffect::tick(&mut state.player_effects.fireball, dt);
    AreaEffect::tick(&mut state.player_effects.scanner, dt);
    AreaEffect::tick(&mut state.player_effects.disruptor, dt);
    AreaEffect::tick(&mut state.player_effects.glue, dt);
}
