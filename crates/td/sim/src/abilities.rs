//! Enemy abilities: one-time stat adjustments at construction plus
//! per-tick behaviors driven by the enemy update system.
//!
//! Behaviors run against the whole simulation state so they can scan the
//! roster (healer), insert new enemies (summoner, boss) and draw from the
//! match rng. While an enemy is silenced its ability timers freeze; the
//! one exception is a dash already in flight, which still counts down so
//! the speed boost does not become permanent.

use glam::Vec2;

use crate::enemy::Enemy;
use crate::events::TdEvent;
use crate::world::{EnemyId, TdState};
use rand::Rng;

const FAST_SPEED_BONUS: f32 = 30.0;
const RANGED_RANGE_BONUS: f32 = 50.0;
const TANK_ARMOR_BONUS: f32 = 4.0;
const TANK_SPEED_PENALTY: f32 = 15.0;

const HEALER_AMOUNT: f32 = 5.0;
const HEALER_RANGE: f32 = 150.0;
const HEALER_COOLDOWN: f32 = 3.0;

const SUMMON_DETOUR_RADIUS: f32 = 30.0;
const SUMMON_TEMPLATE: &str = "minion";
const SUMMON_COUNT: u32 = 4;
const SUMMON_COOLDOWN: f32 = 6.0;
const SUMMON_ELITE_TEMPLATE: &str = "juggernaut";
const SUMMON_ELITE_COOLDOWN: f32 = 5.3;

const BOSS_SUMMON_TEMPLATE: &str = "minion";
const BOSS_SUMMON_COUNT: u32 = 7;
const BOSS_SUMMON_RADIUS: f32 = 40.0;
const BOSS_PHASE_COOLDOWN_MIN: f32 = 1.0;
const BOSS_PHASE_COOLDOWN_MAX: f32 = 3.0;
const GLITCH_INTERVAL: f32 = 0.15;
const GLITCH_LIFETIME: f32 = 0.3;
const GLITCHES_PER_STAGE: u32 = 3;

#[derive(Clone, Debug)]
pub struct HealerState {
    pub timer: f32,
}

#[derive(Clone, Debug)]
pub struct SummonerState {
    pub template: String,
    pub count: u32,
    pub cooldown: f32,
    pub timer: f32,
}

#[derive(Clone, Debug)]
pub struct DashState {
    pub speed_multiplier: f32,
    pub dash_duration: f32,
    pub cooldown: f32,
    pub timer: f32,
    pub dash_timer: f32,
    pub dashing: bool,
    pub original_speed: f32,
}

impl DashState {
    fn new(speed_multiplier: f32, dash_duration: f32, cooldown: f32) -> Self {
        Self {
            speed_multiplier,
            dash_duration,
            cooldown,
            timer: 0.0,
            dash_timer: 0.0,
            dashing: false,
            original_speed: 0.0,
        }
    }
}

/// One-way escalation: Lurking -> Revealed -> Enraged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossStage {
    Lurking,
    Revealed,
    Enraged,
}

impl BossStage {
    pub fn value(self) -> u32 {
        match self {
            Self::Lurking => 1,
            Self::Revealed => 2,
            Self::Enraged => 20,
        }
    }
}

/// Short-lived visual artifact the boss scatters across the arena.
#[derive(Clone, Copy, Debug)]
pub struct Glitch {
    pub pos: Vec2,
    pub size: f32,
    pub remaining: f32,
}

#[derive(Clone, Debug)]
pub struct BossState {
    pub stage: BossStage,
    pub phase_timer: f32,
    pub phase_cooldown: f32,
    pub glitch_timer: f32,
    pub glitches: Vec<Glitch>,
}

#[derive(Clone, Debug)]
pub enum Ability {
    Fast,
    MagicResistant,
    Ranged,
    Tank,
    Invisible,
    Healer(HealerState),
    Summoner(SummonerState),
    Dash(DashState),
    Boss(BossState),
}

impl Ability {
    /// Resolves template ability names; unknown names are logged and
    /// dropped so a bad template degrades instead of failing the match.
    pub fn from_names(names: &[String]) -> Vec<Ability> {
        let mut abilities = Vec::with_capacity(names.len());
        for name in names {
            match Self::from_name(name) {
                Some(ability) => abilities.push(ability),
                None => tracing::warn!(ability = %name, "unknown enemy ability, skipping"),
            }
        }
        abilities
    }

    pub fn from_name(name: &str) -> Option<Ability> {
        match name {
            "fast" => Some(Ability::Fast),
            "magic_resistant" => Some(Ability::MagicResistant),
            "ranged" => Some(Ability::Ranged),
            "tank" => Some(Ability::Tank),
            "invisible" => Some(Ability::Invisible),
            "healer" => Some(Ability::Healer(HealerState { timer: 0.0 })),
            "summoner" => Some(Ability::Summoner(SummonerState {
                template: SUMMON_TEMPLATE.to_owned(),
                count: SUMMON_COUNT,
                cooldown: SUMMON_COOLDOWN,
                timer: 0.0,
            })),
            "summoner_elite" => Some(Ability::Summoner(SummonerState {
                template: SUMMON_ELITE_TEMPLATE.to_owned(),
                count: 1,
                cooldown: SUMMON_ELITE_COOLDOWN,
                timer: 0.0,
            })),
            "dash" => Some(Ability::Dash(DashState::new(4.0, 1.0, 3.0))),
            "dash_slow" => Some(Ability::Dash(DashState::new(4.0, 10.0, 10.0))),
            "boss" => Some(Ability::Boss(BossState {
                stage: BossStage::Lurking,
                phase_timer: 0.0,
                phase_cooldown: 2.0,
                glitch_timer: 0.0,
                glitches: Vec::new(),
            })),
            _ => None,
        }
    }

    /// One-time stat adjustment at enemy construction.
    pub fn apply(&mut self, enemy: &mut Enemy) {
        match self {
            Ability::Fast => enemy.speed += FAST_SPEED_BONUS,
            Ability::MagicResistant => enemy.magic_resistance = f32::INFINITY,
            Ability::Ranged => enemy.attack_range += RANGED_RANGE_BONUS,
            Ability::Tank => {
                enemy.armor += TANK_ARMOR_BONUS;
                enemy.max_health *= 2.0;
                enemy.health *= 2.0;
                enemy.speed = (enemy.speed - TANK_SPEED_PENALTY).max(0.0);
            }
            Ability::Invisible => enemy.is_invisible = true,
            Ability::Boss(_) => enemy.is_invisible = true,
            Ability::Healer(_) | Ability::Summoner(_) | Ability::Dash(_) => {}
        }
    }

    /// Per-tick behavior. `self_id` is the owning enemy; its ability list
    /// is detached while this runs, so roster access never aliases.
    pub fn on_update(
        &mut self,
        self_id: EnemyId,
        state: &mut TdState,
        dt: f32,
        events: &mut Vec<TdEvent>,
    ) {
        match self {
            Ability::Fast
            | Ability::MagicResistant
            | Ability::Ranged
            | Ability::Tank
            | Ability::Invisible => {}
            Ability::Healer(healer) => update_healer(healer, self_id, state, dt, events),
            Ability::Summoner(summoner) => update_summoner(summoner, self_id, state, dt, events),
            Ability::Dash(dash) => update_dash(dash, self_id, state, dt, events),
            Ability::Boss(boss) => update_boss(boss, self_id, state, dt, events),
        }
    }
}

fn update_healer(
    healer: &mut HealerState,
    self_id: EnemyId,
    state: &mut TdState,
    dt: f32,
    events: &mut Vec<TdEvent>,
) {
    let self_pos = match state.world.enemies.get(self_id) {
        Some(e) if !e.silence.active => e.pos,
        _ => return,
    };

    healer.timer += dt;
    if healer.timer < HEALER_COOLDOWN {
        return;
    }
    healer.timer = 0.0;

    // Most wounded ally (lowest health ratio) in range, self excluded.
    let mut best: Option<(EnemyId, f32)> = None;
    for (id, enemy) in state.world.enemies.iter() {
        if id == self_id || enemy.is_dead() || enemy.health >= enemy.max_health {
            continue;
        }
        if self_pos.distance(enemy.pos) > HEALER_RANGE {
            continue;
        }
        let ratio = enemy.health / enemy.max_health;
        if best.map_or(true, |(_, r)| ratio < r) {
            best = Some((id, ratio));
        }
    }

    if let Some((id, _)) = best {
        if let Some(enemy) = state.world.enemies.get_mut(id) {
            let healed = (enemy.health + HEALER_AMOUNT).min(enemy.max_health) - enemy.health;
            enemy.health += healed;
            events.push(TdEvent::EnemyHealed {
                enemy: id,
                amount: healed,
            });
        }
    }
}

fn update_summoner(
    summoner: &mut SummonerState,
    self_id: EnemyId,
    state: &mut TdState,
    dt: f32,
    events: &mut Vec<TdEvent>,
) {
    match state.world.enemies.get(self_id) {
        Some(e) if !e.silence.active => {}
        _ => return,
    }

    summoner.timer += dt;
    if summoner.timer < summoner.cooldown {
        return;
    }
    summoner.timer = 0.0;

    let count = summon_near(
        state,
        self_id,
        &summoner.template,
        summoner.count,
        SUMMON_DETOUR_RADIUS,
        true,
    );
    if count > 0 {
        events.push(TdEvent::EnemiesSummoned {
            by: self_id,
            count,
        });
    }
}

fn update_dash(
    dash: &mut DashState,
    self_id: EnemyId,
    state: &mut TdState,
    dt: f32,
    events: &mut Vec<TdEvent>,
) {
    let Some(enemy) = state.world.enemies.get_mut(self_id) else {
        return;
    };

    if dash.dashing {
        // Runs even while silenced: the boost must expire on schedule.
        dash.dash_timer += dt;
        if dash.dash_timer >= dash.dash_duration {
            enemy.speed = dash.original_speed;
            dash.dashing = false;
            dash.dash_timer = 0.0;
            dash.timer = 0.0;
        }
        return;
    }

    if enemy.silence.active {
        return;
    }
    dash.timer += dt;
    if dash.timer >= dash.cooldown {
        dash.original_speed = enemy.speed;
        enemy.speed *= dash.speed_multiplier;
        dash.dashing = true;
        dash.dash_timer = 0.0;
        events.push(TdEvent::DashStarted { enemy: self_id });
    }
}

fn update_boss(
    boss: &mut BossState,
    self_id: EnemyId,
    state: &mut TdState,
    dt: f32,
    events: &mut Vec<TdEvent>,
) {
    let health_frac = match state.world.enemies.get(self_id) {
        Some(e) if !e.silence.active => e.health / e.max_health,
        _ => return,
    };

    // Escalation is one-way; healing back above a threshold never
    // restores an earlier stage.
    if health_frac < 0.8 && boss.stage == BossStage::Lurking {
        boss.stage = BossStage::Revealed;
        reveal(state, self_id);
        events.push(TdEvent::BossPhaseChanged {
            enemy: self_id,
            stage: boss.stage.value(),
        });
    }
    if health_frac < 0.6 && boss.stage != BossStage::Enraged {
        boss.stage = BossStage::Enraged;
        reveal(state, self_id);
        events.push(TdEvent::BossPhaseChanged {
            enemy: self_id,
            stage: boss.stage.value(),
        });
    }

    if boss.stage != BossStage::Lurking {
        boss.phase_timer += dt;
        if boss.phase_timer >= boss.phase_cooldown {
            boss.phase_timer = 0.0;
            boss.phase_cooldown = state
                .rng
                .gen_range(BOSS_PHASE_COOLDOWN_MIN, BOSS_PHASE_COOLDOWN_MAX);

            if let Some(enemy) = state.world.enemies.get_mut(self_id) {
                if enemy.curr_waypoint > 0 {
                    enemy.curr_waypoint -= 1;
                    enemy.pos = enemy.waypoints[enemy.curr_waypoint];
                }
            }
            let count = summon_near(
                state,
                self_id,
                BOSS_SUMMON_TEMPLATE,
                BOSS_SUMMON_COUNT,
                BOSS_SUMMON_RADIUS,
                false,
            );
            if count > 0 {
                events.push(TdEvent::EnemiesSummoned {
                    by: self_id,
                    count,
                });
            }
        }

        boss.glitch_timer += dt;
        if boss.glitch_timer >= GLITCH_INTERVAL {
            boss.glitch_timer = 0.0;
            let count = boss.stage.value() * GLITCHES_PER_STAGE;
            for _ in 0..count {
                let x = state.rng.gen_range(0.0, state.config.arena_width);
                let y = state.rng.gen_range(0.0, state.config.arena_height);
                let size = state.rng.gen_range(10.0f32, 40.0);
                boss.glitches.push(Glitch {
                    pos: Vec2::new(x, y),
                    size,
                    remaining: GLITCH_LIFETIME,
                });
            }
            events.push(TdEvent::BossGlitchBurst {
                enemy: self_id,
                count,
            });
        }
    }

    for glitch in &mut boss.glitches {
        glitch.remaining -= dt;
    }
    boss.glitches.retain(|g| g.remaining > 0.0);
}

fn reveal(state: &mut TdState, id: EnemyId) {
    if let Some(enemy) = state.world.enemies.get_mut(id) {
        enemy.is_invisible = false;
    }
}

/// Inserts `count` copies of a template around an existing enemy. With
/// `detour` set, each summon wanders through random points before
/// rejoining the summoner's remaining route. Returns how many spawned.
fn summon_near(
    state: &mut TdState,
    around: EnemyId,
    template_name: &str,
    count: u32,
    radius: f32,
    detour: bool,
) -> u32 {
    let Some(template) = state.config.enemy_templates.get(template_name).cloned() else {
        tracing::warn!(template = template_name, "summon references unknown enemy template");
        return 0;
    };
    let (origin, rest) = match state.world.enemies.get(around) {
        Some(e) => (
            e.pos,
            e.waypoints[e.curr_waypoint.min(e.waypoints.len())..].to_vec(),
        ),
        None => return 0,
    };

    for _ in 0..count {
        let mut waypoints = Vec::new();
        if detour {
            for _ in 0..2 {
                let angle = state.rng.gen_range(0.0f32, std::f32::consts::TAU);
                waypoints.push(origin + Vec2::from_angle(angle) * radius);
            }
        }
        waypoints.extend(rest.iter().copied());

        let mut enemy = Enemy::from_template(&template, waypoints);
        let angle = state.rng.gen_range(0.0f32, std::f32::consts::TAU);
        let offset = state.rng.gen_range(0.0, radius);
        enemy.pos = origin + Vec2::from_angle(angle) * offset;
        state.world.enemies.insert(enemy);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use td_types::{EnemyTemplate, Rgb, Shape};

    fn template_with(abilities: &[&str]) -> EnemyTemplate {
        EnemyTemplate {
            health: 100.0,
            speed: 40.0,
            armor: 1.0,
            magic_resistance: 0.0,
            attack_range: 50.0,
            attack_speed: 1.0,
            damage: 10.0,
            gold_reward: 5,
            abilities: abilities.iter().map(|s| s.to_string()).collect(),
            shape: Shape::Circle,
            color: Rgb::default(),
            radius: 10.0,
        }
    }

    fn build(abilities: &[&str]) -> Enemy {
        Enemy::from_template(&template_with(abilities), vec![Vec2::ZERO, Vec2::new(100.0, 0.0)])
    }

    #[test]
    fn fast_raises_speed() {
        let enemy = build(&["fast"]);
        assert_eq!(enemy.speed, 40.0 + FAST_SPEED_BONUS);
    }

    #[test]
    fn tank_stacks_all_adjustments() {
        let enemy = build(&["tank"]);
        assert_eq!(enemy.armor, 5.0);
        assert_eq!(enemy.health, 200.0);
        assert_eq!(enemy.max_health, 200.0);
        assert_eq!(enemy.speed, 40.0 - TANK_SPEED_PENALTY);
    }

    #[test]
    fn magic_resistant_is_infinite() {
        let enemy = build(&["magic_resistant"]);
        assert!(enemy.magic_resistance.is_infinite());
    }

    #[test]
    fn boss_starts_invisible() {
        let enemy = build(&["boss"]);
        assert!(enemy.is_invisible);
        assert!(matches!(
            enemy.abilities.as_slice(),
            [Ability::Boss(BossState {
                stage: BossStage::Lurking,
                ..
            })]
        ));
    }

    #[test]
    fn unknown_ability_names_are_dropped() {
        let enemy = build(&["fast", "does_not_exist", "invisible"]);
        assert_eq!(enemy.abilities.len(), 2);
        assert!(enemy.is_invisible);
    }

    #[test]
    fn stage_values_escalate() {
        assert_eq!(BossStage::Lurking.value(), 1);
        assert_eq!(BossStage::Revealed.value(), 2);
        assert_eq!(BossStage::Enraged.value(), 20);
    }
}
