//! Per-tick systems, called in a fixed order by the game step:
//! scheduler, enemies, player effects, towers, projectiles, then
//! housekeeping. The order is part of the simulation's semantics; tests
//! rely on it.

use crate::economy::Resource;
use crate::events::TdEvent;
use crate::world::{EnemyId, GamePhase, ProjectileId, TdState, TowerId};

/// Launches the next wave from the build phase. Returns false when there
/// is no wave to start or a wave is already running.
pub fn start_wave(state: &mut TdState, events: &mut Vec<TdEvent>) -> bool {
    if state.phase != GamePhase::Build || state.current_wave >= state.waves.len() {
        return false;
    }
    state.spawner.start(&state.waves[state.current_wave]);
    state.phase = GamePhase::Wave;
    events.push(TdEvent::WaveStarted {
        wave: state.current_wave,
    });
    true
}

/// Drives the spawn schedule. Returns true when the running wave has
/// fully resolved (everything spawned and the roster empty again).
pub fn update_wave(state: &mut TdState, events: &mut Vec<TdEvent>) -> bool {
    if state.phase != GamePhase::Wave {
        return false;
    }
    let dt = state.dt();
    let Some(wave) = state.waves.get(state.current_wave) else {
        return false;
    };
    state
        .spawner
        .update(dt, wave, &mut state.world.enemies, events)
}

/// Grants the wave payout plus factory production, then returns to the
/// build phase, or declares victory after the final wave.
pub fn finish_wave(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let payout = state.waves[state.current_wave].payout;
    let mut gold = payout.gold;
    let mut wood = payout.wood;
    let mut metal = payout.metal;
    for factory in &state.factories {
        match factory.resource {
            Resource::Gold => gold += factory.payout_per_wave,
            Resource::Wood => wood += factory.payout_per_wave,
            Resource::Metal => metal += factory.payout_per_wave,
            Resource::Health => {}
        }
    }
    state.resources.add(Resource::Gold, gold);
    state.resources.add(Resource::Wood, wood);
    state.resources.add(Resource::Metal, metal);
    for factory in &state.factories {
        if factory.resource == Resource::Health {
            state.resources.add(Resource::Health, factory.payout_per_wave);
        }
    }

    events.push(TdEvent::WaveCompleted {
        wave: state.current_wave,
        gold,
        wood,
        metal,
    });

    state.spawner.reset();
    state.current_wave += 1;
    if state.current_wave >= state.waves.len() {
        state.phase = GamePhase::Victory;
        events.push(TdEvent::GameOver { won: true });
    } else {
        state.phase = GamePhase::Build;
    }
}

/// Enemy upkeep: silence countdown, waypoint movement, then abilities.
/// Each enemy's ability list is detached while its behaviors run so they
/// can freely scan and mutate the roster (heal allies, summon adds).
pub fn update_enemies(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let dt = state.dt();
    let ids: Vec<EnemyId> = state.world.enemies.keys().collect();
    for id in ids {
        let Some(enemy) = state.world.enemies.get_mut(id) else {
            continue;
        };
        if enemy.is_dead() {
            continue;
        }
        enemy.update_silence(dt);
        enemy.advance(dt);

        let mut abilities = std::mem::take(&mut enemy.abilities);
        for ability in &mut abilities {
            ability.on_update(id, state, dt, events);
        }
        if let Some(enemy) = state.world.enemies.get_mut(id) {
            enemy.abilities = abilities;
        }
    }
}

/// Tower upkeep: drain timers, then acquire targets and fire.
pub fn update_towers(state: &mut TdState) {
    let dt = state.dt();
    let world = &mut state.world;
    let ids: Vec<TowerId> = world.towers.keys().collect();
    for id in ids {
        let Some(tower) = world.towers.get_mut(id) else {
            continue;
        };
        tower.update_timers(dt);
        tower.attack(&mut world.enemies, &mut world.projectiles);
    }
}

/// Projectile flight and impact. A projectile whose target died or
/// despawned deactivates without dealing damage.
pub fn update_projectiles(state: &mut TdState) {
    let dt = state.dt();
    let world = &mut state.world;
    let ids: Vec<ProjectileId> = world.projectiles.keys().collect();
    for id in ids {
        let Some(proj) = world.projectiles.get_mut(id) else {
            continue;
        };
        if !proj.active {
            if proj.explosive && proj.explosion_timer > 0.0 {
                proj.explosion_timer -= dt;
            }
            continue;
        }

        let target_pos = match world.enemies.get(proj.target) {
            Some(target) if !target.is_dead() => target.pos,
            _ => {
                proj.active = false;
                continue;
            }
        };
        if proj.fly(target_pos, dt) {
            proj.resolve(&mut world.enemies);
        }
    }
}

/// Releases each deactivated projectile's damage reservation exactly
/// once, then removes spent projectiles from the arena. Explosive ones
/// stick around until their blast visual runs out.
pub fn housekeep_projectiles(state: &mut TdState) {
    let world = &mut state.world;
    let ids: Vec<ProjectileId> = world.projectiles.keys().collect();
    for id in ids {
        let Some(proj) = world.projectiles.get_mut(id) else {
            continue;
        };
        if proj.active {
            continue;
        }
        if !proj.reservation_released {
            proj.reservation_released = true;
            if let Some(enemy) = world.enemies.get_mut(proj.target) {
                enemy.remove_incoming_damage(proj.damage);
            }
        }
        if proj.is_spent() {
            world.projectiles.remove(id);
        }
    }
}

/// Removes dead and escaped enemies. Kills pay their bounty; escapes
/// damage the base and still pay out, since the enemy is gone either way.
pub fn housekeep_enemies(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let ids: Vec<EnemyId> = state.world.enemies.keys().collect();
    for id in ids {
        let Some(enemy) = state.world.enemies.get(id) else {
            continue;
        };
        if enemy.is_dead() {
            let reward = enemy.gold_reward;
            state.world.enemies.remove(id);
            state.resources.add(Resource::Gold, reward);
            events.push(TdEvent::EnemyKilled {
                enemy: id,
                gold_reward: reward,
            });
        } else if enemy.has_finished() {
            let reward = enemy.gold_reward;
            let damage = enemy.damage.max(0.0).round() as u32;
            state.world.enemies.remove(id);
            state.resources.deduct(Resource::Health, damage);
            state.resources.add(Resource::Gold, reward);
            events.push(TdEvent::EnemyReachedEnd { enemy: id, damage });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{Ability, BossStage};
    use crate::config::TdConfig;
    use crate::enemy::Enemy;
    use crate::player_abilities::{self, PlayerAbility};
    use glam::Vec2;

    fn test_state() -> TdState {
        TdState::new(TdConfig::default(), 7)
    }

    fn spawn(state: &mut TdState, template: &str, pos: Vec2) -> EnemyId {
        let template = state.config.enemy_templates[template].clone();
        let mut enemy = Enemy::from_template(&template, vec![pos, Vec2::new(790.0, 440.0)]);
        enemy.pos = pos;
        state.world.enemies.insert(enemy)
    }

    fn run_ticks(state: &mut TdState, ticks: u32) -> Vec<TdEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            update_enemies(state, &mut events);
            let dt = state.dt();
            player_abilities::update(state, dt, &mut events);
            update_towers(state);
            update_projectiles(state);
            housekeep_projectiles(state);
            housekeep_enemies(state, &mut events);
        }
        events
    }

    #[test]
    fn healer_targets_lowest_health_ratio() {
        let mut state = test_state();
        let healer = spawn(&mut state, "warlock", Vec2::new(100.0, 100.0));
        let hurt = spawn(&mut state, "grunt", Vec2::new(120.0, 100.0));
        let hurt_worse = spawn(&mut state, "grunt", Vec2::new(140.0, 100.0));
        state.world.enemies[healer].speed = 0.0;
        state.world.enemies[hurt].speed = 0.0;
        state.world.enemies[hurt_worse].speed = 0.0;
        state.world.enemies[hurt].health = 60.0;
        state.world.enemies[hurt_worse].health = 20.0;

        // 3s cooldown at 20Hz: one heal lands within 61 ticks.
        let events = run_ticks(&mut state, 61);
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::EnemyHealed { enemy, .. } if *enemy == hurt_worse)));
        assert_eq!(state.world.enemies[hurt_worse].health, 25.0);
        assert_eq!(state.world.enemies[hurt].health, 60.0);
    }

    #[test]
    fn silence_freezes_ability_timers() {
        let mut state = test_state();
        let healer = spawn(&mut state, "warlock", Vec2::new(100.0, 100.0));
        let hurt = spawn(&mut state, "grunt", Vec2::new(120.0, 100.0));
        state.world.enemies[healer].speed = 0.0;
        state.world.enemies[hurt].speed = 0.0;
        state.world.enemies[hurt].health = 10.0;
        // Silence outlasting the healer's 3s cooldown.
        state.world.enemies[healer].silence_for(5.0);

        let events = run_ticks(&mut state, 80);
        assert!(!events
            .iter()
            .any(|e| matches!(e, TdEvent::EnemyHealed { .. })));
        assert_eq!(state.world.enemies[hurt].health, 10.0);

        // Timer resumes from zero once the silence lapses: 1s of silence
        // left plus the full 3s cooldown.
        let events = run_ticks(&mut state, 100);
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::EnemyHealed { .. })));
    }

    #[test]
    fn dash_completes_even_when_silenced_mid_dash() {
        let mut state = test_state();
        let id = spawn(&mut state, "blinker", Vec2::new(100.0, 100.0));
        let base_speed = state.world.enemies[id].speed;

        // 3s cooldown: dash starts by tick 60.
        let events = run_ticks(&mut state, 61);
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::DashStarted { .. })));
        assert!(state.world.enemies[id].speed > base_speed);

        state.world.enemies[id].silence_for(30.0);
        // 1s dash duration: the boost must still expire on schedule.
        run_ticks(&mut state, 25);
        assert_eq!(state.world.enemies[id].speed, base_speed);

        // But no new dash starts while the silence holds.
        let events = run_ticks(&mut state, 120);
        assert!(!events
            .iter()
            .any(|e| matches!(e, TdEvent::DashStarted { .. })));
    }

    #[test]
    fn summoner_adds_enemies_to_roster() {
        let mut state = test_state();
        let id = spawn(&mut state, "broodmother", Vec2::new(200.0, 200.0));
        state.world.enemies[id].speed = 0.0;

        // 6s cooldown at 20Hz.
        let events = run_ticks(&mut state, 121);
        let summoned = events.iter().find_map(|e| match e {
            TdEvent::EnemiesSummoned { by, count } if *by == id => Some(*count),
            _ => None,
        });
        assert_eq!(summoned, Some(4));
        assert_eq!(state.world.enemies.len(), 5);
    }

    #[test]
    fn boss_stages_are_one_way() {
        let mut state = test_state();
        let id = spawn(&mut state, "glitch_king", Vec2::new(300.0, 300.0));
        state.world.enemies[id].speed = 0.0;
        assert!(state.world.enemies[id].is_invisible);

        state.world.enemies[id].health = state.world.enemies[id].max_health * 0.7;
        let events = run_ticks(&mut state, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::BossPhaseChanged { stage: 2, .. })));
        assert!(!state.world.enemies[id].is_invisible);

        // Healing above the threshold must not restore the earlier stage.
        state.world.enemies[id].health = state.world.enemies[id].max_health;
        run_ticks(&mut state, 1);
        let boss_stage = state.world.enemies[id]
            .abilities
            .iter()
            .find_map(|a| match a {
                Ability::Boss(b) => Some(b.stage),
                _ => None,
            });
        assert_eq!(boss_stage, Some(BossStage::Revealed));

        state.world.enemies[id].health = state.world.enemies[id].max_health * 0.5;
        let events = run_ticks(&mut state, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::BossPhaseChanged { stage: 20, .. })));
    }

    #[test]
    fn enraged_boss_teleports_and_summons() {
        let mut state = test_state();
        let id = spawn(&mut state, "glitch_king", Vec2::new(300.0, 300.0));
        state.world.enemies[id].speed = 0.0;
        state.world.enemies[id].curr_waypoint = 1;
        state.world.enemies[id].health = state.world.enemies[id].max_health * 0.1;

        // Phase cooldown is at most 3s; 4s of ticks guarantees one trigger.
        let events = run_ticks(&mut state, 80);
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::EnemiesSummoned { by, count: 7 } if *by == id)));
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::BossGlitchBurst { .. })));
        assert_eq!(state.world.enemies[id].curr_waypoint, 0);
    }

    #[test]
    fn scanner_reveal_is_permanent() {
        let mut state = test_state();
        let id = spawn(&mut state, "shade", Vec2::new(100.0, 100.0));
        state.world.enemies[id].speed = 0.0;
        assert!(state.world.enemies[id].is_invisible);

        let mut events = Vec::new();
        assert!(player_abilities::activate(
            &mut state,
            PlayerAbility::Scanner,
            Vec2::new(100.0, 100.0),
            &mut events,
        ));
        let events = run_ticks(&mut state, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::EnemyRevealed { .. })));
        assert!(!state.world.enemies[id].is_invisible);
        assert!(state.world.enemies[id].abilities.is_empty());

        // Well past the 5s effect duration; still visible.
        run_ticks(&mut state, 200);
        assert!(!state.world.enemies[id].is_invisible);
    }

    #[test]
    fn glue_slows_once_per_enemy() {
        let mut state = test_state();
        let id = spawn(&mut state, "grunt", Vec2::new(100.0, 100.0));
        state.world.enemies[id].speed = 40.0;

        let mut events = Vec::new();
        assert!(player_abilities::activate(
            &mut state,
            PlayerAbility::Glue,
            Vec2::new(100.0, 100.0),
            &mut events,
        ));
        run_ticks(&mut state, 2);
        let slowed = state.world.enemies[id].speed;
        assert!((slowed - 28.0).abs() < 1e-3);

        // Still inside the circle next tick; no second application.
        state.world.enemies[id].speed = slowed;
        state.world.enemies[id].pos = Vec2::new(100.0, 100.0);
        run_ticks(&mut state, 5);
        assert!((state.world.enemies[id].speed - slowed).abs() < 1e-3);
    }

    #[test]
    fn disruptor_only_hits_enemies_present_at_activation() {
        let mut state = test_state();
        let inside = spawn(&mut state, "grunt", Vec2::new(100.0, 100.0));
        let outside = spawn(&mut state, "grunt", Vec2::new(500.0, 500.0));
        state.world.enemies[inside].speed = 0.0;
        state.world.enemies[outside].speed = 0.0;

        let mut events = Vec::new();
        assert!(player_abilities::activate(
            &mut state,
            PlayerAbility::Disruptor,
            Vec2::new(100.0, 100.0),
            &mut events,
        ));
        assert!(state.world.enemies[inside].silence.active);
        assert!(!state.world.enemies[outside].silence.active);

        // Walking into the circle afterwards does nothing.
        state.world.enemies[outside].pos = Vec2::new(100.0, 100.0);
        run_ticks(&mut state, 5);
        assert!(!state.world.enemies[outside].silence.active);
    }

    #[test]
    fn fireball_needs_gold() {
        let mut state = test_state();
        let id = spawn(&mut state, "grunt", Vec2::new(100.0, 100.0));
        state.world.enemies[id].health = 200.0;
        state.world.enemies[id].max_health = 200.0;

        let mut events = Vec::new();
        assert!(player_abilities::activate(
            &mut state,
            PlayerAbility::Fireball,
            Vec2::new(100.0, 100.0),
            &mut events,
        ));
        // 100 damage through 2 armor.
        assert_eq!(state.world.enemies[id].health, 102.0);

        // 150 starting gold minus 70: a second cast drains it; a third fails.
        assert!(player_abilities::activate(
            &mut state,
            PlayerAbility::Fireball,
            Vec2::new(100.0, 100.0),
            &mut events,
        ));
        assert!(!player_abilities::activate(
            &mut state,
            PlayerAbility::Fireball,
            Vec2::new(100.0, 100.0),
            &mut events,
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::ResourcesInsufficient { .. })));
    }

    #[test]
    fn escaped_enemy_damages_base_and_pays_bounty() {
        let mut state = test_state();
        let template = state.config.enemy_templates["grunt"].clone();
        let enemy = Enemy::from_template(&template, vec![Vec2::new(0.0, 0.0)]);
        let id = state.world.enemies.insert(enemy);
        state.world.enemies[id].curr_waypoint = 1; // already past the end

        let gold_before = state.resources.get(Resource::Gold);
        let mut events = Vec::new();
        housekeep_enemies(&mut state, &mut events);

        assert!(state.world.enemies.is_empty());
        assert_eq!(state.resources.get(Resource::Health), 90);
        assert_eq!(state.resources.get(Resource::Gold), gold_before + 5);
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::EnemyReachedEnd { damage: 10, .. })));
    }

    #[test]
    fn projectile_lifecycle_releases_reservation_once() {
        let mut state = test_state();
        let id = spawn(&mut state, "grunt", Vec2::new(100.0, 100.0));
        state.world.enemies[id].speed = 0.0;
        state.world.enemies[id].health = 100.0;

        let preset = state.config.tower_presets["arrow"].clone();
        state
            .world
            .towers
            .insert(crate::tower::Tower::from_preset(
                "arrow",
                &preset,
                Vec2::new(60.0, 100.0),
            ));

        update_towers(&mut state);
        assert_eq!(state.world.projectiles.len(), 1);
        assert_eq!(state.world.enemies[id].incoming_damage, 12.0);

        // 40 units at 420/s resolves within a few ticks.
        let mut events = Vec::new();
        for _ in 0..4 {
            update_projectiles(&mut state);
            housekeep_projectiles(&mut state);
            housekeep_enemies(&mut state, &mut events);
        }
        assert!(state.world.projectiles.is_empty());
        // 12 damage through the grunt's 2 armor.
        assert_eq!(state.world.enemies[id].health, 90.0);
        assert_eq!(state.world.enemies[id].incoming_damage, 0.0);
    }

    #[test]
    fn projectile_whose_target_died_releases_without_damage() {
        let mut state = test_state();
        let victim = spawn(&mut state, "grunt", Vec2::new(400.0, 100.0));
        let bystander = spawn(&mut state, "grunt", Vec2::new(100.0, 100.0));
        state.world.enemies[victim].speed = 0.0;
        state.world.enemies[bystander].speed = 0.0;

        let preset = state.config.tower_presets["sniper"].clone();
        state
            .world
            .towers
            .insert(crate::tower::Tower::from_preset(
                "sniper",
                &preset,
                Vec2::new(100.0, 300.0),
            ));

        update_towers(&mut state);
        assert_eq!(state.world.projectiles.len(), 1);
        let target = state.world.projectiles.values().next().map(|p| p.target);

        // Target dies to something else before the projectile lands.
        if let Some(target) = target {
            state.world.enemies[target].health = 0.0;
        }
        update_projectiles(&mut state);
        housekeep_projectiles(&mut state);
        assert!(state.world.projectiles.is_empty());
        for enemy in state.world.enemies.values() {
            assert_eq!(enemy.incoming_damage, 0.0);
        }
    }

    #[test]
    fn wave_payout_includes_factories() {
        let mut state = test_state();
        state.factories.push(crate::economy::Factory {
            preset: "sawmill".to_owned(),
            resource: Resource::Wood,
            payout_per_wave: 10,
        });
        let mut events = Vec::new();
        assert!(start_wave(&mut state, &mut events));
        assert_eq!(state.phase, GamePhase::Wave);

        let wood_before = state.resources.get(Resource::Wood);
        let gold_before = state.resources.get(Resource::Gold);
        finish_wave(&mut state, &mut events);

        assert_eq!(state.resources.get(Resource::Wood), wood_before + 5 + 10);
        assert_eq!(state.resources.get(Resource::Gold), gold_before + 25);
        assert_eq!(state.phase, GamePhase::Build);
        assert_eq!(state.current_wave, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, TdEvent::WaveCompleted { wave: 0, wood: 15, .. })));
    }

    #[test]
    fn start_wave_rejected_mid_wave() {
        let mut state = test_state();
        let mut events = Vec::new();
        assert!(start_wave(&mut state, &mut events));
        assert!(!start_wave(&mut state, &mut events));
    }
}
