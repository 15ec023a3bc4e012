//! Match configuration: arena bounds, starting resources, and the level
//! data tables (enemy templates, paths, waves, buildable presets).
//!
//! Maps are ordered so path selection during wave compilation is
//! deterministic for a given seed.

use std::collections::BTreeMap;

use td_types::{
    DamageType, EnemyTemplate, FactoryPreset, ResourceCost, Rgb, Shape, TowerPreset, TowerUpgrade,
    WaveDef, WaveUnitEntry,
};

#[derive(Clone, Debug)]
pub struct TdConfig {
    pub tick_hz: u32,
    pub arena_width: f32,
    pub arena_height: f32,

    pub start_gold: u32,
    pub start_wood: u32,
    pub start_metal: u32,
    pub start_health: u32,

    pub enemy_templates: BTreeMap<String, EnemyTemplate>,
    pub paths: BTreeMap<String, Vec<(f32, f32)>>,
    pub waves: Vec<WaveDef>,
    pub tower_presets: BTreeMap<String, TowerPreset>,
    pub factory_presets: BTreeMap<String, FactoryPreset>,
}

impl Default for TdConfig {
    /// A small self-contained level, handy for tools and tests.
    fn default() -> Self {
        let mut enemy_templates = BTreeMap::new();
        enemy_templates.insert("minion".to_owned(), template(30.0, 55.0, &[], 2));
        enemy_templates.insert("grunt".to_owned(), {
            let mut t = template(80.0, 40.0, &[], 5);
            t.armor = 2.0;
            t
        });
        enemy_templates.insert("runner".to_owned(), template(50.0, 45.0, &["fast"], 4));
        enemy_templates.insert("shade".to_owned(), template(60.0, 40.0, &["invisible"], 6));
        enemy_templates.insert("warlock".to_owned(), template(120.0, 35.0, &["healer"], 10));
        enemy_templates.insert(
            "broodmother".to_owned(),
            template(150.0, 30.0, &["summoner"], 15),
        );
        enemy_templates.insert("juggernaut".to_owned(), template(100.0, 40.0, &["tank"], 20));
        enemy_templates.insert("blinker".to_owned(), template(70.0, 35.0, &["dash"], 8));
        enemy_templates.insert(
            "nullskin".to_owned(),
            template(90.0, 40.0, &["magic_resistant"], 8),
        );
        enemy_templates.insert("glitch_king".to_owned(), {
            let mut t = template(1200.0, 25.0, &["boss"], 200);
            t.shape = Shape::GlitchHex;
            t.radius = 22.0;
            t
        });

        let mut paths = BTreeMap::new();
        paths.insert(
            "main".to_owned(),
            vec![
                (0.0, 300.0),
                (200.0, 300.0),
                (200.0, 120.0),
                (480.0, 120.0),
                (480.0, 440.0),
                (800.0, 440.0),
            ],
        );

        let waves = vec![
            WaveDef {
                prep_time: 5.0,
                units: vec![
                    unit("minion", 6, 2.0, 0.6),
                    unit("grunt", 3, 0.0, 1.0),
                ],
                passive_gold: 25,
                passive_wood: 5,
                passive_metal: 0,
            },
            WaveDef {
                prep_time: 8.0,
                units: vec![
                    unit("runner", 5, 1.5, 0.5),
                    unit("shade", 3, 2.0, 0.8),
                    unit("warlock", 1, 0.0, 1.0),
                ],
                passive_gold: 35,
                passive_wood: 5,
                passive_metal: 5,
            },
            WaveDef {
                prep_time: 10.0,
                units: vec![
                    unit("juggernaut", 2, 2.0, 1.5),
                    unit("broodmother", 1, 3.0, 1.0),
                    unit("blinker", 4, 0.0, 0.6),
                ],
                passive_gold: 50,
                passive_wood: 10,
                passive_metal: 5,
            },
            WaveDef {
                prep_time: 12.0,
                units: vec![
                    unit("nullskin", 4, 2.0, 0.8),
                    unit("glitch_king", 1, 0.0, 1.0),
                ],
                passive_gold: 0,
                passive_wood: 0,
                passive_metal: 0,
            },
        ];

        let mut tower_presets = BTreeMap::new();
        tower_presets.insert(
            "arrow".to_owned(),
            TowerPreset {
                cost: cost(50, 0, 0),
                range: 140.0,
                damage: 12.0,
                damage_type: DamageType::Physical,
                reload_time: 0.8,
                magazine_size: 6,
                magazine_reload_time: 2.5,
                max_targets: 1,
                explosive: false,
                explosion_radius: 30.0,
                projectile_speed: 420.0,
                can_see_invisible: false,
                upgrade: Some(TowerUpgrade {
                    cost: cost(60, 10, 0),
                    range_increase: 25.0,
                    damage_increase: 8.0,
                    reload_time_decrease: 0.2,
                    magazine_size_increase: 2,
                    magazine_reload_time_decrease: 0.5,
                    max_targets_increase: 0,
                    projectile_speed_increase: 60.0,
                }),
            },
        );
        tower_presets.insert(
            "sniper".to_owned(),
            TowerPreset {
                cost: cost(90, 0, 10),
                range: 260.0,
                damage: 45.0,
                damage_type: DamageType::Physical,
                reload_time: 2.2,
                magazine_size: 1,
                magazine_reload_time: 1.0,
                max_targets: 1,
                explosive: false,
                explosion_radius: 30.0,
                projectile_speed: 700.0,
                can_see_invisible: true,
                upgrade: None,
            },
        );
        tower_presets.insert(
            "cannon".to_owned(),
            TowerPreset {
                cost: cost(120, 20, 10),
                range: 160.0,
                damage: 30.0,
                damage_type: DamageType::Physical,
                reload_time: 1.8,
                magazine_size: 3,
                magazine_reload_time: 3.0,
                max_targets: 1,
                explosive: true,
                explosion_radius: 45.0,
                projectile_speed: 260.0,
                can_see_invisible: false,
                upgrade: None,
            },
        );
        tower_presets.insert(
            "arcane".to_owned(),
            TowerPreset {
                cost: cost(100, 0, 20),
                range: 150.0,
                damage: 18.0,
                damage_type: DamageType::Magic,
                reload_time: 1.0,
                magazine_size: 4,
                magazine_reload_time: 2.0,
                max_targets: 2,
                explosive: false,
                explosion_radius: 30.0,
                projectile_speed: 360.0,
                can_see_invisible: false,
                upgrade: None,
            },
        );

        let mut factory_presets = BTreeMap::new();
        factory_presets.insert(
            "sawmill".to_owned(),
            FactoryPreset {
                cost: cost(60, 0, 0),
                resource: "wood".to_owned(),
                payout_per_wave: 10,
            },
        );
        factory_presets.insert(
            "smelter".to_owned(),
            FactoryPreset {
                cost: cost(80, 10, 0),
                resource: "metal".to_owned(),
                payout_per_wave: 8,
            },
        );
        factory_presets.insert(
            "mint".to_owned(),
            FactoryPreset {
                cost: cost(100, 10, 10),
                resource: "gold".to_owned(),
                payout_per_wave: 15,
            },
        );

        Self {
            tick_hz: 20,
            arena_width: 800.0,
            arena_height: 600.0,
            start_gold: 150,
            start_wood: 60,
            start_metal: 30,
            start_health: 100,
            enemy_templates,
            paths,
            waves,
            tower_presets,
            factory_presets,
        }
    }
}

fn template(health: f32, speed: f32, abilities: &[&str], gold: u32) -> EnemyTemplate {
    EnemyTemplate {
        health,
        speed,
        armor: 0.0,
        magic_resistance: 0.0,
        attack_range: 50.0,
        attack_speed: 1.0,
        damage: 10.0,
        gold_reward: gold,
        abilities: abilities.iter().map(|s| s.to_string()).collect(),
        shape: Shape::Circle,
        color: Rgb::default(),
        radius: 10.0,
    }
}

fn unit(template: &str, count: u32, delay_after_group: f32, inter_spawn_delay: f32) -> WaveUnitEntry {
    WaveUnitEntry {
        template: template.to_owned(),
        count,
        delay_after_group,
        inter_spawn_delay,
    }
}

fn cost(gold: u32, wood: u32, metal: u32) -> ResourceCost {
    ResourceCost { gold, wood, metal }
}
