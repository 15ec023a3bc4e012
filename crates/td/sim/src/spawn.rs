//! Wave compilation and the spawn scheduler.
//!
//! Wave definitions are resolved against the template and path tables up
//! front, so the per-tick scheduler never touches config maps. The
//! scheduler releases at most one enemy per tick: prep countdown first,
//! then groups in order with an inter-spawn gap inside each group and an
//! inter-group delay between them. A wave is complete only when every
//! group has finished AND the roster is empty, so summoned adds extend
//! the wave too.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::Rng;
use slotmap::SlotMap;
use td_types::EnemyTemplate;

use crate::config::TdConfig;
use crate::enemy::Enemy;
use crate::events::TdEvent;
use crate::world::EnemyId;

/// One enemy waiting to spawn: resolved template plus its chosen route.
#[derive(Clone)]
pub struct PendingSpawn {
    pub template: EnemyTemplate,
    pub path: Vec<Vec2>,
}

#[derive(Clone)]
pub struct SpawnGroup {
    pub units: Vec<PendingSpawn>,
    pub delay_after_group: f32,
    pub inter_spawn_delay: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WavePayout {
    pub gold: u32,
    pub wood: u32,
    pub metal: u32,
}

#[derive(Clone)]
pub struct Wave {
    pub prep_time: f32,
    pub groups: Vec<SpawnGroup>,
    pub payout: WavePayout,
}

/// Resolves wave definitions into spawn-ready waves. Groups naming an
/// unknown template are dropped with a warning; each unit draws a route
/// from the path table at compile time.
pub fn compile_waves(config: &TdConfig, rng: &mut StdRng) -> Vec<Wave> {
    let path_names: Vec<&String> = config.paths.keys().collect();

    config
        .waves
        .iter()
        .map(|def| {
            let groups = def
                .units
                .iter()
                .filter_map(|entry| {
                    let Some(template) = config.enemy_templates.get(&entry.template) else {
                        tracing::warn!(
                            template = %entry.template,
                            "wave references unknown enemy template, dropping group"
                        );
                        return None;
                    };
                    if path_names.is_empty() {
                        tracing::warn!("no paths configured, dropping wave group");
                        return None;
                    }

                    let units = (0..entry.count)
                        .map(|_| {
                            let name = path_names[rng.gen_range(0, path_names.len())];
                            let path = config.paths[name]
                                .iter()
                                .map(|&(x, y)| Vec2::new(x, y))
                                .collect();
                            PendingSpawn {
                                template: template.clone(),
                                path,
                            }
                        })
                        .collect();

                    Some(SpawnGroup {
                        units,
                        delay_after_group: entry.delay_after_group,
                        inter_spawn_delay: entry.inter_spawn_delay,
                    })
                })
                .collect();

            Wave {
                prep_time: def.prep_time,
                groups,
                payout: WavePayout {
                    gold: def.passive_gold,
                    wood: def.passive_wood,
                    metal: def.passive_metal,
                },
            }
        })
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct SpawnController {
    active: bool,
    prep_timer: f32,
    group_idx: usize,
    spawn_idx: usize,
    inter_group_delay: f32,
    time_since_last_spawn: f32,
}

impl SpawnController {
    pub fn start(&mut self, wave: &Wave) {
        self.active = true;
        self.prep_timer = wave.prep_time;
        self.group_idx = 0;
        self.spawn_idx = 0;
        self.inter_group_delay = 0.0;
        self.time_since_last_spawn = 0.0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn prep_remaining(&self) -> f32 {
        self.prep_timer.max(0.0)
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.group_idx, self.spawn_idx)
    }

    pub fn all_spawned(&self, wave: &Wave) -> bool {
        self.group_idx >= wave.groups.len()
    }

    /// Advances the schedule one tick, spawning at most one enemy into
    /// the roster. Returns true when the wave is complete: all groups
    /// exhausted and the roster empty.
    pub fn update(
        &mut self,
        dt: f32,
        wave: &Wave,
        roster: &mut SlotMap<EnemyId, Enemy>,
        events: &mut Vec<TdEvent>,
    ) -> bool {
        if !self.active {
            return false;
        }

        if self.prep_timer > 0.0 {
            self.prep_timer -= dt;
            return false;
        }

        if self.inter_group_delay > 0.0 {
            self.inter_group_delay = (self.inter_group_delay - dt).max(0.0);
            return false;
        }

        // Empty groups are skipped outright, without their trailing delay.
        while self.group_idx < wave.groups.len() && wave.groups[self.group_idx].units.is_empty() {
            self.group_idx += 1;
            self.spawn_idx = 0;
        }

        if let Some(group) = wave.groups.get(self.group_idx) {
            if self.spawn_idx < group.units.len() {
                self.time_since_last_spawn += dt;
                if self.time_since_last_spawn >= group.inter_spawn_delay {
                    let unit = &group.units[self.spawn_idx];
                    let enemy = Enemy::from_template(&unit.template, unit.path.clone());
                    let id = roster.insert(enemy);
                    events.push(TdEvent::EnemySpawned { enemy: id });
                    self.spawn_idx += 1;
                    self.time_since_last_spawn = 0.0;
                }
            } else {
                self.group_idx += 1;
                self.spawn_idx = 0;
                self.inter_group_delay = group.delay_after_group;
            }
        }

        self.group_idx >= wave.groups.len() && roster.is_empty()
    }
}
