//! Tower entity: reload/magazine timers, target acquisition with damage
//! reservations, and projectile launch.

use glam::Vec2;
use slotmap::SlotMap;
use td_types::{DamageType, TowerPreset, TowerUpgrade};

use crate::enemy::Enemy;
use crate::projectile::Projectile;
use crate::world::{EnemyId, ProjectileId};

// Upgrades subtract from timers; clamp so a tower never fires or
// reloads in zero time.
const MIN_RELOAD_TIME: f32 = 0.01;
const MIN_MAGAZINE_RELOAD_TIME: f32 = 0.1;
const MIN_PROJECTILE_SPEED: f32 = 0.1;

#[derive(Clone, Debug)]
pub struct TowerStats {
    pub range: f32,
    pub damage: f32,
    pub damage_type: DamageType,
    pub reload_time: f32,
    pub magazine_size: u32,
    pub magazine_reload_time: f32,
    pub max_targets: u32,
    pub explosive: bool,
    pub explosion_radius: f32,
    pub projectile_speed: f32,
}

impl TowerStats {
    pub fn from_preset(preset: &TowerPreset) -> Self {
        Self {
            range: preset.range,
            damage: preset.damage,
            damage_type: preset.damage_type,
            reload_time: preset.reload_time,
            magazine_size: preset.magazine_size,
            magazine_reload_time: preset.magazine_reload_time,
            max_targets: preset.max_targets,
            explosive: preset.explosive,
            explosion_radius: preset.explosion_radius,
            projectile_speed: preset.projectile_speed,
        }
    }

    pub fn apply_upgrade(&mut self, upgrade: &TowerUpgrade) {
        self.range += upgrade.range_increase;
        self.damage += upgrade.damage_increase;
        self.reload_time =
            (self.reload_time - upgrade.reload_time_decrease).max(MIN_RELOAD_TIME);
        self.magazine_size = self
            .magazine_size
            .saturating_add_signed(upgrade.magazine_size_increase)
            .max(1);
        self.magazine_reload_time = (self.magazine_reload_time
            - upgrade.magazine_reload_time_decrease)
            .max(MIN_MAGAZINE_RELOAD_TIME);
        self.max_targets = self
            .max_targets
            .saturating_add_signed(upgrade.max_targets_increase)
            .max(1);
        self.projectile_speed =
            (self.projectile_speed + upgrade.projectile_speed_increase).max(MIN_PROJECTILE_SPEED);
    }
}

pub struct Tower {
    pub pos: Vec2,
    pub preset: String,
    pub stats: TowerStats,
    pub can_see_invisible: bool,
    pub upgraded: bool,

    pub current_reload: f32,
    pub current_magazine_shots: u32,
    pub is_reloading_magazine: bool,
    pub magazine_reload_timer: f32,

    /// Radians; tracks the frontmost target even while unable to fire.
    pub facing: f32,
}

impl Tower {
    pub fn from_preset(name: &str, preset: &TowerPreset, pos: Vec2) -> Self {
        Self {
            pos,
            preset: name.to_owned(),
            stats: TowerStats::from_preset(preset),
            can_see_invisible: preset.can_see_invisible,
            upgraded: false,
            current_reload: 0.0,
            current_magazine_shots: preset.magazine_size,
            is_reloading_magazine: false,
            magazine_reload_timer: 0.0,
            facing: 0.0,
        }
    }

    /// Drains the shot reload and, while the magazine sits below
    /// capacity, the magazine reload. A finished magazine reload refills
    /// to capacity. The two timers are independent.
    pub fn update_timers(&mut self, dt: f32) {
        if self.current_reload > 0.0 {
            self.current_reload = (self.current_reload - dt).max(0.0);
        }

        if self.is_reloading_magazine {
            self.magazine_reload_timer -= dt;
            if self.magazine_reload_timer <= 0.0 {
                self.current_magazine_shots = self.stats.magazine_size;
                self.is_reloading_magazine = false;
                self.magazine_reload_timer = 0.0;
            }
        } else if self.current_magazine_shots < self.stats.magazine_size {
            self.is_reloading_magazine = true;
            self.magazine_reload_timer = self.stats.magazine_reload_time;
        }
    }

    /// Enemies this tower may shoot at, frontmost first (smallest
    /// remaining path distance). Excludes the dead, the out-of-range,
    /// invisible enemies it cannot see, targets already reserved to
    /// death, and targets its damage cannot hurt at all.
    pub fn valid_targets(&self, enemies: &SlotMap<EnemyId, Enemy>) -> Vec<EnemyId> {
        let mut targets: Vec<(EnemyId, f32)> = enemies
            .iter()
            .filter(|(_, enemy)| {
                if enemy.is_dead() || enemy.has_finished() {
                    return false;
                }
                if enemy.is_invisible && !self.can_see_invisible {
                    return false;
                }
                if self.pos.distance(enemy.pos) > self.stats.range {
                    return false;
                }
                if enemy.effective_health() <= 0.0 {
                    return false;
                }
                let mitigation = match self.stats.damage_type {
                    DamageType::Physical => enemy.armor,
                    DamageType::Magic => enemy.magic_resistance,
                };
                self.stats.damage - mitigation > 0.0
            })
            .map(|(id, enemy)| (id, enemy.distance_to_end()))
            .collect();

        targets.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        targets.into_iter().map(|(id, _)| id).collect()
    }

    /// Turns toward the frontmost target and, if off reload with shots in
    /// the magazine, fires at up to `max_targets` of them. Each shot
    /// reserves its damage on the target and spawns a homing projectile.
    /// Returns the number of shots fired.
    pub fn attack(
        &mut self,
        enemies: &mut SlotMap<EnemyId, Enemy>,
        projectiles: &mut SlotMap<ProjectileId, Projectile>,
    ) -> u32 {
        let targets = self.valid_targets(enemies);
        let Some(&first) = targets.first() else {
            return 0;
        };

        if let Some(enemy) = enemies.get(first) {
            let to_target = enemy.pos - self.pos;
            if to_target.length_squared() > 0.0 {
                self.facing = to_target.y.atan2(to_target.x);
            }
        }

        if self.current_reload > 0.0 || self.current_magazine_shots == 0 {
            return 0;
        }

        let mut fired = 0;
        for id in targets {
            if fired >= self.stats.max_targets || self.current_magazine_shots == 0 {
                break;
            }
            let Some(enemy) = enemies.get_mut(id) else {
                continue;
            };
            enemy.add_incoming_damage(self.stats.damage);
            projectiles.insert(Projectile::launch(self.pos, id, &self.stats));
            self.current_magazine_shots -= 1;
            fired += 1;
        }

        if fired > 0 {
            self.current_reload = self.stats.reload_time;
            if self.current_magazine_shots < self.stats.magazine_size && !self.is_reloading_magazine
            {
                self.is_reloading_magazine = true;
                self.magazine_reload_timer = self.stats.magazine_reload_time;
            }
        }
        fired
    }
}
