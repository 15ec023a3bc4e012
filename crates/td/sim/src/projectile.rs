//! Homing projectiles. Each one carries a damage reservation on its
//! target; the reservation is released exactly once when the projectile
//! deactivates, whether it hit or lost its target.

use glam::Vec2;
use slotmap::SlotMap;
use td_types::DamageType;

use crate::enemy::Enemy;
use crate::tower::TowerStats;
use crate::world::EnemyId;

/// How long a spent explosive projectile lingers for its blast visual.
pub const EXPLOSION_LINGER: f32 = 0.3;

// Splash falls off linearly with distance from the impact point but
// never below half damage inside the radius.
const MIN_SPLASH_FACTOR: f32 = 0.5;

pub struct Projectile {
    pub pos: Vec2,
    pub target: EnemyId,
    pub damage: f32,
    pub damage_type: DamageType,
    pub speed: f32,
    pub explosive: bool,
    pub explosion_radius: f32,

    pub active: bool,
    pub reservation_released: bool,
    pub explosion_timer: f32,
}

impl Projectile {
    pub fn launch(from: Vec2, target: EnemyId, stats: &TowerStats) -> Self {
        Self {
            pos: from,
            target,
            damage: stats.damage,
            damage_type: stats.damage_type,
            speed: stats.projectile_speed,
            explosive: stats.explosive,
            explosion_radius: stats.explosion_radius,
            active: true,
            reservation_released: false,
            explosion_timer: 0.0,
        }
    }

    /// Advances toward the target's current position; homing re-reads it
    /// every tick. Returns true when the projectile reached the target
    /// this tick.
    pub fn fly(&mut self, target_pos: Vec2, dt: f32) -> bool {
        let to_target = target_pos - self.pos;
        let distance = to_target.length();
        let travel = self.speed * dt;
        if distance <= travel {
            self.pos = target_pos;
            true
        } else {
            self.pos += to_target / distance * travel;
            false
        }
    }

    /// Applies impact damage and deactivates. Explosive projectiles
    /// splash every living enemy within the radius, scaled down with
    /// distance; others damage the target alone.
    pub fn resolve(&mut self, enemies: &mut SlotMap<EnemyId, Enemy>) {
        if self.explosive {
            for enemy in enemies.values_mut() {
                if enemy.is_dead() {
                    continue;
                }
                let distance = self.pos.distance(enemy.pos);
                if distance > self.explosion_radius {
                    continue;
                }
                let factor =
                    (1.0 - (distance / self.explosion_radius) * 0.5).max(MIN_SPLASH_FACTOR);
                enemy.take_damage(self.damage * factor, self.damage_type);
            }
            self.explosion_timer = EXPLOSION_LINGER;
        } else if let Some(enemy) = enemies.get_mut(self.target) {
            enemy.take_damage(self.damage, self.damage_type);
        }
        self.active = false;
    }

    /// A projectile leaves the arena once inactive and, for explosives,
    /// once its blast visual has run out.
    pub fn is_spent(&self) -> bool {
        !self.active && (!self.explosive || self.explosion_timer <= 0.0)
    }
}
