//! Enemy entity: waypoint movement, layered damage mitigation, and the
//! damage-reservation bookkeeping towers coordinate through.

use glam::Vec2;
use td_types::{DamageType, EnemyTemplate, Rgb, Shape};

use crate::abilities::Ability;

/// Disable window applied by the disruptor. While active, ability
/// timers are frozen rather than drained.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silence {
    pub active: bool,
    pub remaining: f32,
}

pub struct Enemy {
    pub pos: Vec2,
    pub waypoints: Vec<Vec2>,
    pub curr_waypoint: usize,

    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub armor: f32,
    pub magic_resistance: f32,

    pub attack_range: f32,
    pub attack_speed: f32,
    pub damage: f32,
    pub gold_reward: u32,

    /// Damage already claimed by in-flight projectiles. Towers subtract
    /// this from `health` when judging whether a target still needs fire.
    pub incoming_damage: f32,

    pub is_invisible: bool,
    pub silence: Silence,
    pub was_glued: bool,

    pub abilities: Vec<Ability>,

    pub shape: Shape,
    pub color: Rgb,
    pub radius: f32,
}

impl Enemy {
    /// Builds an enemy at the head of `waypoints` and applies its
    /// abilities' one-time stat adjustments.
    pub fn from_template(template: &EnemyTemplate, waypoints: Vec<Vec2>) -> Self {
        let pos = waypoints.first().copied().unwrap_or(Vec2::ZERO);
        let mut enemy = Self {
            pos,
            waypoints,
            curr_waypoint: 0,
            health: template.health,
            max_health: template.health,
            speed: template.speed,
            armor: template.armor,
            magic_resistance: template.magic_resistance,
            attack_range: template.attack_range,
            attack_speed: template.attack_speed,
            damage: template.damage,
            gold_reward: template.gold_reward,
            incoming_damage: 0.0,
            is_invisible: false,
            silence: Silence::default(),
            was_glued: false,
            abilities: Vec::new(),
            shape: template.shape,
            color: template.color,
            radius: template.radius,
        };

        let mut abilities = Ability::from_names(&template.abilities);
        for ability in &mut abilities {
            ability.apply(&mut enemy);
        }
        enemy.abilities = abilities;
        enemy
    }

    /// Moves toward the current waypoint, consuming waypoints as they are
    /// reached. Leftover travel within a tick carries over to the next
    /// segment.
    pub fn advance(&mut self, dt: f32) {
        let mut travel = self.speed.max(0.0) * dt;
        while travel > 0.0 && self.curr_waypoint < self.waypoints.len() {
            let target = self.waypoints[self.curr_waypoint];
            let to_target = target - self.pos;
            let distance = to_target.length();
            if distance <= travel {
                self.pos = target;
                travel -= distance;
                self.curr_waypoint += 1;
            } else {
                self.pos += to_target / distance * travel;
                travel = 0.0;
            }
        }
    }

    /// Applies damage after the matching mitigation stat. Infinite magic
    /// resistance zeroes magic damage entirely.
    pub fn take_damage(&mut self, amount: f32, damage_type: DamageType) {
        let mitigation = match damage_type {
            DamageType::Physical => self.armor,
            DamageType::Magic => self.magic_resistance,
        };
        let effective = (amount - mitigation).max(0.0);
        self.health = (self.health - effective).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn has_finished(&self) -> bool {
        self.curr_waypoint >= self.waypoints.len()
    }

    /// Remaining path length, measured through the waypoints still ahead.
    /// Towers prioritize the enemy with the smallest value.
    pub fn distance_to_end(&self) -> f32 {
        let mut total = 0.0;
        let mut from = self.pos;
        for &wp in &self.waypoints[self.curr_waypoint.min(self.waypoints.len())..] {
            total += from.distance(wp);
            from = wp;
        }
        total
    }

    /// Health minus damage already reserved by in-flight projectiles.
    pub fn effective_health(&self) -> f32 {
        self.health - self.incoming_damage
    }

    pub fn add_incoming_damage(&mut self, amount: f32) {
        debug_assert!(amount >= 0.0);
        self.incoming_damage += amount;
    }

    /// Releases a reservation. A release larger than the outstanding
    /// total indicates a double-release; clamp so targeting never sees a
    /// negative reservation.
    pub fn remove_incoming_damage(&mut self, amount: f32) {
        debug_assert!(
            amount <= self.incoming_damage + 1e-3,
            "reservation released twice"
        );
        self.incoming_damage = (self.incoming_damage - amount).max(0.0);
    }

    pub fn silence_for(&mut self, duration: f32) {
        self.silence.active = true;
        self.silence.remaining = self.silence.remaining.max(duration);
    }

    pub fn update_silence(&mut self, dt: f32) {
        if self.silence.active {
            self.silence.remaining -= dt;
            if self.silence.remaining <= 0.0 {
                self.silence.active = false;
                self.silence.remaining = 0.0;
            }
        }
    }
}
