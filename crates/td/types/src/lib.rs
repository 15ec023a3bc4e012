//! Canonical serializable types for the tower-defense combat core.
//!
//! Everything that crosses the simulation boundary lives here: the level
//! data handed in (enemy templates, wave definitions, tower presets) and
//! the observation snapshot handed out. The simulation itself consumes
//! these as already-parsed values; file formats are a collaborator's
//! concern.

use serde::{Deserialize, Serialize};

/// Presentation color, carried through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Default for Rgb {
    fn default() -> Self {
        Rgb(255, 255, 255)
    }
}

/// Presentation shape, carried through untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Circle,
    Square,
    Triangle,
    Hexagon,
    GlitchHex,
}

/// Kind of damage a tower deals; enemies reduce it with the matching stat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    #[default]
    Physical,
    Magic,
}

/// Stat block an enemy is constructed from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub health: f32,
    pub speed: f32,
    #[serde(default)]
    pub armor: f32,
    #[serde(default)]
    pub magic_resistance: f32,
    #[serde(default = "default_attack_range")]
    pub attack_range: f32,
    #[serde(default = "default_attack_speed")]
    pub attack_speed: f32,
    #[serde(default = "default_enemy_damage")]
    pub damage: f32,
    #[serde(default = "default_gold_reward")]
    pub gold_reward: u32,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub color: Rgb,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_attack_range() -> f32 {
    50.0
}

fn default_attack_speed() -> f32 {
    1.0
}

fn default_enemy_damage() -> f32 {
    10.0
}

fn default_gold_reward() -> u32 {
    5
}

fn default_radius() -> f32 {
    10.0
}

/// One timed batch of a single enemy template within a wave.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaveUnitEntry {
    pub template: String,
    pub count: u32,
    /// Seconds to wait after this group finishes spawning before the next
    /// group starts.
    #[serde(default)]
    pub delay_after_group: f32,
    /// Seconds between consecutive spawns within the group.
    #[serde(default = "default_inter_spawn_delay")]
    pub inter_spawn_delay: f32,
}

fn default_inter_spawn_delay() -> f32 {
    0.5
}

/// A full wave: prep countdown, ordered unit groups, end-of-wave payout.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WaveDef {
    #[serde(default)]
    pub prep_time: f32,
    #[serde(default)]
    pub units: Vec<WaveUnitEntry>,
    #[serde(default)]
    pub passive_gold: u32,
    #[serde(default)]
    pub passive_wood: u32,
    #[serde(default)]
    pub passive_metal: u32,
}

/// Multi-resource price tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub wood: u32,
    #[serde(default)]
    pub metal: u32,
}

/// Stat deltas applied when a tower is upgraded in place. Decreases are
/// clamped by the simulation so timers never reach zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TowerUpgrade {
    pub cost: ResourceCost,
    #[serde(default)]
    pub range_increase: f32,
    #[serde(default)]
    pub damage_increase: f32,
    #[serde(default)]
    pub reload_time_decrease: f32,
    #[serde(default)]
    pub magazine_size_increase: i32,
    #[serde(default)]
    pub magazine_reload_time_decrease: f32,
    #[serde(default)]
    pub max_targets_increase: i32,
    #[serde(default)]
    pub projectile_speed_increase: f32,
}

/// Named tower configuration a build action references.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TowerPreset {
    pub cost: ResourceCost,
    pub range: f32,
    pub damage: f32,
    #[serde(default)]
    pub damage_type: DamageType,
    pub reload_time: f32,
    #[serde(default = "default_magazine_size")]
    pub magazine_size: u32,
    #[serde(default = "default_magazine_reload_time")]
    pub magazine_reload_time: f32,
    #[serde(default = "default_max_targets")]
    pub max_targets: u32,
    #[serde(default)]
    pub explosive: bool,
    #[serde(default = "default_explosion_radius")]
    pub explosion_radius: f32,
    pub projectile_speed: f32,
    #[serde(default)]
    pub can_see_invisible: bool,
    #[serde(default)]
    pub upgrade: Option<TowerUpgrade>,
}

fn default_magazine_size() -> u32 {
    1
}

fn default_magazine_reload_time() -> f32 {
    1.0
}

fn default_max_targets() -> u32 {
    1
}

fn default_explosion_radius() -> f32 {
    30.0
}

/// Factory blueprint: produces a resource at the end of every wave.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FactoryPreset {
    pub cost: ResourceCost,
    pub resource: String,
    pub payout_per_wave: u32,
}

/// Where the current wave stands.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WaveStatus {
    /// Build phase, no wave running.
    Idle,
    /// Wave started, prep countdown still draining.
    Prep { remaining: f32 },
    /// Groups are still spawning.
    Spawning { group: usize, spawned_in_group: usize },
    /// Everything spawned; waiting for the roster to empty.
    Clearing,
}

impl Default for WaveStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Per-enemy observation entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyInfo {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub max_health: f32,
    pub invisible: bool,
    pub silenced: bool,
    pub shape: Shape,
    pub color: Rgb,
    pub radius: f32,
}

/// Per-tower observation entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TowerInfo {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub preset: String,
    pub facing: f32,
    pub range: f32,
    pub magazine_shots: u32,
    pub reloading_magazine: bool,
}

/// Per-projectile observation entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectileInfo {
    pub x: f32,
    pub y: f32,
    pub explosive: bool,
}

/// Full game state snapshot for external observers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TdObservation {
    pub tick: u64,
    pub ticks_per_second: u32,
    pub game_speed: f32,

    pub phase: String,
    pub current_wave: usize,
    pub waves_total: usize,
    pub wave_status: WaveStatus,

    pub gold: u32,
    pub wood: u32,
    pub metal: u32,
    pub health: u32,

    pub enemies: Vec<EnemyInfo>,
    pub towers: Vec<TowerInfo>,
    pub projectiles: Vec<ProjectileInfo>,
}
