//! Entity arenas and the aggregate simulation state.

use rand::rngs::StdRng;
use rand::SeedableRng;
use slotmap::SlotMap;

use sim_core::Tick;

use crate::config::TdConfig;
use crate::economy::{Factory, Resources};
use crate::enemy::Enemy;
use crate::player_abilities::PlayerEffects;
use crate::projectile::Projectile;
use crate::spawn::{SpawnController, Wave};
use crate::tower::Tower;

slotmap::new_key_type! {
    pub struct EnemyId;
    pub struct TowerId;
    pub struct ProjectileId;
}

/// All live entities. Slotmap keys stay valid across removals of other
/// entities, so projectiles can hold on to their target id safely.
#[derive(Default)]
pub struct World {
    pub enemies: SlotMap<EnemyId, Enemy>,
    pub towers: SlotMap<TowerId, Tower>,
    pub projectiles: SlotMap<ProjectileId, Projectile>,
}

/// Coarse match phase. Victory and Defeat are absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Build,
    Wave,
    Victory,
    Defeat,
}

/// The whole mutable simulation state. Systems are free functions over
/// this struct; field-level borrows keep the arenas independently
/// mutable within one system.
pub struct TdState {
    pub config: TdConfig,
    pub tick: Tick,
    pub game_speed: f32,
    pub phase: GamePhase,

    pub world: World,
    pub resources: Resources,
    pub factories: Vec<Factory>,

    pub waves: Vec<Wave>,
    pub current_wave: usize,
    pub spawner: SpawnController,

    pub player_effects: PlayerEffects,

    pub rng: StdRng,
}

impl TdState {
    pub fn new(config: TdConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let waves = crate::spawn::compile_waves(&config, &mut rng);
        let resources = Resources::new(
            config.start_gold,
            config.start_wood,
            config.start_metal,
            config.start_health,
        );

        Self {
            config,
            tick: 0,
            game_speed: 1.0,
            phase: GamePhase::Build,
            world: World::default(),
            resources,
            factories: Vec::new(),
            waves,
            current_wave: 0,
            spawner: SpawnController::default(),
            player_effects: PlayerEffects::default(),
            rng,
        }
    }

    /// Simulated seconds covered by one tick at the current game speed.
    pub fn dt(&self) -> f32 {
        self.game_speed / self.config.tick_hz as f32
    }
}
