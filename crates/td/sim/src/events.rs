//! Events emitted during a tick, in emission order.

use td_types::ResourceCost;

use crate::player_abilities::PlayerAbility;
use crate::world::{EnemyId, TowerId};

#[derive(Clone, Debug)]
pub enum TdEvent {
    WaveStarted {
        wave: usize,
    },
    WaveCompleted {
        wave: usize,
        gold: u32,
        wood: u32,
        metal: u32,
    },

    EnemySpawned {
        enemy: EnemyId,
    },
    EnemyKilled {
        enemy: EnemyId,
        gold_reward: u32,
    },
    EnemyReachedEnd {
        enemy: EnemyId,
        damage: u32,
    },

    EnemyHealed {
        enemy: EnemyId,
        amount: f32,
    },
    EnemiesSummoned {
        by: EnemyId,
        count: u32,
    },
    DashStarted {
        enemy: EnemyId,
    },
    BossPhaseChanged {
        enemy: EnemyId,
        stage: u32,
    },
    BossGlitchBurst {
        enemy: EnemyId,
        count: u32,
    },

    EnemySilenced {
        enemy: EnemyId,
    },
    EnemySlowed {
        enemy: EnemyId,
    },
    EnemyRevealed {
        enemy: EnemyId,
    },

    TowerBuilt {
        tower: TowerId,
        preset: String,
    },
    TowerUpgraded {
        tower: TowerId,
    },
    FactoryBuilt {
        preset: String,
    },
    AbilityUsed {
        ability: PlayerAbility,
    },
    ResourcesInsufficient {
        cost: ResourceCost,
    },

    GameSpeedChanged {
        speed: f32,
    },
    GameOver {
        won: bool,
    },
}
