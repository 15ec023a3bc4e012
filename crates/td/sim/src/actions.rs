//! Player commands. Placement legality (terrain, overlap) is the level
//! editor's concern; the simulation only enforces costs and phase rules.

use crate::player_abilities::PlayerAbility;
use crate::world::TowerId;

#[derive(Clone, Debug)]
pub enum TdAction {
    /// Leave the build phase and launch the next wave.
    StartWave,
    PlaceTower {
        x: f32,
        y: f32,
        preset: String,
    },
    UpgradeTower {
        tower: TowerId,
    },
    PlaceFactory {
        preset: String,
    },
    UseAbility {
        ability: PlayerAbility,
        x: f32,
        y: f32,
    },
    SetGameSpeed {
        speed: f32,
    },
}
