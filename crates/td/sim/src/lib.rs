//! Real-time tower-defense combat simulation core.
//!
//! The simulation is a fixed-order, single-threaded tick: wave scheduler,
//! enemies (movement + abilities), player ability overlays, towers
//! (timers + target acquisition), projectiles (homing + resolution), then
//! housekeeping. Towers coordinate through damage reservations
//! (`incoming_damage`) so several towers firing in the same tick never
//! over-kill a target that is already slated to die.

pub mod abilities;
pub mod actions;
pub mod config;
pub mod economy;
pub mod enemy;
pub mod events;
pub mod game;
pub mod observe;
pub mod player_abilities;
pub mod projectile;
pub mod spawn;
pub mod systems;
pub mod tower;
pub mod world;

pub use actions::TdAction;
pub use config::TdConfig;
pub use economy::{Resource, Resources};
pub use events::TdEvent;
pub use game::TdGame;
pub use player_abilities::PlayerAbility;
pub use world::{EnemyId, GamePhase, ProjectileId, TdState, TowerId, World};
