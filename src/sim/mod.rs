//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only; every timer counts ticks, so pausing freezes them
//! - Seeded RNG only
//! - No rendering, audio playback or platform dependencies

pub mod bullet;
pub mod collision;
pub mod drone;
pub mod enemy;
pub mod item;
pub mod player;
pub mod shake;
pub mod skills;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;
pub mod turret;
pub mod weapon;

pub use bullet::{Bullet, BulletSource};
pub use drone::{Drone, DroneRegistry};
pub use enemy::{Behavior, Enemy, EnemyKind};
pub use item::{Item, ItemKind};
pub use player::{Facing, MoveAxes, Player};
pub use skills::{Modifiers, Skill, SkillSet};
pub use snapshot::RenderSnapshot;
pub use spawner::WaveSpawner;
pub use state::{GameEvent, GamePhase, GameState, Loadout};
pub use tick::{TickInput, tick};
pub use turret::Turret;
pub use weapon::{WeaponKind, WeaponState};
