//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only, every wait is counted in frames
//! - Seeded RNG only (owned by `GameState`)
//! - Stable iteration order (insertion order in the arena)
//! - No rendering or audio beyond the collaborator traits

pub mod arena;
pub mod boss;
pub mod collision;
pub mod director;
pub mod entity;
pub mod input;
pub mod progress;
pub mod stage;
pub mod state;
pub mod tick;

pub use arena::{EntityArena, EntityId};
pub use boss::{BossPhase, BossRuntime};
pub use collision::{Aabb, intersects, plan_loot, spawn_loot};
pub use director::WaveRuntime;
pub use entity::{BossVariant, Entity, EntityKind};
pub use input::{PointerInput, autopilot};
pub use progress::{PlayerProgress, PurchaseError, UpgradeKind};
pub use stage::{STAGES, StageConfig, WaveConfig};
pub use state::{GameEvent, GamePhase, GameState, GameStats, ScreenEffects};
pub use tick::{TickContext, TickResult, tick};
