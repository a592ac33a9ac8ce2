//! Nebula Strike - a two-world vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (entities, waves, bosses, collisions, economy)
//! - `session`: App-level flow around the simulation (stage select, upgrades, restarts)
//! - `audio`: Fire-and-forget audio cue interface
//! - `renderer`: Render collaborator interface
//! - `settings`: Data-driven configuration

pub mod audio;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::Session;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Logical play-field width (height adapts to the display aspect ratio)
    pub const FIELD_WIDTH: f32 = 600.0;
    /// Fallback play-field height
    pub const DEFAULT_FIELD_HEIGHT: f32 = 800.0;
    /// Fraction of the field height the player may travel in (measured from the bottom)
    pub const PLAYER_MAX_Y_PERCENT: f32 = 0.9;

    pub const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 40.0);
    pub const PROJECTILE_SIZE: Vec2 = Vec2::new(6.0, 16.0);
    pub const ENEMY_SIZE: Vec2 = Vec2::new(35.0, 35.0);
    pub const BOSS_SIZE: Vec2 = Vec2::new(140.0, 100.0);
    pub const LEVEL_KEY_SIZE: Vec2 = Vec2::new(30.0, 30.0);
    pub const COIN_SIZE: Vec2 = Vec2::new(10.0, 10.0);
    pub const BIG_COIN_SIZE: Vec2 = Vec2::new(18.0, 18.0);
    pub const PARTICLE_SIZE: Vec2 = Vec2::new(3.0, 3.0);

    /// Coins worth at least this much use the big coin sprite
    pub const BIG_COIN_VALUE: u32 = 50;

    /// Palette (0xRRGGBB)
    pub const COLOR_PLAYER: u32 = 0xffffff;
    pub const COLOR_PLAYER_PROJECTILE: u32 = 0xffff00;
    pub const COLOR_PLAYER_PROJECTILE_MAX: u32 = 0x00ffff;
    pub const COLOR_LEVEL_KEY: u32 = 0xffd700;
    pub const COLOR_COIN: u32 = 0xffd700;
    pub const COLOR_SHIELD: u32 = 0x00ffff;
    pub const COLOR_CRIT: u32 = 0xff0000;
    pub const COLOR_WHITE: u32 = 0xffffff;
    pub const COLOR_MAGENTA: u32 = 0xff00ff;
}

/// Center point of a box given its top-left corner and size
#[inline]
pub fn box_center(pos: Vec2, size: Vec2) -> Vec2 {
    pos + size / 2.0
}

/// Unit vector for an angle in radians
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
