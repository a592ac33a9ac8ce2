//! Game state and core simulation types
//!
//! Everything one run of the simulation mutates lives here. The upgrade
//! economy is not part of it: it outlives runs and is passed into the tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::{EntityArena, EntityId};
use super::boss::BossRuntime;
use super::director::WaveRuntime;
use super::entity::{Entity, EntityKind, create_explosion, create_player};
use super::progress::{PlayerProgress, UpgradeKind};
use super::stage::{self, StageConfig};
use crate::consts::FIELD_WIDTH;
use crate::settings::Settings;

/// Frames the red damage flash stays up
pub const DAMAGE_FLASH_FRAMES: u32 = 15;
/// Frames the cyan shield ripple stays up
pub const SHIELD_FLASH_FRAMES: u32 = 20;

/// Current phase of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Stage cleared, waiting for the player to continue
    LevelComplete,
    /// Final stage cleared
    Victory,
    /// Run ended
    GameOver,
    StageSelect,
    UpgradeMenu,
}

impl GamePhase {
    /// Phases that freeze the field but keep drawing it
    pub fn is_overlay(self) -> bool {
        matches!(
            self,
            GamePhase::Paused | GamePhase::LevelComplete | GamePhase::Victory | GamePhase::GameOver
        )
    }
}

/// HUD numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u64,
    /// Current 1-based stage
    pub level: u32,
    /// Player health for display, never below 0
    pub lives: u32,
    pub max_lives: u32,
}

/// Full-screen feedback timers (frames remaining)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenEffects {
    pub damage_flash: u32,
    pub shield_flash: u32,
    /// Whether damage also shakes the camera
    pub shake_enabled: bool,
}

impl ScreenEffects {
    pub fn decay(&mut self) {
        self.damage_flash = self.damage_flash.saturating_sub(1);
        self.shield_flash = self.shield_flash.saturating_sub(1);
    }

    /// Camera shake amplitude for the renderer
    pub fn shake(&self) -> f32 {
        if self.shake_enabled && self.damage_flash > 0 { 5.0 } else { 0.0 }
    }
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyKilled { id: EntityId, reward: u32 },
    BossSpawned { id: EntityId },
    BossDefeated { id: EntityId, reward: u32 },
    KeySpawned,
    KeyCollected,
    PlayerHit { health: f32 },
    ShieldAbsorbed,
    EnemyLeaked,
    CoinCollected { value: u32 },
    LevelComplete { level: u32 },
    Victory,
    GameOver { score: u64 },
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Play-field size
    pub field: Vec2,
    /// Fraction of the field height the player may travel in
    pub player_travel: f32,
    /// Live decorative particle cap (0 disables bursts)
    pub max_particles: usize,
    pub phase: GamePhase,
    pub stats: GameStats,
    /// Simulation tick counter (advances only while playing)
    pub frame: u64,
    /// Frame of the last player volley
    pub last_shot_frame: u64,
    pub entities: EntityArena,
    pub player: Option<EntityId>,
    pub waves: WaveRuntime,
    pub boss: BossRuntime,
    pub effects: ScreenEffects,
}

impl GameState {
    /// Create an idle state (menu, no entities)
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            field: Vec2::new(FIELD_WIDTH, settings.field_height),
            player_travel: settings.player_travel,
            max_particles: settings.max_particles(),
            phase: GamePhase::Menu,
            stats: GameStats {
                level: 1,
                ..Default::default()
            },
            frame: 0,
            last_shot_frame: 0,
            entities: EntityArena::new(),
            player: None,
            waves: WaveRuntime::default(),
            boss: BossRuntime::default(),
            effects: ScreenEffects {
                shake_enabled: settings.effective_screen_shake(),
                ..Default::default()
            },
        }
    }

    /// Config of the current stage
    pub fn stage(&self) -> &'static StageConfig {
        stage::stage(self.stats.level)
    }

    /// Full reset into `level`: empty field, fresh player, counters at zero
    pub fn start_stage(&mut self, level: u32, progress: &PlayerProgress) {
        self.entities.clear();
        self.frame = 0;
        self.last_shot_frame = 0;
        self.effects.damage_flash = 0;
        self.effects.shield_flash = 0;
        self.stats.score = 0;
        self.stats.level = level;
        self.reset_runtime();

        let max_health = progress.stat_value(UpgradeKind::MaxHealth);
        let shielded = progress.level(UpgradeKind::Shield) > 0;
        let player = create_player(self.field, max_health, shielded, &mut self.rng);
        self.player = Some(self.entities.insert(player));
        self.stats.lives = max_health as u32;
        self.stats.max_lives = max_health as u32;
        log::info!(
            "Stage {} \"{}\" started (seed {}, hp {}, shield {})",
            level,
            self.stage().name,
            self.seed,
            max_health,
            shielded
        );
    }

    /// Continue into `level` keeping the field: refill health, re-arm the shield
    pub fn advance_to(&mut self, level: u32, progress: &PlayerProgress) {
        self.stats.level = level;
        self.reset_runtime();

        let max_health = progress.stat_value(UpgradeKind::MaxHealth);
        let shielded = progress.level(UpgradeKind::Shield) > 0;
        match self.player_mut() {
            Some(player) => {
                player.health = max_health;
                player.max_health = max_health;
                if shielded {
                    player.has_shield = true;
                }
            }
            None => {
                self.start_stage(level, progress);
                return;
            }
        }
        self.stats.lives = max_health as u32;
        self.stats.max_lives = max_health as u32;
        log::info!("Advanced to stage {} \"{}\"", level, self.stage().name);
    }

    /// Wave and boss counters back to their stage-entry values
    pub fn reset_runtime(&mut self) {
        self.waves.reset();
        self.boss.reset();
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn player_entity(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entities.get(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.player.and_then(|id| self.entities.get_mut(id))
    }

    pub fn player_center(&self) -> Option<Vec2> {
        self.player_entity().map(Entity::center)
    }

    /// Decorative burst, subject to the particle cap
    pub fn spawn_particles(&mut self, pos: Vec2, color: u32, count: usize) {
        let live = self.entities.count(EntityKind::Particle);
        let count = count.min(self.max_particles.saturating_sub(live));
        if count == 0 {
            return;
        }
        let particles = create_explosion(pos.x, pos.y, color, count, &mut self.rng);
        self.entities.extend(particles);
    }

    /// Refresh the displayed health from the player entity
    pub fn sync_lives(&mut self) {
        if let Some(health) = self.player_entity().map(|p| p.health) {
            self.stats.lives = health.max(0.0) as u32;
        }
    }
}
