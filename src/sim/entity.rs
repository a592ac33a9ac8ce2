//! Entity data model and factory
//!
//! Every simulated object (ship, bullet, pickup, particle) is an `Entity`.
//! Kind-specific behaviour lives in the tick; this module only builds them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::EntityId;
use crate::consts::*;
use crate::{box_center, direction};

/// Entity type, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    PlayerProjectile,
    Enemy,
    EnemyProjectile,
    Boss,
    Particle,
    LevelKey,
    Coin,
}

impl EntityKind {
    /// Enemies and bosses: damaged by player fire, hurt the player on contact
    pub fn is_hostile(self) -> bool {
        matches!(self, EntityKind::Enemy | EntityKind::Boss)
    }
}

/// Boss visual/behaviour branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossVariant {
    /// Mid-boss
    #[default]
    Alpha,
    /// Final boss
    Omega,
}

/// The universal mutable simulation unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Top-left corner of the bounding box
    pub pos: Vec2,
    pub size: Vec2,
    /// Per-frame delta
    pub vel: Vec2,
    /// 0xRRGGBB
    pub color: u32,
    pub health: f32,
    pub max_health: f32,
    /// Soft delete; removed at end-of-tick compaction
    pub marked_for_deletion: bool,
    /// Set once death rewards have been paid out
    #[serde(default)]
    pub rewarded: bool,
    pub score_value: u32,
    pub currency_value: u32,
    /// Coin face value
    pub value: u32,
    /// Phase seed for sinusoidal drift
    pub hover_offset: f32,
    pub has_shield: bool,
    pub fire_chance: f32,
    /// Frames until the next hostile shot
    pub shoot_cooldown: f32,
    pub variant: BossVariant,
}

impl Entity {
    pub fn center(&self) -> Vec2 {
        box_center(self.pos, self.size)
    }

    pub fn is_alive(&self) -> bool {
        !self.marked_for_deletion
    }

    pub fn mark_for_deletion(&mut self) {
        self.marked_for_deletion = true;
    }

    /// One-shot gate for death rewards. Returns true only the first time.
    pub fn claim_reward(&mut self) -> bool {
        if self.rewarded {
            return false;
        }
        self.rewarded = true;
        true
    }

    /// Presentation hint: big coins get the larger sprite
    pub fn is_big_coin(&self) -> bool {
        self.kind == EntityKind::Coin && self.value >= BIG_COIN_VALUE
    }
}

/// Parameters for `create_entity` beyond the positional basics
#[derive(Debug, Clone, Copy)]
pub struct Spawn {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub color: u32,
    pub vel: Vec2,
    pub health: f32,
    pub currency_value: u32,
    pub fire_chance: f32,
    pub variant: BossVariant,
}

impl Spawn {
    pub fn new(kind: EntityKind, pos: Vec2, size: Vec2, color: u32, vel: Vec2) -> Self {
        Self {
            kind,
            pos,
            size,
            color,
            vel,
            health: 1.0,
            currency_value: 0,
            fire_chance: 0.0,
            variant: BossVariant::Alpha,
        }
    }

    pub fn health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    pub fn currency(mut self, value: u32) -> Self {
        self.currency_value = value;
        self
    }

    pub fn fire_chance(mut self, chance: f32) -> Self {
        self.fire_chance = chance;
        self
    }

    pub fn variant(mut self, variant: BossVariant) -> Self {
        self.variant = variant;
        self
    }
}

/// Build an entity with randomized cosmetic seeds
///
/// `hover_offset` is drawn from [0, 100) and the first hostile shot is delayed
/// by [120, 180) frames so simultaneous spawns don't fire in lockstep.
pub fn create_entity(spawn: Spawn, rng: &mut (impl Rng + ?Sized)) -> Entity {
    Entity {
        id: EntityId::UNASSIGNED,
        kind: spawn.kind,
        pos: spawn.pos,
        size: spawn.size,
        vel: spawn.vel,
        color: spawn.color,
        health: spawn.health,
        max_health: spawn.health,
        marked_for_deletion: false,
        rewarded: false,
        score_value: 100,
        currency_value: spawn.currency_value,
        value: 0,
        hover_offset: rng.random_range(0.0..100.0),
        has_shield: false,
        fire_chance: spawn.fire_chance,
        shoot_cooldown: rng.random_range(120.0..180.0),
        variant: spawn.variant,
    }
}

/// Level key: descends slowly from `(x, y)`
pub fn create_level_key(x: f32, y: f32) -> Entity {
    Entity {
        id: EntityId::UNASSIGNED,
        kind: EntityKind::LevelKey,
        pos: Vec2::new(x, y),
        size: LEVEL_KEY_SIZE,
        vel: Vec2::new(0.0, 1.5),
        color: COLOR_LEVEL_KEY,
        health: 1.0,
        max_health: 1.0,
        marked_for_deletion: false,
        rewarded: false,
        score_value: 1000,
        currency_value: 0,
        value: 0,
        hover_offset: 0.0,
        has_shield: false,
        fire_chance: 0.0,
        shoot_cooldown: 0.0,
        variant: BossVariant::Alpha,
    }
}

/// Coin pickup worth `value`, bursting outward at `vel`
pub fn create_coin(pos: Vec2, vel: Vec2, value: u32) -> Entity {
    let size = if value >= BIG_COIN_VALUE {
        BIG_COIN_SIZE
    } else {
        COIN_SIZE
    };
    Entity {
        id: EntityId::UNASSIGNED,
        kind: EntityKind::Coin,
        pos,
        size,
        vel,
        color: COLOR_COIN,
        health: 1.0,
        max_health: 1.0,
        marked_for_deletion: false,
        rewarded: false,
        score_value: 0,
        currency_value: 0,
        value,
        hover_offset: 0.0,
        has_shield: false,
        fire_chance: 0.0,
        shoot_cooldown: 0.0,
        variant: BossVariant::Alpha,
    }
}

/// Decorative particle burst at `(x, y)`: random direction, speed in [1, 5)
pub fn create_explosion(
    x: f32,
    y: f32,
    color: u32,
    count: usize,
    rng: &mut (impl Rng + ?Sized),
) -> Vec<Entity> {
    (0..count)
        .map(|_| {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(1.0..5.0);
            let spawn = Spawn::new(
                EntityKind::Particle,
                Vec2::new(x, y),
                PARTICLE_SIZE,
                color,
                direction(angle) * speed,
            );
            create_entity(spawn, rng)
        })
        .collect()
}

/// Player ship centred horizontally, `150` above the bottom edge
pub fn create_player(
    field: Vec2,
    max_health: f32,
    shielded: bool,
    rng: &mut (impl Rng + ?Sized),
) -> Entity {
    let pos = Vec2::new(field.x / 2.0 - PLAYER_SIZE.x / 2.0, field.y - 150.0);
    let spawn = Spawn::new(EntityKind::Player, pos, PLAYER_SIZE, COLOR_PLAYER, Vec2::ZERO)
        .health(max_health);
    let mut player = create_entity(spawn, rng);
    player.has_shield = shielded;
    player
}
