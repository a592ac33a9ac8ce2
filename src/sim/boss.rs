//! Boss behaviour state machine
//!
//! Every boss descends (`Entering`), then loops `Cooldown -> attack -> Cooldown`.
//! Attack sets differ per variant and are kept apart behind `BossPattern`:
//! the mid-boss (Alpha) cycles three firing patterns, the final boss (Omega)
//! swaps the third for a teleport.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::entity::{BossVariant, Entity, EntityKind, Spawn, create_entity};
use crate::consts::*;
use crate::direction;

/// Y position at which a descending boss starts fighting
pub const BOSS_HOVER_Y: f32 = 50.0;
/// Frames a teleport takes to vanish and to reappear
pub const TELEPORT_FRAMES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossPhase {
    Entering,
    Cooldown,
    Attack1,
    Attack2,
    Attack3,
    TeleportOut,
    TeleportIn,
}

/// Per-stage boss runtime, reset on stage entry
#[derive(Debug, Clone, PartialEq)]
pub struct BossRuntime {
    pub phase: BossPhase,
    /// Frames since entering `phase`
    pub timer: u32,
    pub teleport_target: Vec2,
}

impl Default for BossRuntime {
    fn default() -> Self {
        Self {
            phase: BossPhase::Entering,
            timer: 0,
            teleport_target: Vec2::ZERO,
        }
    }
}

impl BossRuntime {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn enter(&mut self, phase: BossPhase) {
        log::debug!("Boss {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.timer = 0;
    }
}

/// World facts a boss reacts to
#[derive(Debug, Clone, Copy)]
pub struct BossContext {
    pub frame: u64,
    pub field_width: f32,
    pub player_center: Option<Vec2>,
    pub projectile_color: u32,
}

/// Variant-specific attack script
pub trait BossPattern {
    /// Minimum frames spent in `Cooldown`
    fn cooldown_frames(&self) -> u32;

    /// Weighted attack choice from a uniform roll in [0, 1)
    fn choose_attack(&self, roll: f32) -> BossPhase;

    /// States reachable from `phase`
    fn successors(&self, phase: BossPhase) -> &'static [BossPhase];

    /// Horizontal sway applied before the state handler
    fn drift(&self, phase: BossPhase, boss: &mut Entity, ctx: &BossContext);

    /// Run one frame of an attack or teleport state, pushing projectiles to
    /// `out`. Returns the next state once this one has finished.
    fn run(
        &self,
        runtime: &mut BossRuntime,
        boss: &mut Entity,
        muzzle: Vec2,
        ctx: &BossContext,
        rng: &mut dyn RngCore,
        out: &mut Vec<Entity>,
    ) -> Option<BossPhase>;
}

/// Mid-boss: aimed shots, a five-way fan and a rotating ring
pub struct MidBoss;

/// Final boss: radial bursts, a weaving stream and teleports
pub struct FinalBoss;

pub fn pattern(variant: BossVariant) -> &'static dyn BossPattern {
    match variant {
        BossVariant::Alpha => &MidBoss,
        BossVariant::Omega => &FinalBoss,
    }
}

fn projectile(pos: Vec2, size: Vec2, color: u32, vel: Vec2, rng: &mut dyn RngCore) -> Entity {
    create_entity(
        Spawn::new(EntityKind::EnemyProjectile, pos, size, color, vel),
        rng,
    )
}

impl BossPattern for MidBoss {
    fn cooldown_frames(&self) -> u32 {
        90
    }

    fn choose_attack(&self, roll: f32) -> BossPhase {
        if roll < 0.33 {
            BossPhase::Attack1
        } else if roll < 0.66 {
            BossPhase::Attack2
        } else {
            BossPhase::Attack3
        }
    }

    fn successors(&self, phase: BossPhase) -> &'static [BossPhase] {
        match phase {
            BossPhase::Cooldown => &[BossPhase::Attack1, BossPhase::Attack2, BossPhase::Attack3],
            BossPhase::Entering | BossPhase::Attack1 | BossPhase::Attack2 | BossPhase::Attack3 => {
                &[BossPhase::Cooldown]
            }
            BossPhase::TeleportOut | BossPhase::TeleportIn => &[],
        }
    }

    fn drift(&self, _phase: BossPhase, boss: &mut Entity, ctx: &BossContext) {
        boss.pos.x += (ctx.frame as f32 * 0.02).sin() * 2.0;
        boss.pos.x = boss.pos.x.clamp(0.0, ctx.field_width - boss.size.x);
    }

    fn run(
        &self,
        runtime: &mut BossRuntime,
        _boss: &mut Entity,
        muzzle: Vec2,
        ctx: &BossContext,
        rng: &mut dyn RngCore,
        out: &mut Vec<Entity>,
    ) -> Option<BossPhase> {
        let (period, duration) = match runtime.phase {
            BossPhase::Attack1 => (30, 120),
            BossPhase::Attack2 => (40, 120),
            BossPhase::Attack3 => (20, 100),
            _ => return Some(BossPhase::Cooldown),
        };

        if ctx.frame % period == 0 {
            match runtime.phase {
                // Aimed shot
                BossPhase::Attack1 => {
                    if let Some(target) = ctx.player_center {
                        let aim = (target - muzzle).normalize_or_zero();
                        let size = Vec2::new(8.0, 20.0);
                        out.push(projectile(muzzle, size, ctx.projectile_color, aim * 7.0, rng));
                    }
                }
                // Five-way fan
                BossPhase::Attack2 => {
                    for spread in [-0.5, -0.2, 0.0, 0.2, 0.5] {
                        let vel = Vec2::new(spread * 6.0, 6.0);
                        out.push(projectile(muzzle, Vec2::new(8.0, 20.0), COLOR_MAGENTA, vel, rng));
                    }
                }
                // Rotating six-point ring
                _ => {
                    for i in 0..6 {
                        let angle = TAU / 6.0 * i as f32 + runtime.timer as f32 * 0.1;
                        let dir = direction(angle);
                        let pos = muzzle + dir * 40.0;
                        out.push(projectile(pos, Vec2::new(6.0, 6.0), COLOR_WHITE, dir * 4.0, rng));
                    }
                }
            }
        }

        (runtime.timer > duration).then_some(BossPhase::Cooldown)
    }
}

impl BossPattern for FinalBoss {
    fn cooldown_frames(&self) -> u32 {
        60
    }

    fn choose_attack(&self, roll: f32) -> BossPhase {
        if roll < 0.4 {
            BossPhase::Attack1
        } else if roll < 0.7 {
            BossPhase::TeleportOut
        } else {
            BossPhase::Attack2
        }
    }

    fn successors(&self, phase: BossPhase) -> &'static [BossPhase] {
        match phase {
            BossPhase::Cooldown => {
                &[BossPhase::Attack1, BossPhase::Attack2, BossPhase::TeleportOut]
            }
            BossPhase::TeleportOut => &[BossPhase::TeleportIn],
            BossPhase::Entering
            | BossPhase::Attack1
            | BossPhase::Attack2
            | BossPhase::TeleportIn => {
                &[BossPhase::Cooldown]
            }
            BossPhase::Attack3 => &[],
        }
    }

    fn drift(&self, phase: BossPhase, boss: &mut Entity, ctx: &BossContext) {
        if phase == BossPhase::Cooldown {
            boss.pos.x += (ctx.frame as f32 * 0.05).sin();
        }
    }

    fn run(
        &self,
        runtime: &mut BossRuntime,
        boss: &mut Entity,
        muzzle: Vec2,
        ctx: &BossContext,
        rng: &mut dyn RngCore,
        out: &mut Vec<Entity>,
    ) -> Option<BossPhase> {
        let t = runtime.timer;
        match runtime.phase {
            // Twelve-way radial burst
            BossPhase::Attack1 => {
                if t % 20 == 0 {
                    for i in 0..12 {
                        let dir = direction(TAU / 12.0 * i as f32);
                        let size = Vec2::new(10.0, 10.0);
                        out.push(projectile(muzzle, size, COLOR_WHITE, dir * 5.0, rng));
                    }
                }
                (t > 60).then_some(BossPhase::Cooldown)
            }
            // Weaving stream
            BossPhase::Attack2 => {
                if t % 5 == 0 {
                    let spread = (t as f32 * 0.2).sin() * 2.0;
                    let pos = muzzle + Vec2::new(spread * 10.0, 0.0);
                    let vel = Vec2::new(spread, 7.0);
                    out.push(projectile(pos, Vec2::new(6.0, 15.0), ctx.projectile_color, vel, rng));
                }
                (t > 100).then_some(BossPhase::Cooldown)
            }
            BossPhase::TeleportOut => {
                boss.size *= 0.9;
                if t <= TELEPORT_FRAMES {
                    return None;
                }
                let span = ctx.field_width - BOSS_SIZE.x - 2.0 * super::director::BOSS_SPAWN_BUFFER;
                runtime.teleport_target = Vec2::new(
                    super::director::BOSS_SPAWN_BUFFER + rng.random_range(0.0..1.0) * span,
                    BOSS_HOVER_Y + rng.random_range(0.0..100.0),
                );
                boss.pos = runtime.teleport_target;
                Some(BossPhase::TeleportIn)
            }
            BossPhase::TeleportIn => {
                boss.size = (boss.size * 1.15).min(BOSS_SIZE);
                if t <= TELEPORT_FRAMES {
                    return None;
                }
                boss.size = BOSS_SIZE;
                Some(BossPhase::Cooldown)
            }
            _ => Some(BossPhase::Cooldown),
        }
    }
}

/// Advance a boss by one frame; returns the projectiles it fired
pub fn update_boss(
    runtime: &mut BossRuntime,
    boss: &mut Entity,
    ctx: &BossContext,
    rng: &mut dyn RngCore,
) -> Vec<Entity> {
    let mut out = Vec::new();

    if boss.pos.y < BOSS_HOVER_Y {
        boss.pos.y += 1.0;
    }
    let muzzle = Vec2::new(boss.pos.x + boss.size.x / 2.0, boss.pos.y + boss.size.y);
    runtime.timer += 1;

    if runtime.phase == BossPhase::Entering {
        if boss.pos.y >= BOSS_HOVER_Y {
            runtime.enter(BossPhase::Cooldown);
        }
        return out;
    }

    let script = pattern(boss.variant);
    script.drift(runtime.phase, boss, ctx);

    let next = if runtime.phase == BossPhase::Cooldown {
        if runtime.timer > script.cooldown_frames() {
            Some(script.choose_attack(rng.random()))
        } else {
            None
        }
    } else {
        script.run(runtime, boss, muzzle, ctx, rng, &mut out)
    };

    if let Some(next) = next {
        debug_assert!(script.successors(runtime.phase).contains(&next));
        runtime.enter(next);
    }
    out
}
