//! Fixed timestep simulation tick
//!
//! One call advances the field by one frame, in a fixed order:
//! spawn, move/behave, cull, player fire vs hostiles, player contacts,
//! compact, render. Deletions are only marked until the compact step, so
//! every pass sees the same set of stored entities.

use glam::Vec2;
use rand::Rng;

use super::arena::EntityId;
use super::boss::{BossContext, update_boss};
use super::collision::{intersects, spawn_loot};
use super::director::DirectorView;
use super::entity::{Entity, EntityKind, Spawn, create_entity};
use super::input::PointerInput;
use super::progress::{PlayerProgress, UpgradeKind};
use super::stage::{StageConfig, is_final_stage};
use super::state::{DAMAGE_FLASH_FRAMES, GameEvent, GamePhase, GameState, SHIELD_FLASH_FRAMES};
use crate::audio::{AudioCue, MusicState, SoundEffect};
use crate::consts::*;
use crate::renderer::{Renderer, Scene};

const ENEMY_SHOT_SPEED: f32 = 4.0;
const ENEMY_SHOT_SIZE: Vec2 = Vec2::new(8.0, 14.0);

const COIN_GRAVITY: f32 = 0.05;
const COIN_TERMINAL_VELOCITY: f32 = 3.0;
const COIN_DRAG: f32 = 0.95;
const MAGNET_PULL: f32 = 1.5;

const PARTICLE_SHRINK: f32 = 0.92;
const PARTICLE_MIN_WIDTH: f32 = 0.2;

/// Off-screen slack before projectiles, coins and particles are culled
const CULL_BELOW: f32 = 50.0;
const CULL_ABOVE: f32 = -150.0;
const CULL_SIDE: f32 = 100.0;

const HIT_BURST: usize = 3;
const DEATH_BURST: usize = 15;
const PLAYER_HIT_BURST: usize = 20;

/// Collaborators a tick talks to
pub struct TickContext<'a> {
    pub progress: &'a mut PlayerProgress,
    pub audio: &'a mut dyn AudioCue,
    pub renderer: &'a mut dyn Renderer,
}

/// Result of a single tick
#[derive(Debug, Clone, Default)]
pub struct TickResult {
    pub events: Vec<GameEvent>,
}

impl TickResult {
    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

/// Upgrade stats, sampled once per tick
#[derive(Debug, Clone, Copy)]
struct Loadout {
    damage: f32,
    max_damage: bool,
    fire_delay: f32,
    move_speed: f32,
    extra_shots: f32,
    projectile_speed: f32,
    magnet_radius: f32,
    crit_chance: f32,
}

impl Loadout {
    fn sample(progress: &PlayerProgress) -> Self {
        Self {
            damage: progress.stat_value(UpgradeKind::WeaponDamage),
            max_damage: progress.is_maxed(UpgradeKind::WeaponDamage),
            fire_delay: progress.stat_value(UpgradeKind::FireRate),
            move_speed: progress.stat_value(UpgradeKind::MovementSpeed),
            extra_shots: progress.stat_value(UpgradeKind::Multishot),
            projectile_speed: progress.stat_value(UpgradeKind::ProjectileSpeed),
            magnet_radius: progress.stat_value(UpgradeKind::Magnet),
            crit_chance: progress.stat_value(UpgradeKind::CritChance),
        }
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &PointerInput, ctx: &mut TickContext<'_>) -> TickResult {
    let mut result = TickResult::default();

    // Frozen phases keep showing the field, menus show nothing
    if state.phase != GamePhase::Playing {
        if state.phase.is_overlay() {
            render(state, ctx);
        }
        return result;
    }

    state.frame += 1;
    state.effects.decay();
    let stage = state.stage();
    let loadout = Loadout::sample(ctx.progress);

    run_director(state, stage, ctx.progress, &mut result);
    update_entities(state, stage, input, &loadout, ctx, &mut result);
    cull_offscreen(state);
    resolve_player_fire(state, &loadout, ctx, &mut result);
    resolve_player_contacts(state, ctx, &mut result);

    let removed = state.entities.compact();
    log::trace!(
        "frame {} removed {} entities, {} live",
        state.frame,
        removed,
        state.entities.len()
    );

    render(state, ctx);
    result
}

/// Change phase and tell the audio collaborator which music fits
pub fn transition(state: &mut GameState, audio: &mut dyn AudioCue, phase: GamePhase) {
    state.set_phase(phase);
    audio.set_music(MusicState::for_phase(phase, state.stage()));
}

fn render(state: &GameState, ctx: &mut TickContext<'_>) {
    let scene = Scene {
        frame: state.frame,
        field: state.field,
        phase: state.phase,
        stage: state.stage(),
        entities: &state.entities,
        stats: state.stats,
        effects: state.effects,
        currency: ctx.progress.currency(),
        max_fire_rate: ctx.progress.is_maxed(UpgradeKind::FireRate),
    };
    ctx.renderer.draw(&scene);
}

fn run_director(
    state: &mut GameState,
    stage: &StageConfig,
    progress: &PlayerProgress,
    result: &mut TickResult,
) {
    let view = DirectorView {
        frame: state.frame,
        field_width: state.field.x,
        hostiles_alive: state.entities.hostile_count(),
        boss_present: state.entities.count(EntityKind::Boss) > 0,
        highest_unlocked_stage: progress.highest_unlocked_stage(),
        final_stage: is_final_stage(stage.level),
    };

    for entity in state.waves.step(stage, &view, &mut state.rng) {
        let kind = entity.kind;
        let id = state.entities.insert(entity);
        match kind {
            EntityKind::Boss => result.events.push(GameEvent::BossSpawned { id }),
            EntityKind::LevelKey => result.events.push(GameEvent::KeySpawned),
            _ => {}
        }
    }
}

fn update_entities(
    state: &mut GameState,
    stage: &StageConfig,
    input: &PointerInput,
    loadout: &Loadout,
    ctx: &mut TickContext<'_>,
    result: &mut TickResult,
) {
    // Entities spawned during this pass wait for the next frame
    for id in state.entities.ids() {
        let Some(kind) = state.entities.get(id).filter(|e| e.is_alive()).map(|e| e.kind) else {
            continue;
        };
        match kind {
            EntityKind::Player => update_player(state, id, input, loadout, ctx.audio),
            EntityKind::Enemy => update_enemy(state, id, stage, ctx.audio, result),
            EntityKind::Boss => update_boss_entity(state, id, stage),
            EntityKind::Coin => update_coin(state, id, loadout.magnet_radius),
            EntityKind::LevelKey => {
                let sway = (state.frame as f32 * 0.05).sin() * 0.5;
                if let Some(key) = state.entities.get_mut(id) {
                    key.pos.y += key.vel.y;
                    key.pos.x += sway;
                }
            }
            EntityKind::Particle => {
                if let Some(particle) = state.entities.get_mut(id) {
                    particle.pos += particle.vel;
                    particle.size *= PARTICLE_SHRINK;
                    if particle.size.x < PARTICLE_MIN_WIDTH {
                        particle.mark_for_deletion();
                    }
                }
            }
            EntityKind::PlayerProjectile | EntityKind::EnemyProjectile => {
                if let Some(shot) = state.entities.get_mut(id) {
                    shot.pos += shot.vel;
                }
            }
        }
    }
}

fn update_player(
    state: &mut GameState,
    id: EntityId,
    input: &PointerInput,
    loadout: &Loadout,
    audio: &mut dyn AudioCue,
) {
    let field = state.field;
    let min_y = field.y * (1.0 - state.player_travel);
    let Some(player) = state.entities.get_mut(id) else {
        return;
    };

    // Exponential smoothing toward the pointer
    let speed = 0.1 + loadout.move_speed;
    let max_x = field.x - player.size.x;
    let max_y = field.y - player.size.y;
    let target_x = input.pos.x - player.size.x / 2.0;
    player.pos.x += (target_x - player.pos.x) * speed;
    player.pos.x = player.pos.x.max(0.0).min(max_x);
    let target_y = (input.pos.y - player.size.y / 2.0).max(min_y).min(max_y);
    player.pos.y += (target_y - player.pos.y) * speed;
    player.pos.y = player.pos.y.max(min_y).min(max_y);
    let muzzle = Vec2::new(player.pos.x + player.size.x / 2.0, player.pos.y);

    let since_last = state.frame.saturating_sub(state.last_shot_frame) as f32;
    if !input.firing || since_last <= loadout.fire_delay {
        return;
    }

    let (width, color) = if loadout.max_damage {
        (PROJECTILE_SIZE.x + 4.0, COLOR_PLAYER_PROJECTILE_MAX)
    } else {
        (PROJECTILE_SIZE.x, COLOR_PLAYER_PROJECTILE)
    };
    let speed = loadout.projectile_speed;
    let mut volley = vec![Vec2::new(0.0, -speed)];
    if loadout.extra_shots >= 2.0 {
        volley.push(Vec2::new(-2.0, -speed * 0.95));
        volley.push(Vec2::new(2.0, -speed * 0.95));
    }
    if loadout.extra_shots >= 4.0 {
        volley.push(Vec2::new(-4.0, -speed * 0.9));
        volley.push(Vec2::new(4.0, -speed * 0.9));
    }

    for vel in volley {
        let spawn = Spawn::new(
            EntityKind::PlayerProjectile,
            Vec2::new(muzzle.x - width / 2.0, muzzle.y),
            Vec2::new(width, PROJECTILE_SIZE.y),
            color,
            vel,
        );
        let shot = create_entity(spawn, &mut state.rng);
        state.entities.insert(shot);
    }
    state.last_shot_frame = state.frame;
    audio.play(SoundEffect::Shoot);
}

fn update_enemy(
    state: &mut GameState,
    id: EntityId,
    stage: &StageConfig,
    audio: &mut dyn AudioCue,
    result: &mut TickResult,
) {
    let frame = state.frame as f32;
    let bottom = state.field.y;
    let target = state.player_center();
    let Some(enemy) = state.entities.get_mut(id) else {
        return;
    };

    enemy.pos.y += enemy.vel.y;
    enemy.pos.x += (frame * 0.05 + enemy.hover_offset).sin();

    let mut shot = None;
    if let Some(target) = target.filter(|_| enemy.fire_chance > 0.0) {
        if enemy.shoot_cooldown > 0.0 {
            enemy.shoot_cooldown -= 1.0;
        } else {
            let muzzle = Vec2::new(enemy.pos.x + enemy.size.x / 2.0, enemy.pos.y + enemy.size.y);
            let aim = (target - muzzle).normalize_or_zero() * ENEMY_SHOT_SPEED;
            shot = Some(Spawn::new(
                EntityKind::EnemyProjectile,
                Vec2::new(muzzle.x - ENEMY_SHOT_SIZE.x / 2.0, muzzle.y),
                ENEMY_SHOT_SIZE,
                stage.secondary_color,
                aim,
            ));
            enemy.shoot_cooldown = state.rng.random_range(90.0..180.0);
        }
    }

    let leaked = enemy.pos.y > bottom;
    if leaked {
        enemy.mark_for_deletion();
    }

    if let Some(spawn) = shot {
        let bullet = create_entity(spawn, &mut state.rng);
        state.entities.insert(bullet);
    }
    if leaked {
        log::debug!("Enemy {:?} leaked past the bottom edge", id);
        result.events.push(GameEvent::EnemyLeaked);
        damage_player(state, audio, result, 10);
    }
}

fn update_boss_entity(state: &mut GameState, id: EntityId, stage: &StageConfig) {
    let ctx = BossContext {
        frame: state.frame,
        field_width: state.field.x,
        player_center: state.player_center(),
        projectile_color: stage.secondary_color,
    };
    let Some(boss) = state.entities.get_mut(id) else {
        return;
    };
    let shots = update_boss(&mut state.boss, boss, &ctx, &mut state.rng);
    state.entities.extend(shots);
}

fn update_coin(state: &mut GameState, id: EntityId, magnet_radius: f32) {
    let target = state.player_center().filter(|_| magnet_radius > 0.0);
    let Some(coin) = state.entities.get_mut(id) else {
        return;
    };

    let mut pulled = false;
    if let Some(target) = target {
        let delta = target - coin.center();
        let dist = delta.length();
        if dist < magnet_radius {
            pulled = true;
            // Already on the player's centre: nothing to pull toward
            if dist > f32::EPSILON {
                coin.vel += delta / dist * MAGNET_PULL;
            }
        }
    }
    if !pulled {
        coin.vel.y = (coin.vel.y + COIN_GRAVITY).min(COIN_TERMINAL_VELOCITY);
    }

    coin.pos += coin.vel;
    coin.vel.x *= COIN_DRAG;
}

fn cull_offscreen(state: &mut GameState) {
    let field = state.field;
    for id in state.entities.ids() {
        let Some(entity) = state.entities.get_mut(id) else {
            continue;
        };
        if matches!(
            entity.kind,
            EntityKind::Player | EntityKind::Enemy | EntityKind::Boss | EntityKind::LevelKey
        ) {
            continue;
        }
        let outside = entity.pos.y > field.y + CULL_BELOW
            || entity.pos.y < CULL_ABOVE
            || entity.pos.x < -CULL_SIDE
            || entity.pos.x > field.x + CULL_SIDE;
        if outside {
            entity.mark_for_deletion();
        }
    }
}

/// Player projectiles against enemies and the boss
fn resolve_player_fire(
    state: &mut GameState,
    loadout: &Loadout,
    ctx: &mut TickContext<'_>,
    result: &mut TickResult,
) {
    let bullets = state.entities.ids_of(EntityKind::PlayerProjectile);
    let hostiles: Vec<EntityId> = state
        .entities
        .iter()
        .filter(|e| e.kind.is_hostile())
        .map(|e| e.id)
        .collect();

    for bullet_id in bullets {
        for &hostile_id in &hostiles {
            let (Some(bullet), Some(hostile)) =
                (state.entities.get(bullet_id), state.entities.get(hostile_id))
            else {
                continue;
            };
            if !bullet.is_alive() || !hostile.is_alive() || !intersects(bullet, hostile) {
                continue;
            }
            let (hit_pos, bullet_color) = (bullet.pos, bullet.color);
            state.entities.mark_for_deletion(bullet_id);

            let crit = state.rng.random::<f32>() < loadout.crit_chance;
            let damage = if crit { loadout.damage * 2.0 } else { loadout.damage };
            state.spawn_particles(hit_pos, if crit { COLOR_CRIT } else { bullet_color }, HIT_BURST);

            let Some(hostile) = state.entities.get_mut(hostile_id) else {
                continue;
            };
            hostile.health -= damage;
            if hostile.health > 0.0 || !hostile.claim_reward() {
                continue;
            }
            hostile.mark_for_deletion();
            let (kind, center, color) = (hostile.kind, hostile.center(), hostile.color);
            let (reward, score) = (hostile.currency_value, hostile.score_value);

            let is_boss = kind == EntityKind::Boss;
            ctx.audio.play(SoundEffect::Explosion { boss: is_boss });
            if reward > 0 {
                let loot = spawn_loot(center.x, center.y, reward, &mut state.rng);
                state.entities.extend(loot);
            }
            state.stats.score += score as u64;
            state.spawn_particles(center, color, DEATH_BURST);

            if is_boss {
                log::info!("Boss defeated on stage {} (reward {})", state.stats.level, reward);
                result.events.push(GameEvent::BossDefeated { id: hostile_id, reward });
                complete_level(state, ctx, result);
            } else {
                log::debug!("Enemy {:?} destroyed (reward {})", hostile_id, reward);
                result.events.push(GameEvent::EnemyKilled { id: hostile_id, reward });
            }
        }
    }
}

/// Player against hostiles, enemy shots, the key and coins
fn resolve_player_contacts(
    state: &mut GameState,
    ctx: &mut TickContext<'_>,
    result: &mut TickResult,
) {
    let Some(player_id) = state.player else {
        return;
    };
    let threats: Vec<EntityId> = state
        .entities
        .iter()
        .filter(|e| e.kind.is_hostile() || e.kind == EntityKind::EnemyProjectile)
        .map(|e| e.id)
        .collect();

    for threat_id in threats {
        if state.phase != GamePhase::Playing {
            break;
        }
        let contact = touching(state, player_id, threat_id).map(|t| (t.kind, t.pos, t.color));
        let Some((kind, pos, color)) = contact else {
            continue;
        };
        match kind {
            EntityKind::EnemyProjectile => {
                state.entities.mark_for_deletion(threat_id);
                state.spawn_particles(pos, color, 5);
            }
            EntityKind::Enemy => {
                state.entities.mark_for_deletion(threat_id);
                state.spawn_particles(pos, color, 10);
            }
            // Bosses survive contact
            _ => {}
        }
        damage_player(state, ctx.audio, result, 15);
    }

    for key_id in state.entities.ids_of(EntityKind::LevelKey) {
        if state.phase != GamePhase::Playing {
            break;
        }
        if touching(state, player_id, key_id).is_some() {
            state.entities.mark_for_deletion(key_id);
            result.events.push(GameEvent::KeyCollected);
            complete_level(state, ctx, result);
        }
    }

    // Coins are credited even when the tick already ended the stage or the run
    for coin_id in state.entities.ids_of(EntityKind::Coin) {
        let Some(value) = touching(state, player_id, coin_id).map(|c| c.value) else {
            continue;
        };
        state.entities.mark_for_deletion(coin_id);
        ctx.audio.play(SoundEffect::Collect);
        ctx.progress.add_currency(value as f64);
        result.events.push(GameEvent::CoinCollected { value });
    }
}

/// The other entity, if both are alive and overlapping
fn touching(state: &GameState, player_id: EntityId, other_id: EntityId) -> Option<&Entity> {
    let player = state.entities.get(player_id)?;
    let other = state.entities.get(other_id)?;
    (player.is_alive() && other.is_alive() && intersects(player, other)).then_some(other)
}

/// One hit on the player: the shield absorbs it, otherwise lose one health
fn damage_player(
    state: &mut GameState,
    audio: &mut dyn AudioCue,
    result: &mut TickResult,
    shield_burst: usize,
) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let Some(player) = state.player_mut() else {
        return;
    };
    let center = player.center();
    let absorbed = std::mem::take(&mut player.has_shield);
    if !absorbed {
        player.health -= 1.0;
    }
    let health = player.health;
    audio.play(SoundEffect::Damage);

    if absorbed {
        log::debug!("Shield absorbed a hit");
        state.effects.shield_flash = SHIELD_FLASH_FRAMES;
        state.spawn_particles(center, COLOR_SHIELD, shield_burst);
        result.events.push(GameEvent::ShieldAbsorbed);
        return;
    }

    state.effects.damage_flash = DAMAGE_FLASH_FRAMES;
    state.spawn_particles(center, COLOR_PLAYER, PLAYER_HIT_BURST);
    state.sync_lives();
    result.events.push(GameEvent::PlayerHit { health });

    if health <= 0.0 {
        audio.play(SoundEffect::Explosion { boss: false });
        log::info!("Game over on stage {} (score {})", state.stats.level, state.stats.score);
        transition(state, audio, GamePhase::GameOver);
        result.events.push(GameEvent::GameOver {
            score: state.stats.score,
        });
    }
}

/// Stage cleared by key pickup or boss kill. Only the first call in a tick counts.
fn complete_level(state: &mut GameState, ctx: &mut TickContext<'_>, result: &mut TickResult) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let level = state.stats.level;
    ctx.audio.play(SoundEffect::Collect);
    ctx.progress.unlock_next_stage(level);

    if is_final_stage(level) {
        log::info!("Final stage {} cleared", level);
        transition(state, ctx.audio, GamePhase::Victory);
        result.events.push(GameEvent::Victory);
    } else {
        log::info!("Stage {} complete", level);
        transition(state, ctx.audio, GamePhase::LevelComplete);
        result.events.push(GameEvent::LevelComplete { level });
    }
}
