//! Wave/spawn director
//!
//! Decides, once per tick, which enemies, bosses or level keys enter the
//! field. Owns the per-stage wave counters; the tick owns the entities.

use glam::Vec2;
use rand::Rng;

use super::entity::{BossVariant, Entity, EntityKind, Spawn, create_entity, create_level_key};
use super::stage::StageConfig;
use crate::consts::*;

/// Countdown every stage starts with before its first wave/boss
pub const STAGE_INTRO_FRAMES: i32 = 120;
/// Horizontal spawn margin for regular enemies
const ENEMY_SPAWN_BUFFER: f32 = 30.0;
/// Horizontal spawn margin for bosses
pub const BOSS_SPAWN_BUFFER: f32 = 40.0;

pub const MID_BOSS_HEALTH: f32 = 400.0;
pub const FINAL_BOSS_HEALTH: f32 = 12_000.0;
pub const MID_BOSS_REWARD: u32 = 1000;
pub const FINAL_BOSS_REWARD: u32 = 3000;
pub const MID_BOSS_FIRST_CLEAR_BONUS: u32 = 2000;
pub const FINAL_BOSS_FIRST_CLEAR_BONUS: u32 = 5000;

/// World facts the director reads each tick
#[derive(Debug, Clone, Copy)]
pub struct DirectorView {
    pub frame: u64,
    pub field_width: f32,
    /// Enemies + bosses currently stored
    pub hostiles_alive: usize,
    pub boss_present: bool,
    pub highest_unlocked_stage: u32,
    pub final_stage: bool,
}

/// Per-stage-entry wave counters
#[derive(Debug, Clone, PartialEq)]
pub struct WaveRuntime {
    pub wave_index: usize,
    pub spawned_in_wave: u32,
    /// Counts up from `-STAGE_INTRO_FRAMES`
    pub timer: i32,
    pub boss_spawned: bool,
    pub key_spawned: bool,
}

impl Default for WaveRuntime {
    fn default() -> Self {
        Self {
            wave_index: 0,
            spawned_in_wave: 0,
            timer: -STAGE_INTRO_FRAMES,
            boss_spawned: false,
            key_spawned: false,
        }
    }
}

impl WaveRuntime {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// All waves of a regular stage have been fully spawned
    pub fn waves_exhausted(&self, stage: &StageConfig) -> bool {
        self.wave_index >= stage.waves.len()
    }

    /// Advance one frame; returns the entities to add to the field
    pub fn step(
        &mut self,
        stage: &StageConfig,
        view: &DirectorView,
        rng: &mut impl Rng,
    ) -> Vec<Entity> {
        let mut spawned = Vec::new();

        if stage.is_boss_stage {
            if let Some(boss) = self.step_boss(stage, view, rng) {
                spawned.push(boss);
            }
            return spawned;
        }

        if let Some(enemy) = self.step_waves(stage, view, rng) {
            spawned.push(enemy);
        }

        let hostiles = view.hostiles_alive + spawned.len();
        if self.waves_exhausted(stage) && hostiles == 0 && !self.key_spawned {
            self.key_spawned = true;
            log::info!("Stage {} cleared, dropping level key", stage.level);
            spawned.push(create_level_key(
                view.field_width / 2.0 - LEVEL_KEY_SIZE.x / 2.0,
                -50.0,
            ));
        }

        spawned
    }

    fn step_waves(
        &mut self,
        stage: &StageConfig,
        view: &DirectorView,
        rng: &mut impl Rng,
    ) -> Option<Entity> {
        let wave = stage.waves.get(self.wave_index)?;

        if self.timer < wave.start_delay {
            self.timer += 1;
            return None;
        }

        if self.spawned_in_wave >= wave.enemy_count {
            self.wave_index += 1;
            self.spawned_in_wave = 0;
            self.timer = 0;
            log::debug!("Stage {} advancing to wave {}", stage.level, self.wave_index);
            return None;
        }

        if view.frame % wave.spawn_interval.max(1) as u64 != 0 {
            return None;
        }

        let span = view.field_width - ENEMY_SIZE.x - ENEMY_SPAWN_BUFFER * 2.0;
        let x = ENEMY_SPAWN_BUFFER + rng.random_range(0.0..1.0) * span;
        let currency = 10 + stage.level * 5 + (wave.enemy_health * 2.0) as u32;
        let spawn = Spawn::new(
            EntityKind::Enemy,
            Vec2::new(x, -ENEMY_SIZE.y),
            ENEMY_SIZE,
            wave.enemy_color.unwrap_or(stage.primary_color),
            Vec2::new(0.0, wave.enemy_speed),
        )
        .health(wave.enemy_health)
        .currency(currency)
        .fire_chance(wave.fire_chance);

        self.spawned_in_wave += 1;
        Some(create_entity(spawn, rng))
    }

    fn step_boss(
        &mut self,
        stage: &StageConfig,
        view: &DirectorView,
        rng: &mut impl Rng,
    ) -> Option<Entity> {
        if self.timer < 0 {
            self.timer += 1;
            return None;
        }
        if self.boss_spawned || view.boss_present {
            return None;
        }
        self.boss_spawned = true;

        let first_clear = stage.level == view.highest_unlocked_stage;
        let (health, base, bonus, variant) = if view.final_stage {
            (FINAL_BOSS_HEALTH, FINAL_BOSS_REWARD, FINAL_BOSS_FIRST_CLEAR_BONUS, BossVariant::Omega)
        } else {
            (MID_BOSS_HEALTH, MID_BOSS_REWARD, MID_BOSS_FIRST_CLEAR_BONUS, BossVariant::Alpha)
        };
        let reward = base + if first_clear { bonus } else { 0 };

        let span = view.field_width - BOSS_SIZE.x - BOSS_SPAWN_BUFFER * 2.0;
        let x = BOSS_SPAWN_BUFFER + rng.random_range(0.0..1.0) * span;
        let spawn = Spawn::new(
            EntityKind::Boss,
            Vec2::new(x, -BOSS_SIZE.y),
            BOSS_SIZE,
            stage.primary_color,
            Vec2::new(2.0, 1.0),
        )
        .health(health)
        .currency(reward)
        .variant(variant);

        log::info!(
            "Boss {:?} spawned on stage {} (hp {}, reward {}, first clear {})",
            variant,
            stage.level,
            health,
            reward,
            first_clear
        );
        Some(create_entity(spawn, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stage::stage;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn view(frame: u64, hostiles_alive: usize) -> DirectorView {
        DirectorView {
            frame,
            field_width: FIELD_WIDTH,
            hostiles_alive,
            boss_present: false,
            highest_unlocked_stage: 1,
            final_stage: false,
        }
    }

    #[test]
    fn test_intro_countdown_then_first_spawn() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut waves = WaveRuntime::default();
        let stage1 = stage(1);

        // 120 intro frames + 60 start delay before the first wave may spawn
        for frame in 1..=180 {
            assert!(waves.step(stage1, &view(frame, 0), &mut rng).is_empty());
        }
        assert_eq!(waves.timer, 60);

        // Frame 240 is the next multiple of the spawn interval (120)
        let mut first = None;
        for frame in 181..=240 {
            let out = waves.step(stage1, &view(frame, 0), &mut rng);
            if !out.is_empty() {
                first = Some((frame, out));
                break;
            }
        }
        let (frame, out) = first.expect("enemy should spawn");
        assert_eq!(frame, 240);
        assert_eq!(out.len(), 1);
        let enemy = &out[0];
        assert_eq!(enemy.kind, EntityKind::Enemy);
        assert_eq!(enemy.currency_value, 10 + 5 + 4);
        assert_eq!(enemy.pos.y, -ENEMY_SIZE.y);
        assert!(enemy.pos.x >= 30.0 && enemy.pos.x <= FIELD_WIDTH - ENEMY_SIZE.x - 30.0);
    }

    #[test]
    fn test_exhausted_waves_drop_exactly_one_key() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut waves = WaveRuntime::default();
        let stage1 = stage(1);
        let mut enemies = 0;
        let mut keys = 0;

        // Enemies are cleared immediately, so hostiles_alive stays 0
        for frame in 1..5_000 {
            for e in waves.step(stage1, &view(frame, 0), &mut rng) {
                match e.kind {
                    EntityKind::Enemy => enemies += 1,
                    EntityKind::LevelKey => keys += 1,
                    other => panic!("unexpected spawn {other:?}"),
                }
            }
        }
        assert_eq!(enemies, 5);
        assert_eq!(keys, 1);
        assert!(waves.key_spawned);
    }

    #[test]
    fn test_key_waits_for_hostiles() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut waves = WaveRuntime {
            wave_index: stage(1).waves.len(),
            ..Default::default()
        };
        assert!(waves.step(stage(1), &view(1, 2), &mut rng).is_empty());
        let out = waves.step(stage(1), &view(2, 0), &mut rng);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, EntityKind::LevelKey);
        assert_eq!(out[0].pos.x, FIELD_WIDTH / 2.0 - 15.0);
    }

    #[test]
    fn test_boss_spawns_once_with_first_clear_bonus() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut waves = WaveRuntime::default();
        let mut v = DirectorView {
            highest_unlocked_stage: 10,
            final_stage: true,
            ..view(0, 0)
        };
        let mut bosses = Vec::new();
        for frame in 1..400 {
            v.frame = frame;
            v.boss_present = !bosses.is_empty();
            bosses.extend(waves.step(stage(10), &v, &mut rng));
        }
        assert_eq!(bosses.len(), 1);
        let boss = &bosses[0];
        assert_eq!(boss.variant, BossVariant::Omega);
        assert_eq!(boss.health, FINAL_BOSS_HEALTH);
        assert_eq!(boss.currency_value, 8000);
    }

    #[test]
    fn test_replayed_mid_boss_has_no_bonus() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut waves = WaveRuntime {
            timer: 0,
            ..Default::default()
        };
        let v = DirectorView {
            highest_unlocked_stage: 7,
            ..view(1, 0)
        };
        let out = waves.step(stage(5), &v, &mut rng);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].currency_value, MID_BOSS_REWARD);
        assert_eq!(out[0].variant, BossVariant::Alpha);
        // Guarded: never a second boss even after the first is gone
        assert!(waves.step(stage(5), &v, &mut rng).is_empty());
    }
}
