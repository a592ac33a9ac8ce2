//! Render collaborator interface
//!
//! The simulation hands a read-only `Scene` to a `Renderer` at the end of
//! every tick. Nothing a renderer does feeds back into the simulation.

use glam::Vec2;

use crate::sim::arena::EntityArena;
use crate::sim::entity::EntityKind;
use crate::sim::stage::StageConfig;
use crate::sim::state::{GamePhase, GameStats, ScreenEffects};

/// Everything needed to draw one frame
pub struct Scene<'a> {
    pub frame: u64,
    pub field: Vec2,
    pub phase: GamePhase,
    pub stage: &'static StageConfig,
    pub entities: &'a EntityArena,
    pub stats: GameStats,
    pub effects: ScreenEffects,
    pub currency: u64,
    /// Player ship gets the max fire-rate look
    pub max_fire_rate: bool,
}

impl Scene<'_> {
    /// Entity counts per kind, in `EntityKind` declaration order
    pub fn census(&self) -> [usize; 8] {
        let mut counts = [0; 8];
        for entity in self.entities.iter() {
            counts[entity.kind as usize] += 1;
        }
        counts
    }
}

pub trait Renderer {
    fn draw(&mut self, scene: &Scene<'_>);
}

/// Draws nothing
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _scene: &Scene<'_>) {}
}

/// Logs a one-line summary every `interval` frames
#[derive(Debug)]
pub struct TextRenderer {
    interval: u64,
    frames_drawn: u64,
    last_phase: Option<GamePhase>,
}

impl TextRenderer {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            frames_drawn: 0,
            last_phase: None,
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn summary(scene: &Scene<'_>) -> String {
        let counts = scene.census();
        let boss_hp = scene
            .entities
            .find(EntityKind::Boss)
            .map(|b| format!(" boss {:.0}/{:.0}", b.health.max(0.0), b.max_health))
            .unwrap_or_default();
        let hud = format!(
            "[{:>6}] {:?} stage {} \"{}\" score {} hp {}/{} credits {}",
            scene.frame,
            scene.phase,
            scene.stats.level,
            scene.stage.name,
            scene.stats.score,
            scene.stats.lives,
            scene.stats.max_lives,
            scene.currency,
        );
        format!(
            "{} | enemies {} shots {}/{} coins {} particles {}{}",
            hud,
            counts[EntityKind::Enemy as usize],
            counts[EntityKind::PlayerProjectile as usize],
            counts[EntityKind::EnemyProjectile as usize],
            counts[EntityKind::Coin as usize],
            counts[EntityKind::Particle as usize],
            boss_hp,
        )
    }
}

impl Renderer for TextRenderer {
    fn draw(&mut self, scene: &Scene<'_>) {
        self.frames_drawn += 1;
        let phase_changed = self.last_phase != Some(scene.phase);
        self.last_phase = Some(scene.phase);
        if phase_changed || scene.frame % self.interval == 0 {
            log::info!("{}", Self::summary(scene));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::create_coin;
    use crate::sim::stage::stage;

    #[test]
    fn test_text_summary() {
        let mut entities = EntityArena::new();
        entities.insert(create_coin(Vec2::ZERO, Vec2::ZERO, 10));
        entities.insert(create_coin(Vec2::ZERO, Vec2::ZERO, 10));
        let scene = Scene {
            frame: 42,
            field: Vec2::new(600.0, 800.0),
            phase: GamePhase::Playing,
            stage: stage(2),
            entities: &entities,
            stats: GameStats {
                score: 300,
                level: 2,
                lives: 3,
                max_lives: 3,
            },
            effects: ScreenEffects::default(),
            currency: 55,
            max_fire_rate: false,
        };
        assert_eq!(scene.census()[EntityKind::Coin as usize], 2);
        let line = TextRenderer::summary(&scene);
        assert!(line.contains("Sector Beta"));
        assert!(line.contains("coins 2"));
        assert!(line.contains("credits 55"));

        let mut renderer = TextRenderer::new(0);
        renderer.draw(&scene);
        assert_eq!(renderer.frames_drawn(), 1);
    }
}
