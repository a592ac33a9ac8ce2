//! App-level flow around the simulation
//!
//! A `Session` owns the upgrade economy for the lifetime of the process and
//! one `GameState` that is reset or advanced as the player moves between
//! menus and stages. Every phase change goes through `transition`, which also
//! picks the music.

use crate::audio::{AudioCue, AudioManager};
use crate::renderer::{NullRenderer, Renderer};
use crate::settings::Settings;
use crate::sim::input::PointerInput;
use crate::sim::progress::{PlayerProgress, PurchaseError, UpgradeKind};
use crate::sim::stage::stage_count;
use crate::sim::state::{GameEvent, GamePhase, GameState};
use crate::sim::tick::{self, TickContext, TickResult};

pub struct Session<A: AudioCue = AudioManager, R: Renderer = NullRenderer> {
    progress: PlayerProgress,
    state: GameState,
    audio: A,
    renderer: R,
    /// A cleared stage is waiting for `next_stage`
    awaiting_next: bool,
}

impl<A: AudioCue, R: Renderer> Session<A, R> {
    /// Fresh economy, sitting at the menu
    pub fn new(seed: u64, settings: &Settings, audio: A, renderer: R) -> Self {
        Self::with_progress(PlayerProgress::new(), seed, settings, audio, renderer)
    }

    pub fn with_progress(
        progress: PlayerProgress,
        seed: u64,
        settings: &Settings,
        audio: A,
        renderer: R,
    ) -> Self {
        let mut session = Self {
            progress,
            state: GameState::new(seed, settings),
            audio,
            renderer,
            awaiting_next: false,
        };
        session.transition(GamePhase::Menu);
        session
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &PointerInput) -> TickResult {
        let mut ctx = TickContext {
            progress: &mut self.progress,
            audio: &mut self.audio,
            renderer: &mut self.renderer,
        };
        let result = tick::tick(&mut self.state, input, &mut ctx);
        if result.events.iter().any(|e| matches!(e, GameEvent::LevelComplete { .. })) {
            self.awaiting_next = true;
        }
        result
    }

    /// Start playing at the highest unlocked stage
    pub fn start_run(&mut self) -> u32 {
        let level = self.progress.highest_unlocked_stage().clamp(1, stage_count());
        self.begin(level);
        level
    }

    /// Play a specific stage; locked or unknown stages are refused
    pub fn select_stage(&mut self, level: u32) -> bool {
        if level == 0 || level > stage_count() || level > self.progress.highest_unlocked_stage() {
            log::warn!(
                "Stage {} is not selectable (unlocked up to {})",
                level,
                self.progress.highest_unlocked_stage()
            );
            return false;
        }
        self.begin(level);
        true
    }

    /// Replay the current stage from scratch
    pub fn restart_stage(&mut self) {
        self.begin(self.state.stats.level);
    }

    /// Continue from a cleared stage, keeping the field
    pub fn next_stage(&mut self) -> bool {
        let from_menu = matches!(self.phase(), GamePhase::LevelComplete | GamePhase::UpgradeMenu);
        if !self.awaiting_next || !from_menu {
            return false;
        }
        self.awaiting_next = false;
        let level = (self.state.stats.level + 1).min(stage_count());
        self.state.advance_to(level, &self.progress);
        self.transition(GamePhase::Playing);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase() != GamePhase::Playing {
            return false;
        }
        self.transition(GamePhase::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase() != GamePhase::Paused {
            return false;
        }
        self.transition(GamePhase::Playing);
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    pub fn quit_to_menu(&mut self) {
        self.awaiting_next = false;
        self.transition(GamePhase::Menu);
    }

    /// Stage select is reachable from any screen outside active play
    pub fn open_stage_select(&mut self) -> bool {
        self.open(GamePhase::StageSelect)
    }

    pub fn open_upgrade_menu(&mut self) -> bool {
        self.open(GamePhase::UpgradeMenu)
    }

    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, PurchaseError> {
        self.progress.try_purchase(kind).inspect_err(|e| {
            log::info!("Purchase of {:?} refused: {}", kind, e);
        })
    }

    fn open(&mut self, phase: GamePhase) -> bool {
        if matches!(self.phase(), GamePhase::Playing | GamePhase::Paused) {
            return false;
        }
        self.transition(phase);
        true
    }

    fn begin(&mut self, level: u32) {
        self.awaiting_next = false;
        self.state.start_stage(level, &self.progress);
        self.transition(GamePhase::Playing);
    }

    fn transition(&mut self, phase: GamePhase) {
        tick::transition(&mut self.state, &mut self.audio, phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MusicState;
    use crate::sim::entity::{EntityKind, Spawn, create_entity, create_level_key};
    use glam::Vec2;

    type TestSession = Session<AudioManager, NullRenderer>;

    fn session(progress: PlayerProgress) -> TestSession {
        let settings = Settings::default();
        Session::with_progress(progress, 99, &settings, AudioManager::new(), NullRenderer)
    }

    fn progress_through(stage: u32) -> PlayerProgress {
        let mut progress = PlayerProgress::new();
        for level in 1..=stage {
            progress.unlock_next_stage(level);
        }
        progress
    }

    /// Drop the key on the player and tick once
    fn clear_stage(session: &mut TestSession) -> TickResult {
        let player = session.state.player_entity().unwrap();
        let (pos, center) = (player.pos, player.center());
        session.state.entities.insert(create_level_key(pos.x, pos.y));
        session.tick(&PointerInput { pos: center, firing: false })
    }

    #[test]
    fn test_menu_then_run() {
        let mut s = session(PlayerProgress::new());
        assert_eq!(s.phase(), GamePhase::Menu);
        assert_eq!(s.audio().music(), MusicState::Menu);

        assert_eq!(s.start_run(), 1);
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.audio().music(), MusicState::Action);
        assert_eq!(s.state().entities.count(EntityKind::Player), 1);
    }

    #[test]
    fn test_start_run_clamps_to_last_stage() {
        let mut s = session(progress_through(10));
        assert_eq!(s.progress().highest_unlocked_stage(), 11);
        assert_eq!(s.start_run(), 10);
        assert_eq!(s.audio().music(), MusicState::Boss);
    }

    #[test]
    fn test_select_only_unlocked_stages() {
        let mut s = session(progress_through(2));
        assert!(!s.select_stage(4));
        assert!(!s.select_stage(0));
        assert_eq!(s.phase(), GamePhase::Menu);
        assert!(s.select_stage(3));
        assert_eq!(s.state().stats.level, 3);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut s = session(PlayerProgress::new());
        assert!(!s.pause());
        s.start_run();
        assert!(s.pause());
        assert_eq!(s.audio().music(), MusicState::None);
        assert!(!s.open_upgrade_menu());
        assert!(s.toggle_pause());
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.audio().music(), MusicState::Action);
    }

    #[test]
    fn test_clear_upgrade_and_continue() {
        let mut progress = PlayerProgress::new();
        progress.add_currency(1_000.0);
        let mut s = session(progress);
        s.start_run();
        assert!(!s.next_stage());

        let result = clear_stage(&mut s);
        assert!(result.events.contains(&GameEvent::LevelComplete { level: 1 }));
        assert_eq!(s.phase(), GamePhase::LevelComplete);
        assert_eq!(s.progress().highest_unlocked_stage(), 2);

        assert!(s.open_upgrade_menu());
        assert_eq!(s.purchase_upgrade(UpgradeKind::MaxHealth), Ok(2));
        assert_eq!(s.progress().currency(), 880);
        assert_eq!(s.purchase_upgrade(UpgradeKind::Shield), Ok(1));
        assert_eq!(s.purchase_upgrade(UpgradeKind::Shield), Err(PurchaseError::MaxLevel));
        assert_eq!(s.purchase_upgrade(UpgradeKind::Multishot), Ok(2));
        assert_eq!(
            s.purchase_upgrade(UpgradeKind::Multishot),
            Err(PurchaseError::InsufficientFunds { cost: 600, available: 330 })
        );

        assert!(s.next_stage());
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.state().stats.level, 2);
        let player = s.state().player_entity().unwrap();
        assert_eq!(player.health, 4.0);
        assert!(player.has_shield);
        assert_eq!(s.state().stats.max_lives, 4);
        assert!(!s.next_stage());
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut s = session(PlayerProgress::new());
        s.start_run();
        s.state.player_mut().unwrap().health = 1.0;
        let center = s.state.player_center().unwrap();
        let size = Vec2::new(8.0, 14.0);
        let spawn = Spawn::new(EntityKind::EnemyProjectile, center, size, 0xff0000, Vec2::ZERO);
        let shot = create_entity(spawn, &mut s.state.rng);
        s.state.entities.insert(shot);

        s.tick(&PointerInput { pos: center, firing: false });
        assert_eq!(s.phase(), GamePhase::GameOver);
        assert_eq!(s.audio().music(), MusicState::None);

        s.restart_stage();
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.state().frame, 0);
        assert_eq!(s.state().player_entity().unwrap().health, 3.0);
        assert_eq!(s.state().entities.len(), 1);

        s.quit_to_menu();
        assert!(s.open_stage_select());
        assert_eq!(s.audio().music(), MusicState::None);
    }
}
