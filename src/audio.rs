//! Audio cue interface
//!
//! The simulation only triggers cues; synthesis and playback belong to the
//! host. `AudioManager` is the native stand-in that logs cues, tracks the
//! current music mode and honours volume/mute settings.

use serde::{Deserialize, Serialize};

use crate::sim::state::GamePhase;
use crate::sim::stage::StageConfig;

/// Sound effect triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player volley
    Shoot,
    /// Hostile destroyed (`boss` for the big one), also the player dying
    Explosion { boss: bool },
    /// Player hit or shield consumed
    Damage,
    /// Coin or key picked up, level complete
    Collect,
}

/// Background music mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MusicState {
    Menu,
    Action,
    Boss,
    #[default]
    None,
}

impl MusicState {
    /// Music for a phase on a given stage
    pub fn for_phase(phase: GamePhase, stage: &StageConfig) -> Self {
        match phase {
            GamePhase::Menu => MusicState::Menu,
            GamePhase::Playing if stage.is_boss_stage => MusicState::Boss,
            GamePhase::Playing => MusicState::Action,
            _ => MusicState::None,
        }
    }
}

/// Fire-and-forget audio collaborator
pub trait AudioCue {
    fn play(&mut self, effect: SoundEffect);
    fn set_music(&mut self, music: MusicState);
}

/// Audio manager for headless runs
#[derive(Debug)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    music: MusicState,
    /// Cues played since creation, by kind
    played: [u64; 4],
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            music: MusicState::None,
            played: [0; 4],
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn music(&self) -> MusicState {
        self.music
    }

    /// Effective gain for sound effects
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play_count(&self, effect: SoundEffect) -> u64 {
        self.played[Self::slot(effect)]
    }

    fn slot(effect: SoundEffect) -> usize {
        match effect {
            SoundEffect::Shoot => 0,
            SoundEffect::Explosion { .. } => 1,
            SoundEffect::Damage => 2,
            SoundEffect::Collect => 3,
        }
    }
}

impl AudioCue for AudioManager {
    fn play(&mut self, effect: SoundEffect) {
        self.played[Self::slot(effect)] += 1;
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return;
        }
        // Shots fire every few frames; keep them out of debug output
        match effect {
            SoundEffect::Shoot => log::trace!("sfx {:?} @ {:.2}", effect, volume),
            _ => log::debug!("sfx {:?} @ {:.2}", effect, volume),
        }
    }

    fn set_music(&mut self, music: MusicState) {
        if music != self.music {
            log::info!("Music {:?} -> {:?}", self.music, music);
            self.music = music;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stage::stage;

    #[test]
    fn test_music_for_phase() {
        assert_eq!(MusicState::for_phase(GamePhase::Menu, stage(1)), MusicState::Menu);
        assert_eq!(MusicState::for_phase(GamePhase::Playing, stage(1)), MusicState::Action);
        assert_eq!(MusicState::for_phase(GamePhase::Playing, stage(5)), MusicState::Boss);
        assert_eq!(MusicState::for_phase(GamePhase::Paused, stage(5)), MusicState::None);
        assert_eq!(MusicState::for_phase(GamePhase::UpgradeMenu, stage(1)), MusicState::None);
    }

    #[test]
    fn test_manager_counts_even_when_muted() {
        let mut audio = AudioManager::new();
        assert!(!audio.is_muted());
        audio.set_muted(true);
        assert!(audio.is_muted());
        audio.play(SoundEffect::Shoot);
        audio.play(SoundEffect::Explosion { boss: true });
        audio.play(SoundEffect::Explosion { boss: false });
        assert_eq!(audio.play_count(SoundEffect::Shoot), 1);
        assert_eq!(audio.play_count(SoundEffect::Explosion { boss: false }), 2);
        assert_eq!(audio.play_count(SoundEffect::Collect), 0);

        audio.set_music(MusicState::Boss);
        assert_eq!(audio.music(), MusicState::Boss);
    }
}
