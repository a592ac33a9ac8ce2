//! Nebula Strike headless entry point
//!
//! Runs a session on autopilot, advancing through stages as they are cleared.
//!
//! Usage: `nebula-strike [settings.json] [frames]`

use std::time::{SystemTime, UNIX_EPOCH};

use nebula_strike::audio::{AudioCue, AudioManager, SoundEffect};
use nebula_strike::renderer::TextRenderer;
use nebula_strike::sim::{GameEvent, GamePhase, UpgradeKind, autopilot};
use nebula_strike::{Session, Settings};

const DEFAULT_FRAMES: u64 = 60 * 60 * 5;
/// Log a status line every this many frames
const REPORT_INTERVAL: u64 = 600;

fn main() {
    env_logger::init();
    log::info!("Nebula Strike (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let frames = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(frames)) => frames,
        Some(Err(e)) => {
            log::warn!("Invalid frame count ({}), using {}", e, DEFAULT_FRAMES);
            DEFAULT_FRAMES
        }
        None => DEFAULT_FRAMES,
    };

    let seed = settings.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    log::info!(
        "Seed {}, quality {}, running {} frames",
        seed,
        settings.quality.as_str(),
        frames
    );

    let mut audio = AudioManager::new();
    audio.set_master_volume(settings.master_volume);
    audio.set_sfx_volume(settings.sfx_volume);
    audio.set_muted(settings.muted);
    if audio.is_muted() {
        log::info!("Audio muted");
    }

    let mut session = Session::new(seed, &settings, audio, TextRenderer::new(REPORT_INTERVAL));
    session.start_run();

    let mut kills = 0u64;
    for _ in 0..frames {
        let input = autopilot(session.state());
        let result = session.tick(&input);
        kills += result.count(|e| {
            matches!(e, GameEvent::EnemyKilled { .. } | GameEvent::BossDefeated { .. })
        }) as u64;

        match session.phase() {
            GamePhase::LevelComplete => {
                spend_credits(&mut session);
                session.next_stage();
            }
            GamePhase::GameOver => {
                spend_credits(&mut session);
                session.restart_stage();
            }
            GamePhase::Victory => break,
            _ => {}
        }
    }

    let progress = session.progress();
    println!(
        "stage {} | unlocked {} | score {} | credits {} | kills {} | explosions heard {}",
        session.state().stats.level,
        progress.highest_unlocked_stage(),
        session.state().stats.score,
        progress.currency(),
        kills,
        session.audio().play_count(SoundEffect::Explosion { boss: false }),
    );
}

/// Buy the cheapest affordable upgrades, the way a player might between stages
fn spend_credits<A: AudioCue>(session: &mut Session<A, TextRenderer>) {
    loop {
        let cheapest = UpgradeKind::ALL
            .into_iter()
            .filter_map(|kind| session.progress().cost(kind).map(|cost| (cost, kind)))
            .filter(|(cost, _)| *cost <= session.progress().currency())
            .min_by_key(|(cost, _)| *cost);
        let Some((_, kind)) = cheapest else {
            break;
        };
        if session.purchase_upgrade(kind).is_err() {
            break;
        }
    }
}
