//! Static stage table
//!
//! Ten stages in two worlds. World 1 enemies never shoot; world 2 enemies
//! return fire. Stages 5 and 10 are boss stages with no waves.

use serde::Serialize;

/// One wave of identical enemies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveConfig {
    pub enemy_count: u32,
    /// Frames between individual spawns
    pub spawn_interval: u32,
    pub enemy_speed: f32,
    pub enemy_health: f32,
    /// Frames to wait before this wave starts spawning
    pub start_delay: i32,
    /// 0 disables return fire
    pub fire_chance: f32,
    pub enemy_color: Option<u32>,
}

impl WaveConfig {
    const fn new(
        enemy_count: u32,
        spawn_interval: u32,
        enemy_speed: f32,
        enemy_health: f32,
        start_delay: i32,
    ) -> Self {
        Self {
            enemy_count,
            spawn_interval,
            enemy_speed,
            enemy_health,
            start_delay,
            fire_chance: 0.0,
            enemy_color: None,
        }
    }

    const fn shooting(mut self) -> Self {
        self.fire_chance = 1.0;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageConfig {
    /// 1-based stage number
    pub level: u32,
    pub name: &'static str,
    pub world_name: &'static str,
    /// Default enemy color
    pub primary_color: u32,
    /// Hostile projectile color
    pub secondary_color: u32,
    pub waves: &'static [WaveConfig],
    pub is_boss_stage: bool,
}

const WORLD_1_NAME: &str = "The Neon Nebula";
const WORLD_1_COLOR: u32 = 0x00ffff;
const WORLD_2_NAME: &str = "The Cyber Void";
const WORLD_2_COLOR: u32 = 0xff00ff;

pub static STAGES: [StageConfig; 10] = [
    StageConfig {
        level: 1,
        name: "Sector Alpha",
        world_name: WORLD_1_NAME,
        primary_color: WORLD_1_COLOR,
        secondary_color: 0x00cccc,
        is_boss_stage: false,
        waves: &[
            WaveConfig::new(1, 120, 0.4, 2.0, 60),
            WaveConfig::new(2, 120, 0.5, 2.0, 100),
            WaveConfig::new(2, 100, 0.5, 2.0, 100),
        ],
    },
    StageConfig {
        level: 2,
        name: "Sector Beta",
        world_name: WORLD_1_NAME,
        primary_color: WORLD_1_COLOR,
        secondary_color: 0x00cccc,
        is_boss_stage: false,
        waves: &[
            WaveConfig::new(2, 100, 0.6, 4.0, 60),
            WaveConfig::new(3, 90, 0.7, 4.0, 100),
            WaveConfig::new(3, 80, 0.8, 3.0, 100),
        ],
    },
    StageConfig {
        level: 3,
        name: "Sector Gamma",
        world_name: WORLD_1_NAME,
        primary_color: WORLD_1_COLOR,
        secondary_color: 0x00cccc,
        is_boss_stage: false,
        waves: &[
            WaveConfig::new(3, 80, 0.8, 7.0, 60),
            WaveConfig::new(4, 70, 0.9, 7.0, 120),
            WaveConfig::new(3, 60, 1.2, 5.0, 100),
        ],
    },
    StageConfig {
        level: 4,
        name: "Sector Delta",
        world_name: WORLD_1_NAME,
        primary_color: WORLD_1_COLOR,
        secondary_color: 0x00cccc,
        is_boss_stage: false,
        waves: &[
            WaveConfig::new(4, 70, 1.0, 10.0, 60),
            WaveConfig::new(4, 65, 1.1, 10.0, 100),
        ],
    },
    StageConfig {
        level: 5,
        name: "Nebula Core",
        world_name: WORLD_1_NAME,
        primary_color: WORLD_1_COLOR,
        secondary_color: 0xcc0000,
        is_boss_stage: true,
        waves: &[],
    },
    StageConfig {
        level: 6,
        name: "Void Entrance",
        world_name: WORLD_2_NAME,
        primary_color: WORLD_2_COLOR,
        secondary_color: 0xff00aa,
        is_boss_stage: false,
        waves: &[
            WaveConfig::new(3, 90, 0.8, 15.0, 60).shooting(),
            WaveConfig::new(3, 90, 0.9, 15.0, 100).shooting(),
        ],
    },
    StageConfig {
        level: 7,
        name: "Data Stream",
        world_name: WORLD_2_NAME,
        primary_color: WORLD_2_COLOR,
        secondary_color: 0xff00aa,
        is_boss_stage: false,
        waves: &[
            WaveConfig::new(4, 80, 1.0, 20.0, 60).shooting(),
            WaveConfig::new(4, 75, 1.1, 18.0, 100).shooting(),
        ],
    },
    StageConfig {
        level: 8,
        name: "Corrupted Memory",
        world_name: WORLD_2_NAME,
        primary_color: WORLD_2_COLOR,
        secondary_color: 0xff00aa,
        is_boss_stage: false,
        waves: &[
            WaveConfig::new(5, 70, 1.1, 25.0, 60).shooting(),
            WaveConfig::new(4, 60, 1.2, 22.0, 100).shooting(),
        ],
    },
    StageConfig {
        level: 9,
        name: "Firewall Breach",
        world_name: WORLD_2_NAME,
        primary_color: WORLD_2_COLOR,
        secondary_color: 0xff00aa,
        is_boss_stage: false,
        waves: &[
            WaveConfig::new(5, 60, 1.2, 35.0, 60).shooting(),
            WaveConfig::new(5, 50, 1.3, 30.0, 100).shooting(),
        ],
    },
    StageConfig {
        level: 10,
        name: "The Void Heart",
        world_name: WORLD_2_NAME,
        primary_color: WORLD_2_COLOR,
        secondary_color: 0xff0000,
        is_boss_stage: true,
        waves: &[],
    },
];

/// Number of stages in the table
pub fn stage_count() -> u32 {
    STAGES.len() as u32
}

/// Look up a 1-based stage, falling back to stage 1 when out of range
pub fn stage(level: u32) -> &'static StageConfig {
    match level.checked_sub(1).and_then(|i| STAGES.get(i as usize)) {
        Some(config) => config,
        None => {
            log::warn!("Stage {} out of range, using stage 1", level);
            &STAGES[0]
        }
    }
}

/// The last boss stage in the table hosts the final boss
pub fn is_final_stage(level: u32) -> bool {
    level == stage_count()
}
