//! Pointer input
//!
//! The simulation samples a resolved pointer position and a firing flag once
//! per tick. `autopilot` produces the same shape of input from the state
//! itself, for demo runs and the headless binary.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::state::GameState;
use crate::consts::{DEFAULT_FIELD_HEIGHT, FIELD_WIDTH};

/// Pointer state in simulation coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub pos: Vec2,
    pub firing: bool,
}

impl Default for PointerInput {
    fn default() -> Self {
        Self {
            pos: Vec2::new(FIELD_WIDTH / 2.0, DEFAULT_FIELD_HEIGHT - 200.0),
            firing: false,
        }
    }
}

/// Cruising height above the bottom edge when chasing hostiles
const AUTOPILOT_STANDOFF: f32 = 120.0;

/// Steer toward the key, then the nearest coin, then under the lowest hostile.
/// Always fires.
pub fn autopilot(state: &GameState) -> PointerInput {
    let Some(player) = state.player_center() else {
        return PointerInput {
            firing: true,
            ..Default::default()
        };
    };
    let cruise_y = state.field.y - AUTOPILOT_STANDOFF;

    let alive = || state.entities.iter().filter(|e| e.is_alive());
    let key = alive().find(|e| e.kind == EntityKind::LevelKey).map(|e| e.center());
    let coin = alive()
        .filter(|e| e.kind == EntityKind::Coin && e.pos.y > 0.0)
        .map(|e| e.center())
        .min_by(|a, b| a.distance_squared(player).total_cmp(&b.distance_squared(player)));
    let hostile = alive()
        .filter(|e| e.kind.is_hostile())
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|e| Vec2::new(e.center().x, cruise_y));

    // Idle sway
    let sway = (state.frame as f32 * 0.03).sin() * 20.0;
    let target = key
        .or(coin)
        .or(hostile)
        .unwrap_or(Vec2::new(state.field.x / 2.0 + sway, cruise_y));

    PointerInput {
        pos: target,
        firing: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::entity::{Spawn, create_coin, create_entity, create_level_key};
    use crate::sim::progress::PlayerProgress;
    use crate::consts::ENEMY_SIZE;

    fn playing_state() -> GameState {
        let mut state = GameState::new(3, &Settings::default());
        state.start_stage(1, &PlayerProgress::new());
        state
    }

    #[test]
    fn test_autopilot_idles_at_centre() {
        let state = playing_state();
        let input = autopilot(&state);
        assert!(input.firing);
        assert_eq!(input.pos, Vec2::new(300.0, 680.0));
    }

    #[test]
    fn test_autopilot_priorities() {
        let mut state = playing_state();
        let enemy = create_entity(
            Spawn::new(EntityKind::Enemy, Vec2::new(100.0, 200.0), ENEMY_SIZE, 0, Vec2::ZERO),
            &mut state.rng,
        );
        state.entities.insert(enemy);
        assert_eq!(autopilot(&state).pos, Vec2::new(117.5, 680.0));

        state.entities.insert(create_coin(Vec2::new(400.0, 500.0), Vec2::ZERO, 10));
        assert_eq!(autopilot(&state).pos, Vec2::new(405.0, 505.0));

        state.entities.insert(create_level_key(285.0, 40.0));
        assert_eq!(autopilot(&state).pos, Vec2::new(300.0, 55.0));
    }
}
