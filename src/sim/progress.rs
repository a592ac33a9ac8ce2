//! Upgrade economy
//!
//! Single source of truth for currency, purchased upgrade levels and stage
//! unlocks. Owned by the session and lent to the simulation each tick, so
//! stat values are always read live.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upgrade categories (menu grouping only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeCategory {
    Offense,
    Defense,
    Utility,
}

/// Purchasable upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    WeaponDamage,
    FireRate,
    Multishot,
    ProjectileSpeed,
    MaxHealth,
    Shield,
    MovementSpeed,
    Magnet,
    CritChance,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 9] = [
        UpgradeKind::WeaponDamage,
        UpgradeKind::FireRate,
        UpgradeKind::Multishot,
        UpgradeKind::ProjectileSpeed,
        UpgradeKind::MaxHealth,
        UpgradeKind::Shield,
        UpgradeKind::MovementSpeed,
        UpgradeKind::Magnet,
        UpgradeKind::CritChance,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Static tuning for this upgrade
    pub fn def(self) -> &'static UpgradeDef {
        &UPGRADE_DEFS[self.index()]
    }

    /// Level a fresh session starts at
    pub fn starting_level(self) -> u32 {
        match self {
            UpgradeKind::Shield | UpgradeKind::CritChance => 0,
            _ => 1,
        }
    }
}

/// Static upgrade tuning
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpgradeDef {
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub max_level: u32,
    pub base_value: f32,
    pub value_per_level: f32,
    pub category: UpgradeCategory,
}

/// Indexed by `UpgradeKind as usize`
const UPGRADE_DEFS: [UpgradeDef; 9] = [
    UpgradeDef {
        name: "Photon Overcharge",
        description: "Increases bullet damage.",
        base_cost: 100.0,
        cost_multiplier: 1.5,
        max_level: 10,
        base_value: 1.0,
        value_per_level: 2.0,
        category: UpgradeCategory::Offense,
    },
    UpgradeDef {
        name: "Rapid Fire Core",
        description: "Reduces shot cooldown.",
        base_cost: 150.0,
        cost_multiplier: 1.5,
        max_level: 8,
        base_value: 30.0,
        value_per_level: 0.0,
        category: UpgradeCategory::Offense,
    },
    UpgradeDef {
        name: "Spread Shot",
        description: "Adds diagonal projectiles.",
        base_cost: 300.0,
        cost_multiplier: 2.0,
        max_level: 3,
        base_value: 0.0,
        value_per_level: 1.0,
        category: UpgradeCategory::Offense,
    },
    UpgradeDef {
        name: "Plasma Velocity",
        description: "Bullets travel faster.",
        base_cost: 80.0,
        cost_multiplier: 1.3,
        max_level: 5,
        base_value: 10.0,
        value_per_level: 2.0,
        category: UpgradeCategory::Offense,
    },
    UpgradeDef {
        name: "Nano-Weave Armor",
        description: "Increases hull integrity (HP).",
        base_cost: 120.0,
        cost_multiplier: 1.4,
        max_level: 10,
        base_value: 3.0,
        value_per_level: 1.0,
        category: UpgradeCategory::Defense,
    },
    UpgradeDef {
        name: "Emergency Shield",
        description: "Absorbs one hit per stage.",
        base_cost: 250.0,
        cost_multiplier: 2.0,
        max_level: 1,
        base_value: 0.0,
        value_per_level: 1.0,
        category: UpgradeCategory::Defense,
    },
    UpgradeDef {
        name: "Thruster Overdrive",
        description: "Enhances ship maneuverability.",
        base_cost: 80.0,
        cost_multiplier: 1.3,
        max_level: 3,
        base_value: 0.1,
        value_per_level: 0.05,
        category: UpgradeCategory::Utility,
    },
    UpgradeDef {
        name: "Gravity Well",
        description: "Pulls loose currency.",
        base_cost: 100.0,
        cost_multiplier: 1.5,
        max_level: 5,
        base_value: 0.0,
        value_per_level: 50.0,
        category: UpgradeCategory::Utility,
    },
    UpgradeDef {
        name: "Luck Processor",
        description: "Chance to deal double damage.",
        base_cost: 150.0,
        cost_multiplier: 1.4,
        max_level: 5,
        base_value: 0.0,
        value_per_level: 0.05,
        category: UpgradeCategory::Utility,
    },
];

/// Hard floor on frames between player volleys
pub const MIN_FIRE_COOLDOWN: f32 = 4.0;
/// Per-level decay of the fire cooldown
const FIRE_RATE_DECAY: f32 = 0.85;

/// Why a purchase was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("upgrade is already at max level")]
    MaxLevel,
    #[error("insufficient funds: need {cost}, have {available}")]
    InsufficientFunds { cost: u64, available: u64 },
}

/// Persistent (per-process) player progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    currency: u64,
    highest_unlocked_stage: u32,
    levels: [u32; 9],
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerProgress {
    pub fn new() -> Self {
        let mut levels = [0; 9];
        for kind in UpgradeKind::ALL {
            levels[kind.index()] = kind.starting_level();
        }
        Self {
            currency: 0,
            highest_unlocked_stage: 1,
            levels,
        }
    }

    pub fn currency(&self) -> u64 {
        self.currency
    }

    /// Credit currency. Fractional amounts truncate; negative amounts are ignored.
    pub fn add_currency(&mut self, amount: f64) {
        let amount = amount.floor();
        if amount > 0.0 {
            self.currency = self.currency.saturating_add(amount as u64);
        }
    }

    pub fn highest_unlocked_stage(&self) -> u32 {
        self.highest_unlocked_stage
    }

    /// Unlock the stage after `completed_stage`. Replaying an older stage is a no-op.
    pub fn unlock_next_stage(&mut self, completed_stage: u32) {
        if completed_stage >= self.highest_unlocked_stage {
            self.highest_unlocked_stage = completed_stage + 1;
            log::info!("Unlocked stage {}", self.highest_unlocked_stage);
        }
    }

    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.levels[kind.index()]
    }

    pub fn is_maxed(&self, kind: UpgradeKind) -> bool {
        self.level(kind) >= kind.def().max_level
    }

    /// Price of the next level, `None` once the upgrade is maxed
    pub fn cost(&self, kind: UpgradeKind) -> Option<u64> {
        let def = kind.def();
        let level = self.level(kind);
        if level >= def.max_level {
            return None;
        }
        let power = level.saturating_sub(1) as i32;
        Some((def.base_cost * def.cost_multiplier.powi(power)).floor() as u64)
    }

    /// Buy one level, reporting why it failed. State is untouched on failure.
    pub fn try_purchase(&mut self, kind: UpgradeKind) -> Result<u32, PurchaseError> {
        let cost = self.cost(kind).ok_or(PurchaseError::MaxLevel)?;
        if self.currency < cost {
            return Err(PurchaseError::InsufficientFunds {
                cost,
                available: self.currency,
            });
        }
        self.currency -= cost;
        self.levels[kind.index()] += 1;
        let level = self.level(kind);
        log::info!("Purchased {:?} level {} for {}", kind, level, cost);
        Ok(level)
    }

    /// Buy one level; `false` when maxed or unaffordable
    pub fn purchase(&mut self, kind: UpgradeKind) -> bool {
        self.try_purchase(kind).is_ok()
    }

    /// Gameplay magnitude for the current level
    pub fn stat_value(&self, kind: UpgradeKind) -> f32 {
        stat_value_at(kind, self.level(kind))
    }
}

/// Gameplay magnitude of `kind` at `level`
pub fn stat_value_at(kind: UpgradeKind, level: u32) -> f32 {
    let def = kind.def();
    match kind {
        UpgradeKind::FireRate => {
            let frames = (def.base_value * FIRE_RATE_DECAY.powi(level as i32 - 1)).floor();
            frames.max(MIN_FIRE_COOLDOWN)
        }
        // Extra projectiles per volley: stepped, not linear
        UpgradeKind::Multishot => match level {
            0 | 1 => 0.0,
            2 => 2.0,
            _ => 4.0,
        },
        _ if level == 0 => 0.0,
        _ => def.base_value + (level - 1) as f32 * def.value_per_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = UpgradeKind> {
        (0..UpgradeKind::ALL.len()).prop_map(|i| UpgradeKind::ALL[i])
    }

    #[test]
    fn test_starting_levels() {
        let progress = PlayerProgress::new();
        assert_eq!(progress.level(UpgradeKind::Shield), 0);
        assert_eq!(progress.level(UpgradeKind::CritChance), 0);
        assert_eq!(progress.level(UpgradeKind::Multishot), 1);
        assert_eq!(progress.level(UpgradeKind::WeaponDamage), 1);
        assert_eq!(progress.currency(), 0);
        assert_eq!(progress.highest_unlocked_stage(), 1);
    }

    #[test]
    fn test_cost_formula() {
        let mut progress = PlayerProgress::new();
        // Level 0 and level 1 both pay base cost
        assert_eq!(progress.cost(UpgradeKind::Shield), Some(250));
        assert_eq!(progress.cost(UpgradeKind::WeaponDamage), Some(100));

        progress.add_currency(10_000.0);
        assert!(progress.purchase(UpgradeKind::WeaponDamage));
        assert_eq!(progress.cost(UpgradeKind::WeaponDamage), Some(150));
        assert!(progress.purchase(UpgradeKind::WeaponDamage));
        assert_eq!(progress.cost(UpgradeKind::WeaponDamage), Some(225));
        assert!(progress.purchase(UpgradeKind::ProjectileSpeed));
        // floor(80 * 1.3)
        assert_eq!(progress.cost(UpgradeKind::ProjectileSpeed), Some(104));
    }

    #[test]
    fn test_purchase_debits_and_levels() {
        let mut progress = PlayerProgress::new();
        progress.add_currency(260.0);
        assert_eq!(progress.try_purchase(UpgradeKind::Shield), Ok(1));
        assert_eq!(progress.currency(), 10);
        assert_eq!(progress.try_purchase(UpgradeKind::Shield), Err(PurchaseError::MaxLevel));
        assert_eq!(progress.cost(UpgradeKind::Shield), None);
    }

    #[test]
    fn test_insufficient_funds_is_noop() {
        let mut progress = PlayerProgress::new();
        progress.add_currency(99.0);
        let before = progress.clone();
        assert_eq!(
            progress.try_purchase(UpgradeKind::WeaponDamage),
            Err(PurchaseError::InsufficientFunds {
                cost: 100,
                available: 99
            })
        );
        assert!(!progress.purchase(UpgradeKind::WeaponDamage));
        assert_eq!(progress, before);
    }

    #[test]
    fn test_add_currency_floors() {
        let mut progress = PlayerProgress::new();
        progress.add_currency(12.9);
        progress.add_currency(0.4);
        progress.add_currency(-5.0);
        assert_eq!(progress.currency(), 12);
    }

    #[test]
    fn test_unlock_is_monotonic() {
        let mut progress = PlayerProgress::new();
        progress.unlock_next_stage(1);
        assert_eq!(progress.highest_unlocked_stage(), 2);
        progress.unlock_next_stage(2);
        progress.unlock_next_stage(3);
        assert_eq!(progress.highest_unlocked_stage(), 4);
        // Replaying an old stage never lowers or raises the unlock
        progress.unlock_next_stage(1);
        assert_eq!(progress.highest_unlocked_stage(), 4);
    }

    #[test]
    fn test_stat_values() {
        assert_eq!(stat_value_at(UpgradeKind::FireRate, 1), 30.0);
        assert_eq!(stat_value_at(UpgradeKind::FireRate, 2), 25.0);
        assert_eq!(stat_value_at(UpgradeKind::Multishot, 1), 0.0);
        assert_eq!(stat_value_at(UpgradeKind::Multishot, 2), 2.0);
        assert_eq!(stat_value_at(UpgradeKind::Multishot, 3), 4.0);
        assert_eq!(stat_value_at(UpgradeKind::MaxHealth, 1), 3.0);
        assert_eq!(stat_value_at(UpgradeKind::MaxHealth, 4), 6.0);
        assert_eq!(stat_value_at(UpgradeKind::WeaponDamage, 3), 5.0);
        assert_eq!(stat_value_at(UpgradeKind::CritChance, 0), 0.0);
        assert!((stat_value_at(UpgradeKind::CritChance, 2) - 0.05).abs() < 1e-6);
        assert!((stat_value_at(UpgradeKind::MovementSpeed, 1) - 0.1).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_cost_non_decreasing_until_max(kind in kind_strategy()) {
            let mut progress = PlayerProgress::new();
            progress.add_currency(1e12);
            let mut last = 0;
            while let Some(cost) = progress.cost(kind) {
                prop_assert!(cost >= last);
                prop_assert!(progress.level(kind) < kind.def().max_level);
                last = cost;
                prop_assert!(progress.purchase(kind));
            }
            prop_assert_eq!(progress.level(kind), kind.def().max_level);
        }

        #[test]
        fn prop_purchase_never_overdraws(
            kind in kind_strategy(),
            funds in 0u32..5_000,
            attempts in 1usize..12,
        ) {
            let mut progress = PlayerProgress::new();
            progress.add_currency(funds as f64);
            for _ in 0..attempts {
                let before = progress.clone();
                if !progress.purchase(kind) {
                    prop_assert_eq!(&progress, &before);
                }
            }
            prop_assert!(progress.currency() <= funds as u64);
        }

        #[test]
        fn prop_fire_rate_non_increasing_with_floor(level in 1u32..64) {
            let here = stat_value_at(UpgradeKind::FireRate, level);
            let next = stat_value_at(UpgradeKind::FireRate, level + 1);
            prop_assert!(next <= here);
            prop_assert!(next >= MIN_FIRE_COOLDOWN);
        }
    }
}
