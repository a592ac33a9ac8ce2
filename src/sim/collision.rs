//! Collision detection and loot resolution
//!
//! Everything in the field is an axis-aligned box anchored at its top-left
//! corner, so hit testing is a plain interval overlap on both axes.

use glam::Vec2;
use rand::Rng;

use super::entity::{Entity, create_coin};
use crate::direction;

/// Coins never drop more than this many entities per kill
pub const MAX_LOOT_COINS: u32 = 30;
/// Face value of a coin when the drop isn't capped
pub const MIN_COIN_VALUE: u32 = 10;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    /// Open-interval overlap: boxes that only share an edge don't collide
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min().x < other.max().x
            && self.max().x > other.min().x
            && self.min().y < other.max().y
            && self.max().y > other.min().y
    }
}

impl From<&Entity> for Aabb {
    fn from(entity: &Entity) -> Self {
        Aabb::new(entity.pos, entity.size)
    }
}

/// Check whether two entities' boxes overlap
#[inline]
pub fn intersects(a: &Entity, b: &Entity) -> bool {
    Aabb::from(a).intersects(&Aabb::from(b))
}

/// Split a reward into coin face values
///
/// Uses `ceil(total / 10)` coins of 10. Past 30 coins the count is capped and
/// the total is spread evenly (values differ by at most one, the largest
/// being `ceil(total / 30)`), so no value is lost.
pub fn plan_loot(total_value: u32) -> Vec<u32> {
    if total_value == 0 {
        return Vec::new();
    }
    let count = total_value.div_ceil(MIN_COIN_VALUE);
    if count <= MAX_LOOT_COINS {
        return vec![MIN_COIN_VALUE; count as usize];
    }

    let base = total_value / MAX_LOOT_COINS;
    let remainder = total_value % MAX_LOOT_COINS;
    (0..MAX_LOOT_COINS)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Burst a reward into coin entities at `(x, y)`, each flying outward at 1-3 px/frame
pub fn spawn_loot(x: f32, y: f32, total_value: u32, rng: &mut (impl Rng + ?Sized)) -> Vec<Entity> {
    plan_loot(total_value)
        .into_iter()
        .map(|value| {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(1.0..3.0);
            create_coin(Vec2::new(x, y), direction(angle) * speed, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BIG_COIN_SIZE, COIN_SIZE};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn aabb(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_overlap() {
        let a = aabb(0.0, 0.0, 10.0, 10.0);
        let b = aabb(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_shared_edge_is_not_a_hit() {
        let a = aabb(0.0, 0.0, 10.0, 10.0);
        let right = aabb(10.0, 0.0, 10.0, 10.0);
        let below = aabb(0.0, 10.0, 10.0, 10.0);
        let corner = aabb(10.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
        assert!(!a.intersects(&corner));
    }

    #[test]
    fn test_contained_box() {
        let outer = aabb(0.0, 0.0, 100.0, 100.0);
        let inner = aabb(40.0, 40.0, 3.0, 3.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn test_small_loot_uses_ten_value_coins() {
        assert_eq!(plan_loot(19), vec![10, 10]);
        assert_eq!(plan_loot(300), vec![10; 30]);
        assert!(plan_loot(0).is_empty());
    }

    #[test]
    fn test_capped_loot_preserves_total() {
        let coins = plan_loot(8000);
        assert_eq!(coins.len(), 30);
        assert_eq!(coins.iter().sum::<u32>(), 8000);
        assert_eq!(coins.iter().max(), Some(&267));
        assert_eq!(coins.iter().min(), Some(&266));
    }

    #[test]
    fn test_spawn_loot_sizes_and_speeds() {
        let mut rng = Pcg32::seed_from_u64(3);
        let small = spawn_loot(50.0, 50.0, 40, &mut rng);
        assert!(small.iter().all(|c| c.size == COIN_SIZE));

        let big = spawn_loot(50.0, 50.0, 3000, &mut rng);
        assert_eq!(big.len(), 30);
        assert!(big.iter().all(|c| c.size == BIG_COIN_SIZE));
        for coin in &big {
            let speed = coin.vel.length();
            assert!((0.999..3.001).contains(&speed));
        }
    }

    proptest! {
        #[test]
        fn prop_intersects_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            aw in 0.0f32..50.0, ah in 0.0f32..50.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            bw in 0.0f32..50.0, bh in 0.0f32..50.0,
        ) {
            let a = aabb(ax, ay, aw, ah);
            let b = aabb(bx, by, bw, bh);
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_edge_touching_never_hits(
            x in -100i32..100, y in -100i32..100,
            w in 1i32..50, h in 1i32..50, other_h in 1i32..50,
        ) {
            let a = aabb(x as f32, y as f32, w as f32, h as f32);
            let right = aabb((x + w) as f32, y as f32, 5.0, other_h as f32);
            prop_assert!(!a.intersects(&right));
            prop_assert!(!right.intersects(&a));
        }

        #[test]
        fn prop_loot_covers_value_within_cap(value in 1u32..200_000) {
            let coins = plan_loot(value);
            prop_assert!(coins.len() as u32 <= MAX_LOOT_COINS);
            prop_assert!(coins.iter().map(|&c| c as u64).sum::<u64>() >= value as u64);
        }
    }
}
