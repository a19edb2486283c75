//! Combat rules: how much of an attack gets through armor

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Damage mitigation policy
pub trait CombatRules {
    /// Health removed by an attack of `damage` against `armor` (never negative)
    fn hits(&mut self, damage: i32, armor: i32) -> i32;
}

/// Armor absorbs a uniformly random 0..=armor points per hit
#[derive(Debug, Clone)]
pub struct RandomMitigation {
    rng: Pcg32,
}

impl RandomMitigation {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl CombatRules for RandomMitigation {
    fn hits(&mut self, damage: i32, armor: i32) -> i32 {
        let absorbed = if armor > 0 { self.rng.random_range(0..=armor) } else { 0 };
        (damage - absorbed).max(0)
    }
}

/// Armor always absorbs a fixed amount; used for reproducible scenarios
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMitigation {
    pub absorbed: i32,
}

impl CombatRules for FixedMitigation {
    fn hits(&mut self, damage: i32, armor: i32) -> i32 {
        (damage - self.absorbed.min(armor.max(0))).max(0)
    }
}
