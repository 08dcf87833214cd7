//! Level content generation
//!
//! `generate_level` is a pure function of `(level_index, seed)`. A single
//! [`SimRng`] is consumed in a fixed order for the whole level:
//! for each segment the left gate, the right gate, then the enemy-count
//! jitter; finally the boss pattern. Reordering any draw changes every
//! later outcome.

use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use crate::consts::*;
use crate::round_to_int;

/// Arithmetic transform applied to army power when a gate is crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Gate {
    Add(i32),
    Subtract(i32),
    Multiply2,
    Multiply3,
    /// Scale power by `value` percent
    MultiplyPercent(i32),
}

impl Gate {
    /// Integer value carried by the gate (the factor for the fixed multipliers)
    pub fn value(&self) -> i32 {
        match *self {
            Gate::Add(v) | Gate::Subtract(v) | Gate::MultiplyPercent(v) => v,
            Gate::Multiply2 => 2,
            Gate::Multiply3 => 3,
        }
    }

    /// Short label for HUD/log output ("+3", "x2", "150%")
    pub fn label(&self) -> String {
        match *self {
            Gate::Add(v) => format!("+{}", v),
            Gate::Subtract(v) => format!("-{}", v),
            Gate::Multiply2 => "x2".to_string(),
            Gate::Multiply3 => "x3".to_string(),
            Gate::MultiplyPercent(v) => format!("{}%", v),
        }
    }

    /// Bucket a roll in [0, 1000) into a gate
    pub fn from_roll(t: i32) -> Gate {
        if t < 400 {
            Gate::Add(1 + t % 5)
        } else if t < 700 {
            Gate::Subtract(1 + t % 5)
        } else if t < 900 {
            Gate::Multiply2
        } else {
            Gate::Multiply3
        }
    }
}

/// Which of the two gates in a segment the player walks through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateSide {
    Left,
    Right,
}

/// One stretch of track: a gate pair followed by an enemy group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub left: Gate,
    pub right: Gate,
    pub enemy_count: i32,
}

impl Segment {
    pub fn gate(&self, side: GateSide) -> Gate {
        match side {
            GateSide::Left => self.left,
            GateSide::Right => self.right,
        }
    }
}

/// Boss attack pattern tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossPattern {
    A,
    B,
    C,
    D,
}

impl BossPattern {
    /// Bucket a roll in [0, 1000) into a pattern
    pub fn from_roll(t: i32) -> BossPattern {
        if t < 500 {
            BossPattern::A
        } else if t < 800 {
            BossPattern::B
        } else if t < 950 {
            BossPattern::C
        } else {
            BossPattern::D
        }
    }

    /// (hp multiplier, damage multiplier)
    pub fn multipliers(&self) -> (f64, f64) {
        match self {
            BossPattern::A => (0.9, 0.9),
            BossPattern::B => (1.0, 1.0),
            BossPattern::C => (1.2, 1.1),
            BossPattern::D => (1.4, 1.2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossSpec {
    pub pattern: BossPattern,
    pub hp: i32,
    pub damage: i32,
}

impl BossSpec {
    /// Boss stats for a level and pattern
    pub fn for_level(level_index: i32, pattern: BossPattern) -> Self {
        let level = f64::from(level_index.max(1) - 1);
        let (hp_mult, dmg_mult) = pattern.multipliers();
        Self {
            pattern,
            hp: round_to_int(BOSS_BASE_HP * (1.0 + BOSS_HP_GROWTH * level) * hp_mult),
            damage: round_to_int(BOSS_BASE_DAMAGE * (1.0 + BOSS_DAMAGE_GROWTH * level) * dmg_mult),
        }
    }
}

/// Complete, immutable content of one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    pub level_index: i32,
    pub segments: Vec<Segment>,
    pub boss: BossSpec,
}

impl LevelData {
    /// Total enemies across all segments
    pub fn total_enemies(&self) -> i32 {
        self.segments.iter().map(|s| s.enemy_count).sum()
    }
}

/// Number of segments for a level: 4 + (level-1)/3, clamped to [4, 9]
pub fn segment_count(level_index: i32) -> i32 {
    let level = level_index.max(1);
    (MIN_SEGMENTS + (level - 1) / 3).clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

/// Enemy count before jitter: 3 + (level-1)/2
pub fn base_enemy_count(level_index: i32) -> i32 {
    3 + (level_index.max(1) - 1) / 2
}

/// Generate the content of a level
pub fn generate_level(level_index: i32, seed: i32) -> LevelData {
    let level_index = level_index.max(1);
    let mut rng = SimRng::new(seed);

    let count = segment_count(level_index);
    let base_enemies = base_enemy_count(level_index);

    let mut segments = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let left = draw_gate(&mut rng);
        let right = draw_gate(&mut rng);
        let enemy_count = base_enemies + rng.range(0, 3);
        segments.push(Segment {
            left,
            right,
            enemy_count,
        });
    }

    let pattern = BossPattern::from_roll(rng.range(0, 1000));
    let boss = BossSpec::for_level(level_index, pattern);

    log::debug!(
        "Level {} (seed {}): {} segments, boss {:?} hp={} dmg={}",
        level_index,
        seed,
        segments.len(),
        boss.pattern,
        boss.hp,
        boss.damage
    );

    LevelData {
        level_index,
        segments,
        boss,
    }
}

fn draw_gate(rng: &mut SimRng) -> Gate {
    Gate::from_roll(rng.range(0, 1000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_segment_count_boundaries() {
        assert_eq!(segment_count(1), 4);
        assert_eq!(segment_count(2), 4);
        assert_eq!(segment_count(3), 4);
        assert_eq!(segment_count(4), 5);
        assert_eq!(segment_count(25), 9);
        assert_eq!(segment_count(1000), 9);
        assert_eq!(segment_count(-3), 4);
    }

    #[test]
    fn test_gate_buckets() {
        assert_eq!(Gate::from_roll(0), Gate::Add(1));
        assert_eq!(Gate::from_roll(399), Gate::Add(5));
        assert_eq!(Gate::from_roll(400), Gate::Subtract(1));
        assert_eq!(Gate::from_roll(699), Gate::Subtract(5));
        assert_eq!(Gate::from_roll(700), Gate::Multiply2);
        assert_eq!(Gate::from_roll(899), Gate::Multiply2);
        assert_eq!(Gate::from_roll(900), Gate::Multiply3);
        assert_eq!(Gate::from_roll(999), Gate::Multiply3);
    }

    #[test]
    fn test_gate_values_in_range() {
        for t in 0..1000 {
            match Gate::from_roll(t) {
                Gate::Add(v) | Gate::Subtract(v) => assert!((1..=5).contains(&v)),
                Gate::Multiply2 => assert!((700..900).contains(&t)),
                Gate::Multiply3 => assert!(t >= 900),
                Gate::MultiplyPercent(_) => panic!("percent gates are never rolled"),
            }
        }
    }

    #[test]
    fn test_boss_patterns() {
        assert_eq!(BossPattern::from_roll(499), BossPattern::A);
        assert_eq!(BossPattern::from_roll(500), BossPattern::B);
        assert_eq!(BossPattern::from_roll(949), BossPattern::C);
        assert_eq!(BossPattern::from_roll(950), BossPattern::D);

        let boss = BossSpec::for_level(1, BossPattern::B);
        assert_eq!((boss.hp, boss.damage), (300, 15));
        let boss = BossSpec::for_level(11, BossPattern::D);
        // 300 * 1.8 * 1.4 = 756, 15 * 1.5 * 1.2 = 27
        assert_eq!((boss.hp, boss.damage), (756, 27));
    }

    #[test]
    fn test_golden_level() {
        let level = generate_level(1, 12345);
        assert_eq!(level.level_index, 1);
        assert_eq!(
            level.segments,
            vec![
                Segment { left: Gate::Add(2), right: Gate::Multiply2, enemy_count: 4 },
                Segment { left: Gate::Add(2), right: Gate::Add(1), enemy_count: 3 },
                Segment { left: Gate::Add(4), right: Gate::Add(3), enemy_count: 3 },
                Segment { left: Gate::Multiply3, right: Gate::Multiply2, enemy_count: 5 },
            ]
        );
        assert_eq!(
            level.boss,
            BossSpec { pattern: BossPattern::A, hp: 270, damage: 14 }
        );
    }

    #[test]
    fn test_golden_late_level() {
        let level = generate_level(25, 777);
        assert_eq!(level.segments.len(), 9);
        assert_eq!(level.segments[0].left, Gate::Multiply2);
        assert_eq!(level.segments[0].right, Gate::Add(2));
        assert_eq!(level.segments[1].right, Gate::Subtract(4));
        assert_eq!(
            level.segments.iter().map(|s| s.enemy_count).collect::<Vec<_>>(),
            vec![15, 15, 17, 17, 17, 15, 17, 17, 15]
        );
        assert_eq!(
            level.boss,
            BossSpec { pattern: BossPattern::B, hp: 876, damage: 33 }
        );
    }

    #[test]
    fn test_level_index_clamped() {
        assert_eq!(generate_level(0, 99), generate_level(1, 99));
        assert_eq!(generate_level(-7, 99).level_index, 1);
    }

    #[test]
    fn test_gate_serializes_tagged() {
        let json = serde_json::to_string(&Gate::Add(3)).unwrap();
        assert_eq!(json, r#"{"kind":"Add","value":3}"#);
        let json = serde_json::to_string(&Gate::Multiply2).unwrap();
        let back: Gate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Gate::Multiply2);
    }

    proptest! {
        #[test]
        fn prop_generation_is_pure(level in -5i32..60, seed in any::<i32>()) {
            prop_assert_eq!(generate_level(level, seed), generate_level(level, seed));
        }

        #[test]
        fn prop_structure_within_bounds(level in 1i32..200, seed in any::<i32>()) {
            let data = generate_level(level, seed);
            prop_assert!(data.segments.len() <= 9);
            prop_assert!(data.segments.len() >= 4);
            let base = base_enemy_count(level);
            for segment in &data.segments {
                prop_assert!(segment.enemy_count >= base && segment.enemy_count < base + 3);
            }
            prop_assert!(data.boss.hp > 0);
        }
    }
}
