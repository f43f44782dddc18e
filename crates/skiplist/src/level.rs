use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws the level of a freshly inserted node.
///
/// Levels follow a fair-coin geometric distribution starting at 1:
/// `P(level = n) = 2^-n` for `n < max_level`, with the remaining tail mass
/// collapsed onto `max_level`.
#[derive(Debug)]
pub(crate) struct LevelGenerator {
    max_level: usize,
    rng: StdRng,
}

impl LevelGenerator {
    /// Seeds from OS entropy.
    pub(crate) fn new(max_level: usize) -> Self {
        Self {
            max_level,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator, same seed gives the same level sequence.
    pub(crate) fn with_seed(max_level: usize, seed: u64) -> Self {
        Self {
            max_level,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns a level in `[1, max_level]`.
    pub(crate) fn next_level(&mut self) -> usize {
        let mut level = 1;
        while level < self.max_level && self.rng.gen_bool(0.5) {
            level += 1;
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_stay_in_bounds() {
        for max in [1, 2, 4, 16] {
            let mut g = LevelGenerator::with_seed(max, 7);
            for _ in 0..10_000 {
                let l = g.next_level();
                assert!((1..=max).contains(&l), "level {} outside [1, {}]", l, max);
            }
        }
    }

    #[test]
    fn max_level_one_always_yields_one() {
        let mut g = LevelGenerator::new(1);
        assert!((0..100).all(|_| g.next_level() == 1));
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = LevelGenerator::with_seed(12, 42);
        let mut b = LevelGenerator::with_seed(12, 42);
        let xs: Vec<_> = (0..256).map(|_| a.next_level()).collect();
        let ys: Vec<_> = (0..256).map(|_| b.next_level()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn distribution_is_roughly_geometric() {
        const DRAWS: usize = 200_000;
        let max = 4;
        let mut g = LevelGenerator::with_seed(max, 1234);
        let mut hist = [0usize; 5];
        for _ in 0..DRAWS {
            hist[g.next_level()] += 1;
        }

        // expected: 1/2, 1/4, 1/8 and the 1/8 tail folded into level 4
        let expected = [0.0, 0.5, 0.25, 0.125, 0.125];
        for level in 1..=max {
            let observed = hist[level] as f64 / DRAWS as f64;
            assert!(
                (observed - expected[level]).abs() < 0.01,
                "level {}: observed {:.4}, expected {:.4}",
                level,
                observed,
                expected[level]
            );
        }
    }
}
