/// Calculates in advance the probability of a new element reaching each level.
///
/// `table[i] = probability^i` for `i in 0..max_level`, so `table[0]` is
/// always 1 and a draw `r` keeps climbing while `r < table[level]`.
pub(crate) fn probability_table(probability: f64, max_level: usize) -> Vec<f64> {
    (0..max_level)
        .map(|i| probability.powi(i as i32))
        .collect()
}

/// Geometric height generator.
///
/// Expected element count at level `L` decays by `probability` per level,
/// which keeps the expected search depth logarithmic.
pub(crate) struct LevelGenerator {
    rng: fastrand::Rng,
    probability: f64,
    table: Vec<f64>,
}

impl LevelGenerator {
    pub(crate) fn new(probability: f64, max_level: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        LevelGenerator {
            rng,
            probability,
            table: probability_table(probability, max_level),
        }
    }

    #[inline]
    pub(crate) fn probability(&self) -> f64 {
        self.probability
    }

    /// Recompute the table. Existing element heights are unaffected.
    pub(crate) fn set_probability(&mut self, probability: f64) {
        self.probability = probability;
        self.table = probability_table(probability, self.table.len());
    }

    /// Draw a height in `1..=max_level`.
    pub(crate) fn random_level(&mut self) -> usize {
        let r = self.rng.f64();
        let max_level = self.table.len();

        let mut level = 1;
        while level < max_level && r < self.table[level] {
            level += 1;
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_table() {
        let table = probability_table(0.5, 4);
        assert_eq!(table, vec![1.0, 0.5, 0.25, 0.125]);

        let table = probability_table(0.25, 1);
        assert_eq!(table, vec![1.0]);
    }

    #[test]
    fn test_levels_stay_in_bounds() {
        let mut levels = LevelGenerator::new(0.9, 5, Some(1));
        for _ in 0..10_000 {
            let level = levels.random_level();
            assert!((1..=5).contains(&level), "level {} out of bounds", level);
        }
    }

    #[test]
    fn test_degenerate_probabilities() {
        let mut never = LevelGenerator::new(0.0, 8, Some(3));
        assert!((0..1_000).all(|_| never.random_level() == 1));

        let mut always = LevelGenerator::new(1.0, 8, Some(3));
        assert!((0..1_000).all(|_| always.random_level() == 8));
    }

    #[test]
    fn test_distribution_is_geometric() {
        let draws = 200_000;
        let mut levels = LevelGenerator::new(0.5, 16, Some(42));

        let mut at_least = [0usize; 17];
        for _ in 0..draws {
            let level = levels.random_level();
            for count in at_least.iter_mut().take(level + 1).skip(1) {
                *count += 1;
            }
        }

        assert_eq!(at_least[1], draws);
        for level in 2..=6 {
            let observed = at_least[level] as f64 / draws as f64;
            let expected = 0.5f64.powi(level as i32 - 1);
            assert!(
                (observed - expected).abs() < expected * 0.1,
                "level {}: observed {}, expected {}",
                level,
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_set_probability_recomputes_table() {
        let mut levels = LevelGenerator::new(0.5, 3, Some(9));
        levels.set_probability(0.0);

        assert_eq!(levels.probability(), 0.0);
        assert_eq!(levels.table, vec![1.0, 0.0, 0.0]);
        assert!((0..100).all(|_| levels.random_level() == 1));
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = LevelGenerator::new(0.37, 18, Some(1234));
        let mut b = LevelGenerator::new(0.37, 18, Some(1234));
        let left: Vec<usize> = (0..256).map(|_| a.random_level()).collect();
        let right: Vec<usize> = (0..256).map(|_| b.random_level()).collect();
        assert_eq!(left, right);
    }
}
