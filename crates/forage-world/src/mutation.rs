//! Mutation operators for heritable traits.

use forage_core::{ReproductionConfig, Traits};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Standard deviation of the noise, relative to the trait value
    pub rate: f64,
    /// Per-trait floor applied after the noise
    pub floor: Traits,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self::from(&ReproductionConfig::default())
    }
}

impl From<&ReproductionConfig> for MutationConfig {
    fn from(config: &ReproductionConfig) -> Self {
        Self {
            rate: config.mutation_rate,
            floor: Traits::new(
                config.min_speed,
                config.min_size,
                config.min_sensory_range,
            ),
        }
    }
}

pub struct Mutator {
    config: MutationConfig,
}

impl Mutator {
    pub fn new(config: MutationConfig) -> Self {
        Self { config }
    }

    /// Produce a perturbed copy of `parent`; every trait respects its floor
    pub fn mutate(&self, parent: &Traits, rng: &mut ChaCha8Rng) -> Traits {
        Traits {
            speed: self.mutate_value(parent.speed, self.config.floor.speed, rng),
            size: self.mutate_value(parent.size, self.config.floor.size, rng),
            sensory_range: self.mutate_value(
                parent.sensory_range,
                self.config.floor.sensory_range,
                rng,
            ),
        }
    }

    fn mutate_value(&self, value: f64, floor: f64, rng: &mut ChaCha8Rng) -> f64 {
        let sigma = (self.config.rate * value).abs();
        let mutated = match Normal::new(0.0, sigma) {
            Ok(noise) => value + noise.sample(rng),
            // non-finite sigma: leave the trait alone
            Err(_) => value,
        };
        mutated.max(floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_zero_rate_copies_traits() {
        let mutator = Mutator::new(MutationConfig {
            rate: 0.0,
            ..Default::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let parent = Traits::new(3.5, 10.0, 40.0);

        assert_eq!(mutator.mutate(&parent, &mut rng), parent);
    }

    #[test]
    fn test_mutation_perturbs_traits() {
        let mutator = Mutator::new(MutationConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let parent = Traits::new(3.5, 10.0, 40.0);

        let children: Vec<Traits> = (0..50).map(|_| mutator.mutate(&parent, &mut rng)).collect();
        assert!(children.iter().any(|c| c.size != parent.size));

        // 2% relative noise stays close to the parent
        for child in &children {
            assert!((child.size - parent.size).abs() < 2.0);
            assert!((child.sensory_range - parent.sensory_range).abs() < 8.0);
        }
    }

    #[test]
    fn test_mutation_is_reproducible() {
        let mutator = Mutator::new(MutationConfig::default());
        let parent = Traits::new(3.5, 10.0, 40.0);

        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(mutator.mutate(&parent, &mut a), mutator.mutate(&parent, &mut b));
    }

    proptest! {
        #[test]
        fn proptest_floors_hold_for_any_noise(
            speed in 0.0f64..5.0,
            size in 0.0f64..3.0,
            sensory_range in 0.0f64..3.0,
            rate in 0.0f64..10.0,
            seed in any::<u64>(),
        ) {
            let mutator = Mutator::new(MutationConfig {
                rate,
                ..Default::default()
            });
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let child = mutator.mutate(&Traits::new(speed, size, sensory_range), &mut rng);

            prop_assert!(child.speed >= 0.1);
            prop_assert!(child.size >= 1.0);
            prop_assert!(child.sensory_range >= 1.0);
        }
    }
}
