//! Starting tours for the annealing engine.

use crate::error::{Result, SolverError};
use crate::instance::TspInstance;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Uniformly random permutation of `0..n` (Fisher-Yates via `SliceRandom::shuffle`).
///
/// Fails with `InvalidInput` when `n` is zero.
pub fn random_tour<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Vec<usize>> {
    if n == 0 {
        return Err(SolverError::invalid_input("cannot build a tour over zero cities"));
    }

    let mut tour: Vec<usize> = (0..n).collect();
    tour.shuffle(rng);
    Ok(tour)
}

/// Random-permutation construction with its own seeded generator.
///
/// Used as the baseline the annealing result is compared against.
pub struct RandomTourHeuristic {
    pub seed: u64,
}

impl RandomTourHeuristic {
    pub fn new() -> Self {
        RandomTourHeuristic { seed: 42 }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomTourHeuristic { seed }
    }

    pub fn construct(&self, instance: &TspInstance) -> Result<Solution> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let tour = random_tour(instance.len(), &mut rng)?;
        let mut solution = Solution::from_tour(instance, tour, self.name());
        solution.seed = Some(self.seed);
        Ok(solution)
    }

    pub fn name(&self) -> &str {
        "RandomTour"
    }
}

impl Default for RandomTourHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::City;

    #[test]
    fn test_random_tour_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for n in [1, 2, 5, 50] {
            let mut tour = random_tour(n, &mut rng).unwrap();
            assert_eq!(tour.len(), n);
            tour.sort_unstable();
            assert_eq!(tour, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_zero_cities_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let err = random_tour(0, &mut rng).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(_)));
    }

    #[test]
    fn test_seeded_tours_repeat() {
        let a = random_tour(30, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let b = random_tour(30, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_successive_draws_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let a = random_tour(30, &mut rng).unwrap();
        let b = random_tour(30, &mut rng).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_heuristic_construct() {
        let cities = (0..6).map(|i| City::new(i, i as f64, (i * i) as f64)).collect();
        let instance = TspInstance::new("parabola", cities).unwrap();
        let sol = RandomTourHeuristic::with_seed(9).construct(&instance).unwrap();

        assert!(sol.is_complete(&instance));
        assert_eq!(sol.seed, Some(9));
        assert_eq!(sol.algorithm, "RandomTour");
    }
}
