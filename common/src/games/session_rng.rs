use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Seedable randomness shared by one game attempt.
///
/// Generation, cascade refills and reshuffles all draw from the same stream, so a seed plus the
/// sequence of player swaps fully determines an attempt.
#[derive(Clone, Debug)]
pub struct SessionRng {
    rng: StdRng,
    seed: u64,
}

impl SessionRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn from_random() -> Self {
        let seed: u64 = rand::rng().random();
        Self::new(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn random_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distr::uniform::SampleUniform,
        R: rand::distr::uniform::SampleRange<T>,
    {
        self.rng.random_range(range)
    }

    /// Uniform Fisher-Yates permutation in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut first = SessionRng::new(7);
        let mut second = SessionRng::new(7);
        for _ in 0..100 {
            let a: usize = first.random_range(0..1000);
            let b: usize = second.random_range(0..1000);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = SessionRng::new(3);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<u32>>());
    }

    #[test]
    fn test_seed_is_reported() {
        let rng = SessionRng::new(12345);
        assert_eq!(rng.seed(), 12345);
    }
}
