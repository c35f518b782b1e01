use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Uniform draws needed by weight initialisation, shuffling and training.
pub trait RandomSource: Send + Sync {
    /// Uniform real in `[min, max)`.
    fn uniform_real(&self, min: f64, max: f64) -> f64;

    /// Uniform integer in `[min, max]` (both ends inclusive).
    fn uniform_index(&self, min: usize, max: usize) -> usize;

    /// Seed for an independent generator owned by one thread.
    fn next_seed(&self) -> u64;
}

/// One process-wide generator for the serial steps of a run.
///
/// Backed by `StdRng` behind a mutex. Statistically good, not suitable
/// for anything cryptographic. Hot per-sample draws do not go through it:
/// each training worker seeds its own generator from `next_seed` once.
pub struct SharedRng {
    inner: Mutex<StdRng>,
}

impl SharedRng {
    pub fn from_seed(seed: u64) -> SharedRng {
        SharedRng { inner: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    pub fn from_entropy() -> SharedRng {
        SharedRng { inner: Mutex::new(StdRng::from_entropy()) }
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> SharedRng {
        match seed {
            Some(seed) => SharedRng::from_seed(seed),
            None => SharedRng::from_entropy(),
        }
    }

    /// Uniform random permutation in place.
    pub fn shuffle<T>(&self, items: &mut [T]) {
        items.shuffle(&mut *self.lock());
    }

    fn lock(&self) -> MutexGuard<'_, StdRng> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RandomSource for SharedRng {
    fn uniform_real(&self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.lock().gen_range(min..max)
    }

    fn uniform_index(&self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.lock().gen_range(min..=max)
    }

    fn next_seed(&self) -> u64 {
        self.lock().gen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let a = SharedRng::from_seed(42);
        let b = SharedRng::from_seed(42);
        for _ in 0..20 {
            assert_eq!(a.uniform_index(0, 1000), b.uniform_index(0, 1000));
            assert_eq!(a.uniform_real(-2.0, 2.0), b.uniform_real(-2.0, 2.0));
        }
    }

    #[test]
    fn draws_stay_in_range() {
        let rng = SharedRng::from_seed(1);
        for _ in 0..1000 {
            let x = rng.uniform_real(-2.0, 2.0);
            assert!((-2.0..2.0).contains(&x));
            let i = rng.uniform_index(3, 5);
            assert!((3..=5).contains(&i));
        }
    }

    #[test]
    fn degenerate_ranges() {
        let rng = SharedRng::from_seed(1);
        assert_eq!(rng.uniform_index(4, 4), 4);
        assert_eq!(rng.uniform_real(1.5, 1.5), 1.5);
    }

    #[test]
    fn seeds_follow_the_shared_sequence() {
        let a = SharedRng::from_seed(3);
        let b = SharedRng::from_seed(3);
        let seeds: Vec<u64> = (0..4).map(|_| a.next_seed()).collect();
        assert_eq!(seeds, (0..4).map(|_| b.next_seed()).collect::<Vec<_>>());
        assert!(seeds.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let rng = SharedRng::from_seed(9);
        let mut v: Vec<usize> = (0..50).collect();
        rng.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }
}
