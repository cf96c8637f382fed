//! Random source seam for the physics step.
//!
//! Every probabilistic branch in the tick draws from a [`ReactorRng`], so a
//! simulation built from the same seed (or the same injected generator)
//! replays bit for bit.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator used when the caller does not inject one.
pub type DefaultRng = ChaCha8Rng;

/// Build the default generator from a seed.
pub fn seeded_rng(seed: u64) -> DefaultRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Random number source for the simulation.
pub trait ReactorRng {
    /// Uniform sample in `[0.0, 1.0)`.
    fn unit(&mut self) -> f64;

    /// True with probability `probability`.
    fn chance(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }

    /// Uniform angle in `[0, 2π)`.
    fn angle(&mut self) -> f64 {
        self.unit() * std::f64::consts::TAU
    }

    /// Uniform sample in `[-0.5, 0.5)`.
    fn centered(&mut self) -> f64 {
        self.unit() - 0.5
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

// Blanket implementation for any rand generator (seeded ChaCha, thread rng, ...)
impl<T: rand::Rng> ReactorRng for T {
    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Generator that always yields the same unit sample. Lets tests force
/// every probabilistic branch one way.
#[cfg(test)]
pub(crate) struct ConstRng(u64);

#[cfg(test)]
impl ConstRng {
    /// `value` must be in `[0, 1)`.
    pub(crate) fn new(value: f64) -> Self {
        // rand builds an f64 from the top 53 bits of a u64
        let bits = (value * (1u64 << 53) as f64) as u64;
        Self(bits << 11)
    }

    /// Every `chance(p)` with `p > 0` succeeds.
    pub(crate) fn always() -> Self {
        Self::new(0.0)
    }

    /// Every `chance(p)` with `p < 0.999` fails.
    pub(crate) fn never() -> Self {
        Self::new(0.999)
    }
}

#[cfg(test)]
impl rand::RngCore for ConstRng {
    fn next_u32(&mut self) -> u32 {
        (self.0 >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for (i, byte) in dst.iter_mut().enumerate() {
            *byte = (self.0 >> ((i % 8) * 8)) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_range() {
        let mut rng = seeded_rng(12345);
        for _ in 0..1000 {
            let v = rng.unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = seeded_rng(12345);
        for _ in 0..100 {
            assert!(rng.chance(1.0));
            assert!(!rng.chance(0.0));
        }
    }

    #[test]
    fn test_seeded_rng_deterministic() {
        let mut a = seeded_rng(42);
        let mut b = seeded_rng(42);
        for _ in 0..100 {
            assert_eq!(a.unit().to_bits(), b.unit().to_bits());
        }
    }

    #[test]
    fn test_index_in_range() {
        let mut rng = seeded_rng(9);
        for _ in 0..1000 {
            assert!(rng.index(532) < 532);
        }
        assert_eq!(ConstRng::new(0.5).index(10), 5);
        assert_eq!(ConstRng::never().index(1), 0);
    }

    #[test]
    fn test_const_rng_yields_value() {
        let mut rng = ConstRng::new(0.5);
        assert_eq!(rng.unit(), 0.5);
        assert!(ConstRng::always().chance(0.0001));
        assert!(!ConstRng::never().chance(0.8));
    }
}
