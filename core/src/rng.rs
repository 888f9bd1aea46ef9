//! Deterministic random number generation.
//!
//! RULE: Nothing in the hub may call any platform RNG.
//! All randomness flows through StreamRng instances derived
//! from the single master seed in HubConfig.
//!
//! Each consumer gets its own RNG stream, seeded deterministically
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new stream never changes existing streams.
//!   - Each stream is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single stream.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream RNG from the master seed and a stable
    /// slot index. The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Uniform float in [low, high).
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Uniform integer in the inclusive range [low, high].
    pub fn int_inclusive(&mut self, low: i64, high: i64) -> i64 {
        assert!(high >= low, "empty range {low}..={high}");
        let span = (high - low) as u64 + 1;
        low + self.next_u64_below(span) as i64
    }

    /// Gaussian sample (Box-Muller, one draw per call).
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        // 1 - u keeps the log argument in (0, 1].
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Log-normal sample: exp of a Gaussian with the given underlying parameters.
    pub fn log_normal(&mut self, mu: f64, sigma: f64) -> f64 {
        self.normal(mu, sigma).exp()
    }

    /// Poisson sample (Knuth). Fine for the small rates used here.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        let limit = (-lambda).exp();
        let mut k = 0u64;
        let mut p = 1.0;
        loop {
            p *= self.next_f64();
            if p <= limit {
                return k;
            }
            k += 1;
        }
    }

    /// Pick one element uniformly. Returns None on an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_u64_below(items.len() as u64) as usize;
        items.get(index)
    }

    /// Pick an index by relative weight. Weights need not sum to 1.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().sum();
        if weights.is_empty() || total <= 0.0 {
            return None;
        }
        let roll = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if roll < cumulative {
                return Some(i);
            }
        }
        Some(weights.len() - 1)
    }
}

/// All stream RNGs for one hub session, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    /// Age, income, balance, assets, transactions, loyalty.
    Numeric = 0,
    /// Region, product, risk level, activity date.
    Categorical = 1,
    Forecast = 2,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Forecast => "forecast",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let bank = RngBank::new(42);
        let mut a = bank.for_stream(StreamSlot::Numeric);
        let mut b = bank.for_stream(StreamSlot::Numeric);
        for _ in 0..100 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn slots_are_independent_streams() {
        let bank = RngBank::new(42);
        let mut a = bank.for_stream(StreamSlot::Numeric);
        let mut b = bank.for_stream(StreamSlot::Categorical);
        let xs: Vec<u64> = (0..10).map(|_| a.next_u64_below(1_000_000)).collect();
        let ys: Vec<u64> = (0..10).map(|_| b.next_u64_below(1_000_000)).collect();
        assert_ne!(xs, ys, "different slots should not share a stream");
        assert_eq!(a.name, "numeric");
    }

    #[test]
    fn int_inclusive_hits_both_ends() {
        let mut rng = StreamRng::new(7, 0);
        let draws: Vec<i64> = (0..2_000).map(|_| rng.int_inclusive(1, 3)).collect();
        assert!(draws.iter().all(|d| (1..=3).contains(d)));
        assert!(draws.contains(&1));
        assert!(draws.contains(&3));
    }

    #[test]
    fn normal_sample_mean_is_close() {
        let mut rng = StreamRng::new(11, 0);
        let n = 20_000;
        let mean = (0..n).map(|_| rng.normal(45.0, 15.0)).sum::<f64>() / n as f64;
        assert!((mean - 45.0).abs() < 1.0, "sample mean {mean:.2} too far from 45");
    }

    #[test]
    fn poisson_sample_mean_is_close() {
        let mut rng = StreamRng::new(13, 0);
        let n = 20_000;
        let mean = (0..n).map(|_| rng.poisson(15.0) as f64).sum::<f64>() / n as f64;
        assert!((mean - 15.0).abs() < 0.5, "sample mean {mean:.2} too far from 15");
    }

    #[test]
    fn weighted_index_respects_weights() {
        let mut rng = StreamRng::new(17, 0);
        let mut counts = [0usize; 3];
        for _ in 0..10_000 {
            let i = rng.weighted_index(&[0.6, 0.3, 0.1]).unwrap();
            counts[i] += 1;
        }
        assert!(counts[0] > counts[1] && counts[1] > counts[2], "counts: {counts:?}");
        assert_eq!(rng.weighted_index(&[]), None);
    }

    #[test]
    fn choose_on_empty_is_none() {
        let mut rng = StreamRng::new(1, 0);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[5]), Some(&5));
    }
}
