//! Seeded pseudo-random source.
//!
//! A plain linear congruential generator. Not suitable for anything but
//! reproducible demo data: for a fixed seed the full output sequence is
//! identical across processes, which the generators and the narrative
//! fixtures depend on.

use chrono::{DateTime, Duration, Utc};

const LCG_A: u64 = 1_664_525;
const LCG_C: u64 = 1_013_904_223;
const LCG_M: u64 = 1 << 32;

#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            state: seed % LCG_M,
        }
    }

    /// Next float in [0, 1).
    pub fn next(&mut self) -> f64 {
        self.state = (self.state.wrapping_mul(LCG_A).wrapping_add(LCG_C)) % LCG_M;
        self.state as f64 / LCG_M as f64
    }

    /// Integer in [min, max], inclusive on both ends.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        debug_assert!(min <= max, "int range inverted: {}..{}", min, max);
        min + (self.next() * (max - min + 1) as f64).floor() as i64
    }

    /// Float in [min, max).
    pub fn float(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }

    /// Pick one element. Panics on an empty slice; callers guarantee
    /// non-empty inputs.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "pick called with an empty slice");
        let idx = self.int(0, items.len() as i64 - 1) as usize;
        &items[idx]
    }

    /// Pick `count` distinct elements via shuffle-and-take. `count` is
    /// clamped to the slice length.
    pub fn pick_multiple<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        let mut indices: Vec<usize> = (0..items.len()).collect();
        // Fisher-Yates driven by the LCG.
        for i in (1..indices.len()).rev() {
            let j = self.int(0, i as i64) as usize;
            indices.swap(i, j);
        }
        indices
            .into_iter()
            .take(count.min(items.len()))
            .map(|i| items[i].clone())
            .collect()
    }

    /// Cumulative-weight selection. Falls back to the last element when
    /// floating rounding leaves the roll past the final boundary.
    pub fn weighted<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> &'a T {
        assert!(!items.is_empty(), "weighted called with an empty slice");
        assert_eq!(items.len(), weights.len(), "weights length mismatch");
        let total: f64 = weights.iter().sum();
        let roll = self.next() * total;
        let mut cumulative = 0.0;
        for (item, weight) in items.iter().zip(weights) {
            cumulative += weight;
            if roll < cumulative {
                return item;
            }
        }
        &items[items.len() - 1]
    }

    /// True with the given probability.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next() < probability
    }

    /// Instant linearly interpolated between two bounds.
    pub fn date(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
        let span = (end - start).num_seconds().max(0);
        start + Duration::seconds((self.next() * span as f64) as i64)
    }

    /// Rewind to the original seed, or re-seed with a new one.
    pub fn reset(&mut self, seed: Option<u64>) {
        if let Some(seed) = seed {
            self.seed = seed;
        }
        self.state = self.seed % LCG_M;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SEED)
    }
}
