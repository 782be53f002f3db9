use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use rand::Rng;

/// Source of uniform randomness, injectable so callers can pin down sequences.
pub trait RandomSource: Send + Sync {
    /// Uniform value in `[0, 1)`
    fn next_f64(&self) -> f64;

    /// Uniform index in `0..n`; `n` must be non-zero.
    fn below(&self, n: usize) -> usize {
        ((self.next_f64() * n as f64) as usize).min(n.saturating_sub(1))
    }

    fn chance(&self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Replays a fixed list of values, wrapping around at the end.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<f64>,
    index: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            index: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let i = self.index.fetch_add(1, AtomicOrdering::Relaxed);
        self.values[i % self.values.len()].clamp(0.0, 0.999_999)
    }
}

/// Shuffle by sorting on a random key per item.
pub fn shuffle<T>(items: Vec<T>, rng: &dyn RandomSource) -> Vec<T> {
    let mut keyed: Vec<(f64, T)> = items.into_iter().map(|item| (rng.next_f64(), item)).collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    keyed.into_iter().map(|(_, item)| item).collect()
}
