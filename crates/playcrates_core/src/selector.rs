//! # Weighted Reward Selection
//!
//! Picks one entry from an ordered pool with probability proportional to
//! its weight.
//!
//! ## Algorithm
//!
//! ```text
//! total = sum(weights)
//! r     = uniform[0, 1) * total
//! for idx in 0..len-1:
//!     r -= weight[idx]
//!     if r <= 0: return idx
//! return len-1
//! ```
//!
//! The last entry is the fallback when no earlier entry wins, which covers
//! floating-point rounding and all-zero pools. A non-empty pool always
//! yields a member; zero-weight entries are only reached as that fallback.

use rand::Rng;

/// Anything that carries a relative selection weight.
pub trait Weighted {
    /// Non-negative relative weight.
    fn weight(&self) -> f64;
}

impl Weighted for f64 {
    fn weight(&self) -> f64 {
        *self
    }
}

/// Chooses one entry of `pool` under weighting.
///
/// Returns the winning index together with the entry, or `None` if the
/// pool is empty.
pub fn choose_weighted<'a, T, R>(pool: &'a [T], rng: &mut R) -> Option<(usize, &'a T)>
where
    T: Weighted,
    R: Rng + ?Sized,
{
    let last = pool.len().checked_sub(1)?;

    let total_weight: f64 = pool.iter().map(Weighted::weight).sum();

    let mut remaining = rng.gen::<f64>() * total_weight;
    let mut idx = 0;
    while idx < last {
        remaining -= pool[idx].weight();
        if remaining <= 0.0 {
            break;
        }
        idx += 1;
    }

    Some((idx, &pool[idx]))
}

/// Runs `iterations` selections and tallies the winners.
pub fn run_statistics<T, R>(pool: &[T], iterations: u64, rng: &mut R) -> SelectionStatistics
where
    T: Weighted,
    R: Rng + ?Sized,
{
    let mut stats = SelectionStatistics {
        total_draws: 0,
        counts: vec![0; pool.len()],
    };

    for _ in 0..iterations {
        if let Some((idx, _)) = choose_weighted(pool, rng) {
            stats.total_draws += 1;
            stats.counts[idx] += 1;
        }
    }

    stats
}

/// Tallies from repeated selection over one pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionStatistics {
    /// Number of successful draws.
    pub total_draws: u64,
    /// Wins per pool index.
    pub counts: Vec<u64>,
}

impl SelectionStatistics {
    /// Observed frequency of `idx` in `[0, 1]`.
    #[must_use]
    pub fn frequency(&self, idx: usize) -> f64 {
        match self.counts.get(idx) {
            Some(&count) if self.total_draws > 0 => count as f64 / self.total_draws as f64,
            _ => 0.0,
        }
    }
}

/// Expected selection chance of each entry, for previews.
///
/// All-zero pools report the fallback entry at 100%.
#[must_use]
pub fn selection_chances<T: Weighted>(pool: &[T]) -> Vec<f64> {
    let total_weight: f64 = pool.iter().map(Weighted::weight).sum();
    if total_weight > 0.0 {
        return pool.iter().map(|e| e.weight() / total_weight).collect();
    }

    let mut chances = vec![0.0; pool.len()];
    if let Some(last) = chances.last_mut() {
        *last = 1.0;
    }
    chances
}
