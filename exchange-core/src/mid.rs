//! Depth-weighted equilibrium mid estimator.
//!
//! Instead of the naive midpoint between the best bid and best ask, this
//! estimator weighs the displayed quantity of every price level by an
//! exponential decay in its distance from a candidate price, and finds the
//! price where the weighted bid depth balances the weighted ask depth.

use crate::order_book::OrderBook;
use crate::types::{Price, PriceLevel};
use std::collections::BTreeMap;
use tracing::trace;

/// Bisection iteration cap for the root find.
const MAX_ITERATIONS: usize = 100;

impl OrderBook {
    /// Estimates the equilibrium mid price within the spread.
    ///
    /// Each resting level at price `L` with total quantity `q` contributes
    /// `q · 2^(−|L − p| / (mid₀ · half_time_ticks))` to its side's depth at
    /// a candidate price `p`, where `mid₀` is the plain midpoint. The
    /// estimate is the root of bid depth minus ask depth on
    /// `[high_bid, low_ask]`, found by bisection to within
    /// `0.1 · price_increment`. Heavy imbalance can push the root outside
    /// the spread; the estimate is then clamped to the nearer end.
    ///
    /// Pure query: the book is not mutated. Cost is linear in the number of
    /// price levels per bisection step.
    ///
    /// Returns `None` when either side is empty, when `half_time_ticks` is
    /// not positive, or when the midpoint is not positive (the decay scale
    /// would be degenerate).
    pub fn equilibrium_mid(&self, half_time_ticks: f64) -> Option<f64> {
        if self.bids.is_empty() || self.asks.is_empty() {
            return None;
        }
        let high_bid = self.high_bid as f64;
        let low_ask = self.low_ask as f64;
        let mid = (high_bid + low_ask) / 2.0;
        if half_time_ticks <= 0.0 || mid <= 0.0 {
            return None;
        }
        let scale = mid * half_time_ticks;
        let imbalance =
            |p: f64| weighted_depth(&self.bids, p, scale) - weighted_depth(&self.asks, p, scale);

        // The imbalance decreases monotonically across the spread: moving up
        // discounts every bid level further and every ask level less.
        if imbalance(high_bid) <= 0.0 {
            return Some(high_bid);
        }
        if imbalance(low_ask) >= 0.0 {
            return Some(low_ask);
        }

        let tolerance = 0.1 * self.config.price_increment as f64;
        let (mut lo, mut hi) = (high_bid, low_ask);
        for iteration in 0..MAX_ITERATIONS {
            let probe = (lo + hi) / 2.0;
            if hi - lo <= tolerance {
                trace!(iteration, probe, "equilibrium mid converged");
                return Some(probe);
            }
            let diff = imbalance(probe);
            if diff == 0.0 {
                return Some(probe);
            }
            if diff > 0.0 {
                lo = probe;
            } else {
                hi = probe;
            }
        }
        Some((lo + hi) / 2.0)
    }
}

/// Sum of level quantities weighted by exponential decay in the distance
/// from `at`.
fn weighted_depth(levels: &BTreeMap<Price, PriceLevel>, at: f64, scale: f64) -> f64 {
    levels
        .iter()
        .map(|(&price, level)| level.total_quantity as f64 * decay(price as f64 - at, scale))
        .sum()
}

fn decay(delta: f64, scale: f64) -> f64 {
    (-delta.abs() / scale).exp2()
}
