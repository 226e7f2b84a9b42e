//! Shares of firms and employment by firm-size class.
//!
//! Size classes are read off the stationary CDFs by linear interpolation at
//! employment thresholds. This is reporting code: below the smallest firm the
//! CDF is held at its first value, and above the largest firm it is extended
//! linearly from the last segment, which can push the top share outside
//! [0, 1] when a threshold lies far beyond the grid.

use serde::Serialize;

use crate::constants::{SIZE_LABELS, SIZE_THRESHOLDS};
use crate::equilibrium::Equilibrium;

/// Linear interpolation of `(x, y)` at `x1`; `x` must be increasing with at least two points.
///
/// Returns the interpolated value and the index of the right neighbour.
pub fn interpolate(x: &[f64], y: &[f64], x1: f64) -> (f64, usize) {
    let n = x.len();
    debug_assert!(n >= 2 && y.len() == n);
    let i = x.partition_point(|&v| v <= x1).clamp(1, n - 1);
    if x1 < x[0] {
        return (y[0], i);
    }
    let (xl, xr, yl, yr) = (x[i - 1], x[i], y[i - 1], y[i]);
    (yl + (yr - yl) / (xr - xl) * (x1 - xl), i)
}

/// Mass in each size class: CDF at every threshold minus the classes below it,
/// with the remainder in the top class.
pub fn size_bucket_shares(pol_n: &[f64], cdf: &[f64], thresholds: &[f64]) -> Vec<f64> {
    let mut shares = Vec::with_capacity(thresholds.len() + 1);
    let mut cumulative = 0.0;
    for &t in thresholds {
        let (at_threshold, _) = interpolate(pol_n, cdf, t);
        let share = at_threshold - cumulative;
        cumulative += share;
        shares.push(share);
    }
    shares.push(1.0 - cumulative);
    shares
}

#[derive(Debug, Clone, Serialize)]
pub struct SizeBuckets {
    pub labels: Vec<String>,
    pub thresholds: Vec<f64>,
    pub firm_shares: Vec<f64>,
    pub employment_shares: Vec<f64>,
}

impl SizeBuckets {
    /// Size classes at the default thresholds (20, 50, 100, 500 workers).
    pub fn from_equilibrium(eq: &Equilibrium) -> Self {
        let pol_n = &eq.incumbent.pol_n;
        let dist = &eq.distribution;
        Self {
            labels: SIZE_LABELS.iter().map(|s| s.to_string()).collect(),
            thresholds: SIZE_THRESHOLDS.to_vec(),
            firm_shares: size_bucket_shares(pol_n, &dist.cdf, &SIZE_THRESHOLDS),
            employment_shares: size_bucket_shares(pol_n, &dist.emp_cdf, &SIZE_THRESHOLDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_inside() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 10.0, 30.0];
        assert_eq!(interpolate(&x, &y, 0.5), (5.0, 1));
        assert_eq!(interpolate(&x, &y, 1.5), (20.0, 2));
        assert_eq!(interpolate(&x, &y, 1.0), (10.0, 2));
    }

    #[test]
    fn test_interpolate_boundaries() {
        let x = [1.0, 2.0, 3.0];
        let y = [0.2, 0.6, 0.8];
        // Held flat below the grid.
        assert_eq!(interpolate(&x, &y, 0.0).0, 0.2);
        // Extrapolated from the last segment above it.
        assert!((interpolate(&x, &y, 4.0).0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bucket_shares_sum_to_one() {
        let pol_n = [5.0, 30.0, 80.0, 300.0, 1000.0];
        let cdf = [0.4, 0.7, 0.85, 0.95, 1.0];
        let shares = size_bucket_shares(&pol_n, &cdf, &SIZE_THRESHOLDS);
        assert_eq!(shares.len(), 5);
        assert!((shares.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        // CDF at 20 workers: 0.4 + (0.3 / 25) * 15
        assert!((shares[0] - 0.58).abs() < 1e-12);
    }
}
