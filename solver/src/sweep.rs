//! Parameter sweeps: one independent equilibrium per grid value, solved in parallel.

use rayon::prelude::*;
use serde::Serialize;

use crate::equilibrium::solve_equilibrium;
use crate::error::Result;
use crate::types::Parameters;

/// Parameter varied along a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    EntryCost,
    FixedCost,
    MarketSize,
    Persistence,
    ShockStd,
}

impl SweepAxis {
    /// Copy of `base` with this axis set to `value`.
    pub fn apply(self, base: &Parameters, value: f64) -> Parameters {
        let mut p = base.clone();
        match self {
            SweepAxis::EntryCost => p.ce = value,
            SweepAxis::FixedCost => p.cf = value,
            SweepAxis::MarketSize => p.market_size = value,
            SweepAxis::Persistence => p.rho_z = value,
            SweepAxis::ShockStd => p.sigma_u = value,
        }
        p
    }
}

/// Headline results of one sweep point.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub price: f64,
    pub exit_rate: f64,
    pub average_firm_size: f64,
    pub exit_cutoff: f64,
    pub m_star: f64,
    pub converged: bool,
}

#[derive(Debug)]
pub struct SweepPoint {
    pub value: f64,
    pub outcome: Result<SweepSummary>,
}

/// `n` evenly spaced values from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|i| lo + step * i as f64).collect()
        }
    }
}

/// Solve one equilibrium per value along `axis`. Results keep input order;
/// a failing point does not stop the others.
pub fn sweep(base: &Parameters, axis: SweepAxis, values: &[f64]) -> Vec<SweepPoint> {
    values
        .par_iter()
        .map(|&value| {
            let outcome = solve_equilibrium(&axis.apply(base, value)).map(|eq| SweepSummary {
                price: eq.price,
                exit_rate: eq.exit_rate,
                average_firm_size: eq.average_firm_size,
                exit_cutoff: eq.exit.exit_cutoff,
                m_star: eq.distribution.m_star,
                converged: eq.converged(),
            });
            SweepPoint { value, outcome }
        })
        .collect()
}
