//! Invariant firm distribution and the market-clearing entrant mass.
//!
//! Let s(z) = 1 − exit(z) and P̃ = (diag(s) P)ᵀ, the transition restricted to
//! survivors. The invariant mass with entrant flow m solves
//! ```text
//! x = P̃ x + m ν_e   ⇔   (I − P̃) x = m ν_e
//! ```
//! which is linear in m. We therefore solve once with m = 1 to get x₀ and
//! read the equilibrium mass off goods-market clearing, D = m* (x₀ · y):
//! ```text
//! m* = D / (x₀ · y)
//! ```
//! No second search nested inside the price bisection is needed.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::constants::NEGATIVE_MASS_TOL;
use crate::error::{ModelError, Result};
use crate::types::{cumsum, dot, ExitPolicy, ProductivityGrid, StationaryDistribution};

/// Solve `(I − P̃) x = m ν_e` for the unnormalized firm mass.
pub fn invariant_distribution(
    grid: &ProductivityGrid,
    pol_exit: &[bool],
    m: f64,
) -> Result<Vec<f64>> {
    let n = grid.len();
    if pol_exit.len() != n {
        return Err(ModelError::SingularDistribution(format!(
            "exit policy has {} states, grid has {n}",
            pol_exit.len()
        )));
    }
    if pol_exit.iter().all(|&e| !e) {
        return Err(ModelError::SingularDistribution(
            "no state exits, so (I - P~) is singular and mass accumulates without bound".into(),
        ));
    }

    let a = DMatrix::from_fn(n, n, |i, j| {
        let survive = if pol_exit[j] { 0.0 } else { 1.0 };
        let identity = if i == j { 1.0 } else { 0.0 };
        identity - survive * grid.pi[j][i]
    });
    let b = DVector::from_iterator(n, grid.entrant.iter().map(|&e| m * e));

    let x = a.lu().solve(&b).ok_or_else(|| {
        ModelError::SingularDistribution("(I - P~) is not invertible".into())
    })?;
    if x.iter().any(|v| !v.is_finite() || *v < -NEGATIVE_MASS_TOL) {
        return Err(ModelError::SingularDistribution(
            "solution has negative or non-finite mass".into(),
        ));
    }
    Ok(x.iter().map(|v| v.max(0.0)).collect())
}

/// Entrant mass that clears the goods market, `D / (x₀ · y)`.
pub fn entrant_mass(distribution_0: &[f64], firm_output: &[f64], market_size: f64) -> Result<f64> {
    let supply = dot(distribution_0, firm_output);
    if !(supply > 0.0 && supply.is_finite()) {
        return Err(ModelError::SingularDistribution(format!(
            "aggregate output per unit of entry is {supply}"
        )));
    }
    Ok(market_size / supply)
}

/// Full stationary distribution: mass, firm and employment pdf/cdf.
pub fn solve_stationary(
    grid: &ProductivityGrid,
    exit: &ExitPolicy,
    firm_output: &[f64],
    pol_n: &[f64],
    market_size: f64,
) -> Result<StationaryDistribution> {
    let distribution_0 = invariant_distribution(grid, &exit.pol_exit, 1.0)?;
    let m_star = entrant_mass(&distribution_0, firm_output, market_size)?;
    let mass: Vec<f64> = distribution_0.iter().map(|x| m_star * x).collect();

    let total_mass: f64 = mass.iter().sum();
    let pdf: Vec<f64> = mass.iter().map(|x| x / total_mass).collect();
    let cdf = cumsum(&pdf);

    let employment: Vec<f64> = pol_n.iter().zip(&pdf).map(|(n, p)| n * p).collect();
    let total_employment: f64 = employment.iter().sum();
    let emp_pdf: Vec<f64> = employment.iter().map(|e| e / total_employment).collect();
    let emp_cdf = cumsum(&emp_pdf);

    debug!(m_star, total_mass, "stationary distribution solved");

    Ok(StationaryDistribution {
        distribution_0,
        m_star,
        mass,
        pdf,
        cdf,
        emp_pdf,
        emp_cdf,
    })
}
