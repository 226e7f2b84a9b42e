//! Free-entry price search.
//!
//! The equilibrium price p* solves
//! ```text
//! β · Σ_z V(z; p*) ν_e(z) = c_e
//! ```
//! where ν_e is the entrant distribution. The left side is increasing in p
//! (higher price → higher profit in every state → higher value), so bisection
//! on `[pmin, pmax]` is well posed once the bracket is checked.
//!
//! ## Cost
//!
//! Every trial price runs a full value iteration, so the total work is
//! O(maxit_outer × maxit_inner × Nz²) with a dense transition matrix. The
//! bracket check adds two more inner solves.

use tracing::{debug, info, warn};

use crate::error::{ModelError, Result, Stage};
use crate::types::{dot, IncumbentSolution, IterationOutcome, Parameters, ProductivityGrid};
use crate::value_iteration::solve_incumbent;

/// Equilibrium price together with the incumbent solution at that price.
#[derive(Debug, Clone)]
pub struct PriceSearch {
    pub price: f64,
    pub entrant_value: f64,
    pub incumbent: IterationOutcome<IncumbentSolution>,
    pub outer: IterationOutcome<f64>,
}

/// Discounted expected value of an entrant, β · (V · ν_e).
pub fn entrant_value(vf: &[f64], grid: &ProductivityGrid, beta: f64) -> f64 {
    beta * dot(vf, &grid.entrant)
}

/// Bisection for `f(x) = target` with `f` increasing on `[lo, hi]`.
///
/// The bracket is verified before iterating: `f(lo) ≤ target ≤ f(hi)` must
/// hold, otherwise [`ModelError::NoEquilibrium`] is returned. Stops when
/// `|f(x) − target| < tol`, after `maxit` midpoints, or when the bracket can
/// no longer be split in floating point; the last two leave `converged` false.
pub fn bisect<F>(
    mut f: F,
    target: f64,
    lo: f64,
    hi: f64,
    tol: f64,
    maxit: usize,
) -> Result<IterationOutcome<f64>>
where
    F: FnMut(f64) -> Result<f64>,
{
    let value_at_lo = f(lo)?;
    let value_at_hi = f(hi)?;
    if !value_at_lo.is_finite()
        || !value_at_hi.is_finite()
        || value_at_lo > target
        || value_at_hi < target
    {
        return Err(ModelError::NoEquilibrium {
            pmin: lo,
            pmax: hi,
            value_at_pmin: value_at_lo,
            value_at_pmax: value_at_hi,
            entry_cost: target,
        });
    }

    let (res_lo, res_hi) = ((value_at_lo - target).abs(), (value_at_hi - target).abs());
    let (mut x, mut residual) = if res_lo <= res_hi {
        (lo, res_lo)
    } else {
        (hi, res_hi)
    };
    if residual < tol {
        return Ok(IterationOutcome {
            value: x,
            iterations: 0,
            converged: true,
            residual,
        });
    }

    let (mut lo, mut hi) = (lo, hi);
    let mut iterations = 0;
    let mut converged = false;
    for it in 0..maxit {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            debug!(lo, hi, "bisection bracket collapsed");
            break;
        }
        let value = f(mid)?;
        x = mid;
        residual = (value - target).abs();
        iterations = it + 1;
        debug!(iteration = iterations, x = mid, value, residual, "bisection step");
        if residual < tol {
            converged = true;
            break;
        }
        if value < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Ok(IterationOutcome {
        value: x,
        iterations,
        converged,
        residual,
    })
}

/// Find the price at which the free-entry condition holds.
pub fn solve_price(grid: &ProductivityGrid, params: &Parameters) -> Result<PriceSearch> {
    let mut last: Option<IterationOutcome<IncumbentSolution>> = None;

    let outer = bisect(
        |price| {
            let inc = solve_incumbent(price, grid, params)?;
            let value = entrant_value(&inc.value.vf, grid, params.beta);
            last = Some(inc);
            Ok(value)
        },
        params.ce,
        params.pmin,
        params.pmax,
        params.tol,
        params.maxit,
    )?;

    let price = outer.value;
    let incumbent = match last {
        Some(inc) if inc.value.price == price => inc,
        _ => solve_incumbent(price, grid, params)?,
    };
    let value = entrant_value(&incumbent.value.vf, grid, params.beta);

    if !outer.converged {
        warn!(
            stage = %Stage::PriceSearch,
            price,
            iterations = outer.iterations,
            residual = outer.residual,
            "price bisection stopped before meeting the tolerance"
        );
    }
    info!(
        price,
        entrant_value = value,
        iterations = outer.iterations,
        "free-entry price found"
    );

    Ok(PriceSearch {
        price,
        entrant_value: value,
        incumbent,
        outer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::productivity::discretize;

    #[test]
    fn test_bisect_cubic_root() {
        let out = bisect(|x| Ok(x * x * x), 8.0, 0.0, 10.0, 1e-10, 200).unwrap();
        assert!(out.converged);
        assert!((out.value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_bisect_invalid_bracket() {
        let err = bisect(|x| Ok(x), 20.0, 0.0, 10.0, 1e-8, 100).unwrap_err();
        assert!(matches!(err, ModelError::NoEquilibrium { .. }));
        assert_eq!(err.stage(), Stage::PriceSearch);
        let err = bisect(|x| Ok(x), -1.0, 0.0, 10.0, 1e-8, 100).unwrap_err();
        assert!(matches!(err, ModelError::NoEquilibrium { .. }));
    }

    #[test]
    fn test_bisect_iteration_cap() {
        let out = bisect(|x| Ok(x), 3.3, 0.0, 10.0, 1e-12, 4).unwrap();
        assert!(!out.converged);
        assert_eq!(out.iterations, 4);
        assert!(out.warning(Stage::PriceSearch, 1e-12).is_some());
    }

    #[test]
    fn test_bisect_endpoint_root() {
        let out = bisect(|x| Ok(x), 0.0, 0.0, 10.0, 1e-8, 100).unwrap();
        assert!(out.converged);
        assert_eq!(out.iterations, 0);
        assert_eq!(out.value, 0.0);
    }

    #[test]
    fn test_bisect_collapsed_bracket() {
        // A step function never gets within tolerance; the bracket collapses first.
        let out = bisect(|x| Ok(if x < 1.0 { 0.0 } else { 2.0 }), 1.0, 0.0, 4.0, 1e-8, 10_000)
            .unwrap();
        assert!(!out.converged);
        assert!(out.iterations < 10_000);
        assert!((out.value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_price_free_entry() {
        let params = Parameters::default();
        let grid = discretize(&params).unwrap();
        let search = solve_price(&grid, &params).unwrap();
        assert!(search.outer.converged);
        assert!(search.price > params.pmin && search.price < params.pmax);
        assert!((search.entrant_value - params.ce).abs() < params.tol);
        assert_eq!(search.incumbent.value.price, search.price);
    }
}
