//! Incumbent value-function iteration at a fixed price.
//!
//! Iterates the Bellman operator with free disposal of the continuation:
//! ```text
//! V(z) = π(z) + β · max(0, Σ_z' P(z'|z) V(z'))
//! ```
//! The `max(0, ·)` is the exit option: a firm whose expected continuation is
//! negative leaves and receives zero. With β < 1 and bounded profits the
//! operator is a β-contraction in the sup norm, so iteration from V = 0
//! converges geometrically. The loop is still capped at `maxit`.

use tracing::{debug, warn};

use crate::error::{ModelError, Result, Stage};
use crate::static_firm::solve_static;
use crate::types::{IncumbentSolution, IterationOutcome, Parameters, ProductivityGrid};

/// One application of the Bellman operator.
pub fn bellman_step(profit: &[f64], grid: &ProductivityGrid, beta: f64, vf: &[f64]) -> Vec<f64> {
    grid.expectation(vf)
        .into_iter()
        .zip(profit)
        .map(|(cont, &pi)| pi + beta * cont.max(0.0))
        .collect()
}

/// Sup-norm distance; NaN or infinite entries give an infinite distance.
fn sup_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0_f64, |acc, d| {
            if d.is_finite() {
                acc.max(d)
            } else {
                f64::INFINITY
            }
        })
}

/// Solve the incumbent problem at `price`, starting from V = 0.
///
/// Returns the last iterate even when `maxit` is exhausted; the outcome's
/// `converged` flag and `residual` tell the caller whether to trust it.
/// Non-finite profits or iterates are a [`ModelError::ValueIteration`].
pub fn solve_incumbent(
    price: f64,
    grid: &ProductivityGrid,
    params: &Parameters,
) -> Result<IterationOutcome<IncumbentSolution>> {
    let policy = solve_static(price, &grid.grid_z, params.theta, params.wage, params.cf)?;
    if let Some(i) = policy.profit.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::ValueIteration {
            price,
            reason: format!("profit is not finite in state {i}"),
        });
    }

    let mut vf = vec![0.0; grid.len()];
    let mut residual = f64::INFINITY;
    let mut iterations = 0;
    let mut converged = false;

    for it in 0..params.maxit {
        let next = bellman_step(&policy.profit, grid, params.beta, &vf);
        if next.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::ValueIteration {
                price,
                reason: format!("value function is not finite after {} iterations", it + 1),
            });
        }
        residual = sup_distance(&next, &vf);
        vf = next;
        iterations = it + 1;
        if residual < params.tol {
            converged = true;
            break;
        }
    }

    debug!(price, iterations, residual, "value iteration finished");
    if !converged {
        warn!(
            stage = %Stage::ValueIteration,
            price,
            iterations,
            residual,
            "value iteration hit the iteration cap"
        );
    }

    Ok(IterationOutcome {
        value: IncumbentSolution {
            price,
            vf,
            firm_profit: policy.profit,
            firm_output: policy.output,
            pol_n: policy.labor,
        },
        iterations,
        converged,
        residual,
    })
}
