//! Static profit maximization of an incumbent at a given price.
//!
//! With y = z n^θ the first-order condition gives, per state,
//! ```text
//! n(z) = (θ p z / w)^(1/(1−θ))
//! y(z) = z n(z)^θ
//! π(z) = p y(z) − w n(z) − c_f
//! ```

use crate::error::{ModelError, Result};
use crate::types::StaticPolicy;

/// Labor demand, output and profit over the productivity grid.
pub fn solve_static(
    price: f64,
    grid_z: &[f64],
    theta: f64,
    wage: f64,
    cf: f64,
) -> Result<StaticPolicy> {
    if !(theta > 0.0 && theta < 1.0) {
        return Err(ModelError::StaticProblem(format!("labor share {theta} is outside (0, 1)")));
    }
    if !(price > 0.0 && price.is_finite()) {
        return Err(ModelError::StaticProblem(format!("price {price} is not positive")));
    }
    if !(wage > 0.0 && wage.is_finite()) {
        return Err(ModelError::StaticProblem(format!("wage {wage} is not positive")));
    }

    let exponent = 1.0 / (1.0 - theta);
    let labor: Vec<f64> = grid_z
        .iter()
        .map(|&z| (theta * price * z / wage).powf(exponent))
        .collect();
    let output: Vec<f64> = grid_z
        .iter()
        .zip(&labor)
        .map(|(&z, &n)| z * n.powf(theta))
        .collect();
    let profit = output
        .iter()
        .zip(&labor)
        .map(|(&y, &n)| price * y - wage * n - cf)
        .collect();

    Ok(StaticPolicy {
        profit,
        output,
        labor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_form_at_unit_values() {
        // θ = 1/2, p = 2, z = 1, w = 1: n = (1)^2 = 1, y = 1, π = 2 − 1 − c_f
        let sp = solve_static(2.0, &[1.0], 0.5, 1.0, 0.5).unwrap();
        assert!((sp.labor[0] - 1.0).abs() < 1e-12);
        assert!((sp.output[0] - 1.0).abs() < 1e-12);
        assert!((sp.profit[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_labor_is_optimal() {
        // Perturbing labor around the closed form never raises profit.
        let (p, z, theta, w) = (1.3, 1.7, 2.0 / 3.0, 1.0);
        let sp = solve_static(p, &[z], theta, w, 0.0).unwrap();
        let n = sp.labor[0];
        let pi = |n: f64| p * z * n.powf(theta) - w * n;
        assert!((pi(n) - sp.profit[0]).abs() < 1e-10);
        for eps in [1e-3, 1e-2, 1e-1] {
            assert!(pi(n * (1.0 + eps)) <= sp.profit[0]);
            assert!(pi(n * (1.0 - eps)) <= sp.profit[0]);
        }
    }

    #[test]
    fn test_domain_errors() {
        for result in [
            solve_static(1.0, &[1.0], 1.0, 1.0, 0.0),
            solve_static(0.0, &[1.0], 0.5, 1.0, 0.0),
            solve_static(1.0, &[1.0], 0.5, -1.0, 0.0),
        ] {
            let err = result.unwrap_err();
            assert!(matches!(err, ModelError::StaticProblem(_)), "{err}");
            assert_eq!(err.stage(), crate::error::Stage::StaticProblem);
        }
    }
}
