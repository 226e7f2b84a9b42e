//! Core data records passed between solver stages.
//!
//! The pipeline is a chain of immutable values:
//! [`Parameters`] → [`ProductivityGrid`] → [`IncumbentSolution`] → [`ExitPolicy`]
//! → [`StationaryDistribution`]. Each stage takes its inputs by reference and
//! returns a fresh record; nothing is mutated after construction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ConvergenceWarning, ModelError, Result, Stage};

/// Discretization method for the log-productivity AR(1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Discretization {
    #[default]
    Rouwenhorst,
    /// Grid spans μ ± m·sd of the unconditional distribution.
    Tauchen { m: f64 },
}

/// Productivity distribution of new entrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntrantDistribution {
    /// Stationary distribution of the productivity chain.
    #[default]
    Stationary,
    /// Equal mass on every grid point.
    Uniform,
}

/// Model calibration and solver settings. Immutable once validated.
///
/// Every field has a default, so a JSON config may override any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Discount factor β ∈ (0, 1).
    pub beta: f64,
    /// Labor share θ ∈ (0, 1).
    pub theta: f64,
    /// Fixed operating cost c_f.
    pub cf: f64,
    /// Sunk entry cost c_e.
    pub ce: f64,
    /// Market size D.
    #[serde(alias = "D")]
    pub market_size: f64,
    pub wage: f64,
    /// Persistence ρ of log productivity.
    pub rho_z: f64,
    /// Innovation standard deviation σ.
    pub sigma_u: f64,
    /// Number of productivity states.
    pub nz: usize,
    /// AR(1) constant z̄.
    pub z_bar: f64,
    pub tol: f64,
    pub maxit: usize,
    /// Price bracket for the free-entry bisection.
    pub pmin: f64,
    pub pmax: f64,
    pub discretization: Discretization,
    pub entrant: EntrantDistribution,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            beta: DEFAULT_BETA,
            theta: DEFAULT_THETA,
            cf: DEFAULT_FIXED_COST,
            ce: DEFAULT_ENTRY_COST,
            market_size: DEFAULT_MARKET_SIZE,
            wage: DEFAULT_WAGE,
            rho_z: DEFAULT_RHO_Z,
            sigma_u: DEFAULT_SIGMA_U,
            nz: DEFAULT_NZ,
            z_bar: DEFAULT_Z_BAR,
            tol: DEFAULT_TOL,
            maxit: DEFAULT_MAXIT,
            pmin: DEFAULT_PRICE_MIN,
            pmax: DEFAULT_PRICE_MAX,
            discretization: Discretization::Rouwenhorst,
            entrant: EntrantDistribution::Stationary,
        }
    }
}

fn require(ok: bool, name: &'static str, value: f64, reason: &'static str) -> Result<()> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::InvalidParameter {
            name,
            value,
            reason,
        })
    }
}

impl Parameters {
    /// Load parameters from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: Parameters = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<()> {
        let open_unit = |x: f64| x > 0.0 && x < 1.0;
        require(open_unit(self.beta), "beta", self.beta, "must lie in (0, 1)")?;
        require(open_unit(self.theta), "theta", self.theta, "must lie in (0, 1)")?;
        require(self.cf >= 0.0, "cf", self.cf, "must be non-negative")?;
        require(self.ce >= 0.0, "ce", self.ce, "must be non-negative")?;
        require(self.market_size > 0.0, "market_size", self.market_size, "must be positive")?;
        require(self.wage > 0.0, "wage", self.wage, "must be positive")?;
        // The exit cutoff needs expected continuation non-decreasing in z.
        require(
            (0.0..1.0).contains(&self.rho_z),
            "rho_z",
            self.rho_z,
            "must lie in [0, 1)",
        )?;
        require(self.sigma_u > 0.0, "sigma_u", self.sigma_u, "must be positive")?;
        require(self.nz >= 2, "nz", self.nz as f64, "needs at least two states")?;
        require(self.z_bar.is_finite(), "z_bar", self.z_bar, "must be finite")?;
        require(self.tol > 0.0, "tol", self.tol, "must be positive")?;
        require(self.maxit > 0, "maxit", self.maxit as f64, "must be at least one")?;
        require(self.pmin > 0.0, "pmin", self.pmin, "must be positive")?;
        require(self.pmax > self.pmin, "pmax", self.pmax, "must exceed pmin")?;
        if let Discretization::Tauchen { m } = self.discretization {
            require(m > 0.0, "tauchen_m", m, "must be positive")?;
        }
        Ok(())
    }
}

/// Finite-state Markov approximation of the productivity process.
#[derive(Debug, Clone, Serialize)]
pub struct ProductivityGrid {
    /// Productivity levels exp(state value), strictly increasing.
    pub grid_z: Vec<f64>,
    /// Row-stochastic transition matrix, `pi[i][j]` = P(z_j | z_i).
    pub pi: Vec<Vec<f64>>,
    /// Stationary distribution of the chain.
    pub nu: Vec<f64>,
    /// Productivity distribution of entrants.
    pub entrant: Vec<f64>,
}

impl ProductivityGrid {
    pub fn len(&self) -> usize {
        self.grid_z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid_z.is_empty()
    }

    /// Conditional expectation `pi · v`, one entry per current state.
    pub fn expectation(&self, v: &[f64]) -> Vec<f64> {
        self.pi.iter().map(|row| dot(row, v)).collect()
    }
}

/// Static optimum per productivity state at a fixed price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticPolicy {
    pub profit: Vec<f64>,
    pub output: Vec<f64>,
    pub labor: Vec<f64>,
}

/// Incumbent value function and static policies at a fixed price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncumbentSolution {
    pub price: f64,
    pub vf: Vec<f64>,
    pub firm_profit: Vec<f64>,
    pub firm_output: Vec<f64>,
    pub pol_n: Vec<f64>,
}

/// Exit threshold and per-state exit indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitPolicy {
    pub exit_cutoff: f64,
    /// Index of the first surviving state.
    pub cutoff_index: usize,
    /// `true` for states that exit.
    pub pol_exit: Vec<bool>,
}

impl ExitPolicy {
    pub fn exiting_states(&self) -> usize {
        self.pol_exit.iter().filter(|&&e| e).count()
    }
}

/// Invariant distribution of firms and employment over productivity states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationaryDistribution {
    /// Unnormalized mass for an entrant mass of one.
    pub distribution_0: Vec<f64>,
    /// Entrant mass clearing the goods market.
    pub m_star: f64,
    /// Firm mass per state, `m_star · distribution_0`.
    pub mass: Vec<f64>,
    pub pdf: Vec<f64>,
    pub cdf: Vec<f64>,
    pub emp_pdf: Vec<f64>,
    pub emp_cdf: Vec<f64>,
}

/// Result of an iterative refinement: best iterate plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationOutcome<T> {
    pub value: T,
    pub iterations: usize,
    pub converged: bool,
    /// Final distance measure (sup-norm step or |f(x) − target|).
    pub residual: f64,
}

impl<T> IterationOutcome<T> {
    /// Warning for a stage that stopped short of its tolerance.
    pub fn warning(&self, stage: Stage, tolerance: f64) -> Option<ConvergenceWarning> {
        if self.converged {
            None
        } else {
            Some(ConvergenceWarning {
                stage,
                iterations: self.iterations,
                residual: self.residual,
                tolerance,
            })
        }
    }
}

#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Running sum.
pub fn cumsum(v: &[f64]) -> Vec<f64> {
    v.iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_valid() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_theta() {
        let p = Parameters {
            theta: 1.0,
            ..Parameters::default()
        };
        match p.validate() {
            Err(ModelError::InvalidParameter { name, .. }) => assert_eq!(name, "theta"),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_persistence_rejected() {
        let p = Parameters {
            rho_z: -0.5,
            ..Parameters::default()
        };
        match p.validate() {
            Err(ModelError::InvalidParameter { name, .. }) => assert_eq!(name, "rho_z"),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
        let iid = Parameters {
            rho_z: 0.0,
            ..Parameters::default()
        };
        assert!(iid.validate().is_ok());
    }

    #[test]
    fn test_invalid_bracket_and_nan() {
        let p = Parameters {
            pmin: 5.0,
            pmax: 1.0,
            ..Parameters::default()
        };
        assert!(p.validate().is_err());
        let p = Parameters {
            wage: f64::NAN,
            ..Parameters::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let p: Parameters = serde_json::from_str(r#"{"ce": 10.0, "D": 50.0}"#).unwrap();
        assert_eq!(p.ce, 10.0);
        assert_eq!(p.market_size, 50.0);
        assert_eq!(p.nz, DEFAULT_NZ);
        assert_eq!(p.discretization, Discretization::Rouwenhorst);

        let p: Parameters =
            serde_json::from_str(r#"{"discretization": {"method": "tauchen", "m": 2.5}}"#).unwrap();
        assert_eq!(p.discretization, Discretization::Tauchen { m: 2.5 });
    }

    #[test]
    fn test_cumsum() {
        assert_eq!(cumsum(&[1.0, 2.0, 3.0]), vec![1.0, 3.0, 6.0]);
        assert!(cumsum(&[]).is_empty());
    }

    #[test]
    fn test_outcome_warning() {
        let done = IterationOutcome {
            value: 1.0,
            iterations: 3,
            converged: true,
            residual: 0.0,
        };
        assert!(done.warning(Stage::PriceSearch, 1e-8).is_none());
        let short = IterationOutcome {
            converged: false,
            residual: 0.1,
            ..done
        };
        let w = short.warning(Stage::PriceSearch, 1e-8).unwrap();
        assert_eq!(w.iterations, 3);
        assert_eq!(w.stage, Stage::PriceSearch);
    }
}
