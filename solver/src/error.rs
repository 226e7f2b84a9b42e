//! Error taxonomy for the equilibrium solver.
//!
//! Fatal failures are [`ModelError`] values and propagate with `?`: no partial
//! model state is usable after one. Iteration caps are not fatal; they surface
//! as a [`ConvergenceWarning`] attached to the best available iterate.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Solver stage that produced a failure or a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Parameters,
    Discretization,
    StaticProblem,
    ValueIteration,
    PriceSearch,
    ExitRule,
    StationaryDistribution,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parameters => "parameters",
            Stage::Discretization => "discretization",
            Stage::StaticProblem => "static firm problem",
            Stage::ValueIteration => "value iteration",
            Stage::PriceSearch => "price search",
            Stage::ExitRule => "exit rule",
            Stage::StationaryDistribution => "stationary distribution",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("discretization failed: {0}")]
    Discretization(String),

    #[error("static firm problem: {0}")]
    StaticProblem(String),

    #[error("value iteration at price {price}: {reason}")]
    ValueIteration { price: f64, reason: String },

    #[error(
        "no equilibrium price in [{pmin}, {pmax}]: entrant value is {value_at_pmin} at pmin \
         and {value_at_pmax} at pmax, entry cost {entry_cost}"
    )]
    NoEquilibrium {
        pmin: f64,
        pmax: f64,
        value_at_pmin: f64,
        value_at_pmax: f64,
        entry_cost: f64,
    },

    #[error("exit rule: expected continuation value is negative in every state, all firms exit")]
    DegenerateExit,

    #[error(
        "exit rule: expected continuation value falls from state {state} to {next}, \
         no single productivity cutoff exists"
    )]
    NonMonotoneContinuation { state: usize, next: usize },

    #[error("stationary distribution: {0}")]
    SingularDistribution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Stage that raised this error.
    pub fn stage(&self) -> Stage {
        match self {
            ModelError::InvalidParameter { .. } => Stage::Parameters,
            ModelError::Discretization(_) => Stage::Discretization,
            ModelError::StaticProblem(_) => Stage::StaticProblem,
            ModelError::ValueIteration { .. } => Stage::ValueIteration,
            ModelError::NoEquilibrium { .. } => Stage::PriceSearch,
            ModelError::DegenerateExit | ModelError::NonMonotoneContinuation { .. } => {
                Stage::ExitRule
            }
            ModelError::SingularDistribution(_) => Stage::StationaryDistribution,
            ModelError::Io(_) | ModelError::Json(_) => Stage::Report,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// An iterative stage hit its cap before meeting the tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceWarning {
    pub stage: Stage,
    pub iterations: usize,
    pub residual: f64,
    pub tolerance: f64,
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} stopped after {} iterations with residual {:.3e} (tolerance {:.3e})",
            self.stage, self.iterations, self.residual, self.tolerance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_stage() {
        let err = ModelError::InvalidParameter {
            name: "theta",
            value: 1.0,
            reason: "must lie in (0, 1)",
        };
        assert_eq!(err.stage(), Stage::Parameters);
        assert!(err.to_string().contains("theta"));
        assert_eq!(ModelError::DegenerateExit.stage(), Stage::ExitRule);
        assert_eq!(
            ModelError::StaticProblem("x".into()).stage(),
            Stage::StaticProblem
        );
        let err = ModelError::ValueIteration {
            price: 100.0,
            reason: "x".into(),
        };
        assert_eq!(err.stage(), Stage::ValueIteration);
        assert_eq!(
            ModelError::SingularDistribution("x".into()).stage(),
            Stage::StationaryDistribution
        );
    }

    #[test]
    fn test_warning_display() {
        let w = ConvergenceWarning {
            stage: Stage::ValueIteration,
            iterations: 5,
            residual: 0.5,
            tolerance: 1e-8,
        };
        let s = w.to_string();
        assert!(s.starts_with("value iteration stopped after 5 iterations"), "{s}");
    }
}
