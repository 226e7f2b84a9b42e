//! Default calibration and solver constants.
//!
//! The calibration is the five-year-period example from Edmond's notes
//! (Hopenhayn 1992, ch. 3), discretized with 20 productivity nodes:
//! - β = [`DEFAULT_BETA`] = 0.8, θ = [`DEFAULT_THETA`] = 2/3
//! - c_f = [`DEFAULT_FIXED_COST`] = 20, c_e = [`DEFAULT_ENTRY_COST`] = 40
//! - D = [`DEFAULT_MARKET_SIZE`] = 100, w = [`DEFAULT_WAGE`] = 1
//! - log z' = z̄ + ρ log z + σ ε with z̄ = 0.14, ρ = 0.9, σ = 0.2

/// Discount factor (five-year period).
pub const DEFAULT_BETA: f64 = 0.8;

/// Labor share in the production function y = z n^θ.
pub const DEFAULT_THETA: f64 = 2.0 / 3.0;

/// Per-period fixed operating cost c_f.
pub const DEFAULT_FIXED_COST: f64 = 20.0;

/// Sunk entry cost c_e.
pub const DEFAULT_ENTRY_COST: f64 = 40.0;

/// Exogenous market size D (inverse demand p = D / Y).
pub const DEFAULT_MARKET_SIZE: f64 = 100.0;

/// Wage, normalized to one.
pub const DEFAULT_WAGE: f64 = 1.0;

/// Autocorrelation of log productivity.
pub const DEFAULT_RHO_Z: f64 = 0.9;

/// Standard deviation of the productivity innovation.
pub const DEFAULT_SIGMA_U: f64 = 0.2;

/// Number of discrete productivity states.
pub const DEFAULT_NZ: usize = 20;

/// Constant term of the AR(1) in logs (not the unconditional mean).
pub const DEFAULT_Z_BAR: f64 = 0.14;

/// Sup-norm tolerance shared by value iteration and the price bisection.
pub const DEFAULT_TOL: f64 = 1e-8;

/// Iteration cap shared by value iteration and the price bisection.
pub const DEFAULT_MAXIT: usize = 2000;

/// Lower end of the price bracket.
pub const DEFAULT_PRICE_MIN: f64 = 0.01;

/// Upper end of the price bracket.
pub const DEFAULT_PRICE_MAX: f64 = 100.0;

/// Width multiplier m for the Tauchen grid (μ ± m·sd) when none is given.
pub const DEFAULT_TAUCHEN_WIDTH: f64 = 3.0;

/// Tolerance for row sums of a transition matrix and the sum of a distribution.
pub const PROBABILITY_SUM_TOL: f64 = 1e-10;

/// Negative entries above this magnitude make a probability vector invalid.
/// Smaller ones are rounding noise and are clipped to zero.
pub const NEGATIVE_MASS_TOL: f64 = 1e-12;

/// Relative drop in expected continuation between adjacent states that still
/// counts as rounding noise.
pub const CONTINUATION_MONOTONE_TOL: f64 = 1e-9;

/// Employment thresholds splitting firms into size classes.
pub const SIZE_THRESHOLDS: [f64; 4] = [20.0, 50.0, 100.0, 500.0];

/// Labels for the size classes induced by [`SIZE_THRESHOLDS`].
pub const SIZE_LABELS: [&str; 5] = ["<20", "21-50", "51-100", "101-500", "501+"];
