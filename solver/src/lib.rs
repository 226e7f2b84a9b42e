//! # Hopenhayn: Stationary Equilibrium with Entry and Exit
//!
//! Computes the stationary equilibrium of the Hopenhayn (1992) firm-dynamics
//! model: a continuum of price-taking firms with persistent idiosyncratic
//! productivity, a fixed operating cost, an exit option, and free entry at a
//! sunk cost.
//!
//! ## Algorithm overview
//!
//! | Step | Rust module | Description |
//! |------|-------------|-------------|
//! | 0 | [`productivity`] | Discretize log z' = z̄ + ρ log z + σε (Rouwenhorst or Tauchen), stationary distribution ν |
//! | 1 | [`static_firm`] | Closed-form labor demand, output and profit per state at price p |
//! | 2 | [`value_iteration`] | V = π + β max(0, P V) from V = 0 to a sup-norm tolerance |
//! | 3 | [`price_search`] | Bisection on p until β V·ν_e = c_e (one step-2 solve per trial price) |
//! | 4 | [`exit_rule`] | Cutoff where expected continuation P V turns non-negative |
//! | 5 | [`stationary`] | (I − P̃) x = ν_e for m = 1, then m* = D / (x·y) from market clearing |
//! | 6 | [`equilibrium`] | Orchestrates 0–5; total mass, employment, average size, exit rate |
//!
//! Every stage consumes immutable records and returns new ones
//! (see [`types`]). Iterative stages return [`types::IterationOutcome`] so an
//! iteration cap is reported instead of silently truncating.
//!
//! Reporting helpers ([`size_buckets`], [`report`]) and parallel parameter
//! sweeps ([`sweep`]) sit on top of the solved [`equilibrium::Equilibrium`].

#![allow(clippy::needless_range_loop)]

pub mod constants;
pub mod env_config;
pub mod equilibrium;
pub mod error;
pub mod exit_rule;
pub mod price_search;
pub mod productivity;
pub mod report;
pub mod size_buckets;
pub mod static_firm;
pub mod stationary;
pub mod sweep;
pub mod types;
pub mod value_iteration;

pub use equilibrium::{solve_equilibrium, Equilibrium};
pub use error::{ConvergenceWarning, ModelError, Result, Stage};
pub use types::Parameters;
