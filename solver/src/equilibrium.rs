//! Stationary equilibrium: runs every stage in order and derives aggregates.
//!
//! 1. Validate [`Parameters`] and discretize productivity.
//! 2. Bisect on price until free entry holds (value iteration per trial price).
//! 3. Read the exit rule off the value function at p*.
//! 4. Solve the invariant distribution for m = 1, scale by the market-clearing m*.
//! 5. Aggregate: total mass, employment, average firm size, exit rate.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ConvergenceWarning, Result, Stage};
use crate::exit_rule::exit_policy;
use crate::price_search::solve_price;
use crate::productivity::discretize;
use crate::stationary::solve_stationary;
use crate::types::{
    dot, ExitPolicy, IncumbentSolution, Parameters, ProductivityGrid, StationaryDistribution,
};

/// Solved stationary equilibrium.
#[derive(Debug, Clone, Serialize)]
pub struct Equilibrium {
    pub params: Parameters,
    pub grid: ProductivityGrid,
    pub price: f64,
    /// β · (V · ν_e) at `price`.
    pub entrant_value: f64,
    pub incumbent: IncumbentSolution,
    pub exit: ExitPolicy,
    pub distribution: StationaryDistribution,
    pub total_mass: f64,
    pub total_employment: f64,
    pub average_firm_size: f64,
    /// Entry equals exit in steady state: m* / total mass.
    pub exit_rate: f64,
    /// Iteration caps hit during the solve.
    pub warnings: Vec<ConvergenceWarning>,
    /// Wall-clock seconds spent solving.
    pub solve_time: f64,
}

impl Equilibrium {
    pub fn converged(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Solve the model for `params`.
pub fn solve_equilibrium(params: &Parameters) -> Result<Equilibrium> {
    let start = Instant::now();
    params.validate()?;
    let grid = discretize(params)?;

    let search = solve_price(&grid, params)?;
    let warnings: Vec<ConvergenceWarning> = [
        search.outer.warning(Stage::PriceSearch, params.tol),
        search.incumbent.warning(Stage::ValueIteration, params.tol),
    ]
    .into_iter()
    .flatten()
    .collect();
    for w in &warnings {
        warn!(%w, "equilibrium computed from an unconverged iterate");
    }

    let incumbent = search.incumbent.value;
    let exit = exit_policy(&incumbent.vf, &grid)?;
    let distribution = solve_stationary(
        &grid,
        &exit,
        &incumbent.firm_output,
        &incumbent.pol_n,
        params.market_size,
    )?;

    let total_mass: f64 = distribution.mass.iter().sum();
    let total_employment = dot(&incumbent.pol_n, &distribution.mass);
    let average_firm_size = total_employment / total_mass;
    let exit_rate = distribution.m_star / total_mass;
    let solve_time = start.elapsed().as_secs_f64();

    info!(
        price = search.price,
        exit_rate,
        average_firm_size,
        exit_cutoff = exit.exit_cutoff,
        solve_time,
        "stationary equilibrium solved"
    );

    Ok(Equilibrium {
        params: params.clone(),
        grid,
        price: search.price,
        entrant_value: search.entrant_value,
        incumbent,
        exit,
        distribution,
        total_mass,
        total_employment,
        average_firm_size,
        exit_rate,
        warnings,
        solve_time,
    })
}
