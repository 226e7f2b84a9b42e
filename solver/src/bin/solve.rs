//! hopenhayn-solve: compute the stationary equilibrium and print its summary.
//!
//! Parameters start from the defaults (or `--config <json>`), then any flag
//! given on the command line overrides the corresponding field.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use hopenhayn::env_config::init_logging;
use hopenhayn::report::{save_json, size_table, summary, PlotSeries};
use hopenhayn::size_buckets::SizeBuckets;
use hopenhayn::types::{Discretization, EntrantDistribution};
use hopenhayn::{solve_equilibrium, Parameters};

#[derive(Parser)]
#[command(name = "hopenhayn-solve")]
#[command(about = "Stationary equilibrium of the Hopenhayn (1992) model")]
struct Cli {
    /// JSON file with parameter overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Discount factor
    #[arg(long)]
    beta: Option<f64>,

    /// Labor share
    #[arg(long)]
    theta: Option<f64>,

    /// Fixed operating cost
    #[arg(long)]
    cf: Option<f64>,

    /// Entry cost
    #[arg(long)]
    ce: Option<f64>,

    /// Market size D
    #[arg(long = "market-size")]
    market_size: Option<f64>,

    /// Wage
    #[arg(long)]
    wage: Option<f64>,

    /// Productivity persistence
    #[arg(long = "rho-z")]
    rho_z: Option<f64>,

    /// Productivity shock standard deviation
    #[arg(long = "sigma-u")]
    sigma_u: Option<f64>,

    /// Number of productivity states
    #[arg(long)]
    nz: Option<usize>,

    /// Constant term of the productivity AR(1)
    #[arg(long = "z-bar")]
    z_bar: Option<f64>,

    /// Convergence tolerance
    #[arg(long)]
    tol: Option<f64>,

    /// Iteration cap
    #[arg(long)]
    maxit: Option<usize>,

    /// Use Tauchen with grid width M standard deviations instead of Rouwenhorst
    #[arg(long, value_name = "M")]
    tauchen: Option<f64>,

    /// Entrants draw productivity uniformly instead of from the stationary distribution
    #[arg(long)]
    uniform_entrants: bool,

    /// Write plot series to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,
}

fn build_params(cli: &Cli) -> hopenhayn::Result<Parameters> {
    let mut p = match &cli.config {
        Some(path) => Parameters::from_json_file(path)?,
        None => Parameters::default(),
    };
    macro_rules! apply {
        ($($field:ident),*) => {
            $(if let Some(v) = cli.$field { p.$field = v; })*
        };
    }
    apply!(beta, theta, cf, ce, market_size, wage, rho_z, sigma_u, nz, z_bar, tol, maxit);
    if let Some(m) = cli.tauchen {
        p.discretization = Discretization::Tauchen { m };
    }
    if cli.uniform_entrants {
        p.entrant = EntrantDistribution::Uniform;
    }
    Ok(p)
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = build_params(&cli).and_then(|params| {
        let eq = solve_equilibrium(&params)?;
        println!("\n{}", summary(&eq));
        println!("{}", size_table(&SizeBuckets::from_equilibrium(&eq)));
        if let Some(path) = &cli.json {
            save_json(&PlotSeries::from_equilibrium(&eq), path)?;
            println!("Plot series written to {}", path.display());
        }
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error ({}): {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}
