//! hopenhayn-sweep: solve the equilibrium over a grid of one parameter.
//!
//! Points are independent and solved in parallel (`RAYON_NUM_THREADS`).
//! A point that fails reports its error and the rest of the grid still runs.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use hopenhayn::env_config::{init_logging, init_rayon_threads};
use hopenhayn::sweep::{linspace, sweep, SweepAxis};
use hopenhayn::Parameters;

#[derive(Parser)]
#[command(name = "hopenhayn-sweep")]
#[command(about = "Solve the Hopenhayn equilibrium along a parameter grid")]
struct Cli {
    /// Parameter to vary
    #[arg(long, value_enum, default_value = "entry-cost")]
    axis: SweepAxis,

    /// First grid value
    #[arg(long, default_value = "10")]
    from: f64,

    /// Last grid value
    #[arg(long, default_value = "80")]
    to: f64,

    /// Number of grid points
    #[arg(long, default_value = "8")]
    steps: usize,

    /// JSON file with base parameters
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    init_rayon_threads();

    let base = match &cli.config {
        Some(path) => Parameters::from_json_file(path).unwrap_or_else(|e| {
            eprintln!("Failed to load {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => Parameters::default(),
    };

    let values = linspace(cli.from, cli.to, cli.steps);
    println!("=== hopenhayn-sweep ===");
    println!("Axis: {:?}, {} points from {} to {}", cli.axis, values.len(), cli.from, cli.to);

    let t0 = Instant::now();
    let points = sweep(&base, cli.axis, &values);

    println!(
        "{:>10}  {:>8}  {:>9}  {:>10}  {:>8}  {:>8}",
        "value", "price", "exit rate", "avg. size", "cutoff", "m*"
    );
    println!("{}", "-".repeat(64));
    for p in &points {
        match &p.outcome {
            Ok(s) => println!(
                "{:>10.4}  {:>8.4}  {:>9.4}  {:>10.2}  {:>8.3}  {:>8.4}{}",
                p.value,
                s.price,
                s.exit_rate,
                s.average_firm_size,
                s.exit_cutoff,
                s.m_star,
                if s.converged { "" } else { "  (unconverged)" }
            ),
            Err(e) => println!("{:>10.4}  error ({}): {}", p.value, e.stage(), e),
        }
    }
    println!("\nSweep finished in {:.2}s", t0.elapsed().as_secs_f64());
}
