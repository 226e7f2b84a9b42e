//! Shared environment configuration for the hopenhayn binaries.
//!
//! Consolidates the `RUST_LOG` and `RAYON_NUM_THREADS` reads used by
//! `hopenhayn-solve` and `hopenhayn-sweep`.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` selects the filter
/// (default `info`). Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read `RAYON_NUM_THREADS` (default: number of logical CPUs).
/// Builds the rayon global thread pool, tolerating an already-initialized one.
/// Returns the thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = std::env::var("RAYON_NUM_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
    if rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .is_err()
    {
        tracing::debug!("rayon global pool already initialized");
    }
    tracing::info!(threads = num_threads, "rayon thread pool");
    num_threads
}
