//! Exit threshold from the solved value function.
//!
//! A firm exits when its expected continuation value `Σ_z' P(z'|z) V(z')` is
//! negative. With an increasing grid and profits increasing in z, that
//! expectation is non-decreasing in the state index, so the exit set is the
//! block of states below a single cutoff.

use tracing::debug;

use crate::constants::CONTINUATION_MONOTONE_TOL;
use crate::error::{ModelError, Result};
use crate::types::{ExitPolicy, ProductivityGrid};

/// Locate the exit cutoff for value function `vf`.
///
/// The cutoff is the first state whose expected continuation is non-negative;
/// every state with strictly lower productivity exits. Returns
/// [`ModelError::NonMonotoneContinuation`] when the expected continuation falls
/// along the grid and [`ModelError::DegenerateExit`] when no state has a
/// non-negative continuation.
pub fn exit_policy(vf: &[f64], grid: &ProductivityGrid) -> Result<ExitPolicy> {
    let avg_vf = grid.expectation(vf);
    if let Some(state) = avg_vf
        .windows(2)
        .position(|w| w[1] < w[0] - CONTINUATION_MONOTONE_TOL * (1.0 + w[0].abs()))
    {
        return Err(ModelError::NonMonotoneContinuation {
            state,
            next: state + 1,
        });
    }
    let idx = avg_vf.partition_point(|&v| v < 0.0);
    if idx == avg_vf.len() {
        return Err(ModelError::DegenerateExit);
    }

    let exit_cutoff = grid.grid_z[idx];
    let pol_exit: Vec<bool> = grid.grid_z.iter().map(|&z| z < exit_cutoff).collect();
    debug!(cutoff_index = idx, exit_cutoff, "exit rule computed");

    Ok(ExitPolicy {
        exit_cutoff,
        cutoff_index: idx,
        pol_exit,
    })
}
