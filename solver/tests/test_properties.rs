//! Property-based tests for the solver stages.

use proptest::prelude::*;

use hopenhayn::exit_rule::exit_policy;
use hopenhayn::price_search::bisect;
use hopenhayn::productivity::{discretize, rouwenhorst, stationary_distribution, tauchen};
use hopenhayn::static_firm::solve_static;
use hopenhayn::stationary::invariant_distribution;
use hopenhayn::types::{Parameters, ProductivityGrid};
use hopenhayn::value_iteration::solve_incumbent;

/// Strategy: a stationary AR(1) specification (nz, z_bar, sigma, rho).
fn process_strategy() -> impl Strategy<Value = (usize, f64, f64, f64)> {
    (2..25usize, -0.5..0.5f64, 0.01..1.0f64, -0.9..0.95f64)
}

fn default_grid() -> ProductivityGrid {
    discretize(&Parameters::default()).unwrap()
}

fn is_prefix(flags: &[bool]) -> bool {
    flags.windows(2).all(|w| w[0] || !w[1])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // 1. Rouwenhorst rows sum to one and the stationary distribution sums to one
    #[test]
    fn rouwenhorst_is_stochastic((n, z_bar, sigma, rho) in process_strategy()) {
        let chain = rouwenhorst(n, z_bar, sigma, rho).unwrap();
        for row in &chain.pi {
            let sum: f64 = row.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-10, "row sum={sum}");
            prop_assert!(row.iter().all(|&p| p >= 0.0));
        }
        let nu = stationary_distribution(&chain.pi).unwrap();
        prop_assert!((nu.iter().sum::<f64>() - 1.0).abs() < 1e-10);
        prop_assert!(nu.iter().all(|&p| p >= 0.0));
        prop_assert!(chain.state_values.windows(2).all(|w| w[1] > w[0]));
    }

    // 2. Same for Tauchen
    #[test]
    fn tauchen_is_stochastic(
        n in 2..25usize,
        z_bar in -0.5..0.5f64,
        sigma in 0.01..1.0f64,
        rho in -0.9..0.9f64,
        m in 1.0..3.0f64,
    ) {
        let chain = tauchen(n, z_bar, sigma, rho, m).unwrap();
        for row in &chain.pi {
            let sum: f64 = row.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-10, "row sum={sum}");
        }
        let nu = stationary_distribution(&chain.pi).unwrap();
        prop_assert!((nu.iter().sum::<f64>() - 1.0).abs() < 1e-10);
    }

    // 3. Profit is increasing in price for every state
    #[test]
    fn profit_increasing_in_price(
        z in 0.1..30.0f64,
        p1 in 0.01..100.0f64,
        dp in 1e-3..50.0f64,
        theta in 0.1..0.9f64,
    ) {
        let lo = solve_static(p1, &[z], theta, 1.0, 20.0).unwrap();
        let hi = solve_static(p1 + dp, &[z], theta, 1.0, 20.0).unwrap();
        prop_assert!(hi.profit[0] > lo.profit[0]);
        prop_assert!(hi.labor[0] > lo.labor[0]);
    }

    // 4. Bisection on a synthetic increasing function finds the known root
    #[test]
    fn bisection_finds_root(root in 0.5..99.0f64, slope in 0.1..10.0f64) {
        let f = |x: f64| x * x * x + slope * x;
        let target = f(root);
        let out = bisect(|x| Ok(f(x)), target, 0.01, 100.0, 1e-8, 2000).unwrap();
        prop_assert!(out.converged);
        prop_assert!((f(out.value) - target).abs() < 1e-8);
        prop_assert!((out.value - root).abs() < 1e-6, "x={} root={root}", out.value);
    }

    // 5. Exit states form a prefix of the grid whenever the value function is monotone
    #[test]
    fn exit_set_is_prefix(mut vf in prop::collection::vec(-50.0..50.0f64, 20)) {
        vf.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let grid = default_grid();
        if let Ok(policy) = exit_policy(&vf, &grid) {
            prop_assert!(is_prefix(&policy.pol_exit));
            prop_assert_eq!(policy.exiting_states(), policy.cutoff_index);
            let avg = grid.expectation(&vf);
            prop_assert!(avg[policy.cutoff_index] >= 0.0);
        }
    }

    // 6. Invariant mass is non-negative for every cutoff
    #[test]
    fn invariant_mass_non_negative(cutoff in 1..20usize) {
        let grid = default_grid();
        let pol_exit: Vec<bool> = (0..grid.len()).map(|i| i < cutoff).collect();
        let x = invariant_distribution(&grid, &pol_exit, 1.0).unwrap();
        prop_assert!(x.iter().all(|&v| v >= 0.0));
        prop_assert!(x.iter().sum::<f64>() > 0.0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // 7. Value function is non-decreasing in productivity and deterministic
    #[test]
    fn value_function_monotone_and_deterministic(price in 0.2..5.0f64) {
        let params = Parameters::default();
        let grid = default_grid();
        let a = solve_incumbent(price, &grid, &params).unwrap();
        let b = solve_incumbent(price, &grid, &params).unwrap();
        prop_assert!(a.converged);
        prop_assert_eq!(&a.value.vf, &b.value.vf);
        prop_assert_eq!(a.iterations, b.iterations);
        prop_assert!(a.value.vf.windows(2).all(|w| w[1] >= w[0]));
    }
}
