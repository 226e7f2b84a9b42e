//! Console summary and JSON export for an external plotting layer.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::equilibrium::Equilibrium;
use crate::error::Result;
use crate::size_buckets::SizeBuckets;

/// Series a plotting layer needs: value function with exit threshold,
/// firm/employment pdf and cdf, and size-class shares.
#[derive(Debug, Clone, Serialize)]
pub struct PlotSeries {
    pub grid_z: Vec<f64>,
    pub vf: Vec<f64>,
    pub exit_cutoff: f64,
    pub pdf_stationary: Vec<f64>,
    pub cdf_stationary: Vec<f64>,
    pub pdf_emp: Vec<f64>,
    pub cdf_emp: Vec<f64>,
    pub size_buckets: SizeBuckets,
    pub price: f64,
    pub exit_rate: f64,
    pub average_firm_size: f64,
}

impl PlotSeries {
    pub fn from_equilibrium(eq: &Equilibrium) -> Self {
        Self {
            grid_z: eq.grid.grid_z.clone(),
            vf: eq.incumbent.vf.clone(),
            exit_cutoff: eq.exit.exit_cutoff,
            pdf_stationary: eq.distribution.pdf.clone(),
            cdf_stationary: eq.distribution.cdf.clone(),
            pdf_emp: eq.distribution.emp_pdf.clone(),
            cdf_emp: eq.distribution.emp_cdf.clone(),
            size_buckets: SizeBuckets::from_equilibrium(eq),
            price: eq.price,
            exit_rate: eq.exit_rate,
            average_firm_size: eq.average_firm_size,
        }
    }
}

/// Write `series` as pretty JSON, creating parent directories.
pub fn save_json(series: &PlotSeries, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(series)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Headline statistics as printed by the solve binary.
pub fn summary(eq: &Equilibrium) -> String {
    let mut out = String::new();
    let rule = "-".repeat(41);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Stationary Equilibrium");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "ss price  = {:.2}", eq.price);
    let _ = writeln!(out, "entry/exit rate = {:.3}", eq.exit_rate);
    let _ = writeln!(out, "avg. firm size = {:.2}", eq.average_firm_size);
    let _ = writeln!(out, "exit cutoff = {:.2}", eq.exit.exit_cutoff);
    let _ = writeln!(out, "\nTime to solve model: {:.2} seconds", eq.solve_time);
    for w in &eq.warnings {
        let _ = writeln!(out, "warning: {w}");
    }
    out
}

/// Size-class table: share of firms and share of employment per class.
pub fn size_table(buckets: &SizeBuckets) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>10}  {:>8}  {:>8}", "employees", "firms", "emp.");
    for ((label, f), e) in buckets
        .labels
        .iter()
        .zip(&buckets.firm_shares)
        .zip(&buckets.employment_shares)
    {
        let _ = writeln!(out, "{:>10}  {:>7.1}%  {:>7.1}%", label, 100.0 * f, 100.0 * e);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_table_rows() {
        let buckets = SizeBuckets {
            labels: vec!["<20".into(), "20+".into()],
            thresholds: vec![20.0],
            firm_shares: vec![0.9, 0.1],
            employment_shares: vec![0.25, 0.75],
        };
        let table = size_table(&buckets);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("90.0%"));
        assert!(table.contains("75.0%"));
    }
}
