use crate::common::Trajectory;
use crate::problem::Constraints;
use crate::traits::Reporter;
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Writes a trajectory to `<dir>/<title>.csv`.
///
/// One row per recorded entry: iteration, objective, violation, a feasible
/// flag and the coordinates `x[0]..x[n-1]`.
pub struct CsvReporter {
    dir: PathBuf,
    /// Tolerance used for the feasible flag.
    pub feas_tol: f64,
}

impl CsvReporter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            feas_tol: 1e-6,
        }
    }

    pub fn path(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", title))
    }
}

impl Reporter for CsvReporter {
    fn report(&self, trajectory: &Trajectory, constraints: &Constraints, title: &str) -> Result<()> {
        let path = self.path(title);
        let mut wtr = csv::Writer::from_path(&path)
            .with_context(|| format!("cannot create {}", path.display()))?;

        let mut header = vec![
            "iteration".to_string(),
            "f".to_string(),
            "violation".to_string(),
            "feasible".to_string(),
        ];
        header.extend((0..constraints.dim()).map(|i| format!("x{}", i)));
        wtr.write_record(&header)?;

        for (k, (x, f)) in trajectory.as_sequence().enumerate() {
            let mut record = vec![
                k.to_string(),
                f.to_string(),
                constraints.violation(x).to_string(),
                constraints.is_feasible(x, self.feas_tol).to_string(),
            ];
            record.extend(x.iter().map(|v| v.to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;

        info!("{}: wrote {} rows to {}", title, trajectory.len(), path.display());
        Ok(())
    }
}
