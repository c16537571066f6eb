mod benchmarks;
mod common;
mod error;
mod math;
mod nesterov;
mod penalized;
mod penalty;
mod problem;
mod report;
mod sgd;
mod solver;
#[cfg(test)]
mod tests;
mod traits;

pub use benchmarks::Benchmark;
pub use common::*;
pub use error::{Error, ScheduleError};
pub use nesterov::Nesterov;
pub use penalized::Penalized;
pub use penalty::{penalty, penalty_with};
pub use problem::{violation, violation_gradient, Constraints, OptimizationProblem};
pub use report::CsvReporter;
pub use sgd::StochasticGradient;
pub use solver::{SolverConfig, SolverKind};
pub use traits::*;
