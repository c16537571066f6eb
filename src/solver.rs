use crate::benchmarks::Benchmark;
use crate::common::StepSize;
use crate::error::ScheduleError;
use crate::nesterov::Nesterov;
use crate::sgd::StochasticGradient;
use crate::traits::InnerSolver;

/// Selects and parameterizes the inner solver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    pub kind: SolverKind,
    /// Steps taken by the inner solver on every outer iteration.
    pub inner_iterations: usize,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverKind {
    /// Nesterov's method on the gradient selected by `tag`.
    AcceleratedGradient {
        alpha: f64,
        momentum: f64,
        tag: Benchmark,
    },
    /// Random-coordinate gradient descent.
    StochasticGradient { alpha: f64, seed: u64 },
}

impl SolverConfig {
    pub fn accelerated(alpha: f64, momentum: f64, tag: Benchmark) -> Self {
        Self {
            kind: SolverKind::AcceleratedGradient {
                alpha,
                momentum,
                tag,
            },
            inner_iterations: 100,
        }
    }

    pub fn stochastic(alpha: f64, seed: u64) -> Self {
        Self {
            kind: SolverKind::StochasticGradient { alpha, seed },
            inner_iterations: 100,
        }
    }

    pub fn with_inner_iterations(self, inner_iterations: usize) -> Self {
        Self {
            inner_iterations,
            ..self
        }
    }

    /// Initial step parameters for the configured kind.
    pub fn step(&self) -> StepSize {
        match self.kind {
            SolverKind::AcceleratedGradient {
                alpha, momentum, ..
            } => StepSize::with_momentum(alpha, momentum),
            SolverKind::StochasticGradient { alpha, .. } => StepSize::new(alpha),
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.inner_iterations == 0 {
            return Err(ScheduleError::InnerIterations);
        }
        self.step().validate()
    }

    /// Instantiates a fresh solver, so that no state carries over between runs.
    pub fn build(&self) -> Box<dyn InnerSolver> {
        match self.kind {
            SolverKind::AcceleratedGradient { tag, .. } => Box::new(Nesterov::new(tag)),
            SolverKind::StochasticGradient { seed, .. } => Box::new(StochasticGradient::new(seed)),
        }
    }
}
