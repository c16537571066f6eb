use crate::error::ScheduleError;
use ndarray::{Array1, ArrayView1};

/// Penalty schedule parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Initial penalty weight.
    pub mu0: f64,
    /// The driver stops once `mu * violation(x)` falls below this value.
    pub eps: f64,
    /// Factor by which the penalty weight grows every outer iteration.
    pub beta: f64,

    /// Divide the inner step size by `beta` after every outer iteration,
    /// keeping `alpha * mu` constant.
    pub anneal_step: bool,
    /// Record `(x0, f(x0))` as the first trajectory entry.
    pub seed_trajectory: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mu0: 1.0,
            eps: 1e-3,
            beta: 2.0,

            anneal_step: true,
            seed_trajectory: true,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(ScheduleError::Eps(self.eps));
        }
        if !self.beta.is_finite() || self.beta <= 1.0 {
            return Err(ScheduleError::Beta(self.beta));
        }
        if !self.mu0.is_finite() || self.mu0 <= 0.0 {
            return Err(ScheduleError::Mu0(self.mu0));
        }
        Ok(())
    }
}

/// Inner solver step parameters, annealed by the driver between calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSize {
    pub alpha: f64,
    /// Momentum coefficient, used by accelerated methods only.
    pub momentum: Option<f64>,
}

impl StepSize {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            momentum: None,
        }
    }

    pub fn with_momentum(alpha: f64, momentum: f64) -> Self {
        Self {
            alpha,
            momentum: Some(momentum),
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(ScheduleError::StepSize(self.alpha));
        }
        match self.momentum {
            Some(m) if !(0.0..1.0).contains(&m) => Err(ScheduleError::Momentum(m)),
            _ => Ok(()),
        }
    }

    pub(crate) fn annealed(self, beta: f64) -> Self {
        Self {
            alpha: self.alpha / beta,
            ..self
        }
    }
}

/// Iterates and objective values recorded by the driver, in order.
///
/// Entries are copies; they never share storage with the live iterate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<Array1<f64>>,
    objectives: Vec<f64>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, x: ArrayView1<f64>, f: f64) {
        self.points.push(x.to_owned());
        self.objectives.push(f);
    }

    /// Ordered `(x, f(x))` pairs.
    pub fn as_sequence(&self) -> impl Iterator<Item = (ArrayView1<f64>, f64)> + '_ {
        self.points
            .iter()
            .map(|x| x.view())
            .zip(self.objectives.iter().copied())
    }

    pub fn points(&self) -> &[Array1<f64>] {
        &self.points
    }

    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    pub fn last(&self) -> Option<(ArrayView1<f64>, f64)> {
        let x = self.points.last()?;
        let f = self.objectives.last()?;
        Some((x.view(), *f))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Result of a converged penalty run.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Final iterate.
    pub x: Array1<f64>,
    /// Objective value `f(x)` at the final iterate.
    pub f: f64,
    /// Number of outer iterations performed.
    pub iterations: usize,
    /// Penalty weight when the loop guard failed, `mu0 * beta^iterations`.
    pub mu: f64,
    /// Constraint violation at the final iterate.
    pub violation: f64,
    /// Inner step parameters after annealing.
    pub step: StepSize,
    pub trajectory: Trajectory,
}
