use crate::common::StepSize;
use crate::penalized::Penalized;
use crate::traits::InnerSolver;
use anyhow::{ensure, Result};
use log::trace;
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Stochastic coordinate gradient descent.
///
/// Every step draws a coordinate `i` uniformly and applies
/// `x[i] -= alpha * dF/dx[i]`. The generator is seeded, so a fresh solver
/// reproduces the same sequence of coordinates.
pub struct StochasticGradient {
    rng: StdRng,
}

impl StochasticGradient {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl InnerSolver for StochasticGradient {
    fn name(&self) -> &str {
        "sgd"
    }

    fn minimize(
        &mut self,
        penalized: &Penalized,
        x0: ArrayView1<f64>,
        step: &StepSize,
        iterations: usize,
    ) -> Result<(Array1<f64>, f64)> {
        let n = x0.len();
        ensure!(n > 0, "stochastic gradient needs at least one variable");

        let mut x = x0.to_owned();
        for _ in 0..iterations {
            let i = self.rng.gen_range(0..n);
            let d = penalized.partial(x.view(), i);
            x[i] -= step.alpha * d;
        }
        let obj = penalized.value(x.view());
        trace!(
            "sgd: {} steps, alpha = {:e}, mu = {:e}, F = {:e}",
            iterations,
            step.alpha,
            penalized.mu(),
            obj
        );
        Ok((x, obj))
    }
}
