use crate::benchmarks::Benchmark;
use crate::common::StepSize;
use crate::penalized::Penalized;
use crate::traits::InnerSolver;
use anyhow::{ensure, Context, Result};
use log::trace;
use ndarray::{Array1, ArrayView1};

/// Nesterov's accelerated gradient method with constant step and momentum.
///
/// ```txt
///     v      = x + beta*(x - x_prev)
///     x_prev = x
///     x      = v - alpha*grad F(v)
/// ```
///
/// The objective part of `grad F` is the analytic gradient of the tagged
/// benchmark; the penalty part is taken from the constraints.
pub struct Nesterov {
    tag: Benchmark,
}

impl Nesterov {
    pub fn new(tag: Benchmark) -> Self {
        Self { tag }
    }

    pub fn tag(&self) -> Benchmark {
        self.tag
    }
}

impl InnerSolver for Nesterov {
    fn name(&self) -> &str {
        "nesterov"
    }

    fn minimize(
        &mut self,
        penalized: &Penalized,
        x0: ArrayView1<f64>,
        step: &StepSize,
        iterations: usize,
    ) -> Result<(Array1<f64>, f64)> {
        let beta = step
            .momentum
            .context("accelerated gradient requires a momentum coefficient")?;
        ensure!(
            self.tag.dim() == x0.len(),
            "problem tag {:?} expects {} variables, got {}",
            self.tag,
            self.tag.dim(),
            x0.len()
        );

        let mut x = x0.to_owned();
        let mut x_prev = x0.to_owned();
        for _ in 0..iterations {
            let v = &x + &((&x - &x_prev) * beta);
            let grad = self.tag.grad(v.view()) + penalized.penalty_gradient(v.view());
            x_prev = x;
            x = v - grad * step.alpha;
        }
        let obj = penalized.value(x.view());
        trace!(
            "nesterov: {} steps, alpha = {:e}, mu = {:e}, F = {:e}",
            iterations,
            step.alpha,
            penalized.mu(),
            obj
        );
        Ok((x, obj))
    }
}
