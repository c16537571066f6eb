use crate::common::{StepSize, Trajectory};
use crate::penalized::Penalized;
use crate::problem::Constraints;
use ndarray::{Array1, ArrayView1};

pub trait ObjectiveFunction {
    fn f(&self, x: ArrayView1<f64>) -> f64;

    /// Analytic gradient of `f`, if one is known.
    fn gradient(&self, _x: ArrayView1<f64>) -> Option<Array1<f64>> {
        None
    }

    /// Partial derivative of `f` with respect to `x[i]`.
    ///
    /// Falls back to a central difference when no analytic gradient exists.
    fn partial(&self, x: ArrayView1<f64>, i: usize) -> f64 {
        if let Some(df) = self.gradient(x) {
            return df[i];
        }
        let h = f64::EPSILON.cbrt() * x[i].abs().max(1.0);
        let mut xp = x.to_owned();
        let mut xm = x.to_owned();
        xp[i] += h;
        xm[i] -= h;
        (self.f(xp.view()) - self.f(xm.view())) / (2.0 * h)
    }
}

impl<T> ObjectiveFunction for T
where
    T: Fn(ArrayView1<f64>) -> f64,
{
    fn f(&self, x: ArrayView1<f64>) -> f64 {
        self(x)
    }
}

/// An unconstrained minimizer run for a fixed number of steps on the
/// penalized objective `f(x) + mu*violation(x)`.
///
/// Returns the new iterate and the penalized objective value the solver
/// reports for it. The result is not required to improve on `x0`.
pub trait InnerSolver {
    fn name(&self) -> &str;

    fn minimize(
        &mut self,
        penalized: &Penalized,
        x0: ArrayView1<f64>,
        step: &StepSize,
        iterations: usize,
    ) -> anyhow::Result<(Array1<f64>, f64)>;
}

/// Called after each outer iteration with the iteration number, the
/// escalated penalty weight, the constraint violation and objective value
/// at the new iterate, the 2-norm of the step taken and the penalized
/// objective reported by the inner solver.
pub trait ProgressMonitor {
    fn update(
        &self,
        k: usize,
        mu: f64,
        violation: f64,
        obj: f64,
        step_size: f64,
        inner_obj: f64,
    );
}

/// Renders a finished run, typically into a file named after `title`.
pub trait Reporter {
    fn report(
        &self,
        trajectory: &Trajectory,
        constraints: &Constraints,
        title: &str,
    ) -> anyhow::Result<()>;
}
