use crate::problem::Constraints;
use crate::traits::ObjectiveFunction;
use ndarray::{Array1, ArrayView1};

/// The unconstrained subproblem `F(x) = f(x) + mu*violation(x)` handed to
/// inner solvers.
pub struct Penalized<'a> {
    objective: &'a dyn ObjectiveFunction,
    constraints: &'a Constraints,
    mu: f64,
}

impl<'a> Penalized<'a> {
    pub fn new(objective: &'a dyn ObjectiveFunction, constraints: &'a Constraints, mu: f64) -> Self {
        Self {
            objective,
            constraints,
            mu,
        }
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn dim(&self) -> usize {
        self.constraints.dim()
    }

    pub fn objective(&self) -> &dyn ObjectiveFunction {
        self.objective
    }

    pub fn constraints(&self) -> &Constraints {
        self.constraints
    }

    pub fn value(&self, x: ArrayView1<f64>) -> f64 {
        self.objective.f(x) + self.mu * self.constraints.violation(x)
    }

    /// `mu * grad(violation)`, the gradient of the penalty term alone.
    pub fn penalty_gradient(&self, x: ArrayView1<f64>) -> Array1<f64> {
        self.constraints.violation_gradient(x) * self.mu
    }

    /// Gradient of `F` using the objective's analytic gradient when it has
    /// one and central differences otherwise.
    pub fn gradient(&self, x: ArrayView1<f64>) -> Array1<f64> {
        let df = match self.objective.gradient(x) {
            Some(df) => df,
            None => Array1::from_shape_fn(x.len(), |i| self.objective.partial(x, i)),
        };
        df + self.penalty_gradient(x)
    }

    /// Partial derivative of `F` with respect to `x[i]`.
    pub fn partial(&self, x: ArrayView1<f64>, i: usize) -> f64 {
        self.objective.partial(x, i) + self.mu * self.constraints.violation_partial(x, i)
    }
}
