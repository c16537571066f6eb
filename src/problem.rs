use crate::error::Error;
use crate::math::{squared_relu, squared_relu_grad};
use crate::traits::ObjectiveFunction;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Measures how far `x` is from the set `{x : A*x <= b, E*x = e}`:
///
/// ```txt
///     sum_i max(0, (A*x - b)_i)^2 + sum_j ((E*x - e)_j)^2
/// ```
///
/// The result is zero exactly when `x` is feasible. Matrices with no rows
/// contribute nothing.
pub fn violation(
    x: ArrayView1<f64>,
    a_mat: ArrayView2<f64>,
    b: ArrayView1<f64>,
    e_mat: ArrayView2<f64>,
    e: ArrayView1<f64>,
) -> f64 {
    let ineq: f64 = (a_mat.dot(&x) - b).iter().map(|&r| squared_relu(r)).sum();
    let eq: f64 = (e_mat.dot(&x) - e).iter().map(|&r| r * r).sum();
    ineq + eq
}

/// Gradient of [`violation`] with respect to `x`:
/// `2*A'*max(0, A*x - b) + 2*E'*(E*x - e)`.
pub fn violation_gradient(
    x: ArrayView1<f64>,
    a_mat: ArrayView2<f64>,
    b: ArrayView1<f64>,
    e_mat: ArrayView2<f64>,
    e: ArrayView1<f64>,
) -> Array1<f64> {
    let ineq = (a_mat.dot(&x) - b).mapv(squared_relu_grad);
    let eq = (e_mat.dot(&x) - e) * 2.0;
    a_mat.t().dot(&ineq) + e_mat.t().dot(&eq)
}

/// Linear constraints `A*x <= b` and `E*x = e` on an `n`-dimensional variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    a_mat: Array2<f64>,
    b: Array1<f64>,
    e_mat: Array2<f64>,
    e: Array1<f64>,
}

impl Constraints {
    /// Checks that `A` is `m1 x n`, `b` has `m1` entries, `E` is `m2 x n`
    /// and `e` has `m2` entries.
    pub fn new(
        a_mat: Array2<f64>,
        b: Array1<f64>,
        e_mat: Array2<f64>,
        e: Array1<f64>,
    ) -> Result<Self, Error> {
        if a_mat.nrows() != b.len() {
            return Err(Error::shape("inequality rhs b", a_mat.nrows(), b.len()));
        }
        if e_mat.nrows() != e.len() {
            return Err(Error::shape("equality rhs e", e_mat.nrows(), e.len()));
        }
        if a_mat.ncols() != e_mat.ncols() {
            return Err(Error::shape(
                "equality matrix columns",
                a_mat.ncols(),
                e_mat.ncols(),
            ));
        }
        Ok(Self { a_mat, b, e_mat, e })
    }

    /// Builds constraints whose shapes are consistent by construction.
    pub(crate) fn from_parts(
        a_mat: Array2<f64>,
        b: Array1<f64>,
        e_mat: Array2<f64>,
        e: Array1<f64>,
    ) -> Self {
        debug_assert_eq!(a_mat.nrows(), b.len());
        debug_assert_eq!(e_mat.nrows(), e.len());
        debug_assert_eq!(a_mat.ncols(), e_mat.ncols());
        Self { a_mat, b, e_mat, e }
    }

    /// No constraints on an `n`-dimensional variable (zero-row `A` and `E`).
    pub fn none(n: usize) -> Self {
        Self {
            a_mat: Array2::zeros((0, n)),
            b: Array1::zeros(0),
            e_mat: Array2::zeros((0, n)),
            e: Array1::zeros(0),
        }
    }

    /// Only inequality constraints `A*x <= b`.
    pub fn inequality(a_mat: Array2<f64>, b: Array1<f64>) -> Result<Self, Error> {
        let n = a_mat.ncols();
        Self::new(a_mat, b, Array2::zeros((0, n)), Array1::zeros(0))
    }

    /// Only equality constraints `E*x = e`.
    pub fn equality(e_mat: Array2<f64>, e: Array1<f64>) -> Result<Self, Error> {
        let n = e_mat.ncols();
        Self::new(Array2::zeros((0, n)), Array1::zeros(0), e_mat, e)
    }

    /// Dimension of the optimization variable.
    pub fn dim(&self) -> usize {
        self.a_mat.ncols()
    }

    pub fn a_mat(&self) -> ArrayView2<f64> {
        self.a_mat.view()
    }

    pub fn b(&self) -> ArrayView1<f64> {
        self.b.view()
    }

    pub fn e_mat(&self) -> ArrayView2<f64> {
        self.e_mat.view()
    }

    pub fn e(&self) -> ArrayView1<f64> {
        self.e.view()
    }

    pub fn violation(&self, x: ArrayView1<f64>) -> f64 {
        violation(x, self.a_mat(), self.b(), self.e_mat(), self.e())
    }

    pub fn violation_gradient(&self, x: ArrayView1<f64>) -> Array1<f64> {
        violation_gradient(x, self.a_mat(), self.b(), self.e_mat(), self.e())
    }

    /// Partial derivative of the violation with respect to `x[i]`.
    pub fn violation_partial(&self, x: ArrayView1<f64>, i: usize) -> f64 {
        let ineq: f64 = (self.a_mat.dot(&x) - &self.b)
            .iter()
            .zip(self.a_mat.column(i))
            .map(|(&r, &a)| squared_relu_grad(r) * a)
            .sum();
        let eq: f64 = (self.e_mat.dot(&x) - &self.e)
            .iter()
            .zip(self.e_mat.column(i))
            .map(|(&r, &a)| 2.0 * r * a)
            .sum();
        ineq + eq
    }

    /// True when `x` satisfies every constraint up to `tol`.
    pub fn is_feasible(&self, x: ArrayView1<f64>, tol: f64) -> bool {
        let ineq = (self.a_mat.dot(&x) - &self.b).iter().all(|&r| r <= tol);
        let eq = (self.e_mat.dot(&x) - &self.e).iter().all(|&r| r.abs() <= tol);
        ineq && eq
    }
}

/// Minimize `f(x)` subject to linear [`Constraints`].
#[derive(Debug, Clone)]
pub struct OptimizationProblem<F> {
    objective: F,
    constraints: Constraints,
}

impl<F: ObjectiveFunction> OptimizationProblem<F> {
    pub fn new(objective: F, constraints: Constraints) -> Self {
        Self {
            objective,
            constraints,
        }
    }

    pub fn objective(&self) -> &F {
        &self.objective
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn dim(&self) -> usize {
        self.constraints.dim()
    }
}
