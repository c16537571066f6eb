use crate::error::Error;
use crate::problem::{Constraints, OptimizationProblem};
use crate::traits::ObjectiveFunction;
use ndarray::{array, Array1, Array2, ArrayView1};

/// Tagged test problems with analytic gradients.
///
/// The tag of a benchmark selects the gradient the accelerated solver
/// differentiates, independent of the objective stored in the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Benchmark {
    /// Tag 1: `f(x) = x_0^2 + x_1^2` with `x_0 + x_1 <= -100`.
    ///
    /// The equality block is a single all-zero row.
    Quadratic,

    /// Tag 2: `f(x) = (1 - x_0)^(3/2) + 100(x_1 - x_0^2)^2`
    /// with `x_0 + x_1 <= 5` and `x_0 - 5 x_1 = 2`.
    ///
    /// Undefined for `x_0 > 1`.
    ShiftedRosenbrock,

    /// `f(x) = sum_i 50(x_{i+1} - x_i^2)^2 + (1 - x_i)^2` over `dim` variables
    /// with `sum_i x_i = dim + 1`.
    ChainedRosenbrock { dim: usize },
}

impl TryFrom<u32> for Benchmark {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Benchmark::Quadratic),
            2 => Ok(Benchmark::ShiftedRosenbrock),
            _ => Err(Error::UnknownProblemTag(tag)),
        }
    }
}

impl Benchmark {
    pub fn dim(&self) -> usize {
        match self {
            Benchmark::Quadratic | Benchmark::ShiftedRosenbrock => 2,
            Benchmark::ChainedRosenbrock { dim } => *dim,
        }
    }

    pub fn constraints(&self) -> Constraints {
        let (a_mat, b, e_mat, e) = match *self {
            Benchmark::Quadratic => (
                array![[1.0, 1.0]],
                array![-100.0],
                array![[0.0, 0.0]],
                array![0.0],
            ),
            Benchmark::ShiftedRosenbrock => (
                array![[1.0, 1.0]],
                array![5.0],
                array![[1.0, -5.0]],
                array![2.0],
            ),
            Benchmark::ChainedRosenbrock { dim } => (
                Array2::zeros((1, dim)),
                array![0.0],
                Array2::ones((1, dim)),
                array![dim as f64 + 1.0],
            ),
        };
        Constraints::from_parts(a_mat, b, e_mat, e)
    }

    pub fn problem(&self) -> OptimizationProblem<Benchmark> {
        OptimizationProblem::new(*self, self.constraints())
    }

    pub fn initial_point(&self) -> Array1<f64> {
        match self {
            Benchmark::Quadratic | Benchmark::ShiftedRosenbrock => Array1::zeros(2),
            Benchmark::ChainedRosenbrock { dim } => Array1::ones(*dim),
        }
    }

    /// Analytic gradient of the benchmark objective.
    pub fn grad(&self, x: ArrayView1<f64>) -> Array1<f64> {
        match self {
            Benchmark::Quadratic => x.mapv(|v| 2.0 * v),
            Benchmark::ShiftedRosenbrock => array![
                -1.5 * (1.0 - x[0]).sqrt() - 400.0 * (x[1] - x[0].powi(2)) * x[0],
                200.0 * (x[1] - x[0].powi(2)),
            ],
            Benchmark::ChainedRosenbrock { .. } => {
                Array1::from_shape_fn(x.len(), |i| chained_partial(x, i))
            }
        }
    }
}

/// Partial derivative of the chained Rosenbrock sum with respect to `x[i]`;
/// touches only the two terms containing `x[i]`.
fn chained_partial(x: ArrayView1<f64>, i: usize) -> f64 {
    let n = x.len();
    let mut d = 0.0;
    if i + 1 < n {
        d += -200.0 * x[i] * (x[i + 1] - x[i].powi(2)) - 2.0 * (1.0 - x[i]);
    }
    if i > 0 {
        d += 100.0 * (x[i] - x[i - 1].powi(2));
    }
    d
}

impl ObjectiveFunction for Benchmark {
    fn f(&self, x: ArrayView1<f64>) -> f64 {
        match self {
            Benchmark::Quadratic => x.dot(&x),
            Benchmark::ShiftedRosenbrock => {
                (1.0 - x[0]).powf(1.5) + 100.0 * (x[1] - x[0].powi(2)).powi(2)
            }
            Benchmark::ChainedRosenbrock { .. } => x
                .windows(2)
                .into_iter()
                .map(|w| 50.0 * (w[1] - w[0].powi(2)).powi(2) + (1.0 - w[0]).powi(2))
                .sum(),
        }
    }

    fn gradient(&self, x: ArrayView1<f64>) -> Option<Array1<f64>> {
        Some(self.grad(x))
    }

    fn partial(&self, x: ArrayView1<f64>, i: usize) -> f64 {
        match self {
            Benchmark::ChainedRosenbrock { .. } => chained_partial(x, i),
            _ => self.grad(x)[i],
        }
    }
}
