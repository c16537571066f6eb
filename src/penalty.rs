use crate::common::{Options, Solution, StepSize, Trajectory};
use crate::error::{Error, ScheduleError};
use crate::math::{all_finite, norm, norm_inf};
use crate::penalized::Penalized;
use crate::problem::OptimizationProblem;
use crate::solver::SolverConfig;
use crate::traits::{InnerSolver, ObjectiveFunction, ProgressMonitor};
use anyhow::Context;
use log::{debug, info, warn};
use ndarray::ArrayView1;

/// Quadratic penalty method for linearly constrained NLP.
/// Minimize a function f(x) beginning from a starting point x0, subject
/// to linear inequality and equality constraints.
///
/// ```text
/// min f(x)
///  x
/// ```
///
/// subject to
///
/// ```text
/// A*x <= b            (linear inequalities)
/// E*x  = e            (linear equalities)
/// ```
///
/// Each outer iteration runs the configured inner solver for a fixed number
/// of steps on `f(x) + mu*violation(x)` and then multiplies `mu` by `beta`,
/// until `mu*violation(x) < eps`.
///
/// Returns the final iterate and the recorded trajectory.
pub fn penalty<F: ObjectiveFunction>(
    problem: &OptimizationProblem<F>,
    x0: ArrayView1<f64>,
    solver: &SolverConfig,
    opt: &Options,
    progress: Option<&dyn ProgressMonitor>,
) -> Result<Solution, Error> {
    solver.validate()?;
    let mut inner = solver.build();
    penalty_with(
        problem,
        x0,
        inner.as_mut(),
        solver.step(),
        solver.inner_iterations,
        opt,
        progress,
    )
}

/// Runs the penalty schedule with a caller-supplied inner solver.
///
/// `step` is passed to the solver on the first outer iteration and, if
/// `opt.anneal_step` is set, divided by `opt.beta` after every iteration.
pub fn penalty_with<F: ObjectiveFunction>(
    problem: &OptimizationProblem<F>,
    x0: ArrayView1<f64>,
    inner: &mut dyn InnerSolver,
    step: StepSize,
    inner_iterations: usize,
    opt: &Options,
    progress: Option<&dyn ProgressMonitor>,
) -> Result<Solution, Error> {
    opt.validate()?;
    step.validate()?;
    if inner_iterations == 0 {
        return Err(ScheduleError::InnerIterations.into());
    }
    let nx = problem.dim();
    if x0.len() != nx {
        return Err(Error::shape("initial point", nx, x0.len()));
    }
    if !all_finite(x0) {
        return Err(Error::DivergenceDetected {
            iteration: 0,
            reason: "initial point is not finite",
        });
    }

    let f_fn = problem.objective();
    let constraints = problem.constraints();
    let name = inner.name().to_string();

    let mut x = x0.to_owned();
    let mut mu = opt.mu0;
    let mut step = step;
    let mut iterations = 0;

    let mut trajectory = Trajectory::new();
    if opt.seed_trajectory {
        trajectory.record(x.view(), f_fn.f(x.view()));
    }

    let mut viol = constraints.violation(x.view());
    debug!("{}: mu = {:e}, violation(x0) = {:e}", name, mu, viol);

    while mu * viol >= opt.eps {
        let penalized = Penalized::new(f_fn, constraints, mu);
        let (x_next, inner_obj) = inner
            .minimize(&penalized, x.view(), &step, inner_iterations)
            .with_context(|| format!("{} failed at outer iteration {}", name, iterations + 1))?;

        if x_next.len() != nx {
            return Err(Error::shape("inner solver iterate", nx, x_next.len()));
        }
        if !all_finite(x_next.view()) {
            warn!("{}: non-finite iterate after {} iterations", name, iterations);
            return Err(Error::DivergenceDetected {
                iteration: iterations + 1,
                reason: "inner solver returned a non-finite iterate",
            });
        }
        let dx = norm((&x_next - &x).view());
        x = x_next;

        mu *= opt.beta;
        if !mu.is_finite() {
            warn!("{}: penalty weight overflowed, |x|_inf = {:e}", name, norm_inf(x.view()));
            return Err(Error::DivergenceDetected {
                iteration: iterations + 1,
                reason: "penalty weight overflowed",
            });
        }
        if opt.anneal_step {
            step = step.annealed(opt.beta);
        }
        iterations += 1;

        let f = f_fn.f(x.view());
        viol = constraints.violation(x.view());
        trajectory.record(x.view(), f);

        debug!(
            "{:3} mu = {:e} violation = {:e} f = {:e} |dx| = {:e}",
            iterations, mu, viol, f, dx
        );
        if let Some(progress) = progress {
            progress.update(iterations, mu, viol, f, dx, inner_obj);
        }
    }
    info!(
        "{}: converged in {} outer iterations, mu*violation = {:e}",
        name,
        iterations,
        mu * viol
    );

    let f = f_fn.f(x.view());
    Ok(Solution {
        x,
        f,
        iterations,
        mu,
        violation: viol,
        step,
        trajectory,
    })
}
