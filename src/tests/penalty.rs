use std::cell::RefCell;

use anyhow::{anyhow, Result};
use float_cmp::assert_approx_eq;
use ndarray::{arr1, arr2, array, Array1, ArrayView1};

use crate::{
    penalty, penalty_with, Benchmark, Constraints, Error, InnerSolver, OptimizationProblem,
    Options, Penalized, ProgressMonitor, ScheduleError, SolverConfig, StepSize,
};

fn sphere(x: ArrayView1<f64>) -> f64 {
    x.dot(&x)
}

/// `min |x|^2` subject to `x_0 + x_1 <= -100`, with a redundant zero
/// equality row.
fn half_plane_problem() -> OptimizationProblem<fn(ArrayView1<f64>) -> f64> {
    let constraints = Constraints::new(
        arr2(&[[1.0, 1.0]]),
        arr1(&[-100.0]),
        arr2(&[[0.0, 0.0]]),
        arr1(&[0.0]),
    )
    .unwrap();
    OptimizationProblem::new(sphere as fn(ArrayView1<f64>) -> f64, constraints)
}

/// Moves `x` a fraction of the way to its projection on the single
/// inequality row, ignoring the objective. `fraction = 1` is the exact
/// feasible projection.
struct Projector {
    fraction: f64,
    calls: usize,
    alphas: Vec<f64>,
}

impl Projector {
    fn new(fraction: f64) -> Self {
        Self {
            fraction,
            calls: 0,
            alphas: Vec::new(),
        }
    }
}

impl InnerSolver for Projector {
    fn name(&self) -> &str {
        "projector"
    }

    fn minimize(
        &mut self,
        penalized: &Penalized,
        x0: ArrayView1<f64>,
        step: &StepSize,
        _iterations: usize,
    ) -> Result<(Array1<f64>, f64)> {
        self.calls += 1;
        self.alphas.push(step.alpha);

        let c = penalized.constraints();
        let a = c.a_mat().row(0).to_owned();
        let r = (a.dot(&x0) - c.b()[0]).max(0.0);
        let x = &x0 - &(&a * (self.fraction * r / a.dot(&a)));
        let obj = penalized.value(x.view());
        Ok((x, obj))
    }
}

/// Returns whatever the closure produces, counting calls.
struct Scripted<G> {
    script: G,
    calls: usize,
}

impl<G> InnerSolver for Scripted<G>
where
    G: FnMut(ArrayView1<f64>) -> Result<Array1<f64>>,
{
    fn name(&self) -> &str {
        "scripted"
    }

    fn minimize(
        &mut self,
        penalized: &Penalized,
        x0: ArrayView1<f64>,
        _step: &StepSize,
        _iterations: usize,
    ) -> Result<(Array1<f64>, f64)> {
        self.calls += 1;
        let x = (self.script)(x0)?;
        let obj = if x.len() == x0.len() {
            penalized.value(x.view())
        } else {
            f64::NAN
        };
        Ok((x, obj))
    }
}

fn scripted<G>(script: G) -> Scripted<G>
where
    G: FnMut(ArrayView1<f64>) -> Result<Array1<f64>>,
{
    Scripted { script, calls: 0 }
}

#[derive(Default)]
struct Recorder {
    updates: RefCell<Vec<(usize, f64, f64)>>,
}

impl ProgressMonitor for Recorder {
    fn update(&self, k: usize, mu: f64, violation: f64, _obj: f64, _step: f64, _inner: f64) {
        self.updates.borrow_mut().push((k, mu, violation));
    }
}

#[test]
fn exact_projection_stops_after_one_iteration() {
    let problem = half_plane_problem();
    let x0 = array![0.0, 0.0];
    let mut solver = Projector::new(1.0);

    let solution = penalty_with(
        &problem,
        x0.view(),
        &mut solver,
        StepSize::new(0.1),
        100,
        &Options::default(),
        None,
    )
    .unwrap();

    // violation(x0) = 10000 > 0, violation(x1) = 0
    assert_eq!(solution.iterations, 1);
    assert_eq!(solver.calls, 1);
    assert_eq!(solution.x, array![-50.0, -50.0]);
    assert_eq!(solution.violation, 0.0);
    assert_eq!(solution.f, 5000.0);
    assert_eq!(solution.mu, 2.0);
}

#[test]
fn stops_at_first_product_below_eps() {
    let problem = half_plane_problem();
    let x0 = array![0.0, 0.0];
    let opt = Options::default();
    let mut solver = Projector::new(0.5);

    let solution = penalty_with(
        &problem,
        x0.view(),
        &mut solver,
        StepSize::new(0.1),
        100,
        &opt,
        None,
    )
    .unwrap();

    // The residual halves per call, so violation(x_k) = 10000 / 4^k and the
    // guard product is mu0 * beta^k * 10000 / 4^k.
    let mut expected = 0;
    while opt.mu0 * opt.beta.powi(expected) * 10000.0 / 4f64.powi(expected) >= opt.eps {
        expected += 1;
    }
    assert_eq!(expected, 24);
    assert_eq!(solution.iterations, expected as usize);
    assert_eq!(solver.calls, expected as usize);
    assert!(solution.mu * solution.violation < opt.eps);
    assert_approx_eq!(f64, solution.mu, opt.mu0 * opt.beta.powi(expected), ulps = 2);
}

#[test]
fn trajectory_length_and_seeding() {
    let problem = half_plane_problem();
    let x0 = array![0.0, 0.0];

    for seed_trajectory in [true, false] {
        let opt = Options {
            seed_trajectory,
            ..Default::default()
        };
        let solution = penalty_with(
            &problem,
            x0.view(),
            &mut Projector::new(0.5),
            StepSize::new(0.1),
            100,
            &opt,
            None,
        )
        .unwrap();

        let k = solution.iterations;
        let traj = &solution.trajectory;
        if seed_trajectory {
            assert_eq!(traj.len(), k + 1);
            assert_eq!(traj.points()[0], x0);
            assert_eq!(traj.objectives()[0], 0.0);
        } else {
            assert_eq!(traj.len(), k);
            assert_eq!(traj.points()[0], array![-25.0, -25.0]);
        }
        let (last_x, last_f) = traj.last().unwrap();
        assert_eq!(last_x, solution.x.view());
        assert_eq!(last_f, solution.f);
        assert_eq!(traj.as_sequence().count(), traj.len());
    }
}

#[test]
fn recorded_points_are_snapshots() {
    let problem = half_plane_problem();
    let x0 = array![0.0, 0.0];
    let solution = penalty_with(
        &problem,
        x0.view(),
        &mut Projector::new(0.5),
        StepSize::new(0.1),
        100,
        &Options::default(),
        None,
    )
    .unwrap();

    let points = solution.trajectory.points();
    for (k, x) in points.iter().enumerate() {
        // residual after k halvings
        let s = x[0] + x[1];
        assert_approx_eq!(f64, s, -100.0 + 100.0 / 2f64.powi(k as i32), epsilon = 1e-9);
    }
    for (x, f) in solution.trajectory.as_sequence() {
        assert_eq!(f, sphere(x));
    }
}

#[test]
fn step_annealing() {
    let problem = half_plane_problem();
    let x0 = array![0.0, 0.0];

    let mut annealed = Projector::new(0.5);
    let solution = penalty_with(
        &problem,
        x0.view(),
        &mut annealed,
        StepSize::new(0.1),
        100,
        &Options::default(),
        None,
    )
    .unwrap();
    for (k, alpha) in annealed.alphas.iter().enumerate() {
        assert_approx_eq!(f64, *alpha, 0.1 / 2f64.powi(k as i32), ulps = 2);
    }
    assert_approx_eq!(
        f64,
        solution.step.alpha,
        0.1 / 2f64.powi(solution.iterations as i32),
        ulps = 2
    );

    let mut fixed = Projector::new(0.5);
    let opt = Options {
        anneal_step: false,
        ..Default::default()
    };
    let solution = penalty_with(
        &problem,
        x0.view(),
        &mut fixed,
        StepSize::new(0.1),
        100,
        &opt,
        None,
    )
    .unwrap();
    assert!(fixed.alphas.iter().all(|&alpha| alpha == 0.1));
    assert_eq!(solution.step.alpha, 0.1);
}

#[test]
fn progress_monitor_sees_every_iteration() {
    let problem = half_plane_problem();
    let x0 = array![0.0, 0.0];
    let recorder = Recorder::default();

    let solution = penalty_with(
        &problem,
        x0.view(),
        &mut Projector::new(0.5),
        StepSize::new(0.1),
        100,
        &Options::default(),
        Some(&recorder),
    )
    .unwrap();

    let updates = recorder.updates.borrow();
    assert_eq!(updates.len(), solution.iterations);
    for (i, &(k, mu, violation)) in updates.iter().enumerate() {
        assert_eq!(k, i + 1);
        assert_eq!(mu, 2f64.powi(k as i32));
        assert_approx_eq!(f64, violation, 10000.0 / 4f64.powi(k as i32), epsilon = 1e-9);
    }
}

#[test]
fn unconstrained_returns_initial_point() {
    let problem = OptimizationProblem::new(
        sphere as fn(ArrayView1<f64>) -> f64,
        Constraints::none(2),
    );
    let x0 = array![3.0, -4.0];
    let mut solver = Projector::new(1.0);

    let solution = penalty_with(
        &problem,
        x0.view(),
        &mut solver,
        StepSize::new(0.1),
        100,
        &Options::default(),
        None,
    )
    .unwrap();

    assert_eq!(solution.iterations, 0);
    assert_eq!(solver.calls, 0);
    assert_eq!(solution.x, x0);
    assert_eq!(solution.f, 25.0);
    assert_eq!(solution.mu, 1.0);
    assert_eq!(solution.trajectory.len(), 1);
}

#[test]
fn rejects_invalid_schedule() {
    let problem = half_plane_problem();
    let x0 = array![0.0, 0.0];

    let cases = [
        (
            Options {
                eps: 0.0,
                ..Default::default()
            },
            ScheduleError::Eps(0.0),
        ),
        (
            Options {
                beta: 1.0,
                ..Default::default()
            },
            ScheduleError::Beta(1.0),
        ),
        (
            Options {
                mu0: -1.0,
                ..Default::default()
            },
            ScheduleError::Mu0(-1.0),
        ),
    ];
    for (opt, expected) in cases {
        let mut solver = Projector::new(1.0);
        let err = penalty_with(
            &problem,
            x0.view(),
            &mut solver,
            StepSize::new(0.1),
            100,
            &opt,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidScheduleConfig(e) if e == expected));
        assert_eq!(solver.calls, 0);
    }

    let opt = Options::default();
    let err = penalty_with(
        &problem,
        x0.view(),
        &mut Projector::new(1.0),
        StepSize::new(0.1),
        0,
        &opt,
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidScheduleConfig(ScheduleError::InnerIterations)
    ));

    let err = penalty(
        &problem,
        x0.view(),
        &SolverConfig::accelerated(0.1, 1.0, Benchmark::Quadratic),
        &opt,
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidScheduleConfig(ScheduleError::Momentum(_))
    ));

    let err = penalty(
        &problem,
        x0.view(),
        &SolverConfig::stochastic(-0.1, 0),
        &opt,
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidScheduleConfig(ScheduleError::StepSize(_))
    ));
}

#[test]
fn rejects_mismatched_initial_point() {
    let problem = half_plane_problem();
    let mut solver = Projector::new(1.0);
    let err = penalty_with(
        &problem,
        array![0.0, 0.0, 0.0].view(),
        &mut solver,
        StepSize::new(0.1),
        100,
        &Options::default(),
        None,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        Error::ShapeMismatch {
            expected: 2,
            found: 3,
            ..
        }
    ));
    assert_eq!(solver.calls, 0);
}

#[test]
fn rejects_mismatched_iterate() {
    let problem = half_plane_problem();
    let mut solver = scripted(|_x| Ok(array![1.0]));
    let err = penalty_with(
        &problem,
        array![0.0, 0.0].view(),
        &mut solver,
        StepSize::new(0.1),
        100,
        &Options::default(),
        None,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        Error::ShapeMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
    assert_eq!(solver.calls, 1);
}

#[test]
fn detects_non_finite_iterate() {
    let problem = half_plane_problem();
    let mut solver = scripted(|x| {
        let mut x = x.to_owned();
        x[0] = if x[1] <= -10.0 { f64::NAN } else { x[0] - 10.0 };
        x[1] -= 10.0;
        Ok(x)
    });
    let err = penalty_with(
        &problem,
        array![0.0, 0.0].view(),
        &mut solver,
        StepSize::new(0.1),
        100,
        &Options::default(),
        None,
    )
    .unwrap_err();

    assert!(matches!(err, Error::DivergenceDetected { iteration: 2, .. }));
    assert_eq!(solver.calls, 2);
}

#[test]
fn detects_penalty_overflow() {
    let problem = half_plane_problem();
    // a solver that never moves keeps violation at 10000
    let mut solver = scripted(|x| Ok(x.to_owned()));
    let err = penalty_with(
        &problem,
        array![0.0, 0.0].view(),
        &mut solver,
        StepSize::new(0.1),
        100,
        &Options::default(),
        None,
    )
    .unwrap_err();

    // 2^1023 is finite, 2^1024 is not
    assert!(matches!(
        err,
        Error::DivergenceDetected {
            iteration: 1024,
            ..
        }
    ));
    assert_eq!(solver.calls, 1024);
}

#[test]
fn inner_failure_propagates_without_retry() {
    let problem = half_plane_problem();
    let mut solver = scripted(|_x| Err(anyhow!("line search failed")));
    let err = penalty_with(
        &problem,
        array![0.0, 0.0].view(),
        &mut solver,
        StepSize::new(0.1),
        100,
        &Options::default(),
        None,
    )
    .unwrap_err();

    assert_eq!(solver.calls, 1);
    match err {
        Error::Solver(e) => {
            let msg = format!("{:#}", e);
            assert!(msg.contains("scripted failed at outer iteration 1"));
            assert!(msg.contains("line search failed"));
        }
        other => panic!("unexpected error: {}", other),
    }
}
