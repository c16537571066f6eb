use thiserror::Error;

/// Errors returned by the penalty driver.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid schedule configuration: {0}")]
    InvalidScheduleConfig(#[from] ScheduleError),

    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A non-finite iterate or penalty weight appeared at outer iteration `iteration`.
    #[error("divergence detected at outer iteration {iteration}: {reason}")]
    DivergenceDetected {
        iteration: usize,
        reason: &'static str,
    },

    #[error("unknown problem tag {0}, only 1 and 2 are supported")]
    UnknownProblemTag(u32),

    /// The inner solver failed; propagated without retry.
    #[error(transparent)]
    Solver(#[from] anyhow::Error),
}

/// Rejected schedule or solver parameters.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ScheduleError {
    #[error("eps ({0}) must be finite and positive")]
    Eps(f64),

    #[error("beta ({0}) must be finite and greater than 1")]
    Beta(f64),

    #[error("mu0 ({0}) must be finite and positive")]
    Mu0(f64),

    #[error("step size ({0}) must be finite and positive")]
    StepSize(f64),

    #[error("momentum ({0}) must lie in [0, 1)")]
    Momentum(f64),

    #[error("inner iteration budget must be at least 1")]
    InnerIterations,
}

impl Error {
    pub(crate) fn shape(what: &'static str, expected: usize, found: usize) -> Self {
        Error::ShapeMismatch {
            what,
            expected,
            found,
        }
    }
}
