//! Fit configuration, results and errors.

use serde::{Deserialize, Serialize};

use crate::frame::AxisKind;

/// Highest polynomial order accepted by [`fit_curve`](super::fit_curve).
pub const MAX_ORDER: usize = 5;

/// Default number of points in the evaluation sweep.
pub const DEFAULT_EVAL_SAMPLES: usize = 100;

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors that can occur during polynomial fitting.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// No samples were supplied.
    NoPoints,
    /// Requested order is outside `0..=max`.
    OrderOutOfRange {
        /// Requested order.
        order: usize,
        /// Largest supported order.
        max: usize,
    },
    /// A sample on a log axis is not strictly positive.
    LogDomain {
        /// Axis carrying the sample.
        axis: AxisKind,
        /// Offending sample value.
        value: f64,
    },
    /// The evaluation sweep needs at least two points.
    TooFewEvalSamples {
        /// Requested sweep size.
        requested: usize,
    },
    /// A sample is NaN or infinite.
    NonFinite,
    /// The least-squares solver failed.
    Solver(&'static str),
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPoints => write!(f, "no curve samples to fit"),
            Self::OrderOutOfRange { order, max } => {
                write!(f, "polynomial order {} is outside 0..={}", order, max)
            }
            Self::LogDomain { axis, value } => write!(
                f,
                "{}-axis is logarithmic but sample value {} is not positive",
                axis, value
            ),
            Self::TooFewEvalSamples { requested } => write!(
                f,
                "evaluation sweep needs at least 2 points, got {}",
                requested
            ),
            Self::NonFinite => write!(f, "curve samples contain NaN or infinite values"),
            Self::Solver(msg) => write!(f, "least-squares solve failed: {}", msg),
        }
    }
}

impl std::error::Error for FitError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Which axis acts as the independent variable of the fitted polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    /// Fit `y = f(x)`.
    #[default]
    X,
    /// Fit `x = f(y)`.
    Y,
}

impl Variable {
    pub fn axis(self) -> AxisKind {
        match self {
            Self::X => AxisKind::X,
            Self::Y => AxisKind::Y,
        }
    }

    /// The other axis, i.e. the dependent variable.
    pub fn dependent(self) -> AxisKind {
        match self {
            Self::X => AxisKind::Y,
            Self::Y => AxisKind::X,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Polynomial fit parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Polynomial order in `0..=MAX_ORDER`.
    pub order: usize,
    /// Independent variable.
    pub independent: Variable,
    /// Number of evenly spaced points in the evaluation curve, at least 2.
    pub eval_samples: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            order: MAX_ORDER,
            independent: Variable::X,
            eval_samples: DEFAULT_EVAL_SAMPLES,
        }
    }
}

/// Fitted polynomial plus its resampled evaluation curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Independent variable of the polynomial.
    pub independent: Variable,
    /// Whether the (independent, dependent) axes were fitted in log10 space.
    pub log_flags: [bool; 2],
    /// Coefficients, highest power first (`order + 1` entries).
    pub coefficients: Vec<f64>,
    /// Polynomial order.
    pub order: usize,
    /// RMS residual of the fit, in the fitted (possibly log10) domain.
    pub rms_residual: f64,
    /// Evaluation curve as graph-space `[x, y]`, log axes already exponentiated.
    pub curve: Vec<[f64; 2]>,
}

impl FitResult {
    /// Evaluate the polynomial in its fitted domain.
    ///
    /// If the independent axis is logarithmic, `t` must already be `log10`
    /// of the graph value, and the result is `log10` when the dependent
    /// axis is logarithmic.
    pub fn evaluate(&self, t: f64) -> f64 {
        super::polyfit::polyval(&self.coefficients, t)
    }

    /// Evaluate at a graph-space value of the independent axis and return a
    /// graph-space value of the dependent axis.
    pub fn evaluate_graph(&self, value: f64) -> f64 {
        let t = if self.log_flags[0] { value.log10() } else { value };
        let v = self.evaluate(t);
        if self.log_flags[1] {
            10f64.powf(v)
        } else {
            v
        }
    }
}
