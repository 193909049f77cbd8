//! Polynomial curve fitting over extracted graph-space samples.
//!
//! Samples are split per axis, moved to log10 space for logarithmic axes,
//! assigned to (independent, dependent) roles, and fitted with a single
//! global least-squares polynomial. The evaluation curve is swept over the
//! observed independent range and mapped back to graph units.

mod polyfit;
mod types;

pub use types::{FitConfig, FitError, FitResult, Variable, DEFAULT_EVAL_SAMPLES, MAX_ORDER};

use crate::frame::AxisKind;
use crate::mapping::{AxisScales, CurveSample};

/// Fit a polynomial to `samples` and build its evaluation curve.
pub fn fit_curve(
    samples: &[CurveSample],
    config: &FitConfig,
    scales: AxisScales,
) -> Result<FitResult, FitError> {
    if samples.is_empty() {
        return Err(FitError::NoPoints);
    }
    if config.order > MAX_ORDER {
        return Err(FitError::OrderOutOfRange {
            order: config.order,
            max: MAX_ORDER,
        });
    }
    if config.eval_samples < 2 {
        return Err(FitError::TooFewEvalSamples {
            requested: config.eval_samples,
        });
    }

    let ind_axis = config.independent.axis();
    let dep_axis = config.independent.dependent();
    let log_flags = [scales.get(ind_axis).is_log(), scales.get(dep_axis).is_log()];

    let t = axis_values(samples, ind_axis, log_flags[0])?;
    let v = axis_values(samples, dep_axis, log_flags[1])?;

    if samples.len() < config.order + 1 {
        tracing::warn!(
            "fitting order {} polynomial to only {} samples; result is underdetermined",
            config.order,
            samples.len()
        );
    }

    let coefficients = polyfit::polyfit(&t, &v, config.order)?;
    let rms_residual = polyfit::rms_residual(&coefficients, &t, &v);

    let (lo, hi) = t
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &ti| {
            (lo.min(ti), hi.max(ti))
        });
    let curve = polyfit::linspace(lo, hi, config.eval_samples)
        .into_iter()
        .map(|ta| {
            let tb = polyfit::polyval(&coefficients, ta);
            let a = if log_flags[0] { 10f64.powf(ta) } else { ta };
            let b = if log_flags[1] { 10f64.powf(tb) } else { tb };
            match config.independent {
                Variable::X => [a, b],
                Variable::Y => [b, a],
            }
        })
        .collect();

    tracing::debug!(
        "fitted {} = f({}) order {} on {} samples: coeffs={:?}, rms={:.3e}",
        dep_axis,
        ind_axis,
        config.order,
        samples.len(),
        coefficients,
        rms_residual,
    );

    Ok(FitResult {
        independent: config.independent,
        log_flags,
        coefficients,
        order: config.order,
        rms_residual,
        curve,
    })
}

/// Evaluate a fitted polynomial in its fitted domain.
pub fn evaluate(fit: &FitResult, value: f64) -> f64 {
    fit.evaluate(value)
}

fn axis_values(samples: &[CurveSample], axis: AxisKind, log: bool) -> Result<Vec<f64>, FitError> {
    samples
        .iter()
        .map(|s| {
            let value = s.get(axis);
            if !value.is_finite() {
                return Err(FitError::NonFinite);
            }
            if log {
                if value <= 0.0 {
                    return Err(FitError::LogDomain { axis, value });
                }
                Ok(value.log10())
            } else {
                Ok(value)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::AxisScale;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::prelude::*;

    fn cfg(order: usize, independent: Variable) -> FitConfig {
        FitConfig {
            order,
            independent,
            ..FitConfig::default()
        }
    }

    fn line_samples() -> Vec<CurveSample> {
        (0..5)
            .map(|i| CurveSample::new(i as f64, 2.0 * i as f64 + 1.0))
            .collect()
    }

    #[test]
    fn linear_fit_recovers_coefficients_and_passes_through_samples() {
        let samples = line_samples();
        let fit = fit_curve(&samples, &cfg(1, Variable::X), AxisScales::default()).unwrap();

        assert_eq!(fit.coefficients.len(), 2);
        assert_abs_diff_eq!(fit.coefficients[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.coefficients[1], 1.0, epsilon = 1e-10);
        assert_eq!(fit.curve.len(), DEFAULT_EVAL_SAMPLES);
        assert_abs_diff_eq!(fit.curve[0][0], 0.0);
        assert_abs_diff_eq!(fit.curve[99][0], 4.0);

        for s in &samples {
            assert_abs_diff_eq!(fit.evaluate(s.x), s.y, epsilon = 1e-9);
        }
        for p in &fit.curve {
            assert_abs_diff_eq!(p[1], 2.0 * p[0] + 1.0, epsilon = 1e-9);
        }
        assert!(fit.rms_residual < 1e-9);
    }

    #[test]
    fn log_y_fit_works_in_log_space() {
        let samples: Vec<CurveSample> = [0.0, 0.5, 1.0, 1.5, 2.0]
            .iter()
            .map(|&x| CurveSample::new(x, 10f64.powf(2.0 * x)))
            .collect();
        let scales = AxisScales::new(AxisScale::Linear, AxisScale::Log10);
        let fit = fit_curve(&samples, &cfg(1, Variable::X), scales).unwrap();

        assert_eq!(fit.log_flags, [false, true]);
        assert_abs_diff_eq!(fit.coefficients[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.coefficients[1], 0.0, epsilon = 1e-9);
        for s in &samples {
            assert_relative_eq!(fit.evaluate_graph(s.x), s.y, max_relative = 1e-9);
            assert_relative_eq!(10f64.powf(evaluate(&fit, s.x)), s.y, max_relative = 1e-9);
        }
        let last = fit.curve.last().unwrap();
        assert_abs_diff_eq!(last[0], 2.0);
        assert_relative_eq!(last[1], 1e4, max_relative = 1e-9);
    }

    #[test]
    fn independent_y_swaps_roles_and_curve_pairs() {
        // x = 3y - 2
        let samples: Vec<CurveSample> = (0..6)
            .map(|i| CurveSample::new(3.0 * i as f64 - 2.0, i as f64))
            .collect();
        let fit = fit_curve(&samples, &cfg(1, Variable::Y), AxisScales::default()).unwrap();

        assert_eq!(fit.independent, Variable::Y);
        assert_abs_diff_eq!(fit.coefficients[0], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.coefficients[1], -2.0, epsilon = 1e-10);
        // Curve is [x, y] with y swept from 0 to 5.
        assert_abs_diff_eq!(fit.curve[0][1], 0.0);
        assert_abs_diff_eq!(fit.curve[0][0], -2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.curve[99][1], 5.0);
        assert_abs_diff_eq!(fit.curve[99][0], 13.0, epsilon = 1e-9);
    }

    #[test]
    fn log_log_power_law() {
        // y = 5 x^3 -> log y = 3 log x + log 5
        let samples: Vec<CurveSample> = [1.0, 2.0, 5.0, 10.0, 50.0]
            .iter()
            .map(|&x| CurveSample::new(x, 5.0 * x * x * x))
            .collect();
        let scales = AxisScales::new(AxisScale::Log10, AxisScale::Log10);
        let fit = fit_curve(&samples, &cfg(1, Variable::X), scales).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.coefficients[1], 5f64.log10(), epsilon = 1e-9);
        assert_relative_eq!(fit.curve[0][0], 1.0, max_relative = 1e-12);
        assert_relative_eq!(fit.curve[99][0], 50.0, max_relative = 1e-12);
        assert_relative_eq!(fit.curve[99][1], 5.0 * 50f64.powi(3), max_relative = 1e-9);
    }

    #[test]
    fn changing_order_changes_only_coefficients_and_curve() {
        let samples = line_samples();
        let snapshot = samples.clone();
        let f1 = fit_curve(&samples, &cfg(1, Variable::X), AxisScales::default()).unwrap();
        let f3 = fit_curve(&samples, &cfg(3, Variable::X), AxisScales::default()).unwrap();

        assert_eq!(samples, snapshot);
        assert_eq!(f1.coefficients.len(), 2);
        assert_eq!(f3.coefficients.len(), 4);
        assert_eq!(f3.order, 3);
        assert_eq!(f1.curve.len(), f3.curve.len());
        assert_abs_diff_eq!(f3.coefficients[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(f3.coefficients[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn noisy_quadratic_fit_is_close() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<CurveSample> = (0..200)
            .map(|i| {
                let x = i as f64 * 0.05;
                let noise: f64 = rng.gen_range(-0.01..0.01);
                CurveSample::new(x, 0.5 * x * x - x + 3.0 + noise)
            })
            .collect();
        let fit = fit_curve(&samples, &cfg(2, Variable::X), AxisScales::default()).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 0.5, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.coefficients[1], -1.0, epsilon = 1e-2);
        assert_abs_diff_eq!(fit.coefficients[2], 3.0, epsilon = 1e-2);
        assert!(fit.rms_residual < 0.01);
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert_eq!(
            fit_curve(&[], &cfg(1, Variable::X), AxisScales::default()),
            Err(FitError::NoPoints)
        );
        assert_eq!(
            fit_curve(&line_samples(), &cfg(6, Variable::X), AxisScales::default()),
            Err(FitError::OrderOutOfRange { order: 6, max: 5 })
        );
        for eval_samples in [0, 1] {
            let config = FitConfig {
                eval_samples,
                ..cfg(1, Variable::X)
            };
            assert_eq!(
                fit_curve(&line_samples(), &config, AxisScales::default()),
                Err(FitError::TooFewEvalSamples {
                    requested: eval_samples
                })
            );
        }
        // First sample has x = 0, so a log x axis is out of domain.
        assert_eq!(
            fit_curve(
                &line_samples(),
                &cfg(1, Variable::X),
                AxisScales::new(AxisScale::Log10, AxisScale::Linear)
            ),
            Err(FitError::LogDomain {
                axis: AxisKind::X,
                value: 0.0
            })
        );
        assert_eq!(
            fit_curve(
                &[CurveSample::new(f64::NAN, 1.0)],
                &cfg(0, Variable::X),
                AxisScales::default()
            ),
            Err(FitError::NonFinite)
        );
    }

    #[test]
    fn single_sample_order_zero() {
        let fit = fit_curve(
            &[CurveSample::new(2.0, 7.0)],
            &cfg(0, Variable::X),
            AxisScales::default(),
        )
        .unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 7.0, epsilon = 1e-12);
        assert!(fit.curve.iter().all(|p| p[0] == 2.0));
    }
}
