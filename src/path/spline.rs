//! Global cubic spline through all checkpoints, one spline per axis,
//! parameterized by checkpoint index.
//!
//! Fitting degrades periodic → natural → linear. Periodic only applies to
//! closed paths, natural needs at least three finite points and a solvable
//! system, and linear always succeeds.

use tracing::{debug, warn};

use crate::sim::Float3;

use super::curve::{Curve, SplineFit};

const CLOSED_EPS: f32 = 1e-6;
const PIVOT_EPS: f64 = 1e-12;

/// Per-axis knot values and second derivatives at each knot.
#[derive(Debug, Clone)]
struct AxisSpline {
    values: Vec<f64>,
    second: Vec<f64>,
}

impl AxisSpline {
    fn linear(values: Vec<f64>) -> Self {
        let second = vec![0.0; values.len()];
        Self { values, second }
    }

    /// Evaluates at parameter `s` in `[0, n-1]` with unit knot spacing.
    /// Zero second derivatives reduce this to piecewise linear interpolation.
    fn evaluate(&self, s: f64) -> f64 {
        let last = self.values.len() - 1;
        if last == 0 {
            return self.values[0];
        }
        let i = (s.floor().max(0.0) as usize).min(last - 1);
        let u = s - i as f64;
        let one_minus_u = 1.0 - u;

        one_minus_u * self.values[i]
            + u * self.values[i + 1]
            + ((one_minus_u * one_minus_u * one_minus_u - one_minus_u) * self.second[i]
                + (u * u * u - u) * self.second[i + 1])
                / 6.0
    }
}

fn axis_values(checkpoints: &[Float3], axis: fn(&Float3) -> f32) -> Vec<f64> {
    checkpoints.iter().map(|p| axis(p) as f64).collect()
}

fn fit_natural(values: &[f64]) -> Option<Vec<f64>> {
    let n = values.len();
    if n < 3 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let size = n - 2;
    let mut matrix = vec![vec![0.0; size]; size];
    let mut rhs = vec![0.0; size];
    for row in 0..size {
        let i = row + 1;
        matrix[row][row] = 4.0;
        if row > 0 {
            matrix[row][row - 1] = 1.0;
        }
        if row + 1 < size {
            matrix[row][row + 1] = 1.0;
        }
        rhs[row] = 6.0 * (values[i + 1] - 2.0 * values[i] + values[i - 1]);
    }

    let inner = solve_dense(matrix, rhs)?;
    let mut second = Vec::with_capacity(n);
    second.push(0.0);
    second.extend(inner);
    second.push(0.0);
    Some(second)
}

fn fit_periodic(values: &[f64]) -> Option<Vec<f64>> {
    let n = values.len();
    if n < 3 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    if (values[0] - values[n - 1]).abs() > CLOSED_EPS as f64 {
        return None;
    }
    // The closing knot duplicates the first one.
    let k = n - 1;
    let mut matrix = vec![vec![0.0; k]; k];
    let mut rhs = vec![0.0; k];
    for j in 0..k {
        let prev = (j + k - 1) % k;
        let next = (j + 1) % k;
        matrix[j][j] += 4.0;
        matrix[j][prev] += 1.0;
        matrix[j][next] += 1.0;
        rhs[j] = 6.0 * (values[next] - 2.0 * values[j] + values[prev]);
    }

    let mut second = solve_dense(matrix, rhs)?;
    second.push(second[0]);
    Some(second)
}

/// Gaussian elimination with partial pivoting. `None` when singular.
fn solve_dense(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| {
            matrix[a][col]
                .abs()
                .partial_cmp(&matrix[b][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if matrix[pivot][col].abs() < PIVOT_EPS || !matrix[pivot][col].is_finite() {
            return None;
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                matrix[row][c] -= factor * matrix[col][c];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|c| matrix[row][c] * solution[c]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    if solution.iter().all(|v| v.is_finite()) {
        Some(solution)
    } else {
        None
    }
}

/// Fits all three axes with the first tier that succeeds on every axis.
fn fit_axes(checkpoints: &[Float3]) -> ([AxisSpline; 3], SplineFit) {
    let axes = [
        axis_values(checkpoints, |p| p.x),
        axis_values(checkpoints, |p| p.y),
        axis_values(checkpoints, |p| p.z),
    ];

    let tiers: [(SplineFit, fn(&[f64]) -> Option<Vec<f64>>); 2] = [
        (SplineFit::Periodic, fit_periodic),
        (SplineFit::Natural, fit_natural),
    ];
    for (fit, solver) in tiers {
        let seconds: Option<Vec<Vec<f64>>> =
            axes.iter().map(|v| solver(v.as_slice())).collect();
        match seconds {
            Some(mut seconds) => {
                let z = seconds.pop().unwrap_or_default();
                let y = seconds.pop().unwrap_or_default();
                let x = seconds.pop().unwrap_or_default();
                let [ax, ay, az] = axes;
                return (
                    [
                        AxisSpline { values: ax, second: x },
                        AxisSpline { values: ay, second: y },
                        AxisSpline { values: az, second: z },
                    ],
                    fit,
                );
            }
            None => debug!(?fit, "spline fit rejected, trying next tier"),
        }
    }

    warn!(
        checkpoints = checkpoints.len(),
        "cubic spline fit failed, using linear interpolation"
    );
    let [ax, ay, az] = axes;
    (
        [
            AxisSpline::linear(ax),
            AxisSpline::linear(ay),
            AxisSpline::linear(az),
        ],
        SplineFit::Linear,
    )
}

pub(crate) fn build(checkpoints: &[Float3], samples_per_segment: usize) -> Curve {
    let n = checkpoints.len();
    let (splines, fit) = fit_axes(checkpoints);

    let count = (n * samples_per_segment).max(2);
    let span = (n - 1) as f64;
    let step = span / (count - 1) as f64;

    let samples: Vec<Float3> = (0..count)
        .map(|k| {
            let s = (k as f64 * step).min(span);
            Float3::new(
                splines[0].evaluate(s) as f32,
                splines[1].evaluate(s) as f32,
                splines[2].evaluate(s) as f32,
            )
        })
        .collect();

    let checkpoint_indices = (0..n)
        .map(|i| ((i as f64 / step).round() as usize).min(count - 1))
        .collect();

    Curve::from_parts(samples, checkpoint_indices, Some(fit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;
    use crate::path::CurveStrategy;
    use approx::assert_relative_eq;

    #[test]
    fn open_path_uses_natural_fit() {
        let checkpoints = [
            Float3::ZERO,
            Float3::new(10.0, 0.0, 0.0),
            Float3::new(10.0, 10.0, 0.0),
        ];
        let curve = build(&checkpoints, 10);
        assert_eq!(curve.fit(), Some(SplineFit::Natural));
        assert_eq!(curve.len(), 30);
    }

    #[test]
    fn closed_path_uses_periodic_fit() {
        let checkpoints = [
            Float3::ZERO,
            Float3::new(5.0, 0.0, 0.0),
            Float3::new(5.0, 0.0, 5.0),
            Float3::new(0.0, 0.0, 5.0),
            Float3::ZERO,
        ];
        let curve = build(&checkpoints, 8);
        assert_eq!(curve.fit(), Some(SplineFit::Periodic));
    }

    #[test]
    fn two_checkpoints_fall_back_to_linear() {
        let checkpoints = [Float3::ZERO, Float3::new(4.0, 2.0, 0.0)];
        let curve = build(&checkpoints, 5);
        assert_eq!(curve.fit(), Some(SplineFit::Linear));
        for (k, p) in curve.samples().iter().enumerate() {
            let t = k as f32 / (curve.len() - 1) as f32;
            assert_relative_eq!(p.x, 4.0 * t, epsilon = 1e-5);
            assert_relative_eq!(p.y, 2.0 * t, epsilon = 1e-5);
        }
    }

    #[test]
    fn non_finite_checkpoint_is_rejected_before_fitting() {
        let checkpoints = [
            Float3::ZERO,
            Float3::new(f32::NAN, 0.0, 0.0),
            Float3::new(2.0, 0.0, 0.0),
        ];
        let err = CurveStrategy::Spline.build(&checkpoints, 4).unwrap_err();
        assert!(matches!(
            err,
            PathError::InvalidParameter {
                name: "checkpoints",
                ..
            }
        ));
    }

    #[test]
    fn natural_spline_interpolates_knots() {
        let values = vec![0.0, 3.0, -1.0, 4.0, 2.0];
        let second = fit_natural(&values).unwrap();
        assert_eq!(second[0], 0.0);
        assert_eq!(second[4], 0.0);
        let spline = AxisSpline {
            values: values.clone(),
            second,
        };
        for (i, v) in values.iter().enumerate() {
            assert_relative_eq!(spline.evaluate(i as f64), *v, epsilon = 1e-9);
        }
    }

    #[test]
    fn periodic_spline_matches_closing_derivatives() {
        let values = vec![0.0, 2.0, 0.0, -2.0, 0.0];
        let second = fit_periodic(&values).unwrap();
        assert_relative_eq!(second[0], second[4], epsilon = 1e-12);
    }

    #[test]
    fn solve_dense_rejects_singular_systems() {
        let matrix = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(solve_dense(matrix, vec![1.0, 2.0]).is_none());
    }

    #[test]
    fn checkpoint_indices_track_knot_parameters() {
        let checkpoints = [
            Float3::ZERO,
            Float3::new(1.0, 1.0, 0.0),
            Float3::new(2.0, 0.0, 0.0),
        ];
        let curve = build(&checkpoints, 4);
        let indices = curve.checkpoint_indices();
        assert_eq!(indices.len(), 3);
        assert_eq!(indices[0], 0);
        assert_eq!(indices[2], curve.len() - 1);
        let middle = curve.get(indices[1]).unwrap();
        assert!(middle.distance(checkpoints[1]) < 0.2);
    }
}
