//! Conjugate Gaussian regression of the fixed effects.
//!
//! The residual variance is plugged in from least squares, then each
//! coefficient gets a normal posterior under the model's normal priors.
//! Random effects are acknowledged but not estimated, so intervals are
//! narrower than a full spatial fit would give.

use ndarray::{Array1, Array2, Axis};
use tracing::{debug, warn};

use super::engine::{FixedEffect, FixedEffectsTable, InferenceEngine, ModelSpec, RandomEffect};
use super::graph::AdjacencyGraph;
use crate::error::{MapError, Result};

/// 97.5% quantile of the standard normal
const Z_975: f64 = 1.959_963_984_540_054;

/// Smallest residual variance used, so exact fits keep a finite precision
const MIN_VARIANCE: f64 = 1e-12;

const PIVOT_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianFixedEffects;

impl GaussianFixedEffects {
    pub fn new() -> Self {
        Self
    }
}

impl InferenceEngine for GaussianFixedEffects {
    fn name(&self) -> &str {
        "gaussian-fixed-effects"
    }

    fn fit(&self, model: &ModelSpec) -> Result<FixedEffectsTable> {
        let n = model.n_obs();
        check_random_effects(model, n)?;

        let (design, names) = model.design();
        let p = names.len();
        if n <= p {
            return Err(inference_error(format!(
                "{} observations cannot support {} coefficients",
                n, p
            )));
        }
        if model.response.iter().any(|v| !v.is_finite()) {
            return Err(inference_error("response contains non-finite values".to_string()));
        }
        if design.iter().any(|v| !v.is_finite()) {
            return Err(inference_error("predictor contains non-finite values".to_string()));
        }

        let y = Array1::from(model.response.clone());
        let xtx = design.t().dot(&design);
        let xty = design.t().dot(&y);

        // Plug-in residual variance from ordinary least squares
        let ols = invert(&xtx)?.dot(&xty);
        let residuals = &y - &design.dot(&ols);
        let variance = (residuals.dot(&residuals) / (n - p) as f64).max(MIN_VARIANCE);

        let (prior_mean, prior_precision) = model.prior_moments(p);
        let mut posterior_precision = &xtx / variance;
        for (j, precision) in prior_precision.iter().enumerate() {
            posterior_precision[[j, j]] += precision;
        }
        let covariance = invert(&posterior_precision)?;
        let mean = covariance.dot(&(&xty / variance + &prior_precision * &prior_mean));

        debug!(
            observations = n,
            coefficients = p,
            residual_variance = variance,
            "Fixed effects fitted"
        );

        let rows = names
            .into_iter()
            .enumerate()
            .map(|(j, term)| {
                let sd = covariance[[j, j]].max(0.0).sqrt();
                FixedEffect {
                    term,
                    mean: mean[j],
                    sd,
                    lower: mean[j] - Z_975 * sd,
                    upper: mean[j] + Z_975 * sd,
                }
            })
            .collect();
        Ok(FixedEffectsTable { rows })
    }
}

fn check_random_effects(model: &ModelSpec, n: usize) -> Result<()> {
    for effect in &model.random_effects {
        if let RandomEffect::Besag { graph } = effect {
            let adjacency = AdjacencyGraph::read(graph)?;
            if adjacency.len() != n {
                return Err(MapError::Graph {
                    message: format!(
                        "{} has {} nodes but there are {} observations",
                        graph.display(),
                        adjacency.len(),
                        n
                    ),
                });
            }
            let islands = adjacency.islands();
            if !islands.is_empty() {
                debug!(islands = islands.len(), "Graph has units without neighbours");
            }
        }
    }
    if !model.random_effects.is_empty() {
        warn!(
            effects = model.random_effects.len(),
            "Random effects are not estimated by the Gaussian engine"
        );
    }
    Ok(())
}

/// Gauss-Jordan inverse with partial pivoting
fn invert(matrix: &Array2<f64>) -> Result<Array2<f64>> {
    let n = matrix.nrows();
    if matrix.ncols() != n {
        return Err(inference_error("cannot invert a non-square matrix".to_string()));
    }

    let mut work = matrix.clone();
    let mut inverse = Array2::<f64>::eye(n);
    let scale = matrix.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| work[[a, col]].abs().total_cmp(&work[[b, col]].abs()))
            .unwrap_or(col);
        if work[[pivot, col]].abs() <= PIVOT_TOLERANCE * scale {
            return Err(inference_error(
                "design is singular (an empty group or a constant predictor)".to_string(),
            ));
        }
        if pivot != col {
            swap_rows(&mut work, pivot, col);
            swap_rows(&mut inverse, pivot, col);
        }

        let divisor = work[[col, col]];
        work.row_mut(col).mapv_inplace(|v| v / divisor);
        inverse.row_mut(col).mapv_inplace(|v| v / divisor);

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = work[[row, col]];
            if factor == 0.0 {
                continue;
            }
            let pivot_work = work.row(col).to_owned();
            let pivot_inverse = inverse.row(col).to_owned();
            work.row_mut(row).scaled_add(-factor, &pivot_work);
            inverse.row_mut(row).scaled_add(-factor, &pivot_inverse);
        }
    }
    Ok(inverse)
}

fn swap_rows(matrix: &mut Array2<f64>, a: usize, b: usize) {
    let row_a = matrix.index_axis(Axis(0), a).to_owned();
    let row_b = matrix.index_axis(Axis(0), b).to_owned();
    matrix.row_mut(a).assign(&row_b);
    matrix.row_mut(b).assign(&row_a);
}

fn inference_error(message: String) -> MapError {
    MapError::Inference { message }
}
