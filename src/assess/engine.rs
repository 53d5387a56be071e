//! Model description handed to an inference engine, and what comes back.

use ndarray::{Array1, Array2};
use serde::Serialize;
use std::path::PathBuf;

use super::grouping::Predictor;
use crate::error::Result;

pub const INTERCEPT: &str = "(Intercept)";
pub const TREND_TERM: &str = "trend";

/// Name of the fixed-effect term for group `level`
pub fn group_term(level: u32) -> String {
    format!("group{}", level)
}

/// Random effect indexed by geographic unit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum RandomEffect {
    /// Unstructured, independent per unit
    Iid,
    /// Intrinsic conditional autoregressive effect over a neighbour graph
    Besag { graph: PathBuf },
}

/// Normal priors on the fixed effects, given as mean and precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriorSpec {
    pub intercept_mean: f64,
    pub intercept_precision: f64,
    pub fixed_mean: f64,
    pub fixed_precision: f64,
}

impl Default for PriorSpec {
    fn default() -> Self {
        Self {
            intercept_mean: 0.0,
            intercept_precision: 0.0,
            fixed_mean: 0.0,
            fixed_precision: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproximationStrategy {
    Gaussian,
    SimplifiedLaplace,
    Laplace,
}

/// Gaussian regression of `response` on an intercept plus the predictor,
/// with unit-level random effects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpec {
    pub response: Vec<f64>,
    pub predictor: Predictor,
    pub random_effects: Vec<RandomEffect>,
    pub prior: PriorSpec,
    pub strategy: ApproximationStrategy,
}

impl ModelSpec {
    pub fn new(response: Vec<f64>, predictor: Predictor, graph: PathBuf) -> Self {
        Self {
            response,
            predictor,
            random_effects: vec![RandomEffect::Iid, RandomEffect::Besag { graph }],
            prior: PriorSpec::default(),
            strategy: ApproximationStrategy::Laplace,
        }
    }

    pub fn n_obs(&self) -> usize {
        self.response.len()
    }

    /// Level every other group is compared against
    pub fn reference_level(&self) -> Option<u32> {
        match &self.predictor {
            Predictor::Groups { levels, .. } => levels.first().copied(),
            Predictor::Trend(_) => None,
        }
    }

    /// Design matrix with treatment contrasts, and its column names
    pub fn design(&self) -> (Array2<f64>, Vec<String>) {
        let n = self.n_obs();
        let mut names = vec![INTERCEPT.to_string()];
        let mut columns: Vec<Array1<f64>> = vec![Array1::ones(n)];

        match &self.predictor {
            Predictor::Groups { codes, levels } => {
                for &level in levels.iter().skip(1) {
                    names.push(group_term(level));
                    columns.push(codes.iter().map(|&c| f64::from(u8::from(c == level))).collect());
                }
            }
            Predictor::Trend(values) => {
                names.push(TREND_TERM.to_string());
                columns.push(Array1::from(values.clone()));
            }
        }

        let mut design = Array2::zeros((n, columns.len()));
        for (j, column) in columns.iter().enumerate() {
            design.column_mut(j).assign(column);
        }
        (design, names)
    }

    /// Prior mean and precision per design column
    pub fn prior_moments(&self, n_terms: usize) -> (Array1<f64>, Array1<f64>) {
        let mut mean = Array1::from_elem(n_terms, self.prior.fixed_mean);
        let mut precision = Array1::from_elem(n_terms, self.prior.fixed_precision);
        if n_terms > 0 {
            mean[0] = self.prior.intercept_mean;
            precision[0] = self.prior.intercept_precision;
        }
        (mean, precision)
    }

    /// Model formula in the usual `response ~ terms` notation
    pub fn formula(&self) -> String {
        let mut terms = vec![match self.predictor {
            Predictor::Groups { .. } => "factor(group)".to_string(),
            Predictor::Trend(_) => TREND_TERM.to_string(),
        }];
        for effect in &self.random_effects {
            terms.push(match effect {
                RandomEffect::Iid => "f(unit, model = \"iid\")".to_string(),
                RandomEffect::Besag { graph } => {
                    format!("f(unit, model = \"besag\", graph = \"{}\")", graph.display())
                }
            });
        }
        format!("x ~ {}", terms.join(" + "))
    }
}

/// Posterior summary of one fixed effect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedEffect {
    pub term: String,
    pub mean: f64,
    pub sd: f64,
    /// 2.5% posterior quantile
    pub lower: f64,
    /// 97.5% posterior quantile
    pub upper: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FixedEffectsTable {
    pub rows: Vec<FixedEffect>,
}

impl FixedEffectsTable {
    pub fn get(&self, term: &str) -> Option<&FixedEffect> {
        self.rows.iter().find(|row| row.term == term)
    }
}

/// Fits a [`ModelSpec`] and reports its fixed effects
pub trait InferenceEngine {
    fn name(&self) -> &str;

    fn fit(&self, model: &ModelSpec) -> Result<FixedEffectsTable>;
}
