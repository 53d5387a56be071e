//! Compare disease rates across groups of a fitted spatial effect.
//!
//! The unstructured and structured random effects of a previous fit are
//! summed, the sum is split into ordinal groups (or used as a trend), and
//! the response is regressed on that grouping through an
//! [`InferenceEngine`]. The result is one row per contrast against the
//! lowest group.

pub mod engine;
pub mod gaussian;
pub mod graph;
pub mod grouping;

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::error::{MapError, Result};
use crate::logging::Operation;

pub use engine::{
    ApproximationStrategy, FixedEffect, FixedEffectsTable, InferenceEngine, ModelSpec, PriorSpec,
    RandomEffect,
};
pub use gaussian::GaussianFixedEffects;
pub use graph::AdjacencyGraph;
pub use grouping::{classify, rank_groups, Grouping, Predictor};

/// One contrast with its 95% credible interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub label: String,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoefficientTable {
    pub rows: Vec<Coefficient>,
}

impl CoefficientTable {
    pub fn get(&self, label: &str) -> Option<&Coefficient> {
        self.rows.iter().find(|row| row.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.label.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub predictor: Predictor,
    pub table: CoefficientTable,
}

/// Regress `x` on groups of `u + v`.
///
/// `v` may hold a single value, which is added to every unit. `graph` is the
/// neighbour file of the structured random effect.
pub fn assess_map(
    engine: &dyn InferenceEngine,
    u: &[f64],
    v: &[f64],
    x: &[f64],
    grouping: &Grouping,
    graph: &Path,
) -> Result<Assessment> {
    let operation = Operation::start("assess_map", grouping.name());
    let result = run_assessment(&operation, engine, u, v, x, grouping, graph);
    operation.finish(result)
}

fn run_assessment(
    operation: &Operation,
    engine: &dyn InferenceEngine,
    u: &[f64],
    v: &[f64],
    x: &[f64],
    grouping: &Grouping,
    graph: &Path,
) -> Result<Assessment> {
    let combined = combine_effects(u, v)?;
    if x.len() != u.len() {
        return Err(MapError::length_mismatch("response values", u.len(), x.len()));
    }

    let predictor = classify(&combined, grouping);
    info!(
        grouping = grouping.name(),
        units = u.len(),
        groups = ?predictor.group_sizes(),
        engine = engine.name(),
        "Fitting group comparison"
    );

    let model = ModelSpec::new(x.to_vec(), predictor, graph.to_path_buf());
    let reference = model.reference_level();
    let fitted = operation.step("fit", || engine.fit(&model))?;

    let rows = fitted
        .rows
        .into_iter()
        .filter(|row| row.term != engine::INTERCEPT)
        .map(|row| Coefficient {
            label: contrast_label(&row.term, reference),
            estimate: row.mean,
            lower: row.lower,
            upper: row.upper,
        })
        .collect();

    Ok(Assessment {
        predictor: model.predictor,
        table: CoefficientTable { rows },
    })
}

/// `u + v`, broadcasting a single-valued `v`
pub fn combine_effects(u: &[f64], v: &[f64]) -> Result<Vec<f64>> {
    match v {
        [single] => Ok(u.iter().map(|a| a + single).collect()),
        _ if v.len() == u.len() => Ok(u.iter().zip(v).map(|(a, b)| a + b).collect()),
        _ => Err(MapError::length_mismatch("structured effect", u.len(), v.len())),
    }
}

fn contrast_label(term: &str, reference: Option<u32>) -> String {
    if term == engine::TREND_TERM {
        return "linear trend".to_string();
    }
    match (term.strip_prefix("group"), reference) {
        (Some(level), Some(reference)) => format!("group {} vs group {}", level, reference),
        _ => term.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records the model it was given and returns fixed rows
    struct StubEngine {
        seen: RefCell<Option<ModelSpec>>,
    }

    impl StubEngine {
        fn new() -> Self {
            Self {
                seen: RefCell::new(None),
            }
        }
    }

    impl InferenceEngine for StubEngine {
        fn name(&self) -> &str {
            "stub"
        }

        fn fit(&self, model: &ModelSpec) -> Result<FixedEffectsTable> {
            *self.seen.borrow_mut() = Some(model.clone());
            let (_, names) = model.design();
            let rows = names
                .into_iter()
                .enumerate()
                .map(|(j, term)| FixedEffect {
                    term,
                    mean: j as f64,
                    sd: 0.1,
                    lower: j as f64 - 0.2,
                    upper: j as f64 + 0.2,
                })
                .collect();
            Ok(FixedEffectsTable { rows })
        }
    }

    #[test]
    fn test_median_grouping_with_broadcast() {
        let engine = StubEngine::new();
        let assessment = assess_map(
            &engine,
            &[1.0, 2.0, 3.0, 4.0],
            &[0.0],
            &[0.5, 0.7, 1.4, 1.6],
            &Grouping::Median,
            Path::new("map.graph"),
        )
        .unwrap();

        assert_eq!(
            assessment.predictor,
            Predictor::Groups {
                codes: vec![1, 1, 2, 2],
                levels: vec![1, 2]
            }
        );
        assert_eq!(assessment.table.labels(), vec!["group 2 vs group 1"]);
        assert_eq!(assessment.table.rows[0].estimate, 1.0);

        let seen = engine.seen.borrow();
        let model = seen.as_ref().unwrap();
        assert_eq!(model.response, vec![0.5, 0.7, 1.4, 1.6]);
        assert_eq!(model.strategy, ApproximationStrategy::Laplace);
        assert!(model.random_effects.contains(&RandomEffect::Iid));
    }

    #[test]
    fn test_quartile_labels() {
        let engine = StubEngine::new();
        let u: Vec<f64> = (0..8).map(f64::from).collect();
        let assessment = assess_map(
            &engine,
            &u,
            &vec![0.0; 8],
            &u,
            &Grouping::Quartile,
            Path::new("map.graph"),
        )
        .unwrap();
        assert_eq!(
            assessment.table.labels(),
            vec!["group 2 vs group 1", "group 3 vs group 1", "group 4 vs group 1"]
        );
    }

    #[test]
    fn test_trend_label() {
        let engine = StubEngine::new();
        let assessment = assess_map(
            &engine,
            &[0.3, 0.1, 0.2],
            &[0.1, 0.1, 0.1],
            &[1.0, 2.0, 3.0],
            &Grouping::Trend,
            Path::new("map.graph"),
        )
        .unwrap();
        assert_eq!(assessment.table.labels(), vec!["linear trend"]);
        assert!(matches!(assessment.predictor, Predictor::Trend(ref t) if t.len() == 3));
    }

    #[test]
    fn test_length_mismatches() {
        let engine = StubEngine::new();
        let graph = Path::new("map.graph");
        let err = assess_map(&engine, &[1.0, 2.0, 3.0], &[0.0, 1.0], &[1.0, 2.0, 3.0], &Grouping::Median, graph)
            .unwrap_err();
        assert!(matches!(err, MapError::LengthMismatch { expected: 3, actual: 2, .. }));

        let err = assess_map(&engine, &[1.0, 2.0], &[0.0], &[1.0], &Grouping::Median, graph).unwrap_err();
        assert!(matches!(err, MapError::LengthMismatch { expected: 2, actual: 1, .. }));
        assert!(engine.seen.borrow().is_none());
    }

    #[test]
    fn test_combine_effects() {
        assert_eq!(combine_effects(&[1.0, 2.0], &[0.5]).unwrap(), vec![1.5, 2.5]);
        assert_eq!(combine_effects(&[1.0, 2.0], &[1.0, -1.0]).unwrap(), vec![2.0, 1.0]);
        // A single unit with a single effect is not a broadcast ambiguity
        assert_eq!(combine_effects(&[1.0], &[2.0]).unwrap(), vec![3.0]);
    }
}
