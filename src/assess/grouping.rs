//! Ordinal grouping of a combined random effect.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How the combined random effect is turned into a predictor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    Median,
    Tertile,
    Quartile,
    Quintile,
    /// Use the combined effect itself as a continuous covariate
    Trend,
    /// Caller-supplied group codes, one per unit
    User(Vec<u32>),
}

impl Grouping {
    /// Build a grouping from its name. Never fails: unknown names, and
    /// `"user"` without groups, fall back to quartiles with a warning.
    pub fn parse(name: &str, user_groups: Option<Vec<u32>>) -> Self {
        match name.to_lowercase().as_str() {
            "median" => Grouping::Median,
            "tertile" => Grouping::Tertile,
            "quartile" => Grouping::Quartile,
            "quintile" => Grouping::Quintile,
            "trend" => Grouping::Trend,
            "user" => match user_groups {
                Some(groups) => Grouping::User(groups),
                None => {
                    warn!("User grouping requested without groups, using quartiles");
                    Grouping::Quartile
                }
            },
            other => {
                warn!(grouping = other, "Unknown grouping, using quartiles");
                Grouping::Quartile
            }
        }
    }

    /// Number of rank groups, `None` for trend and user groupings
    pub fn rank_groups(&self) -> Option<usize> {
        match self {
            Grouping::Median => Some(2),
            Grouping::Tertile => Some(3),
            Grouping::Quartile => Some(4),
            Grouping::Quintile => Some(5),
            Grouping::Trend | Grouping::User(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Grouping::Median => "median",
            Grouping::Tertile => "tertile",
            Grouping::Quartile => "quartile",
            Grouping::Quintile => "quintile",
            Grouping::Trend => "trend",
            Grouping::User(_) => "user",
        }
    }
}

/// Predictor handed to the regression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Predictor {
    /// Group code per unit and the distinct codes in ascending order
    Groups { codes: Vec<u32>, levels: Vec<u32> },
    Trend(Vec<f64>),
}

impl Predictor {
    /// Units per level, in level order
    pub fn group_sizes(&self) -> Vec<(u32, usize)> {
        match self {
            Predictor::Groups { codes, levels } => levels
                .iter()
                .map(|&level| (level, codes.iter().filter(|&&c| c == level).count()))
                .collect(),
            Predictor::Trend(_) => Vec::new(),
        }
    }
}

/// Classify `combined` under `grouping`
pub fn classify(combined: &[f64], grouping: &Grouping) -> Predictor {
    match grouping {
        Grouping::Trend => Predictor::Trend(combined.to_vec()),
        Grouping::User(groups) if groups.len() == combined.len() => groups_predictor(groups.clone()),
        Grouping::User(groups) => {
            warn!(
                expected = combined.len(),
                actual = groups.len(),
                "User groups have the wrong length, using quartiles"
            );
            groups_predictor(rank_groups(combined, 4))
        }
        rank => groups_predictor(rank_groups(combined, rank.rank_groups().unwrap_or(4))),
    }
}

/// Split values into `k` groups of near-equal size by rank position.
///
/// The value at sorted position `p` gets group `p * k / n + 1`. Ties keep
/// their input order.
pub fn rank_groups(values: &[f64], k: usize) -> Vec<u32> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut codes = vec![0u32; n];
    for (position, &index) in order.iter().enumerate() {
        codes[index] = (position * k / n) as u32 + 1;
    }
    codes
}

fn groups_predictor(codes: Vec<u32>) -> Predictor {
    let mut levels = codes.clone();
    levels.sort_unstable();
    levels.dedup();
    Predictor::Groups { codes, levels }
}
