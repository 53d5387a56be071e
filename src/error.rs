//! Error types for diseasemap.
//!
//! Every fallible operation in the crate reports one of these conditions to
//! its caller. A length or shape mismatch stops only the step that hit it:
//! a single panel, a single legend, or a single comparison.

use thiserror::Error;

/// The main error type for diseasemap operations.
#[derive(Error, Debug)]
pub enum MapError {
    /// A caller-supplied sequence has the wrong length
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// A value table with more than two dimensions
    #[error("Value table must be 1-D or 2-D, got {ndim} dimensions")]
    DimensionMismatch { ndim: usize },

    /// Both axes of a value table match the number of geographic units
    #[error("Cannot infer panel axis: both dimensions equal the unit count ({units})")]
    AmbiguousAxis { units: usize },

    /// No finite values to classify
    #[error("No finite values in {what}")]
    EmptyValues { what: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Rendering collaborator errors
    #[error("Render error: {message}")]
    Render { message: String },

    /// Inference collaborator errors
    #[error("Inference error: {message}")]
    Inference { message: String },

    /// Adjacency graph errors
    #[error("Adjacency graph error: {message}")]
    Graph { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MapError {
    /// Shorthand for a [`MapError::LengthMismatch`]
    pub fn length_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        MapError::LengthMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Variant name, logged as `error_kind`
    pub fn kind(&self) -> &'static str {
        match self {
            MapError::LengthMismatch { .. } => "length_mismatch",
            MapError::DimensionMismatch { .. } => "dimension_mismatch",
            MapError::AmbiguousAxis { .. } => "ambiguous_axis",
            MapError::EmptyValues { .. } => "empty_values",
            MapError::InvalidParameter { .. } => "invalid_parameter",
            MapError::Render { .. } => "render",
            MapError::Inference { .. } => "inference",
            MapError::Graph { .. } => "graph",
            MapError::Config { .. } => "config",
            MapError::Io(_) => "io",
            MapError::Json(_) => "json",
        }
    }

    /// Shorthand for a [`MapError::InvalidParameter`]
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        MapError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with MapError
pub type Result<T> = std::result::Result<T, MapError>;
