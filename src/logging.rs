//! Structured logging for diseasemap.
//!
//! Each public entry point runs as an [`Operation`]: it gets a uuid, logs
//! its start, and logs its outcome with the elapsed time. Steps inside an
//! operation carry the same id, so one grep finds a whole map or comparison.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::error::{MapError, Result};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`. Calling this again once a
/// subscriber is installed does nothing.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
    if installed.is_err() {
        debug!("Tracing subscriber already installed");
    }
}

/// Counts logged when a figure is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureStats {
    pub panels: usize,
    pub failed: usize,
    pub units: usize,
    pub n_col: usize,
}

/// One logged call of a public entry point
#[derive(Debug)]
pub struct Operation {
    name: &'static str,
    id: String,
    start: Instant,
}

impl Operation {
    /// Log the start of `name` applied to `subject` (a map title, a grouping)
    pub fn start(name: &'static str, subject: &str) -> Self {
        let id = generate_operation_id();
        info!(operation = name, operation_id = %id, subject, "Starting");
        Self {
            name,
            id,
            start: Instant::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Run one step of the operation, logging its duration at debug level
    pub fn step<F, R>(&self, step: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let begun = Instant::now();
        let result = f();
        debug!(
            operation = self.name,
            operation_id = %self.id,
            step,
            duration_ms = begun.elapsed().as_secs_f64() * 1000.0,
            "Step finished"
        );
        result
    }

    /// Log what a finished figure contains; failed panels raise it to warn
    pub fn record_figure(&self, stats: FigureStats) {
        if stats.failed > 0 {
            warn!(
                operation = self.name,
                operation_id = %self.id,
                panels = stats.panels,
                failed = stats.failed,
                units = stats.units,
                n_col = stats.n_col,
                "Figure rendered with failed panels"
            );
        } else {
            info!(
                operation = self.name,
                operation_id = %self.id,
                panels = stats.panels,
                units = stats.units,
                n_col = stats.n_col,
                "Figure rendered"
            );
        }
    }

    /// Log the outcome and hand the result back unchanged
    pub fn finish<T>(self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => info!(
                operation = self.name,
                operation_id = %self.id,
                duration_ms = self.elapsed_ms(),
                "Completed"
            ),
            Err(e) => log_error(e, &self),
        }
        result
    }
}

/// Log a failed operation with the error's kind
pub fn log_error(error: &MapError, operation: &Operation) {
    error!(
        operation = operation.name,
        operation_id = %operation.id,
        error_kind = error.kind(),
        duration_ms = operation.elapsed_ms(),
        "{}",
        error
    );
}

/// Generate a unique operation ID
pub fn generate_operation_id() -> String {
    Uuid::new_v4().to_string()
}
