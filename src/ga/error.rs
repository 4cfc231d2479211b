//! Error types for the evolutionary engine.
//!
//! Configuration problems are reported as [`ConfigError`] before any
//! generation runs. Failures raised by caller code during a run are wrapped
//! in [`GaError::Stage`] together with the [`Stage`] that was executing.

use std::fmt;

/// A configuration error detected before the run starts.
///
/// Every variant names the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("population_size must be greater than 0")]
    InvalidPopulationSize,

    #[error("initial population must not be empty")]
    EmptyInitialPopulation,

    #[error("{field} must be in {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("selection.tournament_threshold must be in (0.5, 1], got {0}")]
    InvalidTournamentThreshold(f64),

    #[error("{field} is enabled but no operator was supplied")]
    MissingOperator { field: &'static str },

    #[error("islands.{field} is invalid: {reason}")]
    InvalidIslandConfig {
        field: &'static str,
        reason: &'static str,
    },
}

/// The pipeline stage that was running when a failure occurred.
///
/// `Selection` and `Migration` are reserved: both stages run only engine
/// code that cannot fail, so the runner does not currently report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Initialization,
    Evaluation,
    Selection,
    Reproduction,
    Migration,
    Stats,
}

impl Stage {
    /// Lowercase stage name, as used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Initialization => "initialization",
            Stage::Evaluation => "evaluation",
            Stage::Selection => "selection",
            Stage::Reproduction => "reproduction",
            Stage::Migration => "migration",
            Stage::Stats => "stats",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by [`GaRunner`](super::GaRunner).
#[derive(Debug, thiserror::Error)]
pub enum GaError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

impl GaError {
    pub(crate) fn stage(stage: Stage, source: anyhow::Error) -> Self {
        GaError::Stage { stage, source }
    }

    /// The stage that failed, if this is a runtime failure.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            GaError::Config(_) => None,
            GaError::Stage { stage, .. } => Some(*stage),
        }
    }
}
