//! Error types for grid-world construction, solving and export.

use crate::envs::grid_world::State;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GridWorldError>;

#[derive(Debug, Error)]
pub enum GridWorldError {
    #[error("Grid world must have at least one row and one column")]
    EmptyGrid,

    #[error("Grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Reward table is {found_rows}x{found_cols}, grid is {rows}x{cols}")]
    RewardShapeMismatch {
        rows: usize,
        cols: usize,
        found_rows: usize,
        found_cols: usize,
    },

    #[error("Initial state {0} is outside the grid")]
    InitialStateOutOfBounds(State),

    #[error("Unknown cell symbol: '{0}'")]
    UnknownCellSymbol(String),

    #[error("Unknown algorithm '{0}', expected value_iteration or policy_iteration")]
    UnknownAlgorithm(String),

    #[error("Discount factor must lie in (0, 1), got {0}")]
    InvalidGamma(f64),

    #[error("Maximum error epsilon must be positive, got {0}")]
    InvalidEpsilon(f64),

    #[error("Policy evaluation needs at least one sweep per round")]
    InvalidEvaluationSweeps,

    #[error("Cell probabilities must be non-negative and sum to 1.0, got {0}")]
    InvalidCellProbabilities(f64),

    #[error("Cannot step from {0}: not a valid state")]
    InvalidState(State),

    #[error("Transition weights rejected: {0}")]
    Weights(#[from] rand::distributions::WeightedError),

    #[error("Failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
}
