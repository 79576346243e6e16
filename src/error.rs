//! Error types for Cartograph.

use thiserror::Error;

/// Cartograph error types.
#[derive(Error, Debug)]
pub enum CartographError {
    /// Two vectors (or a vector and a matrix axis) disagree on length
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Matrix operands with incompatible shapes
    #[error("Shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Element access outside the matrix
    #[error("Index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// No record stored under the given id
    #[error("Vector with id {0} not found")]
    NotFound(String),

    /// Input violates an algorithm precondition
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// SVD iteration cap reached before every singular value split off
    #[error("SVD did not converge: {unconverged} singular value(s) unresolved after {iterations} QR sweeps")]
    NonConvergence { iterations: usize, unconverged: usize },

    /// Empty input where non-empty was required
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Embedding provider failure
    #[error("Embedding provider error: {0}")]
    Embedding(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persistence I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Cartograph operations.
pub type Result<T> = std::result::Result<T, CartographError>;
