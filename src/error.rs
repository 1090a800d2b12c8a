//! Error type shared by region and objective constructors and the optimizers.

use crate::frank_wolfe::Variant;

/// Failures surfaced by this crate.
///
/// Non-convergence is deliberately absent: running out of iterations is a
/// reported terminal state, not an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    /// The ambient space must have at least one coordinate.
    #[error("dimension must be at least 1, got {0}")]
    InvalidDimension(usize),
    /// Region scale must be a positive finite real.
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f64),
    /// The regularization weight must be a non-negative finite real.
    #[error("regularization weight must be non-negative and finite, got {0}")]
    InvalidRegularization(f64),
    /// The data matrix has no rows or no columns.
    #[error("data matrix must have at least one row and one column, got {rows}x{cols}")]
    EmptyData { rows: usize, cols: usize },
    /// The label vector does not pair with the data matrix rows.
    #[error("labels length {labels} does not match the data matrix row count {rows}")]
    LabelMismatch { rows: usize, labels: usize },
    /// A linear minimization oracle was queried with an all-zero direction,
    /// for which no boundary minimizer is defined.
    #[error("linear minimization oracle queried with a zero direction")]
    DegenerateDirection,
    /// Away-step and pairwise updates need the away oracle, which only
    /// polytope regions provide.
    #[error("the {0:?} variant requires a feasibility region with an away oracle")]
    UnsupportedVariant(Variant),
    /// The symmetric eigendecomposition behind the smoothness constant
    /// failed in LAPACK.
    #[error("eigendecomposition of the Gram matrix failed: {0}")]
    Eigendecomposition(String),
}
