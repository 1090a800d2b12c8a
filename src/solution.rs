//! Terminal reports returned by the optimizers.

use ndarray::prelude::*;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The convergence criterion was met: the duality measure dropped to
    /// the configured threshold, or progress stagnated below `psi`.
    Converged,
    /// The iteration budget ran out; the best iterate so far is returned.
    MaxIterationsReached,
}

/// Outcome of one `optimize()` run.
#[derive(Debug, Clone)]
pub struct Solution<S> {
    /// Final candidate solution.
    pub iterate: Array1<S>,
    /// Objective values: the initial loss followed by one entry per
    /// completed step.
    pub loss_history: Vec<S>,
    /// Per-iteration dual optimality measure: the Frank-Wolfe gap for the
    /// conditional gradient methods, the gradient norm at the momentum
    /// point for accelerated gradient descent.
    pub gap_history: Vec<S>,
    /// Number of completed steps (`loss_history.len() - 1`).
    pub iterations: usize,
    /// Terminal state of the run.
    pub termination: Termination,
}
