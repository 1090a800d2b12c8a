//! Smooth objective functions and step-size selection.
//!
//! [`ObjectiveFunction`] is everything a solver in this crate needs from
//! the function being minimized: point evaluations of the loss and
//! gradient, a global smoothness constant, and a scalar step length
//! along a given search direction. [`L2Loss`] is the concrete
//! regularized least-squares objective
//!
//! ```math
//! f(x) = \frac{1}{m}\|Ax + b\|_2^2 + \frac{\lambda}{2}\|x\|_2^2
//! ```
//!
//! whose quadratic structure gives a closed-form step size and a cheap
//! smoothness constant.
#![allow(non_snake_case)]

use crate::error::SolverError;
use ndarray::prelude::*;
use ndarray::NdFloat;
use ndarray_linalg::eigh::Eigh;
use ndarray_linalg::lapack::Lapack;
use ndarray_linalg::{Scalar, UPLO};
use num_traits::{Float, ToPrimitive};

/// Rule for choosing the step length along a search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSizeRule {
    /// Closed-form minimizer of the objective along the direction.
    Exact,
    /// Bisection on the directional derivative over `[0, 1]`. Slower
    /// than [`StepSizeRule::Exact`] but needs no closed form, so it
    /// also fits objectives that are not quadratic.
    LineSearch {
        /// Number of bisection halvings.
        iterations: usize,
    },
}

impl Default for StepSizeRule {
    fn default() -> Self {
        StepSizeRule::Exact
    }
}

/// Contract between a smooth objective and the solvers in this crate.
///
/// Implementations are immutable and receive read-only views, so one
/// objective can back any number of runs.
pub trait ObjectiveFunction<S: NdFloat> {
    /// The loss at `x`.
    fn evaluate_loss(&self, x: ArrayView1<S>) -> S;

    /// The gradient of the loss at `x`.
    fn evaluate_gradient(&self, x: ArrayView1<S>) -> Array1<S>;

    /// A global Lipschitz constant of the gradient.
    fn smoothness_constant(&self) -> S;

    /// A step length in `[0, 1]` minimizing `loss(x + gamma*direction)`
    /// over that interval, up to the accuracy of the chosen rule.
    ///
    /// `gradient` must be the gradient at `x`; conditional-gradient
    /// callers already have it, so it is passed in rather than
    /// recomputed.
    fn evaluate_step_size(
        &self,
        x: ArrayView1<S>,
        gradient: ArrayView1<S>,
        direction: ArrayView1<S>,
        rule: StepSizeRule,
    ) -> S;
}

/// Regularized least squares
///
/// ```math
/// f(x) = \frac{1}{m}\|Ax + b\|_2^2 + \frac{\lambda}{2}\|x\|_2^2
/// ```
///
/// over an `m × n` data matrix `A`, a length-`m` label vector `b`, and a
/// non-negative regularization weight `λ`. The Gram matrix `AᵀA`, the
/// correlation vector `Aᵀb`, and the smoothness constant are computed
/// once at construction so each iteration costs matrix-vector products
/// only.
#[derive(Debug, Clone)]
pub struct L2Loss<S> {
    data_matrix: Array2<S>,
    labels: Array1<S>,
    regularization_weight: S,
    gram: Array2<S>,
    correlation: Array1<S>,
    smoothness: S,
}

impl<S> L2Loss<S>
where
    S: NdFloat + Scalar<Real = S> + Lapack,
{
    /// Validates the problem data and caches its quadratic structure.
    ///
    /// The smoothness constant is
    ///
    /// ```math
    /// L = \frac{2}{m}\lambda_{max}(A^T A) + \lambda
    /// ```
    ///
    /// with the largest eigenvalue taken from the LAPACK symmetric
    /// eigendecomposition of the Gram matrix.
    ///
    /// # Errors
    /// `EmptyData` when either side of the data matrix is zero,
    /// `LabelMismatch` when the label length differs from the row
    /// count, `InvalidRegularization` for a negative or non-finite
    /// weight, and `Eigendecomposition` when LAPACK rejects the Gram
    /// matrix.
    pub fn new(
        data_matrix: Array2<S>,
        labels: Array1<S>,
        regularization_weight: S,
    ) -> Result<Self, SolverError> {
        let (rows, cols) = data_matrix.dim();
        if rows == 0 || cols == 0 {
            return Err(SolverError::EmptyData { rows, cols });
        }
        if labels.len() != rows {
            return Err(SolverError::LabelMismatch {
                rows,
                labels: labels.len(),
            });
        }
        if !(regularization_weight >= S::zero()) || !regularization_weight.is_finite() {
            return Err(SolverError::InvalidRegularization(
                regularization_weight.to_f64().unwrap_or(f64::NAN),
            ));
        }
        let gram = data_matrix.t().dot(&data_matrix);
        let correlation = data_matrix.t().dot(&labels);
        let (eigenvalues, _) = gram
            .eigh(UPLO::Upper)
            .map_err(|e| SolverError::Eigendecomposition(e.to_string()))?;
        let largest = eigenvalues.fold(S::neg_infinity(), |acc, &v| acc.max(v));
        let m = S::from(rows).unwrap();
        let smoothness = S::from(2.).unwrap() / m * largest + regularization_weight;
        Ok(L2Loss {
            data_matrix,
            labels,
            regularization_weight,
            gram,
            correlation,
            smoothness,
        })
    }
}

impl<S: NdFloat> ObjectiveFunction<S> for L2Loss<S> {
    fn evaluate_loss(&self, x: ArrayView1<S>) -> S {
        let m = S::from(self.labels.len()).unwrap();
        let two = S::from(2.).unwrap();
        let residual = self.data_matrix.dot(&x) + &self.labels;
        residual.dot(&residual) / m + self.regularization_weight / two * x.dot(&x)
    }

    fn evaluate_gradient(&self, x: ArrayView1<S>) -> Array1<S> {
        let m = S::from(self.labels.len()).unwrap();
        let two = S::from(2.).unwrap();
        let regularizer = &x * (m / two * self.regularization_weight);
        (self.gram.dot(&x) + &self.correlation + &regularizer) * (two / m)
    }

    fn smoothness_constant(&self) -> S {
        self.smoothness
    }

    fn evaluate_step_size(
        &self,
        x: ArrayView1<S>,
        gradient: ArrayView1<S>,
        direction: ArrayView1<S>,
        rule: StepSizeRule,
    ) -> S {
        let two = S::from(2.).unwrap();
        match rule {
            // loss(x + gamma*direction) is a parabola in gamma; its
            // vertex -slope/curvature is the minimizer, clipped into
            // [0, 1].
            StepSizeRule::Exact => {
                let m = S::from(self.labels.len()).unwrap();
                let slope = gradient.dot(&direction);
                let transformed = self.data_matrix.dot(&direction);
                let curvature = two / m * transformed.dot(&transformed)
                    + self.regularization_weight * direction.dot(&direction);
                if curvature <= S::zero() {
                    return S::one();
                }
                (-slope / curvature).min(S::one()).max(S::zero())
            }
            StepSizeRule::LineSearch { iterations } => {
                let slope_at = |gamma: S| {
                    let probe = &x + &(&direction * gamma);
                    self.evaluate_gradient(probe.view()).dot(&direction)
                };
                // Still descending at the far end of the interval.
                if slope_at(S::one()) <= S::zero() {
                    return S::one();
                }
                let mut low = S::zero();
                let mut high = S::one();
                for _ in 0..iterations {
                    let mid = (low + high) / two;
                    if slope_at(mid) > S::zero() {
                        high = mid;
                    } else {
                        low = mid;
                    }
                }
                (low + high) / two
            }
        }
    }
}
