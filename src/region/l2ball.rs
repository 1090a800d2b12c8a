//! The scaled Euclidean ball.
//!
//! Its boundary is smooth, with no finite extreme-point set; linear
//! minimization lands at radius opposite the query direction,
//! ```math
//! \mathrm{arg}\!\min_{\|v\|_2 \leq r} \langle v, d \rangle = -r \frac{d}{\|d\|_2},
//! ```
//! so only the vanilla Frank-Wolfe update applies here; there is no away
//! oracle to shrink an active vertex with.

use super::{FeasibilityRegion, FwVertex};
use crate::error::SolverError;
use ndarray::prelude::*;
use ndarray::NdFloat;
use num_traits::{Float, ToPrimitive};

/// The region `{v : ‖v‖₂ ≤ radius}` in `dimension` coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L2Ball<S> {
    dimension: usize,
    radius: S,
}

impl<S: NdFloat> L2Ball<S> {
    /// Validates and builds the region.
    pub fn new(dimension: usize, radius: S) -> Result<Self, SolverError> {
        if dimension == 0 {
            return Err(SolverError::InvalidDimension(dimension));
        }
        if !(radius > S::zero()) || !radius.is_finite() {
            return Err(SolverError::InvalidRadius(
                radius.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(L2Ball { dimension, radius })
    }
}

impl<S: NdFloat> FeasibilityRegion<S> for L2Ball<S> {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn radius(&self) -> S {
        self.radius
    }

    fn linear_minimization_oracle(
        &self,
        x: ArrayView1<S>,
        direction: ArrayView1<S>,
    ) -> Result<FwVertex<S>, SolverError> {
        let norm = direction.dot(&direction).sqrt();
        if norm == S::zero() {
            return Err(SolverError::DegenerateDirection);
        }
        let vertex = &direction * (-(self.radius / norm));
        // ⟨direction, vertex⟩ = -radius·‖direction‖, exactly
        let gap = direction.dot(&x) + self.radius * norm;
        Ok(FwVertex {
            vertex,
            gap,
            basis: None,
        })
    }
}
