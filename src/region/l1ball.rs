//! The scaled `l1` ball, a polytope whose `2n` extreme points are the
//! signed scaled standard basis vectors `±radius·e_i`.
//!
//! Linear minimization over it is a single pass over the direction:
//! ```math
//! \mathrm{arg}\!\min_{\|v\|_1 \leq r} \langle v, d \rangle
//!   = -r \,\mathrm{sign}(d_{i^*})\, e_{i^*},
//! \qquad i^* = \mathrm{arg}\!\max_i |d_i|
//! ```
//! which also makes it the canonical region for away-step and pairwise
//! Frank-Wolfe: active vertices have an exact sparse identity, so the
//! active set stays honest under floating point.

use super::{BasisVertex, FeasibilityRegion, FwVertex, Polytope};
use crate::error::SolverError;
use ndarray::prelude::*;
use ndarray::NdFloat;
use num_traits::{Float, ToPrimitive};

/// The region `{v : ‖v‖₁ ≤ radius}` in `dimension` coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L1Ball<S> {
    dimension: usize,
    radius: S,
}

impl<S: NdFloat> L1Ball<S> {
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
        Ok(L1Ball { dimension, radius })
    }
}

impl<S: NdFloat> FeasibilityRegion<S> for L1Ball<S> {
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
        // first-occurrence argmax of |direction|, ties to the lowest index
        let mut index = 0;
        let mut best = S::zero();
        for (i, &d) in direction.iter().enumerate() {
            if d.abs() > best {
                best = d.abs();
                index = i;
            }
        }
        if best == S::zero() {
            return Err(SolverError::DegenerateDirection);
        }
        let sign = if direction[index] > S::zero() {
            -S::one()
        } else {
            S::one()
        };
        let basis = BasisVertex { index, sign };
        let vertex = basis.to_dense(self.dimension, self.radius);
        // the vertex is 1-sparse, so ⟨direction, vertex⟩ is a single term
        let gap = direction.dot(&x) - direction[index] * vertex[index];
        Ok(FwVertex {
            vertex,
            gap,
            basis: Some(basis),
        })
    }

    fn as_polytope(&self) -> Option<&dyn Polytope<S>> {
        Some(self)
    }
}

impl<S: NdFloat> Polytope<S> for L1Ball<S> {
    fn away_oracle(
        &self,
        active_vertices: ArrayView2<S>,
        direction: ArrayView1<S>,
    ) -> (Array1<S>, usize) {
        let mut best: Option<(usize, S)> = None;
        for (column, vertex) in active_vertices.axis_iter(Axis(1)).enumerate() {
            let score = vertex.dot(&direction);
            match best {
                Some((_, high)) if score <= high => {}
                _ => best = Some((column, score)),
            }
        }
        let (index, _) = best.expect("away oracle requires a non-empty active set");
        (active_vertices.column(index).to_owned(), index)
    }

    #[allow(clippy::float_cmp)]
    fn vertex_among_active_vertices(
        &self,
        active_vertices: ArrayView2<S>,
        nonzero_index: usize,
        value: S,
    ) -> Option<usize> {
        // active columns are 1-sparse with their nonzero on their own
        // support row, so matching the candidate's single entry decides
        // column equality
        active_vertices
            .row(nonzero_index)
            .iter()
            .position(|&entry| entry == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn initial_vertex_is_the_scaled_first_basis_vector() {
        let ball = L1Ball::new(5, 2.).unwrap();
        assert_eq!(ball.initial_vertex(), array![2., 0., 0., 0., 0.]);
    }

    #[test]
    fn lmo_selects_the_steepest_coordinate() {
        let ball = L1Ball::new(5, 2.).unwrap();
        let x = array![0.1, 0.2, 0.3, 0.4, 0.5];
        let direction = array![0., 1., 0., 0., 0.];
        let fw = ball
            .linear_minimization_oracle(x.view(), direction.view())
            .unwrap();
        assert_eq!(fw.vertex, array![0., -2., 0., 0., 0.]);
        let basis = fw.basis.unwrap();
        assert_eq!(basis.index, 1);
        assert_eq!(basis.sign, -1.);
        assert_abs_diff_eq!(fw.gap, 2.2, epsilon = 1e-12);
        assert!(fw.vertex.dot(&direction) <= 0.);
    }

    #[test]
    fn lmo_ties_break_to_the_lowest_index() {
        let ball = L1Ball::new(3, 1.).unwrap();
        let x = Array1::zeros(3);
        let direction = array![1., 1., 0.];
        let fw = ball
            .linear_minimization_oracle(x.view(), direction.view())
            .unwrap();
        assert_eq!(fw.basis.unwrap().index, 0);
        assert_eq!(fw.vertex, array![-1., 0., 0.]);
    }

    #[test]
    fn lmo_minimizes_over_all_extreme_points() {
        let ball = L1Ball::new(4, 3.).unwrap();
        let x = array![0.3, -0.1, 0.0, 0.2];
        let direction = array![0.4, -1.7, 0.2, 0.9];
        let fw = ball
            .linear_minimization_oracle(x.view(), direction.view())
            .unwrap();
        // brute force over the 2n extreme points
        let mut smallest = f64::INFINITY;
        for index in 0..4 {
            for &signed in &[-3.0, 3.0] {
                let mut vertex = Array1::zeros(4);
                vertex[index] = signed;
                smallest = smallest.min(vertex.dot(&direction));
            }
        }
        assert_abs_diff_eq!(fw.vertex.dot(&direction), smallest, epsilon = 1e-12);
    }

    #[test]
    fn lmo_rejects_a_zero_direction() {
        let ball = L1Ball::new(3, 1.).unwrap();
        let x = array![0.5, 0., 0.];
        let err = ball
            .linear_minimization_oracle(x.view(), Array1::zeros(3).view())
            .unwrap_err();
        assert_eq!(err, SolverError::DegenerateDirection);
    }

    #[test]
    fn away_oracle_maximizes_over_active_columns() {
        let ball = L1Ball::new(5, 2.).unwrap();
        let active = array![
            [1.0, 0.0],
            [0.8, 0.811],
            [0.8, 0.0],
            [0.7, 0.0],
            [0.6, 0.0]
        ];
        let direction = array![0., 1., 0., 0., 0.];
        let (vertex, index) = ball.away_oracle(active.view(), direction.view());
        assert_eq!(vertex, array![0., 0.811, 0., 0., 0.]);
        assert_eq!(index, 1);
    }

    #[test]
    fn away_oracle_ties_break_to_the_lowest_index() {
        let ball = L1Ball::new(2, 1.).unwrap();
        let active = array![[1., 1.], [0., 0.]];
        let direction = array![1., 0.];
        let (_, index) = ball.away_oracle(active.view(), direction.view());
        assert_eq!(index, 0);
    }

    #[test]
    fn active_vertex_lookup_matches_exactly_or_not_at_all() {
        let ball = L1Ball::new(2, 2.).unwrap();
        let active = array![[1., -1., 0.], [0., 0., 1.]];
        // a radius-scaled candidate does not match unscaled columns
        assert_eq!(ball.vertex_among_active_vertices(active.view(), 1, -2.), None);
        assert_eq!(
            ball.vertex_among_active_vertices(active.view(), 0, -1.),
            Some(1)
        );
        assert_eq!(
            ball.vertex_among_active_vertices(active.view(), 1, 1.),
            Some(2)
        );
        let single = array![[1.]];
        assert_eq!(
            ball.vertex_among_active_vertices(single.view(), 0, 1.),
            Some(0)
        );
    }

    #[test]
    fn construction_validates_dimension_and_radius() {
        assert_eq!(
            L1Ball::new(0, 1.).unwrap_err(),
            SolverError::InvalidDimension(0)
        );
        assert_eq!(
            L1Ball::new(3, 0.).unwrap_err(),
            SolverError::InvalidRadius(0.)
        );
        assert_eq!(
            L1Ball::new(3, -2.).unwrap_err(),
            SolverError::InvalidRadius(-2.)
        );
        assert!(L1Ball::new(3, f64::INFINITY).is_err());
        assert!(L1Ball::new(3, f64::NAN).is_err());
    }

    #[test]
    fn polytope_capability_is_present() {
        let ball = L1Ball::new(3, 1.).unwrap();
        assert!(ball.as_polytope().is_some());
    }
}
