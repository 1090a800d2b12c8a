//! Convex feasibility regions and their extreme-point oracles.
//!
//! Conditional gradient methods never project onto the feasible set; they
//! only query it. Every region answers linear minimization,
//! ```math
//! v = \mathrm{arg}\!\min_{u \in \mathcal{C}} \langle u, d \rangle,
//! ```
//! which for the norm balls here always lands on an extreme point of the
//! boundary. Polytope regions have finitely many extreme points and answer
//! two more questions about a running active set: which active vertex an
//! away step should shrink, and whether a freshly minimizing vertex is
//! already active. The optimizer discovers that capability through
//! [`FeasibilityRegion::as_polytope`] instead of assuming a uniform
//! interface.

mod l1ball;
pub use l1ball::*;
mod l2ball;
pub use l2ball::*;

use crate::error::SolverError;
use ndarray::prelude::*;
use ndarray::NdFloat;

/// Sparse identity of a signed scaled standard basis vector, the extreme
/// point family of the `l1` ball.
///
/// The dense form is `sign * radius * e_index` with `sign` either `1` or
/// `-1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisVertex<S> {
    /// Coordinate carrying the single nonzero entry.
    pub index: usize,
    /// Orientation along that coordinate.
    pub sign: S,
}

impl<S: NdFloat> BasisVertex<S> {
    /// Materializes the dense vertex `sign * radius * e_index`.
    pub fn to_dense(&self, dimension: usize, radius: S) -> Array1<S> {
        let mut vertex = Array1::zeros(dimension);
        vertex[self.index] = self.sign * radius;
        vertex
    }
}

/// Outcome of a linear minimization oracle query.
#[derive(Debug, Clone)]
pub struct FwVertex<S> {
    /// Extreme point minimizing `⟨v, direction⟩` over the region.
    pub vertex: Array1<S>,
    /// The Frank-Wolfe gap `⟨direction, x - vertex⟩` at the query point,
    /// an upper bound on the optimality gap for convex objectives.
    pub gap: S,
    /// Coordinate identity of the vertex for polytope regions whose
    /// extreme points are signed scaled basis vectors; `None` when the
    /// boundary has no finite vertex set.
    pub basis: Option<BasisVertex<S>>,
}

/// A convex body queried through extreme-point oracles.
///
/// Implementations are immutable once constructed and shared read-only
/// with any number of optimization runs.
pub trait FeasibilityRegion<S: NdFloat> {
    /// Size of the ambient vector space.
    fn dimension(&self) -> usize;

    /// Scale of the region.
    fn radius(&self) -> S;

    /// Deterministic starting extreme point, `radius * e_1`.
    fn initial_vertex(&self) -> Array1<S> {
        let mut vertex = Array1::zeros(self.dimension());
        vertex[0] = self.radius();
        vertex
    }

    /// Extreme point minimizing `⟨v, direction⟩`, together with the
    /// Frank-Wolfe gap at `x`.
    ///
    /// An all-zero `direction` has no boundary minimizer and is rejected
    /// with [`SolverError::DegenerateDirection`]; callers treat an exactly
    /// zero gradient as convergence before querying.
    fn linear_minimization_oracle(
        &self,
        x: ArrayView1<S>,
        direction: ArrayView1<S>,
    ) -> Result<FwVertex<S>, SolverError>;

    /// The polytope capability of this region, if it has one.
    fn as_polytope(&self) -> Option<&dyn Polytope<S>> {
        None
    }
}

/// Extra oracles available on regions with finitely many extreme points.
///
/// Implementations must fill [`FwVertex::basis`] from their linear
/// minimization oracle so the optimizer can deduplicate active vertices.
pub trait Polytope<S: NdFloat>: FeasibilityRegion<S> {
    /// Among the active vertices (columns of `active_vertices`), the one
    /// *maximizing* `⟨column, direction⟩`, the best candidate to move
    /// away from, and its column index. Ties break toward the lowest
    /// index.
    ///
    /// Panics when called with no active columns; a running optimizer
    /// keeps the active set non-empty.
    fn away_oracle(
        &self,
        active_vertices: ArrayView2<S>,
        direction: ArrayView1<S>,
    ) -> (Array1<S>, usize);

    /// Exact-match lookup of the sparse candidate column `{value at
    /// nonzero_index}` among the active columns; `None` when absent.
    ///
    /// Comparison is exact floating-point equality on purpose: this vertex
    /// family reproduces bit-identically, so no tolerance band is needed
    /// (and none would be safe for active-set bookkeeping).
    fn vertex_among_active_vertices(
        &self,
        active_vertices: ArrayView2<S>,
        nonzero_index: usize,
        value: S,
    ) -> Option<usize>;
}
