//! The `ndarray-condgrad` crate provides conditional gradient (Frank-Wolfe
//! family) methods for minimizing a smooth convex function of an `ndarray`
//! over a structured convex feasibility region.
//!
//! It includes:
//! - vanilla, away-step, and pairwise Frank-Wolfe with exact or line-search
//!   step sizes
//! - feasibility regions with extreme-point oracles: the scaled `l1` ball
//!   (a polytope with away steps) and the scaled `l2` ball
//! - a regularized least-squares objective with a cached Lipschitz
//!   smoothness constant
//! - an accelerated gradient descent baseline for unconstrained comparison
//!
//! Projection-free methods like these shine when projecting onto the
//! feasible set is expensive but linear minimization over it is cheap, and
//! when sparse iterates (convex combinations of few extreme points) are
//! desirable in their own right.

#[cfg(test)]
extern crate openblas_src;

pub mod agd;
pub mod error;
pub mod frank_wolfe;
pub mod objective;
pub mod region;
pub mod solution;
