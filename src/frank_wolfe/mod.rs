//! Conditional-gradient (Frank-Wolfe) solvers.
//!
//! These methods minimize a smooth convex objective over a convex
//! region using only the region's linear minimization oracle, so they
//! never project: every iterate is a convex combination of extreme
//! points and stays feasible by construction. The away-step and
//! pairwise variants additionally keep that combination explicit, which
//! lets them remove badly-placed vertices and recover fast convergence
//! on polytopes.
#![allow(non_snake_case)]

mod active_set;

use self::active_set::ActiveSet;
use crate::error::SolverError;
use crate::objective::{ObjectiveFunction, StepSizeRule};
use crate::region::{FeasibilityRegion, FwVertex, Polytope};
use crate::solution::{Solution, Termination};
use log::{debug, trace};
use ndarray::NdFloat;
use num_traits::Float;

/// Flavor of the conditional-gradient update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Step toward the oracle vertex only. Works over any region.
    Vanilla,
    /// Per iteration, either step toward the oracle vertex or away from
    /// the worst active vertex, whichever promises the larger decrease.
    /// Needs a polytope region.
    AwayStep,
    /// Move mass directly from the worst active vertex onto the oracle
    /// vertex. Needs a polytope region.
    Pairwise,
}

/// Conditional-gradient minimization of a smooth objective over a
/// convex feasibility region, after [\[FW56\]](#references).
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// v_k &= \mathrm{arg}\!\min_{v \in \mathcal{C}}
///        \langle \nabla f(x_k), v \rangle \\
/// g_k &= \langle \nabla f(x_k), x_k - v_k \rangle \\
/// x_{k+1} &= x_k + \gamma_k (v_k - x_k)
/// \end{aligned}
/// ```
/// with $`\gamma_k \in [0, 1]`$ picked by the objective's step-size
/// rule. The duality gap $`g_k`$ upper-bounds the suboptimality of
/// $`x_k`$, so the run stops once it falls to `eps`; a relative
/// per-step loss improvement below `psi` also counts as convergence.
/// Away-step and pairwise runs track the active vertex set and may
/// instead shrink the weight of the active vertex most aligned with
/// the gradient, see [\[LJ15\]](#references).
///
/// The optimizer borrows its collaborators and never mutates them, so
/// one objective and one region can back any number of runs.
///
/// References
/// ----------
/// \[FW56\]: Frank M, Wolfe P,
///           "An algorithm for quadratic programming",
///           Naval Research Logistics Quarterly 3, (1956)
///
/// \[LJ15\]: [ Lacoste-Julien S, Jaggi M
///             "On the Global Linear Convergence of Frank-Wolfe
///             Optimization Variants", NIPS 2015,
///             arxiv 1511.05932 ](https://arxiv.org/abs/1511.05932)
#[derive(Debug)]
pub struct FrankWolfe<'a, O, R, S> {
    objective_function: &'a O,
    feasibility_region: &'a R,
    psi: S,
    eps: S,
    max_iterations: usize,
    variant: Option<Variant>,
    step_size_rule: StepSizeRule,
}

impl<'a, O, R, S> FrankWolfe<'a, O, R, S>
where
    O: ObjectiveFunction<S>,
    R: FeasibilityRegion<S>,
    S: NdFloat,
{
    /// Parameters
    /// ----------
    /// - __objective_function:__ the smooth term to minimize
    /// - __feasibility_region:__ the constraint set supplying the oracles
    /// - __psi:__ relative per-step loss improvement below which the run
    ///   stops as converged; `0` stops only on an exactly flat step
    /// - __eps:__ duality-gap threshold for convergence
    /// - __max_iterations:__ iteration budget; exhausting it is a normal
    ///   terminal state, not an error
    pub fn new(
        objective_function: &'a O,
        feasibility_region: &'a R,
        psi: S,
        eps: S,
        max_iterations: usize,
    ) -> Self {
        FrankWolfe {
            objective_function,
            feasibility_region,
            psi,
            eps,
            max_iterations,
            variant: None,
            step_size_rule: StepSizeRule::default(),
        }
    }

    /// Overrides the region-derived default variant: pairwise over
    /// polytopes, vanilla otherwise.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Overrides the default [`StepSizeRule::Exact`] rule.
    pub fn with_step_size_rule(mut self, rule: StepSizeRule) -> Self {
        self.step_size_rule = rule;
        self
    }

    /// Runs the iteration to termination and reports the final iterate
    /// together with the recorded loss and gap histories.
    ///
    /// # Errors
    /// `UnsupportedVariant` when an away-step or pairwise variant was
    /// requested over a region without an away oracle. Oracle errors
    /// propagate, though the zero-gradient convergence guard keeps the
    /// loop away from the one degenerate call.
    pub fn optimize(&self) -> Result<Solution<S>, SolverError> {
        let polytope = self.feasibility_region.as_polytope();
        let variant = self.variant.unwrap_or(match polytope {
            Some(_) => Variant::Pairwise,
            None => Variant::Vanilla,
        });
        debug!(
            "Frank-Wolfe {:?} in {} dimensions: eps {}, psi {}, at most {} iterations",
            variant,
            self.feasibility_region.dimension(),
            self.eps,
            self.psi,
            self.max_iterations
        );
        let solution = match (variant, polytope) {
            (Variant::Vanilla, _) => self.run_vanilla()?,
            (_, Some(polytope)) => self.run_over_polytope(polytope, variant)?,
            (_, None) => return Err(SolverError::UnsupportedVariant(variant)),
        };
        debug!(
            "Frank-Wolfe stopped after {} iterations: {:?}",
            solution.iterations, solution.termination
        );
        Ok(solution)
    }

    fn run_vanilla(&self) -> Result<Solution<S>, SolverError> {
        let region = self.feasibility_region;
        let mut iterate = region.initial_vertex();
        let mut previous_loss = self.objective_function.evaluate_loss(iterate.view());
        let mut loss_history = Vec::with_capacity(self.max_iterations + 1);
        loss_history.push(previous_loss);
        let mut gap_history = Vec::with_capacity(self.max_iterations);
        let mut termination = Termination::MaxIterationsReached;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            let gradient = self.objective_function.evaluate_gradient(iterate.view());
            if gradient.iter().all(|&g| g == S::zero()) {
                gap_history.push(S::zero());
                termination = Termination::Converged;
                break;
            }
            let fw = region.linear_minimization_oracle(iterate.view(), gradient.view())?;
            gap_history.push(fw.gap);
            if fw.gap <= self.eps {
                termination = Termination::Converged;
                break;
            }

            let direction = &fw.vertex - &iterate;
            let gamma = self.objective_function.evaluate_step_size(
                iterate.view(),
                gradient.view(),
                direction.view(),
                self.step_size_rule,
            );
            iterate.scaled_add(gamma, &direction);
            iterations += 1;

            let loss = self.objective_function.evaluate_loss(iterate.view());
            loss_history.push(loss);
            trace!(
                "it {:>4}: forward step {}, gap {}, loss {}",
                iterations,
                gamma,
                fw.gap,
                loss
            );
            if stagnated(previous_loss, loss, self.psi) {
                termination = Termination::Converged;
                break;
            }
            previous_loss = loss;
        }

        Ok(Solution {
            iterate,
            loss_history,
            gap_history,
            iterations,
            termination,
        })
    }

    fn run_over_polytope(
        &self,
        polytope: &dyn Polytope<S>,
        variant: Variant,
    ) -> Result<Solution<S>, SolverError> {
        let region = self.feasibility_region;
        let radius = region.radius();
        let mut iterate = region.initial_vertex();
        // Each iteration activates at most one new vertex, and the
        // region only has 2n of them, so the arena never fills.
        let capacity = (2 * region.dimension()).min(self.max_iterations + 1);
        let mut active_set = ActiveSet::new(capacity, iterate.view());
        let mut previous_loss = self.objective_function.evaluate_loss(iterate.view());
        let mut loss_history = Vec::with_capacity(self.max_iterations + 1);
        loss_history.push(previous_loss);
        let mut gap_history = Vec::with_capacity(self.max_iterations);
        let mut termination = Termination::MaxIterationsReached;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            let gradient = self.objective_function.evaluate_gradient(iterate.view());
            if gradient.iter().all(|&g| g == S::zero()) {
                gap_history.push(S::zero());
                termination = Termination::Converged;
                break;
            }
            let fw = region.linear_minimization_oracle(iterate.view(), gradient.view())?;
            gap_history.push(fw.gap);
            if fw.gap <= self.eps {
                termination = Termination::Converged;
                break;
            }

            let (away_vertex, away_slot) =
                polytope.away_oracle(active_set.active_vertices(), gradient.view());

            let (kind, gamma) = match variant {
                Variant::Pairwise => {
                    let direction = &fw.vertex - &away_vertex;
                    let desired = self.objective_function.evaluate_step_size(
                        iterate.view(),
                        gradient.view(),
                        direction.view(),
                        self.step_size_rule,
                    );
                    let step = desired.min(active_set.weight(away_slot));
                    let to_slot = resolve_slot(polytope, &mut active_set, &fw, radius);
                    active_set.pairwise_step(away_slot, to_slot, step);
                    iterate.scaled_add(step, &direction);
                    ("pairwise", step)
                }
                // AwayStep; optimize() routes Vanilla to its own loop.
                _ => {
                    let away_potential =
                        gradient.dot(&away_vertex) - gradient.dot(&iterate);
                    if fw.gap >= away_potential {
                        let direction = &fw.vertex - &iterate;
                        let step = self.objective_function.evaluate_step_size(
                            iterate.view(),
                            gradient.view(),
                            direction.view(),
                            self.step_size_rule,
                        );
                        let slot = resolve_slot(polytope, &mut active_set, &fw, radius);
                        active_set.forward_step(slot, step);
                        iterate.scaled_add(step, &direction);
                        ("forward", step)
                    } else {
                        let direction = &iterate - &away_vertex;
                        let weight = active_set.weight(away_slot);
                        let cap = weight / (S::one() - weight);
                        let desired = self.objective_function.evaluate_step_size(
                            iterate.view(),
                            gradient.view(),
                            direction.view(),
                            self.step_size_rule,
                        );
                        if desired >= cap {
                            active_set.drop_step(away_slot, cap);
                            iterate.scaled_add(cap, &direction);
                            ("drop", cap)
                        } else {
                            active_set.away_step(away_slot, desired);
                            iterate.scaled_add(desired, &direction);
                            ("away", desired)
                        }
                    }
                }
            };
            iterations += 1;

            let loss = self.objective_function.evaluate_loss(iterate.view());
            loss_history.push(loss);
            trace!(
                "it {:>4}: {} step {}, gap {}, loss {}, {} active vertices",
                iterations,
                kind,
                gamma,
                fw.gap,
                loss,
                active_set.len()
            );
            if stagnated(previous_loss, loss, self.psi) {
                termination = Termination::Converged;
                break;
            }
            previous_loss = loss;
        }

        Ok(Solution {
            iterate,
            loss_history,
            gap_history,
            iterations,
            termination,
        })
    }
}

/// Slot of the oracle vertex in the active set, deduplicating through
/// the region's exact lookup before appending.
fn resolve_slot<S: NdFloat>(
    polytope: &dyn Polytope<S>,
    active_set: &mut ActiveSet<S>,
    fw: &FwVertex<S>,
    radius: S,
) -> usize {
    let found = fw.basis.and_then(|basis| {
        polytope.vertex_among_active_vertices(
            active_set.active_vertices(),
            basis.index,
            basis.sign * radius,
        )
    });
    match found {
        Some(slot) => slot,
        None => active_set.insert(fw.vertex.view()),
    }
}

fn stagnated<S: NdFloat>(previous: S, current: S, psi: S) -> bool {
    (previous - current).abs() <= psi * current.abs().max(S::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::L2Loss;
    use crate::region::{L1Ball, L2Ball};
    use approx::assert_abs_diff_eq;
    use ndarray::prelude::*;
    use ndarray_rand::rand_distr::Normal;
    use ndarray_rand::RandomExt;

    // x* = [0.3, 0.1], strictly inside the unit l1 ball.
    fn small_lasso() -> L2Loss<f64> {
        L2Loss::new(array![[1., 0.], [0., 1.]], array![-0.3, -0.1], 0.).unwrap()
    }

    fn assert_non_increasing(history: &[f64]) {
        for pair in history.windows(2) {
            assert!(
                pair[1] <= pair[0] + 1e-9,
                "loss rose from {} to {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn pairwise_converges_on_an_interior_optimum() {
        let region = L1Ball::new(2, 1.).unwrap();
        let objective = small_lasso();
        let solution = FrankWolfe::new(&objective, &region, 0., 1e-10, 500)
            .optimize()
            .unwrap();
        assert_eq!(solution.termination, Termination::Converged);
        assert_abs_diff_eq!(solution.iterate, array![0.3, 0.1], epsilon = 1e-4);
        assert!(solution.iterate.iter().map(|v| v.abs()).sum::<f64>() <= 1. + 1e-9);
        assert_eq!(solution.gap_history.len(), solution.iterations + 1);
        assert!(solution.gap_history.last().unwrap() < solution.gap_history.first().unwrap());
        assert_non_increasing(&solution.loss_history);
    }

    #[test]
    fn away_steps_converge_on_the_same_instance() {
        let region = L1Ball::new(2, 1.).unwrap();
        let objective = small_lasso();
        let solution = FrankWolfe::new(&objective, &region, 0., 1e-10, 500)
            .with_variant(Variant::AwayStep)
            .optimize()
            .unwrap();
        assert_eq!(solution.termination, Termination::Converged);
        assert_abs_diff_eq!(solution.iterate, array![0.3, 0.1], epsilon = 1e-4);
        assert_non_increasing(&solution.loss_history);
    }

    #[test]
    fn vanilla_also_runs_on_polytopes() {
        let region = L1Ball::new(2, 1.).unwrap();
        let objective = small_lasso();
        let solution = FrankWolfe::new(&objective, &region, 0., 1e-10, 1000)
            .with_variant(Variant::Vanilla)
            .optimize()
            .unwrap();
        assert_eq!(solution.termination, Termination::Converged);
        assert_abs_diff_eq!(solution.iterate, array![0.3, 0.1], epsilon = 1e-4);
    }

    #[test]
    fn vanilla_over_the_l2_ball_reaches_the_ridge_optimum() {
        let region = L2Ball::new(3, 10.).unwrap();
        let objective = L2Loss::new(
            array![[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]],
            array![-1., -2., 1.],
            0.1,
        )
        .unwrap();
        let solution = FrankWolfe::new(&objective, &region, 0., 1e-4, 2000)
            .optimize()
            .unwrap();
        assert_eq!(solution.termination, Termination::Converged);
        // Stationarity of (1/3)|x + b|^2 + 0.05|x|^2 gives x* = -b 20/23.
        let expected = array![1., 2., -1.] * (20. / 23.);
        assert_abs_diff_eq!(solution.iterate, expected, epsilon = 0.05);
        assert!(solution.iterate.dot(&solution.iterate).sqrt() <= 10. + 1e-9);
        assert!(solution.gap_history.last().unwrap() < solution.gap_history.first().unwrap());
        assert_non_increasing(&solution.loss_history);
    }

    #[test]
    fn pairwise_handles_tall_and_wide_problems() {
        for &(m, n) in &[(1000usize, 40usize), (40, 1000)] {
            let A: Array2<f64> = Array::random((m, n), Normal::new(0., 1.).unwrap());
            let b: Array1<f64> = Array::random((m,), Normal::new(0., 1.).unwrap());
            let objective = L2Loss::new(A, b, 1.).unwrap();
            let region = L1Ball::new(n, 1.).unwrap();
            let solution = FrankWolfe::new(&objective, &region, 0., 1e-10, 30)
                .optimize()
                .unwrap();
            assert_eq!(solution.iterate.len(), n);
            assert!(solution.iterate.iter().map(|v| v.abs()).sum::<f64>() <= 1. + 1e-9);
            assert_eq!(solution.loss_history.len(), solution.iterations + 1);
            assert_non_increasing(&solution.loss_history);
        }
    }

    #[test]
    fn vanilla_handles_large_euclidean_problems() {
        for &(m, n) in &[(1000usize, 40usize), (40, 1000)] {
            let A: Array2<f64> = Array::random((m, n), Normal::new(0., 1.).unwrap());
            let b: Array1<f64> = Array::random((m,), Normal::new(0., 1.).unwrap());
            let objective = L2Loss::new(A, b, 1.).unwrap();
            let region = L2Ball::new(n, 2.).unwrap();
            let solution = FrankWolfe::new(&objective, &region, 0., 1e-10, 30)
                .optimize()
                .unwrap();
            assert_eq!(solution.iterate.len(), n);
            assert!(solution.iterate.dot(&solution.iterate).sqrt() <= 2. + 1e-9);
            assert_non_increasing(&solution.loss_history);
        }
    }

    #[test]
    fn a_loose_stagnation_threshold_stops_immediately() {
        let region = L1Ball::new(2, 1.).unwrap();
        let objective = small_lasso();
        let solution = FrankWolfe::new(&objective, &region, 1e9, 1e-12, 200)
            .optimize()
            .unwrap();
        assert_eq!(solution.termination, Termination::Converged);
        assert_eq!(solution.iterations, 1);
        assert_eq!(solution.loss_history.len(), 2);
    }

    #[test]
    fn away_variants_require_a_polytope() {
        let region = L2Ball::new(2, 1.).unwrap();
        let objective = small_lasso();
        let pairwise = FrankWolfe::new(&objective, &region, 0., 1e-6, 10)
            .with_variant(Variant::Pairwise)
            .optimize();
        assert_eq!(
            pairwise.unwrap_err(),
            SolverError::UnsupportedVariant(Variant::Pairwise)
        );
        let away = FrankWolfe::new(&objective, &region, 0., 1e-6, 10)
            .with_variant(Variant::AwayStep)
            .optimize();
        assert_eq!(
            away.unwrap_err(),
            SolverError::UnsupportedVariant(Variant::AwayStep)
        );
        // The default over the same region resolves to vanilla instead.
        let default = FrankWolfe::new(&objective, &region, 0., 1e-6, 10).optimize();
        assert!(default.is_ok());
    }

    #[test]
    fn an_exactly_stationary_start_converges_in_zero_iterations() {
        let region = L1Ball::new(2, 2.).unwrap();
        // The gradient vanishes at the initial vertex [2, 0].
        let objective = L2Loss::new(array![[1., 0.], [0., 1.]], array![-2., 0.], 0.).unwrap();
        let solution = FrankWolfe::new(&objective, &region, 0., 1e-12, 50)
            .optimize()
            .unwrap();
        assert_eq!(solution.termination, Termination::Converged);
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.gap_history, vec![0.]);
        assert_eq!(solution.iterate, array![2., 0.]);
    }

    #[test]
    fn the_line_search_rule_reaches_the_same_optimum() {
        let region = L1Ball::new(2, 1.).unwrap();
        let objective = small_lasso();
        let solution = FrankWolfe::new(&objective, &region, 0., 1e-8, 500)
            .with_step_size_rule(StepSizeRule::LineSearch { iterations: 100 })
            .optimize()
            .unwrap();
        assert_eq!(solution.termination, Termination::Converged);
        assert_abs_diff_eq!(solution.iterate, array![0.3, 0.1], epsilon = 1e-3);
    }
}
